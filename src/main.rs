use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use latticeflow::config::AppConfig;
use latticeflow::visualisations::format_currency;
use latticeflow::{generate_lattice, render_lattice, FigureSize, LatticeParameters, LatticeResult};

#[derive(Parser)]
#[command(name = "latticeflow", version, about = "Binomial price lattice generator and viewer")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the lattice diagram to a PNG or SVG file
    Render {
        #[command(flatten)]
        lattice: LatticeArgs,
        #[arg(short, long, default_value = "lattice.png")]
        output: PathBuf,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
    },
    /// Print the reachable prices at every step
    Prices {
        #[command(flatten)]
        lattice: LatticeArgs,
        #[arg(long)]
        json: bool,
    },
    /// Serve the lattice web form
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(Args)]
struct LatticeArgs {
    /// Initial stock price
    #[arg(short = 's', long, default_value_t = 18.0)]
    price: f64,
    /// Time horizon in years
    #[arg(short = 't', long, default_value_t = 1.0)]
    time: f64,
    /// Annualised volatility
    #[arg(short = 'v', long, default_value_t = 0.2)]
    volatility: f64,
    /// Number of steps (1 to 12)
    #[arg(short = 'n', long, default_value_t = 10)]
    steps: usize,
}

impl LatticeArgs {
    fn params(&self) -> LatticeResult<LatticeParameters> {
        LatticeParameters::new(self.price, self.time, self.volatility, self.steps)
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cfg = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cli.command, cfg).await {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

async fn run(command: Command, mut cfg: AppConfig) -> LatticeResult<()> {
    match command {
        Command::Render { lattice, output, width, height } => {
            let size = FigureSize::new(
                width.unwrap_or(cfg.figure_size.width),
                height.unwrap_or(cfg.figure_size.height),
            )?;
            let figure = render_lattice(&lattice.params()?)?;
            figure.save(&output, size)?;
            println!("Lattice diagram saved as {}", output.display());
        }
        Command::Prices { lattice, json } => {
            let prices = generate_lattice(&lattice.params()?)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&prices)?);
            } else {
                println!("u = {:.4}, d = {:.4}, dt = {:.4}", prices.up, prices.down, prices.dt);
                for (step, level) in prices.levels().iter().enumerate() {
                    let row: Vec<String> =
                        level.prices().iter().map(|p| format_currency(*p)).collect();
                    println!("Step {step:>2}: {}", row.join("  "));
                }
            }
        }
        Command::Serve { host, port } => {
            if let Some(host) = host {
                cfg.host = host;
            }
            if let Some(port) = port {
                cfg.port = port;
            }
            latticeflow::server::serve(cfg).await?;
        }
    }
    Ok(())
}
