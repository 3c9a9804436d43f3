use crate::errors::{LatticeError, LatticeResult};
use crate::visualisations::FigureSize;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub figure_size: FigureSize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            figure_size: FigureSize::default(),
        }
    }
}

impl AppConfig {
    /// Reads `.env` (if present) and then the process environment.
    pub fn from_env() -> LatticeResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> LatticeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var_or = |key: &str, default: String| lookup(key).unwrap_or(default);

        let port = var_or("LATTICE_PORT", defaults.port.to_string())
            .parse::<u16>()
            .map_err(|e| LatticeError::Config(format!("LATTICE_PORT: {e}")))?;

        let width = var_or("LATTICE_WIDTH", defaults.figure_size.width.to_string())
            .parse::<u32>()
            .map_err(|e| LatticeError::Config(format!("LATTICE_WIDTH: {e}")))?;

        let height = var_or("LATTICE_HEIGHT", defaults.figure_size.height.to_string())
            .parse::<u32>()
            .map_err(|e| LatticeError::Config(format!("LATTICE_HEIGHT: {e}")))?;

        let figure_size = FigureSize::new(width, height)
            .map_err(|e| LatticeError::Config(format!("LATTICE_WIDTH/LATTICE_HEIGHT: {e}")))?;

        Ok(Self {
            host: var_or("LATTICE_HOST", defaults.host),
            port,
            figure_size,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
