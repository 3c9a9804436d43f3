use serde::Serialize;

use crate::errors::{LatticeError, LatticeResult};

/// Largest step count a lattice may have. Beyond this the diagram stops
/// being readable.
pub const MAX_STEPS: usize = 12;

/// Inputs of a Cox-Ross-Rubinstein price lattice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatticeParameters {
    /// Spot price of the underlying at step 0.
    pub initial_price: f64,
    /// Total horizon in years.
    pub time_horizon: f64,
    /// Annualised volatility.
    pub volatility: f64,
    pub steps: usize,
}

impl LatticeParameters {
    pub fn new(
        initial_price: f64,
        time_horizon: f64,
        volatility: f64,
        steps: usize,
    ) -> LatticeResult<Self> {
        let params = Self {
            initial_price,
            time_horizon,
            volatility,
            steps,
        };
        params.validate()?;
        Ok(params)
    }

    /// Checks the step ceiling first, then the numeric domain.
    pub fn validate(&self) -> LatticeResult<()> {
        if self.steps > MAX_STEPS {
            return Err(LatticeError::StepCountExceeded { steps: self.steps, ceiling: MAX_STEPS });
        }
        if self.steps == 0 {
            return Err(LatticeError::InvalidParameter {
                name: "steps",
                reason: "must be at least 1".to_string(),
            });
        }
        positive("initial_price", self.initial_price)?;
        positive("time_horizon", self.time_horizon)?;
        positive("volatility", self.volatility)?;
        Ok(())
    }
}

fn positive(name: &'static str, value: f64) -> LatticeResult<()> {
    if !value.is_finite() {
        let reason = format!("{value} is not a finite number");
        return Err(LatticeError::InvalidParameter { name, reason });
    }
    if value <= 0.0 {
        let reason = format!("{value} must be greater than zero");
        return Err(LatticeError::InvalidParameter { name, reason });
    }
    Ok(())
}

/// All prices reachable at one step, indexed by the number of down-moves.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PriceLevel(Vec<f64>);

impl PriceLevel {
    pub fn prices(&self) -> &[f64] {
        &self.0
    }

    pub fn price(&self, down_moves: usize) -> Option<f64> {
        self.0.get(down_moves).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Generator output: one [`PriceLevel`] per step `0..=steps`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceLattice {
    pub params: LatticeParameters,
    pub dt: f64,
    pub up: f64,
    pub down: f64,
    levels: Vec<PriceLevel>,
}

impl PriceLattice {
    pub fn levels(&self) -> &[PriceLevel] {
        &self.levels
    }

    pub fn level(&self, step: usize) -> Option<&PriceLevel> {
        self.levels.get(step)
    }

    pub fn price(&self, step: usize, down_moves: usize) -> Option<f64> {
        self.level(step).and_then(|level| level.price(down_moves))
    }

    pub fn steps(&self) -> usize {
        self.params.steps
    }

    /// `(n + 1)(n + 2) / 2` for `n` steps.
    pub fn node_count(&self) -> usize {
        self.levels.iter().map(PriceLevel::len).sum()
    }
}

/// Computes every reachable price of the lattice described by `params`.
///
/// `u = exp(sigma * sqrt(dt))` and `d = 1 / u`, so an up-move followed by a
/// down-move lands back on the same price and the tree recombines. Nothing is
/// rounded here; labels round to cents at display time.
pub fn generate_lattice(params: &LatticeParameters) -> LatticeResult<PriceLattice> {
    params.validate()?;

    let s = params.initial_price;
    let n = params.steps;
    let dt = params.time_horizon / n as f64;
    let u = f64::exp(params.volatility * f64::sqrt(dt));
    let d = 1.0 / u;

    let levels = (0..=n)
        .map(|step| {
            let prices = (0..=step)
                .map(|down_moves| {
                    let up_moves = step - down_moves;
                    s * u.powi(up_moves as i32) * d.powi(down_moves as i32)
                })
                .collect();
            PriceLevel(prices)
        })
        .collect();

    tracing::debug!(steps = n, dt, up = u, down = d, "generated price lattice");

    Ok(PriceLattice { params: *params, dt, up: u, down: d, levels })
}
