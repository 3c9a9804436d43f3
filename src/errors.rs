/// Errors raised while building, rendering or serving a price lattice.
///
/// `StepCountExceeded` and `InvalidParameter` are caller mistakes and are
/// raised before any computation. Everything else comes from exporting or
/// configuration.
#[derive(Debug, thiserror::Error)]
pub enum LatticeError {
    #[error("too many steps: {steps} (at most {ceiling}), please choose a smaller number")]
    StepCountExceeded { steps: usize, ceiling: usize },

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("render error: {0}")]
    Render(String),

    #[error("unsupported export format: {0}")]
    UnsupportedFormat(String),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl LatticeError {
    /// True for errors caused by the lattice parameters themselves.
    pub fn is_parameter_error(&self) -> bool {
        matches!(
            self,
            LatticeError::StepCountExceeded { .. } | LatticeError::InvalidParameter { .. }
        )
    }
}

impl From<serde_json::Error> for LatticeError {
    fn from(e: serde_json::Error) -> Self {
        LatticeError::Serialize(e.to_string())
    }
}

pub type LatticeResult<T> = Result<T, LatticeError>;
