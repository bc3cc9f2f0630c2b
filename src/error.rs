//! Error types.
//!
//! - `AnalysisError`: typed failures raised by the analysis core. Per-device
//!   failures are caught by the pipeline and turned into exclusions; batch-level
//!   failures (`EmptyAggregationInput`) reach the caller.
//! - `AppError`: what the binary reports, carrying a process exit code.

use thiserror::Error;

/// Failures raised by the analysis core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// Not enough peak/trough pairs to derive FSR and extinction ratio.
    #[error("malformed spectrum: {reason}")]
    MalformedSpectrum { reason: String },

    /// Device identifier does not follow the configured naming convention.
    #[error("cannot parse device id '{id}': {reason}")]
    IdentifierParseError { id: String, reason: String },

    /// No curve data anywhere to aggregate (or build a surface from).
    #[error("nothing to aggregate: {0}")]
    EmptyAggregationInput(String),

    /// An interpolant was evaluated outside its native domain.
    ///
    /// Non-fatal: the aggregator maps it to an undefined sample.
    #[error("x={x} lies outside the interpolation domain [{min}, {max}]")]
    InterpolationOutOfDomain { x: f64, min: f64, max: f64 },

    /// A caller broke an input contract (length mismatch, bad grid, bad constant).
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl AnalysisError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedSpectrum {
            reason: reason.into(),
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidInput(reason.into())
    }

    /// Exit code used when this error terminates the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::IdentifierParseError { .. } | Self::InvalidInput(_) => 2,
            Self::MalformedSpectrum { .. } | Self::EmptyAggregationInput(_) => 3,
            Self::InterpolationOutOfDomain { .. } => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        Self::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
