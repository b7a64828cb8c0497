//! Error types for fftbench

use thiserror::Error;

/// Main error type for harness operations
#[derive(Debug, Error)]
pub enum BenchError {
    /// Bad bounds, non-power-of-two sizes or otherwise unusable settings.
    /// Always raised before any buffer is allocated.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A transform buffer could not be reserved
    #[error("Allocation of {bytes} bytes failed: {reason}")]
    Allocation { bytes: usize, reason: String },

    /// The transform engine rejected a plan request
    #[error("Plan construction error: {0}")]
    PlanConstruction(String),

    /// Engine failure outside plan construction
    #[error("Engine error: {0}")]
    Engine(String),

    /// Report output failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BenchError {
    /// Shorthand for a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        BenchError::Configuration(msg.into())
    }

    /// Shorthand for a plan construction error.
    pub fn plan(msg: impl Into<String>) -> Self {
        BenchError::PlanConstruction(msg.into())
    }
}

/// Result type alias for harness operations
pub type Result<T> = std::result::Result<T, BenchError>;
