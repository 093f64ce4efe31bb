//! Error types for the simulation core

use thiserror::Error;

/// Failures that abort the simulation
#[derive(Debug, Error)]
pub enum SimError {
    /// Instrument registration or label resolution failed
    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// A terminated loop was asked to run another cycle
    #[error("simulation loop already terminated")]
    Terminated,
}

pub type Result<T> = std::result::Result<T, SimError>;
