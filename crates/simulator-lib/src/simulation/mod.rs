//! Request simulation engine
//!
//! This module fabricates HTTP request telemetry: a weighted status code
//! sampler, a request synthesizer, and the loop that folds one simulated
//! request per cycle into the exposed instruments.

mod r#loop;
mod request;
pub mod sampler;

pub use r#loop::{LoopState, SimulationLoop, SimulationLoopBuilder};
pub use request::{request_path, RequestSimulator};

use crate::error::Result;
use crate::models::SimulatedRequest;
use crate::observability::SimulatorMetrics;

/// Destination for the metric mutations of each cycle
pub trait TelemetrySink: Send + Sync {
    /// Count one elapsed cycle
    fn inc_uptime(&self);

    /// Record a simulated request
    fn apply(&self, request: &SimulatedRequest) -> Result<()>;
}

impl TelemetrySink for SimulatorMetrics {
    fn inc_uptime(&self) {
        SimulatorMetrics::inc_uptime(self);
    }

    fn apply(&self, request: &SimulatedRequest) -> Result<()> {
        SimulatorMetrics::apply(self, request)
    }
}
