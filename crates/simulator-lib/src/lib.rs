//! Simulation library for synthetic HTTP telemetry
//!
//! This crate provides the core functionality for:
//! - Weighted status code sampling and fake request synthesis
//! - Folding simulated requests into Prometheus instruments
//! - The cycle loop that drives the simulation
//! - Health checks and the metrics exposition endpoint

pub mod api;
pub mod error;
pub mod health;
pub mod models;
pub mod observability;
pub mod simulation;

pub use error::{Result, SimError};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{SimulatorMetrics, StructuredLogger};
pub use simulation::{
    LoopState, RequestSimulator, SimulationLoop, SimulationLoopBuilder, TelemetrySink,
};
