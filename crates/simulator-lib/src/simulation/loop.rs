//! Simulation loop
//!
//! Sleeps for the configured interval, then counts one cycle of uptime and
//! folds one simulated request into the instruments. Runs until a shutdown
//! signal arrives between cycles or a cycle fails.

use super::{RequestSimulator, TelemetrySink};
use crate::error::{Result, SimError};
use crate::health::{components, HealthRegistry};
use crate::models::SimulationConfig;
use crate::observability::StructuredLogger;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Cycles between progress log lines
const PROGRESS_LOG_EVERY: u64 = 30;

/// Lifecycle of the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    /// Stopped by shutdown or a failed cycle; no further cycles run
    Terminated,
}

/// Drives one simulated request per cycle into a telemetry sink
pub struct SimulationLoop {
    simulator: RequestSimulator,
    sink: Arc<dyn TelemetrySink>,
    sleep_interval: Duration,
    health: Option<HealthRegistry>,
    logger: StructuredLogger,
    state: LoopState,
    cycles: u64,
}

impl SimulationLoop {
    /// Create a loop with an entropy- or config-seeded simulator
    pub fn new(config: &SimulationConfig, sink: Arc<dyn TelemetrySink>) -> Self {
        Self::with_simulator(config, sink, RequestSimulator::new(config))
    }

    fn with_simulator(
        config: &SimulationConfig,
        sink: Arc<dyn TelemetrySink>,
        simulator: RequestSimulator,
    ) -> Self {
        Self {
            simulator,
            sink,
            sleep_interval: config.sleep_interval,
            health: None,
            logger: StructuredLogger::new(config),
            state: LoopState::Running,
            cycles: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Completed cycles so far
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Run until shutdown, returning the number of completed cycles
    ///
    /// A failed cycle ends the run with its error instead. Shutdown is only observed while sleeping, so a cycle is never half-applied.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) -> Result<u64> {
        if self.state == LoopState::Terminated {
            return Err(SimError::Terminated);
        }

        info!(
            sleep_ms = self.sleep_interval.as_millis() as u64,
            "Starting simulation loop"
        );
        if let Some(health) = &self.health {
            health.register(components::SIMULATION_LOOP).await;
        }

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.sleep_interval) => {}
                _ = shutdown.recv() => {
                    info!(cycles = self.cycles, "Shutting down simulation loop");
                    self.state = LoopState::Terminated;
                    return Ok(self.cycles);
                }
            }

            self.step().await?;
        }
    }

    /// Sleep once, then run a single cycle
    pub async fn run_cycle(&mut self) -> Result<()> {
        if self.state == LoopState::Terminated {
            return Err(SimError::Terminated);
        }

        tokio::time::sleep(self.sleep_interval).await;
        self.step().await
    }

    /// Simulate, apply, then count the cycle. Any failure terminates the loop
    /// with nothing recorded for the failed cycle.
    async fn step(&mut self) -> Result<()> {
        let request = self.simulator.simulate().await;
        let cycle = self.cycles + 1;
        self.logger.log_request(cycle, &request);

        if let Err(e) = self.sink.apply(&request) {
            self.terminate(&e).await;
            return Err(e);
        }
        self.sink.inc_uptime();

        self.cycles = cycle;
        if self.cycles % PROGRESS_LOG_EVERY == 0 {
            debug!(cycles = self.cycles, "Simulation progress");
        }

        Ok(())
    }

    async fn terminate(&mut self, error: &SimError) {
        self.state = LoopState::Terminated;
        self.logger
            .log_cycle_failure(self.cycles + 1, &error.to_string());

        if let Some(health) = &self.health {
            health
                .set_unhealthy(components::SIMULATION_LOOP, error.to_string())
                .await;
        }
    }
}

/// Builder for the simulation loop
#[derive(Default)]
pub struct SimulationLoopBuilder {
    config: Option<SimulationConfig>,
    sink: Option<Arc<dyn TelemetrySink>>,
    rng: Option<StdRng>,
    health: Option<HealthRegistry>,
}

impl SimulationLoopBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: SimulationConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the metrics destination
    pub fn sink(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Override the random source (takes precedence over `config.seed`)
    pub fn rng(mut self, rng: StdRng) -> Self {
        self.rng = Some(rng);
        self
    }

    /// Report loop health into `health`
    pub fn health(mut self, health: HealthRegistry) -> Self {
        self.health = Some(health);
        self
    }

    pub fn build(self) -> anyhow::Result<SimulationLoop> {
        let config = self
            .config
            .ok_or_else(|| anyhow::anyhow!("Simulation config is required"))?;
        let sink = self
            .sink
            .ok_or_else(|| anyhow::anyhow!("Telemetry sink is required"))?;

        let simulator = match self.rng {
            Some(rng) => RequestSimulator::with_rng(&config, rng),
            None => RequestSimulator::new(&config),
        };

        let mut simulation = SimulationLoop::with_simulator(&config, sink, simulator);
        simulation.health = self.health;
        Ok(simulation)
    }
}
