//! Metrics Simulator - synthetic HTTP request telemetry
//!
//! Fabricates request counts, durations and status codes for a fake
//! service and exposes them on a Prometheus scrape endpoint, so that
//! dashboards and alerts can be exercised without a real backend.

use anyhow::{Context, Result};
use prometheus::Registry;
use simulator_lib::{
    api,
    health::{components, HealthRegistry},
    observability::{SimulatorMetrics, StructuredLogger},
    SimulationLoopBuilder,
};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;

const SIMULATOR_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    let config = config::SimulatorConfig::load()?;
    let simulation_config = config.simulation.clone();

    let logger = StructuredLogger::new(&simulation_config);
    logger.log_startup(SIMULATOR_VERSION, &simulation_config);

    let registry = Registry::new();
    let metrics = SimulatorMetrics::register(&registry, &simulation_config)
        .context("Failed to register simulator metrics")?;

    let health_registry = HealthRegistry::new();
    health_registry.register(components::METRICS_ENDPOINT).await;

    // Bind before the loop starts so a taken port aborts startup
    let listener = api::bind(config.metrics_port)
        .await
        .with_context(|| format!("Failed to bind metrics port {}", config.metrics_port))?;
    logger.log_endpoint(&listener.local_addr()?.to_string());

    let app_state = Arc::new(api::AppState::new(health_registry.clone(), registry));
    let mut api_handle = tokio::spawn(api::serve(listener, app_state));
    health_registry.set_ready(true).await;

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let simulation = SimulationLoopBuilder::new()
        .config(simulation_config)
        .sink(Arc::new(metrics))
        .health(health_registry.clone())
        .build()?;
    let mut loop_handle = tokio::spawn(simulation.run(shutdown_rx));

    tokio::select! {
        result = &mut loop_handle => {
            let cycles = result.context("Simulation task panicked")??;
            info!(cycles = cycles, "Simulation loop exited");
        }
        result = &mut api_handle => {
            result.context("API server task panicked")??;
            anyhow::bail!("API server stopped unexpectedly");
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            logger.log_shutdown("SIGINT received");
            let _ = shutdown_tx.send(());
            let cycles = loop_handle.await.context("Simulation task panicked")??;
            info!(cycles = cycles, "Simulation loop stopped");
        }
    }

    Ok(())
}
