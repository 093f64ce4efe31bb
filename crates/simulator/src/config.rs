//! Simulator configuration
//!
//! Settings come from plain environment variables (no prefix), as injected
//! from a ConfigMap. The environment source lowercases names, so `appName`
//! is looked up as `appname`. Malformed integers fall back to their default
//! with a warning.

use anyhow::Result;
use simulator_lib::models::{
    DistributionConfig, SimulationConfig, DEFAULT_APP_NAME, DEFAULT_MAX_REQUEST_DELAY_MILLIS,
    DEFAULT_NAMESPACE, DEFAULT_SLEEP_MILLIS, DEFAULT_URI_BASE,
};
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Port the metrics endpoint listens on
const DEFAULT_METRICS_PORT: u16 = 9400;

mod keys {
    pub const NAMESPACE: &str = "namespace";
    pub const APP_NAME: &str = "appname";
    pub const URI_BASE: &str = "uribase";
    pub const SLEEP_MILLIS: &str = "sleeptimeinmillis";
    pub const MAX_REQUEST_DELAY_MILLIS: &str = "maxrequestdelaymillis";
    pub const METRICS_PORT: &str = "metricsport";
    pub const SEED: &str = "simulationseed";
    pub const STATUS_200: &str = "status_200_percent";
    pub const STATUS_201: &str = "status_201_percent";
    pub const STATUS_401: &str = "status_401_percent";
    pub const STATUS_404: &str = "status_404_percent";
    pub const STATUS_500: &str = "status_500_percent";
}

/// Process configuration
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    pub simulation: SimulationConfig,
    pub metrics_port: u16,
}

impl SimulatorConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        let source = config::Config::builder()
            .add_source(config::Environment::default().ignore_empty(true))
            .build()?;

        Ok(Self::from_source(&source))
    }

    fn from_source(source: &config::Config) -> Self {
        let distribution = DistributionConfig {
            status_200_percent: int_or_default(source, keys::STATUS_200, 50),
            status_201_percent: int_or_default(source, keys::STATUS_201, 20),
            status_401_percent: int_or_default(source, keys::STATUS_401, 10),
            status_404_percent: int_or_default(source, keys::STATUS_404, 10),
            status_500_percent: int_or_default(source, keys::STATUS_500, 10),
        };

        let simulation = SimulationConfig {
            namespace: string_or_default(source, keys::NAMESPACE, DEFAULT_NAMESPACE),
            app_name: string_or_default(source, keys::APP_NAME, DEFAULT_APP_NAME),
            uri_base: string_or_default(source, keys::URI_BASE, DEFAULT_URI_BASE),
            sleep_interval: Duration::from_millis(int_or_default(
                source,
                keys::SLEEP_MILLIS,
                DEFAULT_SLEEP_MILLIS,
            )),
            max_request_delay: Duration::from_millis(int_or_default(
                source,
                keys::MAX_REQUEST_DELAY_MILLIS,
                DEFAULT_MAX_REQUEST_DELAY_MILLIS,
            )),
            distribution,
            seed: optional_int(source, keys::SEED),
        };

        Self {
            simulation,
            metrics_port: int_or_default(source, keys::METRICS_PORT, DEFAULT_METRICS_PORT),
        }
    }
}

fn string_or_default(source: &config::Config, key: &str, default: &str) -> String {
    source
        .get_string(key)
        .unwrap_or_else(|_| default.to_string())
}

fn int_or_default<T>(source: &config::Config, key: &str, default: T) -> T
where
    T: FromStr + Display,
{
    let Ok(raw) = source.get_string(key) else {
        return default;
    };

    match raw.trim().parse::<T>() {
        Ok(value) => value,
        Err(_) => {
            warn!(key = %key, value = %raw, default = %default, "Invalid integer, using default");
            default
        }
    }
}

fn optional_int<T: FromStr>(source: &config::Config, key: &str) -> Option<T> {
    let raw = source.get_string(key).ok()?;

    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key = %key, value = %raw, "Invalid integer, ignoring");
            None
        }
    }
}
