//! Core data models for the metrics simulator

use std::fmt;
use std::time::Duration;

/// Default Kubernetes namespace label
pub const DEFAULT_NAMESPACE: &str = "default";

/// Default application label
pub const DEFAULT_APP_NAME: &str = "metrics-demo";

/// Default base path for simulated endpoints
pub const DEFAULT_URI_BASE: &str = "/domain/demo-api";

/// Default sleep between simulation cycles (20 seconds)
pub const DEFAULT_SLEEP_MILLIS: u64 = 20_000;

/// Default upper bound of the artificial per-request delay
pub const DEFAULT_MAX_REQUEST_DELAY_MILLIS: u64 = 500;

/// Path segment appended to the URI base for item-scoped reads
pub const ID_PLACEHOLDER: &str = "{id}";

/// HTTP status codes the simulator can emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Ok,
    Created,
    Unauthorized,
    NotFound,
    InternalServerError,
}

impl StatusCode {
    /// All codes in sampling order
    pub const ALL: [StatusCode; 5] = [
        StatusCode::Ok,
        StatusCode::Created,
        StatusCode::Unauthorized,
        StatusCode::NotFound,
        StatusCode::InternalServerError,
    ];

    /// Label value used in the duration histogram
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusCode::Ok => "200",
            StatusCode::Created => "201",
            StatusCode::Unauthorized => "401",
            StatusCode::NotFound => "404",
            StatusCode::InternalServerError => "500",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP methods the simulator can emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Percentage weights for each simulated status code
///
/// The weights are not required to sum to 100. Any shortfall lands on 500,
/// and any excess makes the ranges of later codes unreachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistributionConfig {
    pub status_200_percent: u32,
    pub status_201_percent: u32,
    pub status_401_percent: u32,
    pub status_404_percent: u32,
    pub status_500_percent: u32,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            status_200_percent: 50,
            status_201_percent: 20,
            status_401_percent: 10,
            status_404_percent: 10,
            status_500_percent: 10,
        }
    }
}

impl DistributionConfig {
    /// Distribution that always yields a single code
    pub fn only(code: StatusCode) -> Self {
        let mut dist = Self {
            status_200_percent: 0,
            status_201_percent: 0,
            status_401_percent: 0,
            status_404_percent: 0,
            status_500_percent: 0,
        };
        match code {
            StatusCode::Ok => dist.status_200_percent = 100,
            StatusCode::Created => dist.status_201_percent = 100,
            StatusCode::Unauthorized => dist.status_401_percent = 100,
            StatusCode::NotFound => dist.status_404_percent = 100,
            StatusCode::InternalServerError => dist.status_500_percent = 100,
        }
        dist
    }

    /// Configured weight for a code
    pub fn percent(&self, code: StatusCode) -> u32 {
        match code {
            StatusCode::Ok => self.status_200_percent,
            StatusCode::Created => self.status_201_percent,
            StatusCode::Unauthorized => self.status_401_percent,
            StatusCode::NotFound => self.status_404_percent,
            StatusCode::InternalServerError => self.status_500_percent,
        }
    }

    /// Sum of all weights (saturating)
    pub fn total(&self) -> u32 {
        StatusCode::ALL
            .iter()
            .fold(0u32, |acc, code| acc.saturating_add(self.percent(*code)))
    }
}

/// Settings consumed by the simulation core
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub namespace: String,
    pub app_name: String,
    pub uri_base: String,
    /// Sleep between cycles
    pub sleep_interval: Duration,
    /// Upper bound (exclusive) of the artificial request delay
    pub max_request_delay: Duration,
    pub distribution: DistributionConfig,
    /// Fixed RNG seed, random when absent
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            app_name: DEFAULT_APP_NAME.to_string(),
            uri_base: DEFAULT_URI_BASE.to_string(),
            sleep_interval: Duration::from_millis(DEFAULT_SLEEP_MILLIS),
            max_request_delay: Duration::from_millis(DEFAULT_MAX_REQUEST_DELAY_MILLIS),
            distribution: DistributionConfig::default(),
            seed: None,
        }
    }
}

/// One fabricated request, folded into metrics and then dropped
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedRequest {
    pub method: HttpMethod,
    pub path: String,
    pub status: StatusCode,
    pub duration_seconds: f64,
}
