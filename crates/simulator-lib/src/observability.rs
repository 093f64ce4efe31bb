//! Observability infrastructure for the metrics simulator
//!
//! Provides:
//! - The simulated Prometheus instruments (uptime, request totals, request duration)
//! - Structured JSON logging with tracing

use crate::error::Result;
use crate::models::{SimulatedRequest, SimulationConfig};
use prometheus::core::Collector;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};
use tracing::{debug, error, info, warn};

pub const UPTIME_METRIC: &str = "uptime_seconds_total";
pub const REQUESTS_METRIC: &str = "requests_total";
pub const REQUEST_DURATION_METRIC: &str = "http_server_requests_seconds";

/// Label names of the request duration histogram
const DURATION_LABELS: &[&str] = &["namespace", "app", "method", "uri", "status"];

/// Simulated service metrics
///
/// Cloning is cheap; clones share the same underlying instruments.
#[derive(Clone)]
pub struct SimulatorMetrics {
    uptime: IntCounter,
    requests_total: IntCounterVec,
    request_duration_seconds: HistogramVec,
    namespace: String,
    app_name: String,
}

impl SimulatorMetrics {
    /// Create the instruments and register them with `registry`
    ///
    /// Registration happens once; registering twice into the same registry
    /// fails with `AlreadyReg`.
    pub fn register(registry: &Registry, config: &SimulationConfig) -> Result<Self> {
        let uptime = IntCounter::with_opts(Opts::new(
            UPTIME_METRIC,
            "total number of seconds since this application was started",
        ))?;

        let requests_total = IntCounterVec::new(
            Opts::new(REQUESTS_METRIC, "total number of requests"),
            &["app"],
        )?;

        let request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                REQUEST_DURATION_METRIC,
                "Duration of HTTP requests in seconds",
            )
            .buckets(prometheus::DEFAULT_BUCKETS.to_vec()),
            DURATION_LABELS,
        )?;

        registry.register(Box::new(uptime.clone()))?;
        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(request_duration_seconds.clone()))?;

        Ok(Self {
            uptime,
            requests_total,
            request_duration_seconds,
            namespace: config.namespace.clone(),
            app_name: config.app_name.clone(),
        })
    }

    /// Count one elapsed simulation cycle
    pub fn inc_uptime(&self) {
        self.uptime.inc();
    }

    /// Fold a simulated request into the request counter and duration histogram
    ///
    /// Both label handles are resolved before either instrument changes, so a
    /// failure leaves the metrics untouched.
    pub fn apply(&self, request: &SimulatedRequest) -> Result<()> {
        let requests = self
            .requests_total
            .get_metric_with_label_values(&[self.app_name.as_str()])?;
        let duration = self.request_duration_seconds.get_metric_with_label_values(&[
            self.namespace.as_str(),
            self.app_name.as_str(),
            request.method.as_str(),
            request.path.as_str(),
            request.status.as_str(),
        ])?;

        requests.inc();
        duration.observe(request.duration_seconds);
        Ok(())
    }

    /// Current uptime counter value (elapsed cycles)
    pub fn uptime(&self) -> u64 {
        self.uptime.get()
    }

    /// Current request total for the configured application
    pub fn requests_total(&self) -> Result<u64> {
        Ok(self
            .requests_total
            .get_metric_with_label_values(&[self.app_name.as_str()])?
            .get())
    }

    /// Number of distinct label sets in the duration histogram
    pub fn duration_series_count(&self) -> usize {
        self.request_duration_seconds
            .collect()
            .iter()
            .map(|family| family.get_metric().len())
            .sum()
    }

    /// Observations recorded for one histogram series
    pub fn duration_sample_count(&self, method: &str, uri: &str, status: &str) -> Result<u64> {
        Ok(self
            .request_duration_seconds
            .get_metric_with_label_values(&[
                self.namespace.as_str(),
                self.app_name.as_str(),
                method,
                uri,
                status,
            ])?
            .get_sample_count())
    }
}

/// Structured logger for simulator events
#[derive(Clone)]
pub struct StructuredLogger {
    app_name: String,
    namespace: String,
}

impl StructuredLogger {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            app_name: config.app_name.clone(),
            namespace: config.namespace.clone(),
        }
    }

    /// Log simulator startup along with the effective configuration
    pub fn log_startup(&self, version: &str, config: &SimulationConfig) {
        let dist = &config.distribution;
        info!(
            event = "simulator_started",
            app = %self.app_name,
            namespace = %self.namespace,
            version = %version,
            uri_base = %config.uri_base,
            sleep_ms = config.sleep_interval.as_millis() as u64,
            max_request_delay_ms = config.max_request_delay.as_millis() as u64,
            status_200_percent = dist.status_200_percent,
            status_201_percent = dist.status_201_percent,
            status_401_percent = dist.status_401_percent,
            status_404_percent = dist.status_404_percent,
            status_500_percent = dist.status_500_percent,
            seeded = config.seed.is_some(),
            "Metrics simulator started"
        );

        let total = dist.total();
        if total != 100 {
            warn!(
                event = "distribution_unbalanced",
                app = %self.app_name,
                total_percent = total,
                "Status code percentages do not sum to 100; remainder is absorbed by 500"
            );
        }
    }

    /// Log the metrics endpoint coming up
    pub fn log_endpoint(&self, addr: &str) {
        info!(
            event = "endpoint_listening",
            app = %self.app_name,
            addr = %addr,
            "Serving metrics at http://{}/metrics",
            addr
        );
    }

    pub fn log_request(&self, cycle: u64, request: &SimulatedRequest) {
        debug!(
            event = "request_simulated",
            app = %self.app_name,
            cycle = cycle,
            method = %request.method,
            uri = %request.path,
            status = %request.status,
            duration_seconds = request.duration_seconds,
            "Simulated request"
        );
    }

    /// Log a fatal cycle failure
    pub fn log_cycle_failure(&self, cycle: u64, reason: &str) {
        error!(
            event = "cycle_failed",
            app = %self.app_name,
            cycle = cycle,
            reason = %reason,
            "Simulation cycle failed, terminating"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "simulator_shutdown",
            app = %self.app_name,
            reason = %reason,
            "Metrics simulator shutting down"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HttpMethod, StatusCode};

    fn request(method: HttpMethod, path: &str, status: StatusCode) -> SimulatedRequest {
        SimulatedRequest {
            method,
            path: path.to_string(),
            status,
            duration_seconds: 0.042,
        }
    }

    #[test]
    fn test_metrics_registration() {
        let registry = Registry::new();
        let metrics = SimulatorMetrics::register(&registry, &SimulationConfig::default()).unwrap();

        metrics.inc_uptime();
        metrics
            .apply(&request(HttpMethod::Post, "/domain/demo-api", StatusCode::Created))
            .unwrap();

        let names: Vec<String> = registry
            .gather()
            .iter()
            .map(|family| family.get_name().to_string())
            .collect();
        assert!(names.contains(&UPTIME_METRIC.to_string()));
        assert!(names.contains(&REQUESTS_METRIC.to_string()));
        assert!(names.contains(&REQUEST_DURATION_METRIC.to_string()));
    }

    #[test]
    fn test_double_registration_fails() {
        let registry = Registry::new();
        let config = SimulationConfig::default();
        SimulatorMetrics::register(&registry, &config).unwrap();

        assert!(SimulatorMetrics::register(&registry, &config).is_err());
    }

    #[test]
    fn test_apply_updates_counter_and_histogram() {
        let registry = Registry::new();
        let metrics = SimulatorMetrics::register(&registry, &SimulationConfig::default()).unwrap();

        let get = request(HttpMethod::Get, "/domain/demo-api/{id}", StatusCode::NotFound);
        metrics.apply(&get).unwrap();
        metrics.apply(&get).unwrap();

        assert_eq!(metrics.requests_total().unwrap(), 2);
        assert_eq!(metrics.uptime(), 0);
        assert_eq!(metrics.duration_series_count(), 1);
        assert_eq!(
            metrics
                .duration_sample_count("GET", "/domain/demo-api/{id}", "404")
                .unwrap(),
            2
        );
    }

    #[test]
    fn test_series_bounded_by_label_space() {
        let registry = Registry::new();
        let metrics = SimulatorMetrics::register(&registry, &SimulationConfig::default()).unwrap();

        for method in [HttpMethod::Get, HttpMethod::Post] {
            let path = crate::simulation::request_path("/domain/demo-api", method);
            for status in StatusCode::ALL {
                metrics.apply(&request(method, &path, status)).unwrap();
                metrics.apply(&request(method, &path, status)).unwrap();
            }
        }

        assert_eq!(metrics.duration_series_count(), 10);
    }

    #[test]
    fn test_failed_apply_leaves_instruments_untouched() {
        let config = SimulationConfig::default();
        let registry = Registry::new();
        let mut metrics = SimulatorMetrics::register(&registry, &config).unwrap();

        // Histogram missing the status label, so resolving its handle fails
        metrics.request_duration_seconds = HistogramVec::new(
            HistogramOpts::new("broken_duration_seconds", "label set too short"),
            &["namespace", "app", "method", "uri"],
        )
        .unwrap();

        let result = metrics.apply(&request(
            HttpMethod::Get,
            "/domain/demo-api/{id}",
            StatusCode::Ok,
        ));

        assert!(result.is_err());
        assert_eq!(metrics.requests_total().unwrap(), 0);
        assert_eq!(metrics.duration_series_count(), 0);
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new(&SimulationConfig::default());
        assert_eq!(logger.app_name, "metrics-demo");
        assert_eq!(logger.namespace, "default");
    }
}
