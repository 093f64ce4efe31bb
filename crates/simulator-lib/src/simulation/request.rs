//! Fake request synthesis
//!
//! Each call produces one request with a method, a path derived from the
//! method, a measured latency across an artificial delay, and a sampled
//! status code.

use super::sampler;
use crate::models::{
    DistributionConfig, HttpMethod, SimulatedRequest, SimulationConfig, ID_PLACEHOLDER,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::time::Instant;

/// Probability that a simulated request is a GET
const GET_PROBABILITY: f64 = 0.6;

/// Synthesizes requests from a seedable random source
pub struct RequestSimulator {
    uri_base: String,
    distribution: DistributionConfig,
    max_delay: Duration,
    rng: StdRng,
}

impl RequestSimulator {
    /// Create a simulator, seeding from `config.seed` when present
    pub fn new(config: &SimulationConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }

    /// Create a simulator with an explicit random source
    pub fn with_rng(config: &SimulationConfig, rng: StdRng) -> Self {
        Self {
            uri_base: config.uri_base.clone(),
            distribution: config.distribution,
            max_delay: config.max_request_delay,
            rng,
        }
    }

    /// Fabricate one request
    pub async fn simulate(&mut self) -> SimulatedRequest {
        let method = self.choose_method();
        let path = request_path(&self.uri_base, method);

        let delay = self.choose_delay();
        let start = Instant::now();
        tokio::time::sleep(delay).await;
        let duration_seconds = start.elapsed().as_secs_f64();

        let status = sampler::sample(&self.distribution, &mut self.rng);

        SimulatedRequest {
            method,
            path,
            status,
            duration_seconds,
        }
    }

    fn choose_method(&mut self) -> HttpMethod {
        if self.rng.gen_bool(GET_PROBABILITY) {
            HttpMethod::Get
        } else {
            HttpMethod::Post
        }
    }

    /// Whole milliseconds in `[0, max_delay)`
    fn choose_delay(&mut self) -> Duration {
        let max_ms = self.max_delay.as_millis() as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(self.rng.gen_range(0..max_ms))
    }
}

/// Path for a method: item-scoped reads carry an id segment, creates hit the collection
pub fn request_path(uri_base: &str, method: HttpMethod) -> String {
    match method {
        HttpMethod::Get => format!("{}/{}", uri_base, ID_PLACEHOLDER),
        HttpMethod::Post => uri_base.to_string(),
    }
}
