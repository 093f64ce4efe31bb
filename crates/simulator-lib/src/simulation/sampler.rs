//! Weighted status code sampling
//!
//! Maps one uniform draw in `[0, 100)` onto cumulative percentage ranges.
//! The final code (500) owns everything past the 404 threshold, so a
//! distribution that sums to less than 100 leaks the remainder into 500,
//! and one that sums to more than 100 starves the later codes.

use crate::models::{DistributionConfig, StatusCode};
use rand::Rng;

/// Exclusive upper bound of the percentage draw
const PERCENT_RANGE: u32 = 100;

/// Draw one status code from the configured distribution
pub fn sample<R: Rng>(dist: &DistributionConfig, rng: &mut R) -> StatusCode {
    let r = rng.gen_range(0..PERCENT_RANGE);
    code_for_draw(dist, r)
}

/// Resolve a draw against the cumulative thresholds
fn code_for_draw(dist: &DistributionConfig, r: u32) -> StatusCode {
    let t200 = dist.status_200_percent;
    let t201 = t200.saturating_add(dist.status_201_percent);
    let t401 = t201.saturating_add(dist.status_401_percent);
    let t404 = t401.saturating_add(dist.status_404_percent);

    if r < t200 {
        StatusCode::Ok
    } else if r < t201 {
        StatusCode::Created
    } else if r < t401 {
        StatusCode::Unauthorized
    } else if r < t404 {
        StatusCode::NotFound
    } else {
        StatusCode::InternalServerError
    }
}
