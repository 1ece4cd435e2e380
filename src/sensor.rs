//! ==============================================================================
//! sensor.rs - simulated temperature/humidity sensor
//! ==============================================================================
//!
//! purpose:
//!     produces temperature/humidity samples for `/reading` and `/stream`.
//!     there is no physical sensor on this node yet, so values are drawn
//!     uniformly from a plausible indoor range.
//!
//! relationships:
//!     - used by: server.rs (`/reading`), stream.rs (`/stream`)
//!     - also provides the wall clock helpers the rest of the crate uses
//!
//! ==============================================================================

use crate::domain::Reading;
use rand::Rng;
use std::time::{SystemTime, UNIX_EPOCH};

pub const TEMPERATURE_RANGE: (f64, f64) = (24.0, 30.0);
pub const HUMIDITY_RANGE: (f64, f64) = (40.0, 70.0);

/// take one sample from the simulated sensor
pub fn generate_reading() -> Reading {
    let mut rng = rand::thread_rng();
    Reading {
        ts: now_secs(),
        temperature: round2(rng.gen_range(TEMPERATURE_RANGE.0..=TEMPERATURE_RANGE.1)),
        humidity: round2(rng.gen_range(HUMIDITY_RANGE.0..=HUMIDITY_RANGE.1)),
    }
}

/// uniform value in [lo, hi] rounded to 2 decimals
pub fn random_score(lo: f64, hi: f64) -> f64 {
    round2(rand::thread_rng().gen_range(lo..=hi))
}

/// round half away from zero to 2 decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// get current timestamp in seconds (unix epoch)
///
/// a clock set before 1970 reads as 0 rather than failing a request.
pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// ==============================================================================
// tests
// ==============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn has_at_most_two_decimals(v: f64) -> bool {
        ((v * 100.0).round() - v * 100.0).abs() < 1e-6
    }

    #[test]
    fn test_timestamp() {
        // should be after 2024
        assert!(now_secs() > 1_700_000_000, "timestamp should be after 2024");
    }

    #[test]
    fn test_readings_stay_in_range() {
        for _ in 0..1000 {
            let r = generate_reading();
            assert!((24.0..=30.0).contains(&r.temperature), "temp {}", r.temperature);
            assert!((40.0..=70.0).contains(&r.humidity), "humidity {}", r.humidity);
            assert!(has_at_most_two_decimals(r.temperature));
            assert!(has_at_most_two_decimals(r.humidity));
        }
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(5.019_607), 5.02);
        assert_eq!(round2(10.0), 10.0);
        assert_eq!(round2(0.004), 0.0);
    }

    #[test]
    fn test_random_score_range() {
        for _ in 0..500 {
            let s = random_score(0.0, 10.0);
            assert!((0.0..=10.0).contains(&s));
        }
    }
}
