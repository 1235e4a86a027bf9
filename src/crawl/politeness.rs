// src/crawl/politeness.rs
// =============================================================================
// Randomized wait before every request.
//
// A uniform delay in [min, max] seconds keeps the request rate predictable
// for the target server without a fixed, easily fingerprinted rhythm.
// =============================================================================

use rand::Rng;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct Politeness {
    min: f64,
    max: f64,
}

impl Politeness {
    /// `min` and `max` are seconds; callers validate them via `CrawlBudget`.
    pub fn new((min, max): (f64, f64)) -> Self {
        Self { min, max }
    }

    /// Samples the next delay.
    pub fn next_delay(&self) -> Duration {
        let seconds = if self.max > self.min {
            rand::rng().random_range(self.min..=self.max)
        } else {
            self.min
        };
        Duration::from_secs_f64(seconds)
    }
}
