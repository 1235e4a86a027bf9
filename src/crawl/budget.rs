// src/crawl/budget.rs
// =============================================================================
// Crawl limits and tunables.
//
// CrawlBudget is the immutable (max_depth, max_pages, delay range) triple that
// bounds a crawl. CrawlConfig wraps it together with the scope policy and the
// checkpoint cadence so the controller receives everything in one value.
// =============================================================================

use std::time::Duration;

use crate::crawl::scope::ScopePolicy;
use crate::error::CrawlError;

/// Longest politeness delay accepted, in seconds (one day).
pub const MAX_DELAY_SECS: f64 = 86_400.0;

/// Hard limits on how far a crawl may go.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrawlBudget {
    max_depth: usize,
    max_pages: usize,
    delay_min: f64,
    delay_max: f64,
}

impl CrawlBudget {
    /// Builds a budget, rejecting delay ranges that cannot be sampled or that
    /// exceed `MAX_DELAY_SECS`.
    ///
    /// `delay_min` and `delay_max` are seconds.
    pub fn new(
        max_depth: usize,
        max_pages: usize,
        delay_min: f64,
        delay_max: f64,
    ) -> Result<Self, CrawlError> {
        if !delay_min.is_finite() || !delay_max.is_finite() {
            return Err(CrawlError::Config("delays must be finite numbers".to_string()));
        }
        if delay_min < 0.0 {
            return Err(CrawlError::Config(format!(
                "minimum delay must not be negative (got {delay_min})"
            )));
        }
        if delay_max > MAX_DELAY_SECS {
            return Err(CrawlError::Config(format!(
                "maximum delay must not exceed {MAX_DELAY_SECS}s (got {delay_max})"
            )));
        }
        if delay_min > delay_max {
            return Err(CrawlError::Config(format!(
                "minimum delay {delay_min}s is larger than maximum delay {delay_max}s"
            )));
        }

        Ok(Self {
            max_depth,
            max_pages,
            delay_min,
            delay_max,
        })
    }

    /// Inclusive upper bound on traversal depth (start URL is depth 0).
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Inclusive upper bound on the size of the visited set.
    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    /// Politeness delay bounds in seconds.
    pub fn delay_range(&self) -> (f64, f64) {
        (self.delay_min, self.delay_max)
    }
}

impl Default for CrawlBudget {
    fn default() -> Self {
        Self {
            max_depth: 2,
            max_pages: 50,
            delay_min: 1.0,
            delay_max: 3.0,
        }
    }
}

/// Everything the controller needs besides its collaborators.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub budget: CrawlBudget,
    pub scope: ScopePolicy,
    /// Save a checkpoint after this many fetched pages
    pub checkpoint_every: usize,
    /// ...or once this much time has passed since the last save
    pub checkpoint_interval: Duration,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            budget: CrawlBudget::default(),
            scope: ScopePolicy::default(),
            checkpoint_every: 10,
            checkpoint_interval: Duration::from_secs(300),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::Politeness;

    #[test]
    fn test_default_budget_matches_cli_defaults() {
        let budget = CrawlBudget::default();
        assert_eq!(budget.max_depth(), 2);
        assert_eq!(budget.max_pages(), 50);
        assert_eq!(budget.delay_range(), (1.0, 3.0));
    }

    #[test]
    fn test_rejects_inverted_delay_range() {
        assert!(CrawlBudget::new(2, 50, 3.0, 1.0).is_err());
    }

    #[test]
    fn test_rejects_negative_or_nan_delay() {
        assert!(CrawlBudget::new(2, 50, -1.0, 1.0).is_err());
        assert!(CrawlBudget::new(2, 50, 0.0, f64::NAN).is_err());
    }

    #[test]
    fn test_accepts_zero_width_range() {
        let budget = CrawlBudget::new(0, 1, 0.0, 0.0).unwrap();
        assert_eq!(budget.delay_range(), (0.0, 0.0));
    }

    #[test]
    fn test_rejects_delay_above_ceiling() {
        let err = CrawlBudget::new(2, 50, 1e20, 1e20).unwrap_err();
        assert!(err.to_string().contains("maximum delay"));
        assert!(CrawlBudget::new(2, 50, 1.0, MAX_DELAY_SECS + 1.0).is_err());
    }

    #[test]
    fn test_ceiling_delay_can_be_sampled() {
        let budget = CrawlBudget::new(2, 50, MAX_DELAY_SECS, MAX_DELAY_SECS).unwrap();
        let delay = Politeness::new(budget.delay_range()).next_delay();
        assert_eq!(delay, Duration::from_secs(86_400));
    }
}
