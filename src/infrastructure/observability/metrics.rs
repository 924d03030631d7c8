//! Search metrics
//!
//! Metrics go through the `metrics` facade; installing a recorder/exporter is
//! left to the embedding application.

use std::time::Duration;

use metrics::{counter, histogram};

/// Outcome of the cache lookup for one search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    Hit,
    Miss,
}

impl CacheOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Miss => "miss",
        }
    }
}

/// Best-effort operations whose failures are counted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BestEffortOp {
    CacheRead,
    CacheWrite,
    HitIncrement,
    Telemetry,
}

impl BestEffortOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CacheRead => "cache_read",
            Self::CacheWrite => "cache_write",
            Self::HitIncrement => "hit_increment",
            Self::Telemetry => "telemetry",
        }
    }
}

/// Record a completed search
pub fn record_search(outcome: CacheOutcome, duration: Duration) {
    let labels = [("cache", outcome.as_str().to_string())];

    counter!("search_requests_total", &labels).increment(1);
    histogram!("search_duration_seconds", &labels).record(duration.as_secs_f64());
}

/// Record a search whose record query failed
pub fn record_search_error() {
    counter!("search_errors_total").increment(1);
}

/// Record a swallowed failure of a best-effort operation
pub fn record_best_effort_failure(op: BestEffortOp) {
    counter!("search_cache_failures_total", "operation" => op.as_str()).increment(1);
}

/// Record entries removed by a sweep
pub fn record_sweep(deleted: usize) {
    counter!("search_cache_swept_total").increment(deleted as u64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_values() {
        assert_eq!(CacheOutcome::Hit.as_str(), "hit");
        assert_eq!(CacheOutcome::Miss.as_str(), "miss");
        assert_eq!(BestEffortOp::HitIncrement.as_str(), "hit_increment");
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_search(CacheOutcome::Miss, Duration::from_millis(5));
        record_search_error();
        record_best_effort_failure(BestEffortOp::CacheWrite);
        record_sweep(3);
    }
}
