//! Observability infrastructure - Metrics

mod metrics;

pub use self::metrics::{
    record_best_effort_failure, record_search, record_search_error, record_sweep, BestEffortOp,
    CacheOutcome,
};
