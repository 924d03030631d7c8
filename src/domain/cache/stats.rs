//! Cache diagnostics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::CacheEntry;

/// Snapshot of the persisted cache
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: u64,
    pub active_entries: u64,
    pub expired_entries: u64,
    pub total_hits: u64,
    /// Mean hits per entry, rounded to two decimals
    pub average_hit_count: f64,
}

impl CacheStats {
    /// Computes stats by scanning every persisted entry
    pub fn from_entries<'a>(
        entries: impl IntoIterator<Item = &'a CacheEntry>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut stats = Self::default();

        for entry in entries {
            stats.total_entries += 1;
            stats.total_hits += entry.hit_count;

            if entry.is_live_at(now) {
                stats.active_entries += 1;
            }
        }

        stats.expired_entries = stats.total_entries - stats.active_entries;

        if stats.total_entries > 0 {
            let average = stats.total_hits as f64 / stats.total_entries as f64;
            stats.average_hit_count = (average * 100.0).round() / 100.0;
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::CacheKey;
    use crate::domain::search::CachedSearchPayload;
    use chrono::Duration;

    fn entry(key: &str, now: DateTime<Utc>, ttl_minutes: i64, hits: u64) -> CacheEntry {
        let mut entry = CacheEntry::new(
            CacheKey::new(key),
            CachedSearchPayload::default(),
            now,
            Duration::minutes(ttl_minutes),
        );
        entry.hit_count = hits;
        entry
    }

    #[test]
    fn test_empty_stats() {
        let entries: Vec<CacheEntry> = Vec::new();
        let stats = CacheStats::from_entries(&entries, Utc::now());

        assert_eq!(stats, CacheStats::default());
        assert_eq!(stats.average_hit_count, 0.0);
    }

    #[test]
    fn test_stats_counts_active_and_expired() {
        let now = Utc::now();
        let entries = vec![
            entry("a", now, 30, 1),
            entry("b", now, 30, 0),
            entry("c", now - Duration::hours(1), 30, 1),
        ];

        let stats = CacheStats::from_entries(&entries, now);

        assert_eq!(stats.total_entries, 3);
        assert_eq!(stats.active_entries, 2);
        assert_eq!(stats.expired_entries, 1);
        assert_eq!(stats.total_hits, 2);
        assert_eq!(stats.average_hit_count, 0.67);
    }
}
