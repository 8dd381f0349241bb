//! Tunables for feed orchestration.

use std::time::Duration;

use gathr_core::DEFAULT_INACTIVITY_DAYS;
use serde::{Deserialize, Serialize};

/// Which cache entries a per-user invalidation removes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidationScope {
    /// Evict only entries belonging to the user.
    User,
    /// Flush every cached feed.
    #[default]
    All,
}

/// Sizing of the feed cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of cached feeds.
    pub capacity: u64,
    /// Seconds a cached feed stays valid.
    pub ttl_seconds: u64,
    /// Reach of [`FeedRanker::invalidate_user_feed_cache`](crate::FeedRanker::invalidate_user_feed_cache).
    pub scope: InvalidationScope,
}

impl CacheConfig {
    /// Time-to-live as a [`Duration`].
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 10_000,
            ttl_seconds: 300,
            scope: InvalidationScope::All,
        }
    }
}

/// Configuration for [`FeedRanker`](crate::FeedRanker).
///
/// # Examples
///
/// ```
/// use gathr_ranker::FeedConfig;
///
/// let config = FeedConfig::default();
/// assert_eq!(config.effective_limit(0), 20);
/// assert_eq!(config.effective_limit(5), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Limit used when the caller passes zero or a negative value.
    pub default_limit: usize,
    /// Largest requested limit whose result is cached.
    pub cache_limit_ceiling: i32,
    /// Result count above which the diversity pass runs.
    pub diversity_threshold: usize,
    /// Score reduction per repeated category occurrence.
    pub diversity_step: f64,
    /// Lowest multiplier the diversity pass applies.
    pub diversity_floor: f64,
    /// Share of the limit reserved for a single-interest user's category.
    pub exploration_share: f64,
    /// Hub used when neither the request nor the profile names one.
    pub fallback_hub: Option<u64>,
    /// Preferred start hour when neither profile nor history provide one.
    pub default_preferred_hour: u8,
    /// Days without participation before a user counts as inactive.
    pub inactivity_days: i64,
    /// Whole hours ahead that count as "happening soon" in feed metadata.
    pub happening_soon_hours: i64,
    /// Number of leading activities summarised in feed metadata.
    pub top_n: usize,
    /// Cache sizing and invalidation reach.
    pub cache: CacheConfig,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            default_limit: 20,
            cache_limit_ceiling: 50,
            diversity_threshold: 10,
            diversity_step: 0.2,
            diversity_floor: 0.5,
            exploration_share: 0.7,
            fallback_hub: Some(1),
            default_preferred_hour: 19,
            inactivity_days: DEFAULT_INACTIVITY_DAYS,
            happening_soon_hours: 3,
            top_n: 5,
            cache: CacheConfig::default(),
        }
    }
}

impl FeedConfig {
    /// Resolve a requested limit, substituting the default for `limit <= 0`.
    #[must_use]
    pub fn effective_limit(&self, limit: i32) -> usize {
        usize::try_from(limit)
            .ok()
            .filter(|&requested| requested > 0)
            .unwrap_or(self.default_limit)
    }

    /// Whether a result for `limit` may be cached.
    #[must_use]
    pub const fn is_cacheable(&self, limit: i32) -> bool {
        limit <= self.cache_limit_ceiling
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(-3, 20)]
    #[case(0, 20)]
    #[case(1, 1)]
    #[case(75, 75)]
    fn limit_resolution(#[case] requested: i32, #[case] expected: usize) {
        assert_eq!(FeedConfig::default().effective_limit(requested), expected);
    }

    #[rstest]
    #[case(50, true)]
    #[case(-1, true)]
    #[case(51, false)]
    fn cacheability_follows_ceiling(#[case] limit: i32, #[case] expected: bool) {
        assert_eq!(FeedConfig::default().is_cacheable(limit), expected);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: FeedConfig = serde_json::from_str(r#"{"fallback_hub": null, "cache": {"scope": "user"}}"#)
            .expect("config should deserialise");
        assert_eq!(config.fallback_hub, None);
        assert_eq!(config.cache.scope, InvalidationScope::User);
        assert_eq!(config.cache.ttl(), Duration::from_secs(300));
        assert_eq!(config.default_limit, 20);
    }

    #[test]
    fn invalidation_flushes_everything_by_default() {
        assert_eq!(FeedConfig::default().cache.scope, InvalidationScope::All);
        assert_eq!(InvalidationScope::default(), InvalidationScope::All);
    }
}
