//! Read-through cache of computed feeds backed by `moka`.

use chrono::NaiveDate;
use moka::sync::Cache;

use crate::config::CacheConfig;
use crate::result::FeedComputationResult;

/// Identity of a cached feed.
///
/// The hub is the one the caller asked for, not the resolved hub, so a
/// request without a hub shares an entry with other hub-less requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeedCacheKey {
    /// Requesting user.
    pub user_id: u64,
    /// Requested hub, `None` when defaulted.
    pub hub_id: Option<u64>,
    /// Target date after defaulting to today.
    pub date: NaiveDate,
    /// Limit exactly as requested.
    pub limit: i32,
}

/// Bounded, expiring feed cache safe for concurrent use.
#[derive(Clone)]
pub struct FeedCache {
    inner: Cache<FeedCacheKey, FeedComputationResult>,
}

impl std::fmt::Debug for FeedCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedCache")
            .field("entry_count", &self.inner.entry_count())
            .finish()
    }
}

impl FeedCache {
    /// Build a cache sized by `config`.
    #[must_use]
    pub fn new(config: &CacheConfig) -> Self {
        let inner = Cache::builder()
            .max_capacity(config.capacity)
            .time_to_live(config.ttl())
            .build();
        Self { inner }
    }

    /// Look up a cached feed.
    #[must_use]
    pub fn get(&self, key: &FeedCacheKey) -> Option<FeedComputationResult> {
        self.inner.get(key)
    }

    /// Store a computed feed.
    pub fn insert(&self, key: FeedCacheKey, result: FeedComputationResult) {
        self.inner.insert(key, result);
    }

    /// Evict every entry owned by `user_id`.
    ///
    /// Entries inserted concurrently with the eviction may survive until
    /// they expire.
    pub fn invalidate_user(&self, user_id: u64) {
        let keys: Vec<FeedCacheKey> = self
            .inner
            .iter()
            .filter(|(key, _)| key.user_id == user_id)
            .map(|(key, _)| *key)
            .collect();
        for key in &keys {
            self.inner.invalidate(key);
        }
    }

    /// Evict everything.
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::FeedMeta;
    use rstest::{fixture, rstest};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date")
    }

    fn key(user_id: u64) -> FeedCacheKey {
        FeedCacheKey {
            user_id,
            hub_id: None,
            date: date(),
            limit: 20,
        }
    }

    fn result() -> FeedComputationResult {
        FeedComputationResult {
            activities: Vec::new(),
            fallback_used: false,
            suggestions: Vec::new(),
            feed_meta: FeedMeta::empty(date(), false),
        }
    }

    #[fixture]
    fn cache() -> FeedCache {
        FeedCache::new(&CacheConfig::default())
    }

    #[rstest]
    fn stores_and_returns_results(cache: FeedCache) {
        cache.insert(key(1), result());
        assert_eq!(cache.get(&key(1)), Some(result()));
        assert_eq!(cache.get(&key(2)), None);
    }

    #[rstest]
    fn limit_is_part_of_the_key(cache: FeedCache) {
        cache.insert(key(1), result());
        let other = FeedCacheKey { limit: 5, ..key(1) };
        assert_eq!(cache.get(&other), None);
    }

    #[rstest]
    fn user_invalidation_spares_other_users(cache: FeedCache) {
        cache.insert(key(1), result());
        cache.insert(FeedCacheKey { hub_id: Some(3), ..key(1) }, result());
        cache.insert(key(2), result());

        cache.invalidate_user(1);

        assert_eq!(cache.get(&key(1)), None);
        assert_eq!(cache.get(&FeedCacheKey { hub_id: Some(3), ..key(1) }), None);
        assert!(cache.get(&key(2)).is_some());
    }

    #[rstest]
    fn flush_removes_everything(cache: FeedCache) {
        cache.insert(key(1), result());
        cache.insert(key(2), result());
        cache.invalidate_all();
        assert_eq!(cache.get(&key(1)), None);
        assert_eq!(cache.get(&key(2)), None);
    }
}
