//! Bounded memo of full rankings

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use serde::Serialize;
use tracing::debug;

use crate::domain::catalog::CatalogVersion;
use crate::domain::item::ItemId;

use super::types::StrategyKind;

/// A ranking is valid for exactly one reference item, catalog snapshot and strategy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RankingKey {
    pub reference_id: ItemId,
    pub catalog_version: CatalogVersion,
    pub strategy: StrategyKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub len: usize,
    pub capacity: usize,
}

/// Least-recently-used store of untruncated rankings, as item ids in rank order.
#[derive(Debug)]
pub struct RankingCache {
    entries: LruCache<RankingKey, Arc<Vec<ItemId>>>,
    hits: u64,
    misses: u64,
}

impl RankingCache {
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self { entries: LruCache::new(capacity), hits: 0, misses: 0 }
    }

    /// Return the cached ranking for `key`, computing and storing it on a miss.
    pub fn get_or_insert_with<F>(&mut self, key: RankingKey, rank: F) -> Arc<Vec<ItemId>>
    where
        F: FnOnce() -> Vec<ItemId>,
    {
        if let Some(ranking) = self.entries.get(&key) {
            self.hits += 1;
            debug!(
                event_name = "recommendations.cache.hit",
                reference_id = %key.reference_id,
                catalog_version = %key.catalog_version,
                strategy = key.strategy.as_str(),
                "ranking served from cache"
            );
            return Arc::clone(ranking);
        }

        self.misses += 1;
        let ranking = Arc::new(rank());
        debug!(
            event_name = "recommendations.cache.miss",
            reference_id = %key.reference_id,
            catalog_version = %key.catalog_version,
            strategy = key.strategy.as_str(),
            ranked = ranking.len(),
            "ranking computed"
        );
        self.entries.put(key, Arc::clone(&ranking));
        ranking
    }

    pub fn contains(&self, key: &RankingKey) -> bool {
        self.entries.contains(key)
    }

    /// Drop every ranking computed against `version`. Returns how many were removed.
    pub fn invalidate_catalog(&mut self, version: &CatalogVersion) -> usize {
        let stale: Vec<RankingKey> = self
            .entries
            .iter()
            .filter(|(key, _)| key.catalog_version == *version)
            .map(|(key, _)| key.clone())
            .collect();

        for key in &stale {
            self.entries.pop(key);
        }
        stale.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            len: self.entries.len(),
            capacity: self.entries.cap().get(),
        }
    }
}

impl Default for RankingCache {
    fn default() -> Self {
        Self::new(super::DEFAULT_CACHE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(reference: &str, version: &str, strategy: StrategyKind) -> RankingKey {
        RankingKey {
            reference_id: ItemId::from(reference),
            catalog_version: CatalogVersion(version.to_string()),
            strategy,
        }
    }

    #[test]
    fn second_lookup_is_a_hit() {
        let mut cache = RankingCache::new(4);
        let mut computed = 0;

        for _ in 0..3 {
            let ranking = cache.get_or_insert_with(key("a", "v1", StrategyKind::Content), || {
                computed += 1;
                vec![ItemId::from("b"), ItemId::from("c")]
            });
            assert_eq!(ranking.len(), 2);
        }

        assert_eq!(computed, 1);
        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.len, stats.capacity), (2, 1, 1, 4));
    }

    #[test]
    fn strategy_and_version_are_part_of_the_key() {
        let mut cache = RankingCache::new(8);
        cache.get_or_insert_with(key("a", "v1", StrategyKind::Content), Vec::new);
        cache.get_or_insert_with(key("a", "v1", StrategyKind::CrossSell), Vec::new);
        cache.get_or_insert_with(key("a", "v2", StrategyKind::Content), Vec::new);

        assert_eq!(cache.stats().misses, 3);
        assert_eq!(cache.stats().len, 3);
    }

    #[test]
    fn least_recently_used_entry_is_evicted() {
        let mut cache = RankingCache::new(2);
        cache.get_or_insert_with(key("a", "v1", StrategyKind::Content), Vec::new);
        cache.get_or_insert_with(key("b", "v1", StrategyKind::Content), Vec::new);
        cache.get_or_insert_with(key("a", "v1", StrategyKind::Content), Vec::new);
        cache.get_or_insert_with(key("c", "v1", StrategyKind::Content), Vec::new);

        assert!(cache.contains(&key("a", "v1", StrategyKind::Content)));
        assert!(!cache.contains(&key("b", "v1", StrategyKind::Content)));
        assert!(cache.contains(&key("c", "v1", StrategyKind::Content)));
    }

    #[test]
    fn invalidating_a_catalog_keeps_other_versions() {
        let mut cache = RankingCache::new(8);
        cache.get_or_insert_with(key("a", "v1", StrategyKind::Content), Vec::new);
        cache.get_or_insert_with(key("b", "v1", StrategyKind::CrossSell), Vec::new);
        cache.get_or_insert_with(key("a", "v2", StrategyKind::Content), Vec::new);

        assert_eq!(cache.invalidate_catalog(&CatalogVersion("v1".to_string())), 2);
        assert_eq!(cache.stats().len, 1);
        assert!(cache.contains(&key("a", "v2", StrategyKind::Content)));

        cache.clear();
        assert_eq!(cache.stats().len, 0);
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        assert_eq!(RankingCache::new(0).stats().capacity, 1);
    }
}
