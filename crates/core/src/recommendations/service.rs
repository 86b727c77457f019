//! Cached entry point used by storefront code

use rand::Rng;
use tracing::debug;

use crate::domain::catalog::{Catalog, CatalogVersion};
use crate::domain::item::{Item, ItemId};

use super::cache::{CacheStats, RankingCache, RankingKey};
use super::orchestrator::RecommendationOrchestrator;
use super::types::{PlacementSpec, RecommendationSet};

/// Orchestration with rankings memoized per (reference, catalog version, strategy).
///
/// Rankings are only recomputed when the reference item or the catalog
/// snapshot changes. Exclusion and diversity still run on every call, so
/// repeat views of the same item get a fresh shuffle.
#[derive(Debug)]
pub struct RecommendationService {
    orchestrator: RecommendationOrchestrator,
    cache: RankingCache,
}

impl RecommendationService {
    pub fn new(orchestrator: RecommendationOrchestrator, cache_capacity: usize) -> Self {
        Self { orchestrator, cache: RankingCache::new(cache_capacity) }
    }

    pub fn orchestrator(&self) -> &RecommendationOrchestrator {
        &self.orchestrator
    }

    /// Lists for every placement around `reference_id`. An id missing from the
    /// catalog yields empty lists.
    pub fn recommend<'a, R>(
        &mut self,
        reference_id: &ItemId,
        catalog: &'a Catalog,
        placements: &[PlacementSpec],
        rng: &mut R,
    ) -> RecommendationSet<'a>
    where
        R: Rng + ?Sized,
    {
        let Some(reference) = catalog.get(reference_id) else {
            debug!(
                event_name = "recommendations.reference.unknown",
                reference_id = %reference_id,
                catalog_version = %catalog.version(),
                "reference item not in catalog"
            );
            return self.orchestrator.recommend(None, catalog.items(), placements, rng);
        };

        let orchestrator = &self.orchestrator;
        let cache = &mut self.cache;
        let pool: Vec<&'a Item> = catalog.items().iter().collect();

        orchestrator.assemble(reference, placements, rng, move |strategy| {
            let key = RankingKey {
                reference_id: reference.id.clone(),
                catalog_version: catalog.version().clone(),
                strategy,
            };
            let ranking = cache.get_or_insert_with(key, || {
                let engine = orchestrator.engine();
                engine
                    .rank_with(engine.strategy(strategy), reference, &pool, usize::MAX)
                    .into_iter()
                    .map(|candidate| candidate.item.id.clone())
                    .collect()
            });

            ranking.iter().filter_map(|id| catalog.get(id)).collect()
        })
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn invalidate_catalog(&mut self, version: &CatalogVersion) -> usize {
        self.cache.invalidate_catalog(version)
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

impl Default for RecommendationService {
    fn default() -> Self {
        Self::new(RecommendationOrchestrator::default(), super::DEFAULT_CACHE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::recommendations::types::{Placement, PlacementSpec};

    fn catalog() -> Catalog {
        Catalog::try_new(vec![
            Item::new("ref", "Smartphone Tecno Spark").with_category("phones").with_price(120.0),
            Item::new("p1", "Smartphone Itel A70").with_category("phones").with_price(95.0),
            Item::new("a1", "Coque souple").with_category("accessories").with_price(5.0).with_stock(4),
            Item::new("a2", "Chargeur rapide").with_category("accessories").with_price(12.0),
            Item::new("h1", "Écouteurs bluetooth").with_category("audio").with_price(25.0),
            Item::new("f1", "Robe wax").with_category("fashion").with_price(30.0),
        ])
        .expect("valid catalog")
    }

    fn placements() -> Vec<PlacementSpec> {
        Placement::ALL.iter().map(|placement| PlacementSpec::new(*placement, 3)).collect()
    }

    #[test]
    fn repeat_views_reuse_rankings() {
        let catalog = catalog();
        let mut service = RecommendationService::default();
        let reference = ItemId::from("ref");

        service.recommend(&reference, &catalog, &placements(), &mut StdRng::seed_from_u64(1));
        assert_eq!(service.cache_stats().misses, 2);
        assert_eq!(service.cache_stats().hits, 0);

        service.recommend(&reference, &catalog, &placements(), &mut StdRng::seed_from_u64(2));
        assert_eq!(service.cache_stats().misses, 2);
        assert_eq!(service.cache_stats().hits, 2);
    }

    #[test]
    fn cached_results_match_uncached_orchestration() {
        let catalog = catalog();
        let mut service = RecommendationService::default();
        let reference = ItemId::from("ref");

        // warm the cache, then compare against a cold orchestration with the same seed
        service.recommend(&reference, &catalog, &placements(), &mut StdRng::seed_from_u64(3));
        let cached = service.recommend(&reference, &catalog, &placements(), &mut StdRng::seed_from_u64(7));

        let direct = RecommendationOrchestrator::default().recommend(
            catalog.get(&reference),
            catalog.items(),
            &placements(),
            &mut StdRng::seed_from_u64(7),
        );
        assert_eq!(cached, direct);
    }

    #[test]
    fn catalog_changes_trigger_recomputation() {
        let first = catalog();
        let mut items = first.items().to_vec();
        items[2].stock = Some(50);
        let second = Catalog::try_new(items).expect("valid catalog");
        assert_ne!(first.version(), second.version());

        let mut service = RecommendationService::default();
        let reference = ItemId::from("ref");
        service.recommend(&reference, &first, &placements(), &mut StdRng::seed_from_u64(1));
        service.recommend(&reference, &second, &placements(), &mut StdRng::seed_from_u64(1));

        assert_eq!(service.cache_stats().misses, 4);
        assert_eq!(service.invalidate_catalog(first.version()), 2);
        assert_eq!(service.cache_stats().len, 2);
    }

    #[test]
    fn unknown_reference_yields_empty_lists_without_caching() {
        let catalog = catalog();
        let mut service = RecommendationService::default();

        let set = service.recommend(
            &ItemId::from("missing"),
            &catalog,
            &placements(),
            &mut StdRng::seed_from_u64(1),
        );

        assert_eq!(set.placements.len(), 4);
        assert!(set.is_empty());
        assert_eq!(service.cache_stats().misses, 0);
    }
}
