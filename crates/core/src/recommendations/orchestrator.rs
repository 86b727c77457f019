//! Placement orchestration

use std::collections::{HashMap, HashSet};

use rand::Rng;
use tracing::debug;

use crate::domain::item::{Item, ItemId};

use super::diversity::DiversitySampler;
use super::ranking::RankingEngine;
use super::types::{PlacementList, PlacementSpec, RecommendationSet, StrategyKind};

/// Builds the lists for every placement shown next to one reference item.
#[derive(Debug, Clone, Default)]
pub struct RecommendationOrchestrator {
    engine: RankingEngine,
    sampler: DiversitySampler,
}

impl RecommendationOrchestrator {
    pub fn new(engine: RankingEngine, sampler: DiversitySampler) -> Self {
        Self { engine, sampler }
    }

    pub fn engine(&self) -> &RankingEngine {
        &self.engine
    }

    pub fn sampler(&self) -> &DiversitySampler {
        &self.sampler
    }

    /// Rank, diversify and de-overlap every placement for `reference`.
    ///
    /// A missing reference or an empty catalog yields empty lists, one per
    /// requested placement.
    pub fn recommend<'a, R>(
        &self,
        reference: Option<&'a Item>,
        candidates: &'a [Item],
        placements: &[PlacementSpec],
        rng: &mut R,
    ) -> RecommendationSet<'a>
    where
        R: Rng + ?Sized,
    {
        let Some(reference) = reference else {
            return empty_set(placements);
        };

        let pool: Vec<&'a Item> = candidates.iter().collect();
        self.assemble(reference, placements, rng, |strategy| {
            self.engine
                .rank_with(self.engine.strategy(strategy), reference, &pool, usize::MAX)
                .into_iter()
                .map(|candidate| candidate.item)
                .collect()
        })
    }

    /// Placement assembly over full rankings supplied by `ranked`, which is
    /// called at most once per strategy.
    ///
    /// Placements run content-first, then in page order. Each one cuts its
    /// ranking to `limit`, drops what earlier placements already hold, then
    /// diversifies the rest. Nothing below the cut is promoted to replace a
    /// dropped item, so later placements may come back short. The dedup keys
    /// kept by earlier placements stay blocked for later ones.
    pub(crate) fn assemble<'a, R, F>(
        &self,
        reference: &Item,
        placements: &[PlacementSpec],
        rng: &mut R,
        mut ranked: F,
    ) -> RecommendationSet<'a>
    where
        R: Rng + ?Sized,
        F: FnMut(StrategyKind) -> Vec<&'a Item>,
    {
        let mut ordered = placements.to_vec();
        ordered.sort_by_key(PlacementSpec::priority);

        let mut rankings: HashMap<StrategyKind, Vec<&'a Item>> = HashMap::new();
        let mut placed: HashSet<&'a ItemId> = HashSet::new();
        let mut seen = HashSet::new();
        let mut lists = Vec::with_capacity(ordered.len());

        for spec in ordered {
            let ranking = rankings.entry(spec.strategy).or_insert_with(|| ranked(spec.strategy));

            let shortlist: Vec<&'a Item> = ranking
                .iter()
                .copied()
                .filter(|item| item.id != reference.id)
                .take(spec.limit)
                .filter(|item| !placed.contains(&item.id))
                .collect();

            let items = self.sampler.diversify(&shortlist, &mut seen, rng);
            placed.extend(items.iter().copied().map(|item| &item.id));

            debug!(
                event_name = "recommendations.placement.built",
                placement = spec.placement.as_str(),
                strategy = spec.strategy.as_str(),
                reference_id = %reference.id,
                shortlisted = shortlist.len(),
                kept = items.len(),
                "placement built"
            );

            lists.push(PlacementList { placement: spec.placement, strategy: spec.strategy, items });
        }

        RecommendationSet { placements: lists }
    }
}

fn empty_set<'a>(placements: &[PlacementSpec]) -> RecommendationSet<'a> {
    let mut ordered = placements.to_vec();
    ordered.sort_by_key(PlacementSpec::priority);

    RecommendationSet {
        placements: ordered
            .into_iter()
            .map(|spec| PlacementList { placement: spec.placement, strategy: spec.strategy, items: Vec::new() })
            .collect(),
    }
}

/// Slice out page `page_number` (1-indexed) of `page_size` items.
///
/// Page zero, a zero page size, and pages past the end are empty.
pub fn paginate<T>(items: &[T], page_size: usize, page_number: usize) -> &[T] {
    if page_size == 0 || page_number == 0 {
        return &[];
    }

    let start = (page_number - 1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }

    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::recommendations::types::{PageInfo, Placement};

    fn catalog() -> Vec<Item> {
        vec![
            Item::new("ref", "Smartphone Tecno Spark").with_category("phones").with_price(120.0),
            Item::new("p1", "Smartphone Itel A70").with_category("phones").with_price(95.0),
            Item::new("p2", "Smartphone Infinix Hot").with_category("phones").with_price(140.0),
            Item::new("p3", "Smartphone Samsung A15").with_category("phones").with_price(180.0),
            Item::new("a1", "Coque souple").with_category("accessories").with_price(5.0).with_stock(4),
            Item::new("a2", "Chargeur rapide").with_category("accessories").with_price(12.0),
            Item::new("a3", "Protection écran").with_category("accessories").with_price(4.0).featured(),
            Item::new("h1", "Écouteurs bluetooth").with_category("audio").with_price(25.0).flash_offer(),
            Item::new("h2", "Casque audio").with_category("audio").with_price(60.0),
            Item::new("w1", "Montre connectée").with_category("wearables").with_price(70.0),
            Item::new("f1", "Robe wax").with_category("fashion").with_price(30.0),
            Item::new("f2", "Chemise lin").with_category("fashion").with_price(28.0),
        ]
    }

    fn all_placements(limit: usize) -> Vec<PlacementSpec> {
        Placement::ALL.iter().map(|placement| PlacementSpec::new(*placement, limit)).collect()
    }

    fn ids(list: &PlacementList<'_>) -> HashSet<String> {
        list.items.iter().map(|item| item.id.0.clone()).collect()
    }

    #[test]
    fn placements_come_back_in_priority_order() {
        let items = catalog();
        let specs = vec![
            PlacementSpec::new(Placement::YouMightLike, 3),
            PlacementSpec::new(Placement::SimilarItems, 3).with_strategy(StrategyKind::CrossSell),
            PlacementSpec::new(Placement::CheckoutUpsell, 3),
            PlacementSpec::new(Placement::FrequentlyBoughtTogether, 3),
        ];

        let set = RecommendationOrchestrator::default().recommend(
            Some(&items[0]),
            &items,
            &specs,
            &mut StdRng::seed_from_u64(5),
        );

        let order: Vec<Placement> = set.placements.iter().map(|list| list.placement).collect();
        assert_eq!(
            order,
            vec![
                Placement::FrequentlyBoughtTogether,
                Placement::SimilarItems,
                Placement::CheckoutUpsell,
                Placement::YouMightLike,
            ]
        );
    }

    #[test]
    fn placements_never_share_items_or_include_the_reference() {
        let items = catalog();
        let orchestrator = RecommendationOrchestrator::default();

        for seed in 0..10 {
            let set = orchestrator.recommend(
                Some(&items[0]),
                &items,
                &all_placements(5),
                &mut StdRng::seed_from_u64(seed),
            );

            for (index, list) in set.placements.iter().enumerate() {
                let list_ids = ids(list);
                assert!(!list_ids.contains("ref"));
                for other in &set.placements[index + 1..] {
                    assert!(list_ids.is_disjoint(&ids(other)), "placements overlap for seed {seed}");
                }
            }
        }
    }

    #[test]
    fn first_computed_placement_keeps_the_top_item() {
        let items = catalog();
        let specs = vec![
            PlacementSpec::new(Placement::FrequentlyBoughtTogether, 5),
            PlacementSpec::new(Placement::SimilarItems, 1),
        ];

        let set = RecommendationOrchestrator::default().recommend(
            Some(&items[0]),
            &items,
            &specs,
            &mut StdRng::seed_from_u64(11),
        );

        let similar = set.get(Placement::SimilarItems).expect("similar items computed");
        let together = set.get(Placement::FrequentlyBoughtTogether).expect("bought together computed");
        assert_eq!(similar.items.len(), 1);
        assert!(!ids(together).contains(&similar.items[0].id.0));
    }

    #[test]
    fn short_catalogs_leave_later_placements_under_filled() {
        let items = catalog()[..3].to_vec();
        let set = RecommendationOrchestrator::default().recommend(
            Some(&items[0]),
            &items,
            &all_placements(4),
            &mut StdRng::seed_from_u64(2),
        );

        assert_eq!(set.total_items(), 2);
        assert_eq!(set.placements[0].items.len(), 2);
        assert!(set.placements[1..].iter().all(|list| list.items.is_empty()));
    }

    #[test]
    fn placed_items_are_not_replaced_by_lower_ranked_ones() {
        // Content ranking: p1 1.0, p2 1.0, p3 0.6, p4 0.0
        let items = vec![
            Item::new("ref", "Ref").with_category("phones").with_price(100.0),
            Item::new("p1", "P1").with_category("phones").with_price(100.0),
            Item::new("p2", "P2").with_category("phones").with_price(95.0),
            Item::new("p3", "P3").with_category("phones").with_price(10.0),
            Item::new("p4", "P4").with_category("beauty").with_price(10.0),
        ];
        let specs = vec![
            PlacementSpec::new(Placement::SimilarItems, 2),
            PlacementSpec::new(Placement::FrequentlyBoughtTogether, 2),
        ];

        for seed in 0..5 {
            let set = RecommendationOrchestrator::default().recommend(
                Some(&items[0]),
                &items,
                &specs,
                &mut StdRng::seed_from_u64(seed),
            );

            let similar = set.get(Placement::SimilarItems).expect("similar items computed");
            let together =
                set.get(Placement::FrequentlyBoughtTogether).expect("bought together computed");
            assert_eq!(ids(similar), HashSet::from(["p1".to_string(), "p2".to_string()]));
            assert!(together.items.is_empty(), "seed {seed}: got {:?}", ids(together));
        }
    }

    #[test]
    fn missing_reference_or_empty_catalog_yields_empty_lists() {
        let items = catalog();
        let orchestrator = RecommendationOrchestrator::default();

        let set = orchestrator.recommend(None, &items, &all_placements(4), &mut StdRng::seed_from_u64(1));
        assert_eq!(set.placements.len(), 4);
        assert!(set.is_empty());

        let set = orchestrator.recommend(Some(&items[0]), &[], &all_placements(4), &mut StdRng::seed_from_u64(1));
        assert!(set.is_empty());
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let items = catalog();
        let orchestrator = RecommendationOrchestrator::default();

        let first =
            orchestrator.recommend(Some(&items[0]), &items, &all_placements(6), &mut StdRng::seed_from_u64(8));
        let second =
            orchestrator.recommend(Some(&items[0]), &items, &all_placements(6), &mut StdRng::seed_from_u64(8));
        assert_eq!(first, second);
    }

    #[test]
    fn pages_concatenate_back_to_the_list() {
        let list: Vec<u32> = (1..=11).collect();
        let info = PageInfo::new(list.len(), 4, 1);
        assert_eq!(info.page_count, 3);

        let rebuilt: Vec<u32> =
            (1..=info.page_count).flat_map(|page| paginate(&list, 4, page).to_vec()).collect();
        assert_eq!(rebuilt, list);
        assert!(paginate(&list, 4, info.page_count + 1).is_empty());
        assert_eq!(paginate(&list, 4, 3), &[9, 10, 11]);
    }

    #[test]
    fn degenerate_pages_are_empty() {
        let list = [1, 2, 3];
        assert!(paginate(&list, 0, 1).is_empty());
        assert!(paginate(&list, 2, 0).is_empty());
        assert!(paginate(&list, usize::MAX, usize::MAX).is_empty());
        assert!(paginate::<u8>(&[], 5, 1).is_empty());
    }

    #[test]
    fn placement_list_pages_report_counts() {
        let items = catalog();
        let set = RecommendationOrchestrator::default().recommend(
            Some(&items[0]),
            &items,
            &[PlacementSpec::new(Placement::YouMightLike, 10)],
            &mut StdRng::seed_from_u64(4),
        );
        let list = &set.placements[0];

        let page = list.page(3, 1);
        assert_eq!(page.info.total_count, list.items.len());
        assert_eq!(page.info.page_count, list.items.len().div_ceil(3));
        assert_eq!(page.items, &list.items[..list.items.len().min(3)]);
        assert!(list.page(3, page.info.page_count + 1).items.is_empty());
    }
}
