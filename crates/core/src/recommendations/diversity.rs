//! Diversity sampling for ranked lists

use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::item::Item;

/// Identity of a physical product across listings: normalized title plus
/// effective price in cents. Coarser than the item id on purpose, so the same
/// product listed twice collapses to one slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub title: String,
    pub price_cents: Option<i64>,
}

impl DedupKey {
    pub fn of(item: &Item) -> Self {
        let title = item.title.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        let price_cents = item.effective_price().map(|price| (price * 100.0).round() as i64);
        Self { title, price_cents }
    }
}

/// Removes near-duplicates and caps how many items one category contributes.
///
/// The input is shuffled with the supplied random source first, so among
/// otherwise equal lists the survivors vary between views. Pass a seeded
/// generator to make the output reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiversitySampler {
    per_category_cap: usize,
}

impl DiversitySampler {
    pub fn new(per_category_cap: usize) -> Self {
        Self { per_category_cap }
    }

    pub fn per_category_cap(&self) -> usize {
        self.per_category_cap
    }

    /// Keep items whose dedup key is not in `seen` and whose category is under
    /// the cap, in shuffled order. Keys of kept items are added to `seen`.
    pub fn diversify<'a, R>(
        &self,
        items: &[&'a Item],
        seen: &mut HashSet<DedupKey>,
        rng: &mut R,
    ) -> Vec<&'a Item>
    where
        R: Rng + ?Sized,
    {
        let mut shuffled = items.to_vec();
        shuffled.shuffle(rng);

        let mut category_counts: HashMap<Option<String>, usize> = HashMap::new();
        let mut kept = Vec::with_capacity(items.len());

        for item in shuffled {
            let category = item.category().map(str::to_lowercase);
            let count = category_counts.entry(category).or_insert(0);
            if *count >= self.per_category_cap {
                continue;
            }

            if seen.insert(DedupKey::of(item)) {
                *count += 1;
                kept.push(item);
            }
        }

        kept
    }
}

impl Default for DiversitySampler {
    fn default() -> Self {
        Self::new(super::DEFAULT_PER_CATEGORY_CAP)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    use super::{DedupKey, DiversitySampler};
    use crate::domain::item::Item;

    #[test]
    fn duplicate_title_and_price_collapse() {
        let items = vec![
            Item::new("1", "A").with_price(10.0),
            Item::new("2", "A").with_price(10.0),
            Item::new("3", "B").with_price(5.0),
        ];
        let refs: Vec<&Item> = items.iter().collect();

        let sampler = DiversitySampler::new(100);
        let kept = sampler.diversify(&refs, &mut HashSet::new(), &mut StdRng::seed_from_u64(1));

        assert_eq!(kept.len(), 2);
        let titles: HashSet<&str> = kept.iter().map(|item| item.title.as_str()).collect();
        assert_eq!(titles, HashSet::from(["A", "B"]));
    }

    #[test]
    fn same_title_at_different_price_is_distinct() {
        let items = vec![Item::new("1", "A").with_price(10.0), Item::new("2", "a ").with_price(12.0)];
        let refs: Vec<&Item> = items.iter().collect();

        let kept = DiversitySampler::new(8).diversify(
            &refs,
            &mut HashSet::new(),
            &mut StdRng::seed_from_u64(3),
        );
        assert_eq!(kept.len(), 2);
        assert_eq!(DedupKey::of(&Item::new("x", " Coque  Rouge ")).title, "coque rouge");
    }

    #[test]
    fn category_cap_bounds_every_category() {
        let mut items: Vec<Item> = (0..12)
            .map(|index| Item::new(format!("p{index}"), format!("Phone {index}")).with_category("phones"))
            .collect();
        items.extend(
            (0..4).map(|index| Item::new(format!("a{index}"), format!("Case {index}")).with_category("Accessories")),
        );
        items.extend((0..5).map(|index| Item::new(format!("u{index}"), format!("Loose {index}"))));
        let refs: Vec<&Item> = items.iter().collect();

        let sampler = DiversitySampler::new(3);
        for seed in 0..20 {
            let kept = sampler.diversify(&refs, &mut HashSet::new(), &mut StdRng::seed_from_u64(seed));
            let phones = kept.iter().filter(|item| item.category() == Some("phones")).count();
            let accessories = kept.iter().filter(|item| item.category() == Some("Accessories")).count();
            let uncategorized = kept.iter().filter(|item| item.category().is_none()).count();

            assert_eq!(phones, 3);
            assert_eq!(accessories, 3);
            assert_eq!(uncategorized, 3);
        }
    }

    #[test]
    fn seeded_output_is_reproducible_and_follows_the_shuffle() {
        let items: Vec<Item> =
            (0..10).map(|index| Item::new(format!("i{index}"), format!("Item {index}"))).collect();
        let refs: Vec<&Item> = items.iter().collect();
        let sampler = DiversitySampler::new(100);

        let first = sampler.diversify(&refs, &mut HashSet::new(), &mut StdRng::seed_from_u64(42));
        let second = sampler.diversify(&refs, &mut HashSet::new(), &mut StdRng::seed_from_u64(42));
        assert_eq!(first, second);

        let mut expected = refs.clone();
        expected.shuffle(&mut StdRng::seed_from_u64(42));
        assert_eq!(first, expected);
    }

    #[test]
    fn previously_seen_keys_are_rejected_and_kept_keys_recorded() {
        let items = vec![Item::new("1", "A").with_price(10.0), Item::new("2", "B").with_price(5.0)];
        let refs: Vec<&Item> = items.iter().collect();

        let mut seen = HashSet::from([DedupKey::of(&items[0])]);
        let kept = DiversitySampler::default().diversify(&refs, &mut seen, &mut StdRng::seed_from_u64(9));

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id.as_str(), "2");
        assert!(seen.contains(&DedupKey::of(&items[1])));
    }

    #[test]
    fn empty_input_stays_empty() {
        let kept = DiversitySampler::default().diversify(
            &[],
            &mut HashSet::new(),
            &mut StdRng::seed_from_u64(0),
        );
        assert!(kept.is_empty());
    }
}
