//! Types for the recommendation pipeline

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::item::Item;
use crate::errors::ApplicationError;

/// Which scoring strategy a ranking uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Resemblance: same category, shared keywords, close price
    Content,
    /// Complement: affine categories, merchandising boosts
    CrossSell,
}

impl StrategyKind {
    /// Content placements are computed before cross-sell placements.
    pub fn priority(&self) -> u8 {
        match self {
            StrategyKind::Content => 0,
            StrategyKind::CrossSell => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Content => "content",
            StrategyKind::CrossSell => "cross_sell",
        }
    }
}

/// A candidate paired with its relevance to the reference item.
///
/// Scores are only meaningful relative to other scores from the same ranking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredCandidate<'a> {
    pub item: &'a Item,
    pub score: f64,
}

/// Input to a single ranking
#[derive(Debug, Clone, Copy)]
pub struct RecommendationRequest<'a> {
    /// Item being viewed; `None` yields an empty ranking
    pub reference: Option<&'a Item>,
    /// Candidate pool, in catalog order
    pub candidates: &'a [Item],
    pub strategy: StrategyKind,
    /// Cut applied before diversity filtering
    pub limit: usize,
}

impl<'a> RecommendationRequest<'a> {
    pub fn new(reference: &'a Item, candidates: &'a [Item], strategy: StrategyKind) -> Self {
        Self { reference: Some(reference), candidates, strategy, limit: usize::MAX }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// Storefront slot that shows a recommendation list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    SimilarItems,
    FrequentlyBoughtTogether,
    CheckoutUpsell,
    YouMightLike,
}

impl Placement {
    pub const ALL: [Placement; 4] = [
        Placement::SimilarItems,
        Placement::FrequentlyBoughtTogether,
        Placement::CheckoutUpsell,
        Placement::YouMightLike,
    ];

    pub fn default_strategy(&self) -> StrategyKind {
        match self {
            Placement::SimilarItems | Placement::FrequentlyBoughtTogether => StrategyKind::Content,
            Placement::CheckoutUpsell | Placement::YouMightLike => StrategyKind::CrossSell,
        }
    }

    /// Position on the page, top first
    pub fn order(&self) -> u8 {
        match self {
            Placement::SimilarItems => 0,
            Placement::FrequentlyBoughtTogether => 1,
            Placement::CheckoutUpsell => 2,
            Placement::YouMightLike => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Placement::SimilarItems => "similar_items",
            Placement::FrequentlyBoughtTogether => "frequently_bought_together",
            Placement::CheckoutUpsell => "checkout_upsell",
            Placement::YouMightLike => "you_might_like",
        }
    }

    /// Heading shown above the list
    pub fn title(&self) -> &'static str {
        match self {
            Placement::SimilarItems => "Similar items",
            Placement::FrequentlyBoughtTogether => "Frequently bought together",
            Placement::CheckoutUpsell => "Complete your order",
            Placement::YouMightLike => "You might like",
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Placement {
    type Err = ApplicationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "similar_items" | "similar" => Ok(Placement::SimilarItems),
            "frequently_bought_together" | "bought_together" => {
                Ok(Placement::FrequentlyBoughtTogether)
            }
            "checkout_upsell" | "upsell" => Ok(Placement::CheckoutUpsell),
            "you_might_like" => Ok(Placement::YouMightLike),
            other => Err(ApplicationError::Input(format!(
                "unknown placement `{other}` (expected similar_items|frequently_bought_together|checkout_upsell|you_might_like)"
            ))),
        }
    }
}

/// A placement bound to its strategy and pre-diversity limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementSpec {
    pub placement: Placement,
    pub strategy: StrategyKind,
    pub limit: usize,
}

impl PlacementSpec {
    pub fn new(placement: Placement, limit: usize) -> Self {
        Self { placement, strategy: placement.default_strategy(), limit }
    }

    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    pub(crate) fn priority(&self) -> (u8, u8) {
        (self.strategy.priority(), self.placement.order())
    }
}

/// Final, diversified list for one placement
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementList<'a> {
    pub placement: Placement,
    pub strategy: StrategyKind,
    pub items: Vec<&'a Item>,
}

impl<'a> PlacementList<'a> {
    pub fn page(&self, page_size: usize, page_number: usize) -> Page<'_, 'a> {
        Page {
            items: super::paginate(&self.items, page_size, page_number),
            info: PageInfo::new(self.items.len(), page_size, page_number),
        }
    }
}

/// Every placement computed for one reference item, in priority order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecommendationSet<'a> {
    pub placements: Vec<PlacementList<'a>>,
}

impl<'a> RecommendationSet<'a> {
    pub fn get(&self, placement: Placement) -> Option<&PlacementList<'a>> {
        self.placements.iter().find(|list| list.placement == placement)
    }

    pub fn is_empty(&self) -> bool {
        self.placements.iter().all(|list| list.items.is_empty())
    }

    pub fn total_items(&self) -> usize {
        self.placements.iter().map(|list| list.items.len()).sum()
    }
}

/// One page of a placement list
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Page<'s, 'a> {
    pub items: &'s [&'a Item],
    pub info: PageInfo,
}

/// What a caller needs to render pagination controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub page_number: usize,
    pub page_size: usize,
    pub total_count: usize,
    pub page_count: usize,
}

impl PageInfo {
    pub fn new(total_count: usize, page_size: usize, page_number: usize) -> Self {
        let page_count = if page_size == 0 { 0 } else { total_count.div_ceil(page_size) };
        Self { page_number, page_size, total_count, page_count }
    }
}
