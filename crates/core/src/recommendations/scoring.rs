//! Scoring strategies for candidate items

use crate::domain::item::{same_label, Item};

use super::affinity::is_complementary;
use super::keywords::{overlap_ratio, KeywordSet};
use super::types::StrategyKind;

/// Per-call data a strategy may consult besides the two items
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'k> {
    pub reference_keywords: &'k KeywordSet,
    pub candidate_keywords: &'k KeywordSet,
}

/// A relevance heuristic comparing a candidate to the reference item.
///
/// Implementations must be pure: the same pair of items and keyword sets
/// always yields the same score.
pub trait ScoringStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    fn score(&self, reference: &Item, candidate: &Item, context: &ScoringContext<'_>) -> f64;
}

/// Weights for resemblance scoring
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentWeights {
    /// Same category, case-insensitive (default: 0.60)
    pub same_category: f64,
    /// Same non-empty subcategory (default: 0.80)
    pub same_subcategory: f64,
    /// Scale applied to the keyword overlap ratio (default: 1.05)
    pub keyword_overlap: f64,
    /// Effective prices within the proximity threshold (default: 0.40)
    pub price_proximity: f64,
    /// Same supplier (default: 0.60)
    pub same_supplier: f64,
    /// Relative price gap under which prices count as close (default: 0.30)
    pub price_proximity_threshold: f64,
}

impl Default for ContentWeights {
    fn default() -> Self {
        super::DEFAULT_CONTENT_WEIGHTS
    }
}

/// Weights for complement scoring
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossSellWeights {
    /// Candidate category in the reference's affinity set (default: 0.75)
    pub complementary_category: f64,
    /// Candidate category differs from the reference's (default: 0.40)
    pub different_category: f64,
    /// Candidate price inside the add-on/upgrade window (default: 0.48)
    pub price_window: f64,
    /// Stock under the scarcity threshold (default: 0.30)
    pub low_stock: f64,
    pub featured: f64,
    pub flash_offer: f64,
    /// Same city as the reference (default: 0.30)
    pub same_city: f64,
    pub price_window_low: f64,
    pub price_window_high: f64,
    pub low_stock_threshold: u32,
}

impl Default for CrossSellWeights {
    fn default() -> Self {
        super::DEFAULT_CROSS_SELL_WEIGHTS
    }
}

/// Rewards items that resemble the reference
#[derive(Debug, Clone, Default)]
pub struct ContentStrategy {
    weights: ContentWeights,
}

impl ContentStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: ContentWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ContentWeights {
        &self.weights
    }

    fn price_proximity_score(&self, reference: &Item, candidate: &Item) -> f64 {
        let (Some(reference_price), Some(candidate_price)) =
            (reference.effective_price(), candidate.effective_price())
        else {
            return 0.0;
        };

        let scale = reference_price.max(candidate_price).max(1.0);
        let gap = (reference_price - candidate_price).abs() / scale;
        if gap < self.weights.price_proximity_threshold {
            self.weights.price_proximity
        } else {
            0.0
        }
    }
}

impl ScoringStrategy for ContentStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Content
    }

    fn score(&self, reference: &Item, candidate: &Item, context: &ScoringContext<'_>) -> f64 {
        let mut score = 0.0;

        if same_label(reference.category(), candidate.category()) {
            score += self.weights.same_category;
        }
        if same_label(reference.subcategory(), candidate.subcategory()) {
            score += self.weights.same_subcategory;
        }

        score += overlap_ratio(context.reference_keywords, context.candidate_keywords)
            * self.weights.keyword_overlap;
        score += self.price_proximity_score(reference, candidate);

        if same_label(reference.supplier_name(), candidate.supplier_name()) {
            score += self.weights.same_supplier;
        }

        score
    }
}

/// Rewards items that complement the reference rather than resemble it
#[derive(Debug, Clone, Default)]
pub struct CrossSellStrategy {
    weights: CrossSellWeights,
}

impl CrossSellStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: CrossSellWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &CrossSellWeights {
        &self.weights
    }

    fn category_score(&self, reference: &Item, candidate: &Item) -> f64 {
        let (Some(reference_category), Some(candidate_category)) =
            (reference.category(), candidate.category())
        else {
            return 0.0;
        };

        let mut score = 0.0;
        if is_complementary(reference_category, candidate_category) {
            score += self.weights.complementary_category;
        }
        if !same_label(Some(reference_category), Some(candidate_category)) {
            score += self.weights.different_category;
        }
        score
    }

    fn price_window_score(&self, reference: &Item, candidate: &Item) -> f64 {
        let (Some(reference_price), Some(candidate_price)) =
            (reference.effective_price(), candidate.effective_price())
        else {
            return 0.0;
        };

        let low = reference_price * self.weights.price_window_low;
        let high = reference_price * self.weights.price_window_high;
        if (low..=high).contains(&candidate_price) {
            self.weights.price_window
        } else {
            0.0
        }
    }
}

impl ScoringStrategy for CrossSellStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::CrossSell
    }

    fn score(&self, reference: &Item, candidate: &Item, _context: &ScoringContext<'_>) -> f64 {
        let mut score = self.category_score(reference, candidate);
        score += self.price_window_score(reference, candidate);

        if candidate.stock.is_some_and(|stock| stock < self.weights.low_stock_threshold) {
            score += self.weights.low_stock;
        }
        if candidate.flags.is_featured {
            score += self.weights.featured;
        }
        if candidate.flags.is_flash_offer {
            score += self.weights.flash_offer;
        }
        if same_label(reference.city(), candidate.city()) {
            score += self.weights.same_city;
        }

        score
    }
}
