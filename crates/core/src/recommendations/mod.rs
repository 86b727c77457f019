//! Relevance ranking for catalog placements
//!
//! Scores candidate items against a reference item with static heuristics,
//! ranks them, thins near-duplicates and crowded categories, and assembles
//! mutually exclusive lists for the storefront placements.

mod affinity;
mod cache;
mod diversity;
mod keywords;
mod orchestrator;
mod ranking;
mod scoring;
mod service;
mod types;

pub use affinity::{complementary_categories, is_complementary};
pub use cache::{CacheStats, RankingCache, RankingKey};
pub use diversity::{DedupKey, DiversitySampler};
pub use keywords::{extract_keywords, KeywordSet};
pub use orchestrator::{paginate, RecommendationOrchestrator};
pub use ranking::RankingEngine;
pub use scoring::{
    ContentStrategy, ContentWeights, CrossSellStrategy, CrossSellWeights, ScoringContext,
    ScoringStrategy,
};
pub use service::RecommendationService;
pub use types::*;

/// Default content-strategy weights
pub const DEFAULT_CONTENT_WEIGHTS: ContentWeights = ContentWeights {
    same_category: 0.60,
    same_subcategory: 0.80,
    keyword_overlap: 1.05,
    price_proximity: 0.40,
    same_supplier: 0.60,
    price_proximity_threshold: 0.30,
};

/// Default cross-sell-strategy weights
pub const DEFAULT_CROSS_SELL_WEIGHTS: CrossSellWeights = CrossSellWeights {
    complementary_category: 0.75,
    different_category: 0.40,
    price_window: 0.48,
    low_stock: 0.30,
    featured: 0.80,
    flash_offer: 0.60,
    same_city: 0.30,
    price_window_low: 0.3,
    price_window_high: 2.0,
    low_stock_threshold: 10,
};

/// Maximum items from one category in a diversified list
pub const DEFAULT_PER_CATEGORY_CAP: usize = 8;

/// Distinct (reference, catalog, strategy) rankings kept by the cache
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Items per page when the caller does not choose
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// Tokens at or under this many characters are not significant on their own
pub const MIN_SIGNIFICANT_TOKEN_CHARS: usize = 4;
