pub mod domain;
pub mod errors;
pub mod recommendations;

pub use domain::catalog::{Catalog, CatalogVersion};
pub use domain::item::{Item, ItemFlags, ItemId};
pub use errors::{ApplicationError, CatalogError, InterfaceError};
pub use recommendations::{
    extract_keywords, paginate, ContentStrategy, CrossSellStrategy, DiversitySampler, Page,
    PageInfo, Placement, PlacementList, PlacementSpec, RankingEngine, RecommendationOrchestrator,
    RecommendationRequest, RecommendationService, RecommendationSet, ScoredCandidate,
    ScoringStrategy, StrategyKind,
};
