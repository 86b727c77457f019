//! Ranking engine

use std::sync::Arc;

use tracing::debug;

use crate::domain::item::Item;

use super::keywords::extract_keywords;
use super::scoring::{ContentStrategy, CrossSellStrategy, ScoringContext, ScoringStrategy};
use super::types::{RecommendationRequest, ScoredCandidate, StrategyKind};

/// Scores every candidate with one strategy and orders them best first.
///
/// Ranking is a pure function of its inputs: no randomness and no clock, so
/// identical requests always produce identical orderings.
#[derive(Clone)]
pub struct RankingEngine {
    content: Arc<dyn ScoringStrategy>,
    cross_sell: Arc<dyn ScoringStrategy>,
}

impl std::fmt::Debug for RankingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RankingEngine")
            .field("content", &self.content.kind())
            .field("cross_sell", &self.cross_sell.kind())
            .finish()
    }
}

impl RankingEngine {
    /// Create an engine with the default strategies
    pub fn new() -> Self {
        Self { content: Arc::new(ContentStrategy::new()), cross_sell: Arc::new(CrossSellStrategy::new()) }
    }

    /// Create with custom strategies for each kind
    pub fn with_strategies(
        content: Arc<dyn ScoringStrategy>,
        cross_sell: Arc<dyn ScoringStrategy>,
    ) -> Self {
        Self { content, cross_sell }
    }

    pub fn strategy(&self, kind: StrategyKind) -> &dyn ScoringStrategy {
        match kind {
            StrategyKind::Content => self.content.as_ref(),
            StrategyKind::CrossSell => self.cross_sell.as_ref(),
        }
    }

    /// Rank a request with the strategy it names
    pub fn rank<'a>(&self, request: &RecommendationRequest<'a>) -> Vec<ScoredCandidate<'a>> {
        let Some(reference) = request.reference else {
            return Vec::new();
        };

        let candidates: Vec<&'a Item> = request.candidates.iter().collect();
        self.rank_with(self.strategy(request.strategy), reference, &candidates, request.limit)
    }

    /// Rank with any strategy, including ones this engine was not built with.
    ///
    /// The reference item (matched by id) never appears in the result, and
    /// equal scores keep their candidate-list order.
    pub fn rank_with<'a>(
        &self,
        strategy: &dyn ScoringStrategy,
        reference: &Item,
        candidates: &[&'a Item],
        limit: usize,
    ) -> Vec<ScoredCandidate<'a>> {
        if candidates.is_empty() || limit == 0 {
            return Vec::new();
        }

        let reference_keywords = extract_keywords(&reference.title, &reference.description);

        let mut scored: Vec<ScoredCandidate<'a>> = candidates
            .iter()
            .copied()
            .filter(|candidate| candidate.id != reference.id)
            .map(|candidate| {
                let candidate_keywords = extract_keywords(&candidate.title, &candidate.description);
                let context = ScoringContext {
                    reference_keywords: &reference_keywords,
                    candidate_keywords: &candidate_keywords,
                };
                ScoredCandidate { item: candidate, score: strategy.score(reference, candidate, &context) }
            })
            .collect();

        // sort_by is stable, so ties keep candidate order
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(limit);

        debug!(
            event_name = "recommendations.ranked",
            strategy = strategy.kind().as_str(),
            reference_id = %reference.id,
            candidates = candidates.len(),
            returned = scored.len(),
            "candidates ranked"
        );

        scored
    }
}

impl Default for RankingEngine {
    fn default() -> Self {
        Self::new()
    }
}
