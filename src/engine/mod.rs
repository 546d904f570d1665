pub mod enricher;
pub mod fallback;
pub mod ranker;
pub mod registry;
pub mod retriever;

pub use registry::IdRegistry;

use crate::algorithms::{CsrMatrix, RankingModel, RetrievalModel};
use crate::artifacts::Artifacts;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::models::{ItemId, ItemMetadata, Recommendation, UserId};
use enricher::Enricher;
use fallback::PopularityFallback;
use ranker::Ranker;
use retriever::CandidateRetriever;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

/// The online hybrid recommendation engine.
///
/// Composes identifier translation, candidate retrieval, ranking, the
/// popularity fallback, and enrichment over artifacts that are loaded once
/// and immutable for the process lifetime. Requests are independent and
/// side-effect-free, so any number may run in parallel over a shared engine.
pub struct RecommendationEngine {
    registry: Arc<IdRegistry>,
    retriever: CandidateRetriever,
    ranker: Ranker,
    fallback: PopularityFallback,
    enricher: Enricher,
}

impl RecommendationEngine {
    pub fn new(artifacts: Artifacts, config: &EngineConfig) -> Self {
        let Artifacts {
            registry,
            retrieval,
            interactions,
            ranking,
            metadata,
            popularity,
        } = artifacts;
        Self::from_parts(
            Arc::new(registry),
            Arc::new(retrieval),
            Arc::new(interactions),
            Arc::new(ranking),
            metadata,
            popularity,
            config,
        )
    }

    /// Wire the engine from already-constructed collaborators. Mostly useful
    /// for tests that substitute model implementations.
    pub fn from_parts(
        registry: Arc<IdRegistry>,
        retrieval: Arc<dyn RetrievalModel>,
        interactions: Arc<CsrMatrix>,
        ranking: Arc<dyn RankingModel>,
        metadata: Option<HashMap<ItemId, ItemMetadata>>,
        popularity: Option<Vec<ItemId>>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            retriever: CandidateRetriever::new(
                retrieval,
                interactions,
                registry.clone(),
                config.candidate_pool,
            ),
            ranker: Ranker::new(ranking),
            fallback: PopularityFallback::new(popularity),
            enricher: Enricher::new(metadata),
            registry,
        }
    }

    /// Ranked recommendations for `user_id`, at most `k` items, best first.
    ///
    /// An unknown user is served from the popularity fallback rather than
    /// erroring; the only failure mode is a model query failing mid-request.
    pub fn recommend(
        &self,
        user_id: UserId,
        k: usize,
        enrich: bool,
    ) -> Result<Vec<Recommendation>, EngineError> {
        let ranked: Vec<(ItemId, Option<f32>)> = match self.registry.user_index(user_id) {
            Some(index) => {
                let candidates = self.retriever.retrieve(index)?;
                if candidates.is_empty() {
                    info!(%user_id, "retrieval yielded no candidates, serving popularity fallback");
                    self.cold_start(k)
                } else {
                    debug!(%user_id, candidates = candidates.len(), "ranking candidates");
                    self.ranker
                        .rank(user_id, &candidates, k)?
                        .into_iter()
                        .map(|(item, score)| (item, Some(score)))
                        .collect()
                }
            }
            None => {
                info!(%user_id, "unknown user, serving popularity fallback");
                self.cold_start(k)
            }
        };

        Ok(self.finish(ranked, enrich))
    }

    /// Globally popular items, the same sequence unknown users receive.
    pub fn popular(&self, k: usize, enrich: bool) -> Vec<Recommendation> {
        let items = self.cold_start(k);
        self.finish(items, enrich)
    }

    fn cold_start(&self, k: usize) -> Vec<(ItemId, Option<f32>)> {
        self.fallback
            .top_k(k)
            .into_iter()
            .map(|item| (item, None))
            .collect()
    }

    fn finish(&self, items: Vec<(ItemId, Option<f32>)>, enrich: bool) -> Vec<Recommendation> {
        if enrich {
            let ids: Vec<ItemId> = items.iter().map(|(id, _)| *id).collect();
            let metadata = self.enricher.enrich(&ids);
            items
                .into_iter()
                .zip(metadata)
                .map(|((item_id, score), meta)| Recommendation {
                    item_id,
                    score,
                    metadata: Some(meta),
                })
                .collect()
        } else {
            items
                .into_iter()
                .map(|(item_id, score)| Recommendation {
                    item_id,
                    score,
                    metadata: None,
                })
                .collect()
        }
    }
}

/// Shared slot for the engine, published exactly once after a complete,
/// all-or-nothing artifact load.
///
/// Requests arriving before publication observe "not ready" instead of any
/// partially-initialized state.
#[derive(Clone, Default)]
pub struct EngineHandle {
    inner: Arc<OnceLock<Arc<RecommendationEngine>>>,
}

impl EngineHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish the fully-built engine. Returns false if one was already
    /// published; the first publication wins.
    pub fn publish(&self, engine: RecommendationEngine) -> bool {
        self.inner.set(Arc::new(engine)).is_ok()
    }

    pub fn get(&self) -> Option<Arc<RecommendationEngine>> {
        self.inner.get().cloned()
    }

    pub fn is_ready(&self) -> bool {
        self.inner.get().is_some()
    }
}
