use super::registry::IdRegistry;
use crate::algorithms::{CsrMatrix, RetrievalModel};
use crate::error::EngineError;
use crate::models::{ItemId, ItemIndex, UserIndex};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// First stage: broad candidate generation for a known user.
///
/// Over-inclusive by design; the candidate budget is deliberately larger
/// than any expected K so the ranker has room to reorder, and precision is
/// entirely the ranker's problem.
pub struct CandidateRetriever {
    model: Arc<dyn RetrievalModel>,
    interactions: Arc<CsrMatrix>,
    registry: Arc<IdRegistry>,
    budget: usize,
}

impl CandidateRetriever {
    pub fn new(
        model: Arc<dyn RetrievalModel>,
        interactions: Arc<CsrMatrix>,
        registry: Arc<IdRegistry>,
        budget: usize,
    ) -> Self {
        Self {
            model,
            interactions,
            registry,
            budget,
        }
    }

    /// Candidate external item ids for `user`, in model affinity order,
    /// excluding items the user already interacted with.
    ///
    /// Deduplicated preserving first occurrence, so downstream tie-breaking
    /// stays stable even when future candidate sources overlap. May be
    /// empty; that is not an error.
    pub fn retrieve(&self, user: UserIndex) -> Result<Vec<ItemId>, EngineError> {
        let seen: HashSet<ItemIndex> = self
            .interactions
            .row_indices(user.0)
            .iter()
            .map(|&c| ItemIndex(c))
            .collect();

        let scored = self
            .model
            .recommend(user, &seen, self.budget)
            .map_err(EngineError::Retrieval)?;

        let mut candidates = Vec::with_capacity(scored.len());
        let mut dedup = HashSet::with_capacity(scored.len());
        for (index, _) in scored {
            match self.registry.item_id(index) {
                Some(item_id) => {
                    if dedup.insert(item_id) {
                        candidates.push(item_id);
                    }
                }
                None => warn!("retrieval model returned unmapped item index {}", index.0),
            }
        }

        debug!(
            user_index = user.0,
            candidates = candidates.len(),
            "generated candidate pool"
        );
        Ok(candidates)
    }
}
