use crate::algorithms::RankingModel;
use crate::error::EngineError;
use crate::models::{ItemId, UserId};
use std::cmp::Ordering;
use std::sync::Arc;

/// Second stage: precise scoring of a small candidate set.
///
/// One model query per candidate, so the candidate pool must stay bounded
/// upstream.
pub struct Ranker {
    model: Arc<dyn RankingModel>,
}

impl Ranker {
    pub fn new(model: Arc<dyn RankingModel>) -> Self {
        Self { model }
    }

    /// Score every candidate for `user` and return the top `k`, best first.
    ///
    /// The sort is stable, so equal scores keep their candidate order across
    /// runs. Fewer than `k` candidates yields all of them, unpadded. A
    /// failed prediction fails the request; masking it as an empty result
    /// would silently degrade quality.
    pub fn rank(
        &self,
        user: UserId,
        candidates: &[ItemId],
        k: usize,
    ) -> Result<Vec<(ItemId, f32)>, EngineError> {
        let mut scored = Vec::with_capacity(candidates.len());
        for &item in candidates {
            let score = self.model.predict(user, item).map_err(EngineError::Ranking)?;
            scored.push((item, score));
        }

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }
}
