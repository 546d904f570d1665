pub mod ranking;
pub mod retrieval;
pub mod sparse;

pub use ranking::BiasedMf;
pub use retrieval::LatentFactorModel;
pub use sparse::CsrMatrix;

use crate::error::ModelError;
use crate::models::{ItemId, ItemIndex, UserId, UserIndex};
use std::collections::HashSet;

/// Query seam over the trained candidate-retrieval model.
///
/// The model operates entirely in its own dense index space; translating
/// indices back to external ids is the caller's job.
pub trait RetrievalModel: Send + Sync {
    /// Up to `n` internal item indices with affinity scores for `user`,
    /// best first, never including anything in `seen`.
    fn recommend(
        &self,
        user: UserIndex,
        seen: &HashSet<ItemIndex>,
        n: usize,
    ) -> Result<Vec<(ItemIndex, f32)>, ModelError>;
}

/// Query seam over the trained rating-prediction model.
///
/// Unlike the retrieval model this one is keyed directly by external ids.
pub trait RankingModel: Send + Sync {
    /// Estimated preference of `user` for `item`.
    fn predict(&self, user: UserId, item: ItemId) -> Result<f32, ModelError>;
}
