use super::RankingModel;
use crate::error::ModelError;
use crate::models::{ItemId, UserId};
use std::collections::HashMap;

/// SVD-style biased matrix-factorization rating predictor.
///
/// Keyed directly by external ids. The estimate is
/// `mu + b_u + b_i + p_u . q_i`, dropping any term the model has no
/// parameters for; an entirely unknown user/item pair degrades to the
/// global mean. Estimates are clamped to the training rating scale.
#[derive(Debug, Clone)]
pub struct BiasedMf {
    global_mean: f32,
    rating_min: f32,
    rating_max: f32,
    user_bias: HashMap<UserId, f32>,
    item_bias: HashMap<ItemId, f32>,
    user_factors: HashMap<UserId, Vec<f32>>,
    item_factors: HashMap<ItemId, Vec<f32>>,
}

impl BiasedMf {
    pub fn new(
        global_mean: f32,
        rating_min: f32,
        rating_max: f32,
        user_bias: HashMap<UserId, f32>,
        item_bias: HashMap<ItemId, f32>,
        user_factors: HashMap<UserId, Vec<f32>>,
        item_factors: HashMap<ItemId, Vec<f32>>,
    ) -> Self {
        Self {
            global_mean,
            rating_min,
            rating_max,
            user_bias,
            item_bias,
            user_factors,
            item_factors,
        }
    }

    /// Baseline-only predictor, handy for fixtures.
    pub fn baseline(global_mean: f32, rating_min: f32, rating_max: f32) -> Self {
        Self::new(
            global_mean,
            rating_min,
            rating_max,
            HashMap::new(),
            HashMap::new(),
            HashMap::new(),
            HashMap::new(),
        )
    }
}

impl RankingModel for BiasedMf {
    fn predict(&self, user: UserId, item: ItemId) -> Result<f32, ModelError> {
        let mut est = self.global_mean;
        if let Some(bu) = self.user_bias.get(&user) {
            est += bu;
        }
        if let Some(bi) = self.item_bias.get(&item) {
            est += bi;
        }
        if let (Some(pu), Some(qi)) = (self.user_factors.get(&user), self.item_factors.get(&item))
        {
            if pu.len() != qi.len() {
                return Err(ModelError::DimensionMismatch {
                    expected: pu.len(),
                    got: qi.len(),
                });
            }
            est += pu.iter().zip(qi).map(|(p, q)| p * q).sum::<f32>();
        }
        Ok(est.clamp(self.rating_min, self.rating_max))
    }
}
