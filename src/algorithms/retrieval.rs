use super::RetrievalModel;
use crate::error::ModelError;
use crate::models::{ItemIndex, UserIndex};
use ndarray::Array2;
use std::collections::HashSet;

/// ALS-style implicit-feedback latent-factor model.
///
/// Holds the trained user and item factor matrices; affinity is the dot
/// product of a user's factor row with each item's factor row.
#[derive(Debug, Clone)]
pub struct LatentFactorModel {
    user_factors: Array2<f32>,
    item_factors: Array2<f32>,
}

impl LatentFactorModel {
    pub fn new(user_factors: Array2<f32>, item_factors: Array2<f32>) -> Result<Self, ModelError> {
        if user_factors.ncols() != item_factors.ncols() {
            return Err(ModelError::DimensionMismatch {
                expected: user_factors.ncols(),
                got: item_factors.ncols(),
            });
        }
        Ok(Self {
            user_factors,
            item_factors,
        })
    }
}

impl RetrievalModel for LatentFactorModel {
    fn recommend(
        &self,
        user: UserIndex,
        seen: &HashSet<ItemIndex>,
        n: usize,
    ) -> Result<Vec<(ItemIndex, f32)>, ModelError> {
        if user.0 >= self.user_factors.nrows() {
            return Err(ModelError::UserIndexOutOfBounds(user.0));
        }
        let user_vec = self.user_factors.row(user.0);
        let scores = self.item_factors.dot(&user_vec);

        let mut scored: Vec<(ItemIndex, f32)> = scores
            .iter()
            .enumerate()
            .map(|(i, &s)| (ItemIndex(i), s))
            .filter(|(i, _)| !seen.contains(i))
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(n);
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn model() -> LatentFactorModel {
        // Two users, four items, two factors.
        let users = array![[1.0, 0.0], [0.0, 1.0]];
        let items = array![[0.9, 0.0], [0.0, 0.8], [0.5, 0.5], [0.1, 0.1]];
        LatentFactorModel::new(users, items).unwrap()
    }

    #[test]
    fn scores_sorted_descending() {
        let m = model();
        let recs = m.recommend(UserIndex(0), &HashSet::new(), 10).unwrap();
        assert_eq!(recs.len(), 4);
        assert!(recs.windows(2).all(|w| w[0].1 >= w[1].1));
        assert_eq!(recs[0].0, ItemIndex(0));
    }

    #[test]
    fn excludes_already_interacted_items() {
        let m = model();
        let seen: HashSet<ItemIndex> = [ItemIndex(0), ItemIndex(2)].into_iter().collect();
        let recs = m.recommend(UserIndex(0), &seen, 10).unwrap();
        assert!(recs.iter().all(|(i, _)| !seen.contains(i)));
        assert_eq!(recs.len(), 2);
    }

    #[test]
    fn honors_candidate_budget() {
        let m = model();
        let recs = m.recommend(UserIndex(1), &HashSet::new(), 2).unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].0, ItemIndex(1));
    }

    #[test]
    fn unknown_user_index_is_an_error() {
        let m = model();
        let err = m.recommend(UserIndex(99), &HashSet::new(), 5);
        assert!(matches!(err, Err(ModelError::UserIndexOutOfBounds(99))));
    }

    #[test]
    fn rejects_mismatched_factor_widths() {
        let users = array![[1.0, 0.0, 0.0]];
        let items = array![[1.0, 0.0]];
        assert!(LatentFactorModel::new(users, items).is_err());
    }
}
