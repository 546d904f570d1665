use crate::models::{ItemId, ItemIndex, UserId, UserIndex};
use std::collections::HashMap;

/// Bidirectional mapping between external ids and the retrieval model's
/// dense internal index spaces.
///
/// Built once from the retrieval model's id tables, which are authoritative;
/// the ranking model and metadata table may cover different id universes.
/// Immutable after construction. A lookup miss is a normal outcome that
/// signals an unknown user, not an error.
#[derive(Debug, Clone)]
pub struct IdRegistry {
    user_to_index: HashMap<UserId, UserIndex>,
    index_to_item: Vec<ItemId>,
}

impl IdRegistry {
    /// Build from the model's dense tables: position `i` in each slice is
    /// the external id assigned internal index `i`.
    pub fn new(user_ids: &[UserId], item_ids: &[ItemId]) -> Self {
        let user_to_index = user_ids
            .iter()
            .enumerate()
            .map(|(i, &id)| (id, UserIndex(i)))
            .collect();
        Self {
            user_to_index,
            index_to_item: item_ids.to_vec(),
        }
    }

    pub fn user_index(&self, user: UserId) -> Option<UserIndex> {
        self.user_to_index.get(&user).copied()
    }

    pub fn item_id(&self, index: ItemIndex) -> Option<ItemId> {
        self.index_to_item.get(index.0).copied()
    }

    pub fn num_users(&self) -> usize {
        self.user_to_index.len()
    }

    pub fn num_items(&self) -> usize {
        self.index_to_item.len()
    }
}
