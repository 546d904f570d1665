use crate::models::ItemId;
use tracing::warn;

/// Canonical well-known items, substituted when the precomputed popularity
/// artifact is unavailable so the fallback path never comes back empty.
pub const BUILTIN_POPULAR: [u64; 10] = [2858, 260, 1196, 1210, 480, 2028, 589, 2571, 1270, 593];

/// Static ranked list of globally popular items, served to unknown users.
pub struct PopularityFallback {
    list: Vec<ItemId>,
}

impl PopularityFallback {
    /// `list` is the precomputed popularity artifact; `None` means the
    /// collaborator data was missing and the built-in list takes over.
    pub fn new(list: Option<Vec<ItemId>>) -> Self {
        let list = match list {
            Some(list) if !list.is_empty() => list,
            _ => {
                warn!("popularity list unavailable, using built-in fallback");
                BUILTIN_POPULAR.iter().map(|&id| ItemId(id)).collect()
            }
        };
        Self { list }
    }

    /// First `k` entries, most popular first. Truncates silently when `k`
    /// exceeds the list length.
    pub fn top_k(&self, k: usize) -> Vec<ItemId> {
        self.list.iter().take(k).copied().collect()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}
