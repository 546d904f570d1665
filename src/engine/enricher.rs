use crate::models::{ItemId, ItemMetadata};
use std::collections::HashMap;
use tracing::warn;

/// Resolves item ids to display metadata, tolerating gaps.
///
/// Enrichment never fails a request: a missing row gets a sentinel
/// placeholder and a missing table gets generic per-item placeholders, so
/// the output always has one entry per input id.
pub struct Enricher {
    table: Option<HashMap<ItemId, ItemMetadata>>,
}

impl Enricher {
    pub fn new(table: Option<HashMap<ItemId, ItemMetadata>>) -> Self {
        if table.is_none() {
            warn!("metadata table unavailable, serving generic placeholders");
        }
        Self { table }
    }

    /// Metadata for each id, same order and length as the input.
    pub fn enrich(&self, items: &[ItemId]) -> Vec<ItemMetadata> {
        match &self.table {
            Some(table) => items
                .iter()
                .map(|id| table.get(id).cloned().unwrap_or_else(ItemMetadata::unknown))
                .collect(),
            None => items.iter().map(|&id| ItemMetadata::generic(id)).collect(),
        }
    }
}
