use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// External user identifier, stable across runs and supplied by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

/// External item identifier, stable across runs and supplied by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

/// Dense zero-based position in the retrieval model's user factor table.
///
/// Deliberately a distinct type from [`UserId`]: the retrieval model's
/// internal index space and the external id space must never be mixed up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserIndex(pub usize);

/// Dense zero-based position in the retrieval model's item factor table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemIndex(pub usize);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Display metadata for one catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemMetadata {
    pub title: String,
    pub genres: Vec<String>,
}

impl ItemMetadata {
    /// Placeholder for an item that has no row in the metadata table.
    pub fn unknown() -> Self {
        Self {
            title: "Unknown title".to_string(),
            genres: vec!["Unknown".to_string()],
        }
    }

    /// Placeholder used when the whole metadata table failed to load.
    pub fn generic(item_id: ItemId) -> Self {
        Self {
            title: format!("Item {item_id}"),
            genres: vec!["Unknown".to_string()],
        }
    }
}

/// One recommended item. `score` is the ranking model's estimate on the
/// personalized path and absent on the popularity-fallback path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub item_id: ItemId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ItemMetadata>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub user_id: UserId,
    pub count: usize,
    pub enriched: bool,
    pub recommendations: Vec<Recommendation>,
    pub generated_at: DateTime<Utc>,
}

impl RecommendationResponse {
    pub fn new(user_id: UserId, enriched: bool, recommendations: Vec<Recommendation>) -> Self {
        Self {
            user_id,
            count: recommendations.len(),
            enriched,
            recommendations,
            generated_at: Utc::now(),
        }
    }
}
