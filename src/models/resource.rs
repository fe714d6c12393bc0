//! Study resource model.

use serde::{Deserialize, Serialize};

/// A study material link filed under a department and semester.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    pub title: String,
    /// Department name as stored; legacy documents may carry any string here.
    pub category: String,
    pub semester: String,
    pub pdf_link: String,
    pub created_at: i64,
}

/// Request body for publishing a resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub semester: String,
    /// Drive or PDF link
    #[serde(default)]
    pub link: String,
}

/// Query parameters selecting a department and semester.
///
/// A missing value matches nothing, so the listing falls back to its empty state.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceSelector {
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub semester: String,
}
