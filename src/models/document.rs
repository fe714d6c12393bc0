//! Raw documents and collection snapshots as held by the document store.

use serde::{Deserialize, Serialize};

/// A named collection in the document store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Resources,
    Jobs,
    Notices,
    #[serde(rename = "fcm_tokens")]
    PushTokens,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Resources => "resources",
            Collection::Jobs => "jobs",
            Collection::Notices => "notices",
            Collection::PushTokens => "fcm_tokens",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stored record. `data` is the JSON body as written; `created_at` is the
/// store-assigned timestamp in epoch milliseconds, absent until materialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub data: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

/// A full listing of one collection at a store revision.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot<T> {
    pub collection: Collection,
    pub revision_id: i64,
    pub documents: Vec<T>,
}
