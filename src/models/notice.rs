//! Notice model and unread badge.

use serde::{Deserialize, Serialize};

/// An admin broadcast notice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub id: String,
    pub title: String,
    pub text: String,
    pub created_at: i64,
}

/// Request body for broadcasting a notice.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NoticeDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
}

/// Unread notice count for one client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UnreadBadge {
    pub count: usize,
    /// Display text: empty when nothing is unread, capped at "9+".
    pub label: String,
}

/// Notice drawer contents returned when a client opens the notice list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticeDrawer {
    pub notices: Vec<Notice>,
    pub badge: UnreadBadge,
    pub last_read_at: i64,
}
