//! Push registration models.

use serde::{Deserialize, Serialize};

/// A device or browser push token as stored in `fcm_tokens`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PushToken {
    pub token: String,
    pub updated_at: i64,
}

/// Request body for registering a push token.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterTokenRequest {
    #[serde(default)]
    pub token: String,
}

/// A foreground message delivered to connected clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
}
