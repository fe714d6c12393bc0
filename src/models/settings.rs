//! Per-client persisted preferences.

use serde::{Deserialize, Serialize};

/// Setting key for the colour theme.
pub const THEME_KEY: &str = "theme";
/// Setting key for the last time the notice list was opened.
pub const LAST_NOTICE_READ_KEY: &str = "lastNoticeReadAt";

/// Light or dark colour theme.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Anything other than "dark" reads as light.
    pub fn from_stored(s: &str) -> Self {
        if s == "dark" {
            Theme::Dark
        } else {
            Theme::Light
        }
    }
}

/// All preferences stored for a client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClientSettings {
    pub theme: Theme,
    pub last_notice_read_at: i64,
}

/// Request body for changing the theme.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateThemeRequest {
    pub theme: Theme,
}
