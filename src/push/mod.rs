//! Push registration and foreground message fan-out.
//!
//! Device tokens are stored in the `fcm_tokens` collection keyed by their own
//! value. Connected clients receive foreground messages over a broadcast
//! channel; delivery through a vendor push service is out of scope.

use serde_json::json;
use tokio::sync::broadcast;

use crate::db::{now_millis, Repository};
use crate::errors::AppError;
use crate::models::{Collection, Notice, PushMessage, PushToken};
use crate::views::project_push_token;

const PUSH_CHANNEL_CAPACITY: usize = 32;

/// Fan-out point for foreground push messages.
pub struct PushHub {
    sender: broadcast::Sender<PushMessage>,
}

impl Default for PushHub {
    fn default() -> Self {
        Self::new()
    }
}

impl PushHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(PUSH_CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Send a message to every connected listener. Returns how many received it.
    pub fn publish(&self, message: PushMessage) -> usize {
        self.sender.send(message).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PushMessage> {
        self.sender.subscribe()
    }

    /// Announce a freshly published notice.
    pub fn announce_notice(&self, notice: &Notice) -> usize {
        let delivered = self.publish(PushMessage {
            title: notice.title.clone(),
            body: notice.text.clone(),
        });
        tracing::debug!(id = %notice.id, delivered, "Announced notice");
        delivered
    }
}

/// Store or refresh a device token.
pub async fn register_token(repo: &Repository, token: &str) -> Result<PushToken, AppError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::Validation("Push token is required".to_string()));
    }

    let document = repo
        .set_document(
            Collection::PushTokens,
            token,
            json!({ "token": token, "updatedAt": now_millis() }),
        )
        .await?;

    Ok(project_push_token(&document))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::db::init_database;

    #[test]
    fn test_publish_without_listeners() {
        let hub = PushHub::new();
        let delivered = hub.publish(PushMessage {
            title: "t".to_string(),
            body: "b".to_string(),
        });
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn test_listener_receives_notice() {
        let hub = PushHub::new();
        let mut receiver = hub.subscribe();
        let notice = Notice {
            id: "n1".to_string(),
            title: "Form fill-up".to_string(),
            text: "Deadline extended".to_string(),
            created_at: 1,
        };

        assert_eq!(hub.announce_notice(&notice), 1);
        let message = receiver.recv().await.unwrap();
        assert_eq!(message.title, "Form fill-up");
        assert_eq!(message.body, "Deadline extended");
    }

    #[tokio::test]
    async fn test_register_token_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("test.sqlite"))
            .await
            .unwrap();
        let repo = Repository::new(pool);

        let first = register_token(&repo, " device-token ").await.unwrap();
        assert_eq!(first.token, "device-token");
        register_token(&repo, "device-token").await.unwrap();

        assert_eq!(repo.count_documents(Collection::PushTokens).await.unwrap(), 1);
        assert!(matches!(
            register_token(&repo, "  ").await,
            Err(AppError::Validation(_))
        ));
    }
}
