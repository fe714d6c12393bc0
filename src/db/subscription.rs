//! Live collection subscriptions.
//!
//! A subscription yields one full snapshot up front and another after every
//! write to its collection. Dropping it unsubscribes. Client settings have a
//! lighter feed that only signals that a value was written.

use futures::Stream;
use tokio::sync::broadcast::{self, error::RecvError};

use super::Repository;
use crate::models::{Collection, Document, Snapshot};

/// Change notification sent after every committed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionChange {
    pub collection: Collection,
    pub revision_id: i64,
}

/// Sent after every client setting write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingChange {
    pub client_id: String,
    pub key: String,
}

/// Stream of wake-ups for one client's setting.
///
/// A lagged receiver also wakes, since the missed writes may include ours.
pub(super) fn setting_writes(
    receiver: broadcast::Receiver<SettingChange>,
    client_id: String,
    key: String,
) -> impl Stream<Item = ()> + Send + 'static {
    futures::stream::unfold(
        (receiver, client_id, key),
        |(mut receiver, client_id, key)| async move {
            loop {
                match receiver.recv().await {
                    Ok(change) if change.client_id == client_id && change.key == key => break,
                    Ok(_) => continue,
                    Err(RecvError::Lagged(_)) => break,
                    Err(RecvError::Closed) => return None,
                }
            }
            Some(((), (receiver, client_id, key)))
        },
    )
}

/// A push-based sequence of full-collection snapshots.
pub struct Subscription {
    repo: Repository,
    collection: Collection,
    receiver: broadcast::Receiver<CollectionChange>,
    primed: bool,
}

impl Subscription {
    pub(super) fn new(
        repo: Repository,
        collection: Collection,
        receiver: broadcast::Receiver<CollectionChange>,
    ) -> Self {
        Self {
            repo,
            collection,
            receiver,
            primed: false,
        }
    }

    /// Wait for the next snapshot. Returns `None` once the store shuts down.
    ///
    /// A failed reload is logged and skipped; the consumer keeps whatever it
    /// last rendered until the next change succeeds.
    pub async fn next_snapshot(&mut self) -> Option<Snapshot<Document>> {
        if !self.primed {
            self.primed = true;
            match self.repo.snapshot(self.collection).await {
                Ok(snapshot) => return Some(snapshot),
                Err(e) => {
                    tracing::warn!(collection = %self.collection, "Initial snapshot failed: {}", e)
                }
            }
        }

        loop {
            match self.receiver.recv().await {
                Ok(change) if change.collection != self.collection => continue,
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(
                        collection = %self.collection,
                        skipped,
                        "Subscriber lagged, reloading"
                    );
                }
                Err(RecvError::Closed) => return None,
            }

            match self.repo.snapshot(self.collection).await {
                Ok(snapshot) => return Some(snapshot),
                Err(e) => {
                    tracing::warn!(collection = %self.collection, "Snapshot reload failed: {}", e)
                }
            }
        }
    }

    /// Turn the subscription into a stream of snapshots.
    pub fn into_stream(self) -> impl Stream<Item = Snapshot<Document>> + Send + 'static {
        futures::stream::unfold(self, |mut subscription| async move {
            subscription
                .next_snapshot()
                .await
                .map(|snapshot| (snapshot, subscription))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use futures::StreamExt;
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::db::init_database;

    async fn test_repo() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("test.sqlite"))
            .await
            .unwrap();
        (Repository::new(pool), temp_dir)
    }

    #[tokio::test]
    async fn test_initial_snapshot_then_updates() {
        let (repo, _dir) = test_repo().await;
        repo.add_document(Collection::Notices, json!({ "title": "first" }))
            .await
            .unwrap();

        let mut subscription = repo.subscribe(Collection::Notices);
        let initial = subscription.next_snapshot().await.unwrap();
        assert_eq!(initial.documents.len(), 1);

        repo.add_document(Collection::Notices, json!({ "title": "second" }))
            .await
            .unwrap();
        let next = tokio::time::timeout(Duration::from_secs(5), subscription.next_snapshot())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(next.documents.len(), 2);
        assert!(next.revision_id > initial.revision_id);
    }

    #[tokio::test]
    async fn test_setting_watch_wakes_only_for_its_client_and_key() {
        let (repo, _dir) = test_repo().await;
        let mut writes = Box::pin(repo.watch_setting("device-1", "lastNoticeReadAt"));

        repo.set_setting("device-2", "lastNoticeReadAt", "5").await.unwrap();
        repo.set_setting("device-1", "theme", "dark").await.unwrap();
        let woke = tokio::time::timeout(Duration::from_millis(200), writes.next()).await;
        assert!(woke.is_err());

        repo.set_last_notice_read_at("device-1", 10).await.unwrap();
        let woke = tokio::time::timeout(Duration::from_secs(5), writes.next())
            .await
            .unwrap();
        assert_eq!(woke, Some(()));
    }

    #[tokio::test]
    async fn test_other_collections_do_not_wake_subscriber() {
        let (repo, _dir) = test_repo().await;
        let mut stream = Box::pin(repo.subscribe(Collection::Jobs).into_stream());
        assert!(stream.next().await.unwrap().documents.is_empty());

        repo.add_document(Collection::Notices, json!({ "title": "notice" }))
            .await
            .unwrap();
        let woke = tokio::time::timeout(Duration::from_millis(200), stream.next()).await;
        assert!(woke.is_err());

        repo.add_document(Collection::Jobs, json!({ "title": "job" }))
            .await
            .unwrap();
        let snapshot = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(snapshot.collection, Collection::Jobs);
        assert_eq!(snapshot.documents.len(), 1);
    }
}
