//! Document store repository.
//!
//! Every write bumps the store revision and announces the touched collection
//! to live subscribers.

use chrono::Utc;
use futures::Stream;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tokio::sync::broadcast;

use super::now_millis;
use super::subscription::{setting_writes, CollectionChange, SettingChange, Subscription};
use crate::errors::AppError;
use crate::models::{
    ClientSettings, Collection, Document, Snapshot, Theme, LAST_NOTICE_READ_KEY, THEME_KEY,
};

/// Buffered change events per subscriber before it is considered lagged.
const CHANGE_CHANNEL_CAPACITY: usize = 64;
const SETTING_CHANNEL_CAPACITY: usize = 64;

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
    changes: broadcast::Sender<CollectionChange>,
    settings: broadcast::Sender<SettingChange>,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        let (settings, _) = broadcast::channel(SETTING_CHANNEL_CAPACITY);
        Self {
            pool,
            changes,
            settings,
        }
    }

    /// Get the current revision ID.
    pub async fn get_revision_id(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT revision_id FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("revision_id"))
    }

    /// Increment the revision ID and return the new value.
    async fn increment_revision(&self) -> Result<i64, AppError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query("UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1")
            .bind(&now)
            .execute(&self.pool)
            .await?;
        self.get_revision_id().await
    }

    /// Bump the revision and wake subscribers of `collection`.
    async fn publish_change(&self, collection: Collection) -> Result<i64, AppError> {
        let revision_id = self.increment_revision().await?;
        // No receivers is fine: nobody is watching this collection.
        let _ = self.changes.send(CollectionChange {
            collection,
            revision_id,
        });
        Ok(revision_id)
    }

    /// Open a live subscription on one collection.
    pub fn subscribe(&self, collection: Collection) -> Subscription {
        Subscription::new(self.clone(), collection, self.changes.subscribe())
    }

    /// Yields once after every write of `key` for `client_id`.
    pub fn watch_setting(
        &self,
        client_id: &str,
        key: &str,
    ) -> impl Stream<Item = ()> + Send + 'static {
        setting_writes(self.settings.subscribe(), client_id.to_string(), key.to_string())
    }

    // ==================== DOCUMENT OPERATIONS ====================

    /// Insert a new document with a generated id and a store-assigned timestamp.
    pub async fn add_document(
        &self,
        collection: Collection,
        data: serde_json::Value,
    ) -> Result<Document, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let created_at = now_millis();
        let body = serde_json::to_string(&data)?;

        sqlx::query("INSERT INTO documents (collection, id, data, created_at) VALUES (?, ?, ?, ?)")
            .bind(collection.as_str())
            .bind(&id)
            .bind(&body)
            .bind(created_at)
            .execute(&self.pool)
            .await?;

        self.publish_change(collection).await?;

        Ok(Document {
            id,
            data,
            created_at: Some(created_at),
        })
    }

    /// Create or replace the document stored under `id`.
    ///
    /// A replaced document keeps its original position and timestamp.
    pub async fn set_document(
        &self,
        collection: Collection,
        id: &str,
        data: serde_json::Value,
    ) -> Result<Document, AppError> {
        let body = serde_json::to_string(&data)?;

        sqlx::query(
            r#"INSERT INTO documents (collection, id, data, created_at) VALUES (?, ?, ?, ?)
               ON CONFLICT (collection, id) DO UPDATE SET data = excluded.data"#,
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(&body)
        .bind(now_millis())
        .execute(&self.pool)
        .await?;

        self.publish_change(collection).await?;

        self.get_document(collection, id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Document {}/{} vanished", collection, id)))
    }

    /// Get one document.
    pub async fn get_document(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<Document>, AppError> {
        let row =
            sqlx::query("SELECT id, data, created_at FROM documents WHERE collection = ? AND id = ?")
                .bind(collection.as_str())
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.as_ref().map(document_from_row).transpose()
    }

    /// Delete one document. Returns false when it was already gone.
    pub async fn delete_document(&self, collection: Collection, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
            .bind(collection.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        self.publish_change(collection).await?;
        Ok(true)
    }

    /// List a collection newest first. Equal timestamps put the later insert first.
    pub async fn list_recent(
        &self,
        collection: Collection,
        limit: Option<usize>,
    ) -> Result<Vec<Document>, AppError> {
        // SQLite treats a negative LIMIT as unbounded.
        let limit = limit.map(|n| n as i64).unwrap_or(-1);

        let rows = sqlx::query(
            r#"SELECT id, data, created_at FROM documents
               WHERE collection = ?
               ORDER BY created_at DESC, seq DESC
               LIMIT ?"#,
        )
        .bind(collection.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(document_from_row).collect()
    }

    /// Read a whole collection together with the revision it reflects.
    ///
    /// Documents come newest insert first, so a stable recency sort keeps the
    /// same tie order as [`Repository::list_recent`].
    pub async fn snapshot(&self, collection: Collection) -> Result<Snapshot<Document>, AppError> {
        let mut tx = self.pool.begin().await?;

        let meta = sqlx::query("SELECT revision_id FROM meta WHERE id = 1")
            .fetch_one(&mut *tx)
            .await?;
        let rows = sqlx::query(
            "SELECT id, data, created_at FROM documents WHERE collection = ? ORDER BY seq DESC",
        )
        .bind(collection.as_str())
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Snapshot {
            collection,
            revision_id: meta.get("revision_id"),
            documents: rows
                .iter()
                .map(document_from_row)
                .collect::<Result<_, _>>()?,
        })
    }

    // ==================== CLIENT SETTINGS ====================

    /// Read one stored setting for a client.
    pub async fn get_setting(&self, client_id: &str, key: &str) -> Result<Option<String>, AppError> {
        let row = sqlx::query("SELECT value FROM client_settings WHERE client_id = ? AND key = ?")
            .bind(client_id)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.get("value")))
    }

    /// Store one setting for a client, replacing any previous value.
    pub async fn set_setting(&self, client_id: &str, key: &str, value: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"INSERT INTO client_settings (client_id, key, value, updated_at) VALUES (?, ?, ?, ?)
               ON CONFLICT (client_id, key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"#,
        )
        .bind(client_id)
        .bind(key)
        .bind(value)
        .bind(now_millis())
        .execute(&self.pool)
        .await?;

        let _ = self.settings.send(SettingChange {
            client_id: client_id.to_string(),
            key: key.to_string(),
        });
        Ok(())
    }

    /// Last time the client opened the notice list; 0 when never opened.
    pub async fn last_notice_read_at(&self, client_id: &str) -> Result<i64, AppError> {
        let stored = self.get_setting(client_id, LAST_NOTICE_READ_KEY).await?;
        Ok(stored.and_then(|v| v.parse().ok()).unwrap_or(0))
    }

    pub async fn set_last_notice_read_at(&self, client_id: &str, at: i64) -> Result<(), AppError> {
        self.set_setting(client_id, LAST_NOTICE_READ_KEY, &at.to_string())
            .await
    }

    /// All stored preferences for a client, with defaults filled in.
    pub async fn client_settings(&self, client_id: &str) -> Result<ClientSettings, AppError> {
        let theme = self
            .get_setting(client_id, THEME_KEY)
            .await?
            .map(|v| Theme::from_stored(&v))
            .unwrap_or_default();

        Ok(ClientSettings {
            theme,
            last_notice_read_at: self.last_notice_read_at(client_id).await?,
        })
    }
}

#[cfg(test)]
impl Repository {
    /// List a collection in insertion order.
    pub async fn list_documents(&self, collection: Collection) -> Result<Vec<Document>, AppError> {
        let rows = sqlx::query(
            "SELECT id, data, created_at FROM documents WHERE collection = ? ORDER BY seq",
        )
        .bind(collection.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(document_from_row).collect()
    }

    pub async fn count_documents(&self, collection: Collection) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM documents WHERE collection = ?")
            .bind(collection.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }
}

fn document_from_row(row: &SqliteRow) -> Result<Document, AppError> {
    let body: String = row.get("data");
    Ok(Document {
        id: row.get("id"),
        data: serde_json::from_str(&body)?,
        created_at: row.get("created_at"),
    })
}
