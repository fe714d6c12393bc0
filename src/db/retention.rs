//! Retention pruning: keep only the newest documents of a collection.

use tokio::task::JoinSet;

use super::Repository;
use crate::errors::AppError;
use crate::models::Collection;

/// Delete every document of `collection` beyond the `keep` most recent.
///
/// Deletions run concurrently and are all joined before returning. A partial
/// failure returns the first error; deletions that succeeded stay deleted.
pub async fn prune_collection(
    repo: &Repository,
    collection: Collection,
    keep: usize,
) -> Result<usize, AppError> {
    let documents = repo.list_recent(collection, None).await?;
    if documents.len() <= keep {
        return Ok(0);
    }

    let mut deletions = JoinSet::new();
    for document in documents.into_iter().skip(keep) {
        let repo = repo.clone();
        deletions.spawn(async move { repo.delete_document(collection, &document.id).await });
    }

    let mut pruned = 0;
    let mut first_error = None;
    while let Some(joined) = deletions.join_next().await {
        match joined {
            Ok(Ok(true)) => pruned += 1,
            // Already removed by a concurrent prune.
            Ok(Ok(false)) => {}
            Ok(Err(e)) => {
                first_error.get_or_insert(e);
            }
            Err(e) => {
                first_error.get_or_insert(AppError::Internal(format!("Delete task failed: {}", e)));
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => {
            tracing::debug!(%collection, pruned, keep, "Pruned collection");
            Ok(pruned)
        }
    }
}

#[cfg(test)]
mod tests {
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
    async fn test_prune_keeps_newest() {
        let (repo, _dir) = test_repo().await;
        let mut ids = Vec::new();
        for i in 0..11 {
            let doc = repo
                .add_document(Collection::Notices, json!({ "title": format!("notice {}", i) }))
                .await
                .unwrap();
            ids.push(doc.id);
        }

        let pruned = prune_collection(&repo, Collection::Notices, 10).await.unwrap();
        assert_eq!(pruned, 1);

        let remaining: Vec<String> = repo
            .list_recent(Collection::Notices, None)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(remaining.len(), 10);
        assert!(!remaining.contains(&ids[0]));
        assert!(remaining.contains(&ids[10]));
    }

    #[tokio::test]
    async fn test_prune_under_cap_is_noop() {
        let (repo, _dir) = test_repo().await;
        for _ in 0..3 {
            repo.add_document(Collection::Notices, json!({ "title": "n" }))
                .await
                .unwrap();
        }
        let revision = repo.get_revision_id().await.unwrap();

        assert_eq!(prune_collection(&repo, Collection::Notices, 10).await.unwrap(), 0);
        assert_eq!(repo.get_revision_id().await.unwrap(), revision);
    }

    #[tokio::test]
    async fn test_prune_only_touches_its_collection() {
        let (repo, _dir) = test_repo().await;
        for _ in 0..4 {
            repo.add_document(Collection::Jobs, json!({ "title": "job" }))
                .await
                .unwrap();
            repo.add_document(Collection::Notices, json!({ "title": "notice" }))
                .await
                .unwrap();
        }

        assert_eq!(prune_collection(&repo, Collection::Notices, 1).await.unwrap(), 3);
        assert_eq!(repo.count_documents(Collection::Notices).await.unwrap(), 1);
        assert_eq!(repo.count_documents(Collection::Jobs).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_failed_deletes_are_reported_after_all_finish() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("test.sqlite"))
            .await
            .unwrap();
        let repo = Repository::new(pool.clone());
        for _ in 0..3 {
            repo.add_document(Collection::Notices, json!({ "title": "n" }))
                .await
                .unwrap();
        }
        sqlx::query(
            "CREATE TRIGGER no_deletes BEFORE DELETE ON documents \
             BEGIN SELECT RAISE(ABORT, 'deletes disabled'); END",
        )
        .execute(&pool)
        .await
        .unwrap();

        let result = prune_collection(&repo, Collection::Notices, 1).await;
        assert!(matches!(result, Err(AppError::Database(_))));
        assert_eq!(repo.count_documents(Collection::Notices).await.unwrap(), 3);
    }
}
