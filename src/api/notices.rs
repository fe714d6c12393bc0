//! Notice endpoints.

use axum::{extract::State, response::IntoResponse, Json};
use futures::StreamExt;

use super::{error, publish_form, snapshot_events, success, ApiResult, FormReceipt};
use crate::db::{now_millis, prune_collection};
use crate::models::{Collection, Document, Notice, NoticeDraft};
use crate::views::{project_notices, sort_by_recency};
use crate::AppState;

pub(crate) fn notice_board(documents: &[Document]) -> Vec<Notice> {
    let mut notices = project_notices(documents, now_millis());
    sort_by_recency(&mut notices);
    notices
}

/// GET /api/notices - All retained notices, newest first.
pub async fn list_notices(State(state): State<AppState>) -> ApiResult<Vec<Notice>> {
    match state.repo.snapshot(Collection::Notices).await {
        Ok(snapshot) => success(notice_board(&snapshot.documents), snapshot.revision_id),
        Err(e) => {
            let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
            error(e, revision_id)
        }
    }
}

/// GET /api/notices/live - Notice list on every change.
pub async fn live_notices(State(state): State<AppState>) -> impl IntoResponse {
    let views = state
        .repo
        .subscribe(Collection::Notices)
        .into_stream()
        .map(|snapshot| (snapshot.revision_id, notice_board(&snapshot.documents)));

    snapshot_events(views)
}

/// POST /api/admin/notices - Broadcast a notice.
///
/// Once the notice is stored, older notices beyond the retention cap are
/// pruned. A pruning failure is logged and does not fail the request.
pub async fn create_notice(
    State(state): State<AppState>,
    Json(draft): Json<NoticeDraft>,
) -> ApiResult<FormReceipt<Notice, NoticeDraft>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let mut receipt = match publish_form(&state.repo, &state.forms, draft).await {
        Ok(receipt) => receipt,
        Err(e) => return error(e, revision_id),
    };

    match prune_collection(&state.repo, Collection::Notices, state.config.notice_retention).await {
        Ok(pruned) => receipt.pruned = Some(pruned),
        Err(e) => tracing::error!("Notice pruning failed: {}", e),
    }

    state.push.announce_notice(&receipt.record);

    let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
    success(receipt, new_revision)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn stored(id: &str, created_at: i64) -> Document {
        Document {
            id: id.to_string(),
            data: json!({ "title": id, "text": "body" }),
            created_at: Some(created_at),
        }
    }

    #[test]
    fn test_notice_board_keeps_newest_insert_first_on_ties() {
        // Snapshot order: newest insert first.
        let documents = vec![stored("third", 500), stored("second", 500), stored("first", 400)];
        let ids: Vec<String> = notice_board(&documents).into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec!["third", "second", "first"]);
    }
}
