//! Job board endpoints.

use axum::{extract::State, response::IntoResponse, Json};
use futures::StreamExt;

use super::{error, publish_form, snapshot_events, success, ApiResult, FormReceipt};
use crate::db::now_millis;
use crate::models::{Collection, Document, JobDraft, JobUpdate};
use crate::views::{project_jobs, sort_by_recency};
use crate::AppState;

fn job_board(documents: &[Document]) -> Vec<JobUpdate> {
    let mut jobs = project_jobs(documents, now_millis());
    sort_by_recency(&mut jobs);
    jobs
}

/// GET /api/jobs - All job updates, newest first.
pub async fn list_jobs(State(state): State<AppState>) -> ApiResult<Vec<JobUpdate>> {
    match state.repo.snapshot(Collection::Jobs).await {
        Ok(snapshot) => success(job_board(&snapshot.documents), snapshot.revision_id),
        Err(e) => {
            let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
            error(e, revision_id)
        }
    }
}

/// GET /api/jobs/live - Job board on every change.
pub async fn live_jobs(State(state): State<AppState>) -> impl IntoResponse {
    let views = state
        .repo
        .subscribe(Collection::Jobs)
        .into_stream()
        .map(|snapshot| (snapshot.revision_id, job_board(&snapshot.documents)));

    snapshot_events(views)
}

/// POST /api/admin/jobs - Post a job update.
pub async fn create_job(
    State(state): State<AppState>,
    Json(draft): Json<JobDraft>,
) -> ApiResult<FormReceipt<JobUpdate, JobDraft>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match publish_form(&state.repo, &state.forms, draft).await {
        Ok(receipt) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(receipt, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
