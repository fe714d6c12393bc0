//! Resource library endpoints.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use futures::StreamExt;
use serde::Serialize;

use super::{error, publish_form, snapshot_events, success, ApiResult, FormReceipt};
use crate::db::now_millis;
use crate::models::{Collection, Resource, ResourceDraft, ResourceSelector};
use crate::views::{filter_resources, project_resources};
use crate::AppState;

/// Resources for one department and semester.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceList {
    pub department: String,
    pub semester: String,
    pub resources: Vec<Resource>,
    /// True when nothing matched; clients render the empty state.
    pub is_empty: bool,
}

impl ResourceList {
    fn new(department: String, semester: String, resources: Vec<Resource>) -> Self {
        Self {
            is_empty: resources.is_empty(),
            department,
            semester,
            resources,
        }
    }
}

async fn select_resources(
    state: &AppState,
    department: String,
    semester: String,
) -> ApiResult<ResourceList> {
    match state.repo.snapshot(Collection::Resources).await {
        Ok(snapshot) => {
            let resources = filter_resources(
                project_resources(&snapshot.documents, now_millis()),
                &department,
                &semester,
            );
            success(
                ResourceList::new(department, semester, resources),
                snapshot.revision_id,
            )
        }
        Err(e) => {
            let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
            error(e, revision_id)
        }
    }
}

/// GET /api/resources?department=&semester= - Filtered resource list.
pub async fn list_resources(
    State(state): State<AppState>,
    Query(selector): Query<ResourceSelector>,
) -> ApiResult<ResourceList> {
    select_resources(&state, selector.department, selector.semester).await
}

/// GET /api/departments/:id/:semester/resources - Filtered resource list.
pub async fn list_department_resources(
    State(state): State<AppState>,
    Path((department, semester)): Path<(String, String)>,
) -> ApiResult<ResourceList> {
    select_resources(&state, department, semester).await
}

/// GET /api/departments/:id/:semester/resources/live - Filtered list on every change.
pub async fn live_department_resources(
    State(state): State<AppState>,
    Path((department, semester)): Path<(String, String)>,
) -> impl IntoResponse {
    let views = state
        .repo
        .subscribe(Collection::Resources)
        .into_stream()
        .map(move |snapshot| {
            let resources = filter_resources(
                project_resources(&snapshot.documents, now_millis()),
                &department,
                &semester,
            );
            (
                snapshot.revision_id,
                ResourceList::new(department.clone(), semester.clone(), resources),
            )
        });

    snapshot_events(views)
}

/// POST /api/admin/resources - Publish a study resource.
pub async fn create_resource(
    State(state): State<AppState>,
    Json(draft): Json<ResourceDraft>,
) -> ApiResult<FormReceipt<Resource, ResourceDraft>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match publish_form(&state.repo, &state.forms, draft).await {
        Ok(receipt) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(receipt, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
