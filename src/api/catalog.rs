//! Department catalog and home feed endpoints.

use axum::extract::{Path, State};
use serde::Serialize;

use super::{error, success, ApiResult};
use crate::db::now_millis;
use crate::errors::AppError;
use crate::models::{
    Collection, Department, DepartmentInfo, DepartmentSemesters, JobUpdate, Notice, SEMESTERS,
};
use crate::views::{project_jobs, project_notices};
use crate::AppState;

/// Jobs shown on the home page.
pub const HOME_JOB_COUNT: usize = 3;
/// Notices shown on the home page.
pub const HOME_NOTICE_COUNT: usize = 4;

/// Latest activity shown on the home page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeFeed {
    pub departments: Vec<DepartmentInfo>,
    pub latest_jobs: Vec<JobUpdate>,
    pub latest_notices: Vec<Notice>,
}

/// GET /api/departments - List departments.
pub async fn list_departments(State(state): State<AppState>) -> ApiResult<Vec<DepartmentInfo>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    success(
        Department::ALL.into_iter().map(DepartmentInfo::from).collect(),
        revision_id,
    )
}

/// GET /api/departments/:id/semesters - Semester picker for a department.
pub async fn list_semesters(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<DepartmentSemesters> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match Department::from_str(&id) {
        Some(department) => success(
            DepartmentSemesters {
                department,
                semesters: SEMESTERS.to_vec(),
            },
            revision_id,
        ),
        None => error(
            AppError::NotFound(format!("Department {} not found", id)),
            revision_id,
        ),
    }
}

/// GET /api/home - Departments plus the newest jobs and notices.
pub async fn home_feed(State(state): State<AppState>) -> ApiResult<HomeFeed> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    let now = now_millis();

    let jobs = match state
        .repo
        .list_recent(Collection::Jobs, Some(HOME_JOB_COUNT))
        .await
    {
        Ok(documents) => project_jobs(&documents, now),
        Err(e) => return error(e, revision_id),
    };
    let notices = match state
        .repo
        .list_recent(Collection::Notices, Some(HOME_NOTICE_COUNT))
        .await
    {
        Ok(documents) => project_notices(&documents, now),
        Err(e) => return error(e, revision_id),
    };

    success(
        HomeFeed {
            departments: Department::ALL.into_iter().map(DepartmentInfo::from).collect(),
            latest_jobs: jobs,
            latest_notices: notices,
        },
        revision_id,
    )
}
