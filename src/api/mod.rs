//! REST API module.
//!
//! JSON handlers share the success/error envelope; live views are served as
//! Server-Sent Events carrying the same envelope per snapshot.

mod catalog;
mod clients;
mod jobs;
mod notices;
mod push;
mod resources;

pub use catalog::*;
pub use clients::*;
pub use jobs::*;
pub use notices::*;
pub use push::*;
pub use resources::*;

use axum::{
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::{Stream, StreamExt};
use serde::Serialize;

use crate::db::Repository;
use crate::errors::{AppError, AppErrorWithRevision};
use crate::forms::{AdminForm, FormController, FormGates, SubmitOutcome};

/// Success response envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub revision_id: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T, revision_id: i64) -> Self {
        Self {
            success: true,
            data,
            revision_id,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppErrorWithRevision>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T, revision_id: i64) -> ApiResult<T> {
    Ok(ApiResponse::new(data, revision_id))
}

/// Create an error API response.
pub fn error<T: Serialize>(err: AppError, revision_id: i64) -> ApiResult<T> {
    Err(err.at_revision(revision_id))
}

/// What the admin sees after a successful submit.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormReceipt<R: Serialize, D: Serialize> {
    pub message: &'static str,
    pub record: R,
    /// The draft after submission, with its cleared fields emptied.
    pub draft: D,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pruned: Option<usize>,
}

/// Run one admin form submission and map its outcome onto the error taxonomy.
pub(crate) async fn publish_form<F>(
    repo: &Repository,
    gates: &FormGates,
    draft: F,
) -> Result<FormReceipt<F::Record, F>, AppError>
where
    F: AdminForm + Serialize,
    F::Record: Serialize,
{
    let mut form = FormController::new(draft, F::gate(gates));
    match form.submit(repo).await {
        SubmitOutcome::Published { record, message } => Ok(FormReceipt {
            message,
            record,
            draft: form.into_draft(),
            pruned: None,
        }),
        SubmitOutcome::Invalid { prompt } => Err(AppError::Validation(prompt.to_string())),
        SubmitOutcome::Busy { prompt } => Err(AppError::Conflict(prompt.to_string())),
        SubmitOutcome::Failed { message } => Err(AppError::Internal(message.to_string())),
    }
}

/// Serve a stream of `(revision, view)` pairs as `snapshot` events.
pub(crate) fn snapshot_events<S, T>(
    views: S,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>> + Send + 'static>
where
    S: Stream<Item = (i64, T)> + Send + 'static,
    T: Serialize,
{
    let events = views.map(|(revision_id, view)| {
        Event::default()
            .event("snapshot")
            .id(revision_id.to_string())
            .json_data(ApiResponse::new(view, revision_id))
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Reject client ids that cannot be a device identifier.
pub(crate) fn validate_client_id(client_id: &str) -> Result<(), AppError> {
    if client_id.trim().is_empty() || client_id.len() > 128 {
        return Err(AppError::Validation(
            "Client id must be between 1 and 128 characters".to_string(),
        ));
    }
    Ok(())
}
