//! Push registration endpoints.

use axum::{
    extract::State,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    Json,
};
use tokio::sync::broadcast::error::RecvError;

use super::{error, success, ApiResult};
use crate::models::{PushToken, RegisterTokenRequest};
use crate::AppState;

/// POST /api/push/tokens - Register a device push token.
pub async fn register_push_token(
    State(state): State<AppState>,
    Json(request): Json<RegisterTokenRequest>,
) -> ApiResult<PushToken> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match crate::push::register_token(&state.repo, &request.token).await {
        Ok(token) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(token, new_revision)
        }
        Err(e) => {
            tracing::warn!("Failed to save push token: {}", e);
            error(e, revision_id)
        }
    }
}

/// GET /api/push/stream - Foreground push messages as `push` events.
pub async fn push_stream(State(state): State<AppState>) -> impl IntoResponse {
    let receiver = state.push.subscribe();

    let events = futures::stream::unfold(receiver, |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(message) => {
                    let event = Event::default().event("push").json_data(&message);
                    return Some((event, receiver));
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Push listener lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
