//! Per-client preferences and the unread notice badge.

use std::pin::Pin;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use futures::{stream, Stream, StreamExt};

use super::notices::notice_board;
use super::{error, snapshot_events, success, validate_client_id, ApiResult};
use crate::db::{now_millis, Repository};
use crate::models::{
    ClientSettings, Collection, Document, NoticeDrawer, Snapshot, UnreadBadge, UpdateThemeRequest,
    LAST_NOTICE_READ_KEY, THEME_KEY,
};
use crate::views::{cleared_badge, latest, unread_badge};
use crate::AppState;

/// Notices listed in the drawer.
pub const DRAWER_NOTICE_COUNT: usize = 15;

/// GET /api/clients/:client_id/settings - Stored preferences.
pub async fn get_client_settings(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> ApiResult<ClientSettings> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    if let Err(e) = validate_client_id(&client_id) {
        return error(e, revision_id);
    }

    match state.repo.client_settings(&client_id).await {
        Ok(settings) => success(settings, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/clients/:client_id/settings/theme - Switch between light and dark.
pub async fn update_theme(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    Json(request): Json<UpdateThemeRequest>,
) -> ApiResult<ClientSettings> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    if let Err(e) = validate_client_id(&client_id) {
        return error(e, revision_id);
    }

    if let Err(e) = state
        .repo
        .set_setting(&client_id, THEME_KEY, request.theme.as_str())
        .await
    {
        return error(e, revision_id);
    }

    match state.repo.client_settings(&client_id).await {
        Ok(settings) => success(settings, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/clients/:client_id/notices/unread - Current unread badge.
pub async fn get_unread_badge(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> ApiResult<UnreadBadge> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    if let Err(e) = validate_client_id(&client_id) {
        return error(e, revision_id);
    }

    let last_read_at = match state.repo.last_notice_read_at(&client_id).await {
        Ok(at) => at,
        Err(e) => return error(e, revision_id),
    };

    match state.repo.snapshot(Collection::Notices).await {
        Ok(snapshot) => success(
            unread_badge(&notice_board(&snapshot.documents), last_read_at),
            snapshot.revision_id,
        ),
        Err(e) => error(e, revision_id),
    }
}

/// What can change a client's badge.
enum BadgeWake {
    Notices(Snapshot<Document>),
    MarkedRead,
}

/// Recomputes one client's badge whenever notices change or the drawer is opened.
struct BadgeWatch {
    wakes: Pin<Box<dyn Stream<Item = BadgeWake> + Send>>,
    repo: Arc<Repository>,
    client_id: String,
    notices: Option<Snapshot<Document>>,
}

impl BadgeWatch {
    fn new(repo: Arc<Repository>, client_id: String) -> Self {
        let notices = repo
            .subscribe(Collection::Notices)
            .into_stream()
            .map(BadgeWake::Notices);
        let reads = repo
            .watch_setting(&client_id, LAST_NOTICE_READ_KEY)
            .map(|()| BadgeWake::MarkedRead);

        Self {
            wakes: Box::pin(stream::select(notices, reads)),
            repo,
            client_id,
            notices: None,
        }
    }

    async fn next_badge(&mut self) -> Option<(i64, UnreadBadge)> {
        loop {
            match self.wakes.next().await? {
                BadgeWake::Notices(snapshot) => self.notices = Some(snapshot),
                BadgeWake::MarkedRead => {}
            }
            // Nothing to count against until the first snapshot lands.
            let Some(snapshot) = &self.notices else {
                continue;
            };

            let last_read_at = self
                .repo
                .last_notice_read_at(&self.client_id)
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!(
                        client_id = %self.client_id,
                        "Failed to read last notice time: {}",
                        e
                    );
                    0
                });
            return Some((
                snapshot.revision_id,
                unread_badge(&notice_board(&snapshot.documents), last_read_at),
            ));
        }
    }
}

/// GET /api/clients/:client_id/notices/unread/live - Badge recomputed on every
/// notice change and whenever this client opens the drawer.
pub async fn live_unread_badge(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> Response {
    if let Err(e) = validate_client_id(&client_id) {
        return e.at_revision(0).into_response();
    }

    let watch = BadgeWatch::new(state.repo.clone(), client_id);
    let views = stream::unfold(watch, |mut watch| async move {
        watch.next_badge().await.map(|view| (view, watch))
    });

    snapshot_events(views).into_response()
}

/// POST /api/clients/:client_id/notices/open - Open the notice drawer.
///
/// Marks everything as read and returns a zero badge whether or not the new
/// read time could be persisted.
pub async fn open_notice_drawer(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> ApiResult<NoticeDrawer> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    if let Err(e) = validate_client_id(&client_id) {
        return error(e, revision_id);
    }

    let now = now_millis();
    if let Err(e) = state.repo.set_last_notice_read_at(&client_id, now).await {
        tracing::error!(%client_id, "Failed to persist notice read time: {}", e);
    }

    match state.repo.snapshot(Collection::Notices).await {
        Ok(snapshot) => success(
            NoticeDrawer {
                notices: latest(notice_board(&snapshot.documents), DRAWER_NOTICE_COUNT),
                badge: cleared_badge(),
                last_read_at: now,
            },
            snapshot.revision_id,
        ),
        Err(e) => error(e, revision_id),
    }
}
