//! API Handler implementations for session queries and session copies.

use axum::extract::{Json, Path, Query, State};
use std::sync::Arc;

use crate::api::ApiError;
use crate::api::sessions::types::{
    CopySessionRequest, FilesQuery, FilesResponse, ListSessionsResponse, RefreshResponse,
    SessionResponse,
};
use crate::api::transfers::handlers::{resolve_destination, run_copy};
use crate::api::transfers::types::CopyReport;
use crate::discovery::{Session, scanner};
use crate::state::AppState;
use crate::transfer::summary::{format_size, group_by_extension, total_size};

fn find_session(state: &AppState, key: &str) -> Result<Session, ApiError> {
    state
        .registry()
        .find_by_composite(key)
        .ok_or_else(|| ApiError::SessionNotFound(key.to_string()))
}

/// GET /api/v1/sessions
///
/// Lists every live session.
pub async fn list_sessions(State(state): State<Arc<AppState>>) -> Json<ListSessionsResponse> {
    let sessions: Vec<SessionResponse> = state
        .registry()
        .snapshot()
        .iter()
        .map(SessionResponse::from)
        .collect();

    Json(ListSessionsResponse {
        count: sessions.len(),
        sessions,
    })
}

/// GET /api/v1/sessions/{key}
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = find_session(&state, &key)?;
    Ok(Json(SessionResponse::from(&session)))
}

/// POST /api/v1/sessions/refresh
///
/// Runs a scan cycle now and returns the events it produced.
pub async fn refresh_sessions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let monitor = Arc::clone(state.monitor());
    let events = tokio::task::spawn_blocking(move || monitor.refresh()).await?;

    Ok(Json(RefreshResponse {
        events,
        session_count: state.registry().len(),
    }))
}

/// GET /api/v1/sessions/{key}/files
///
/// Lists the sandbox files, optionally only those modified after `since`.
pub async fn list_session_files(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Query(query): Query<FilesQuery>,
) -> Result<Json<FilesResponse>, ApiError> {
    let session = find_session(&state, &key)?;

    let (files, size) = tokio::task::spawn_blocking(move || {
        let files = match query.since {
            Some(since) => scanner::modified_since(&session.sandbox_path, since),
            None => scanner::session_files(&session.sandbox_path),
        };
        let size = total_size(&files);
        (files, size)
    })
    .await?;

    let by_extension = group_by_extension(&files)
        .into_iter()
        .map(|(extension, group)| (extension, group.len()))
        .collect();

    Ok(Json(FilesResponse {
        key,
        files: files.iter().map(|f| f.display().to_string()).collect(),
        total_size: size,
        total_size_display: format_size(size),
        by_extension,
    }))
}

/// POST /api/v1/sessions/{key}/copy
///
/// Copies the session's sandbox, keeping its layout.
pub async fn copy_session(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(req): Json<CopySessionRequest>,
) -> Result<Json<CopyReport>, ApiError> {
    let session = find_session(&state, &key)?;
    let destination = resolve_destination(&state, req.destination)?;
    let filter = req.filter;

    let report = run_copy(&state, destination, move |engine, destination, progress| {
        engine.copy_session_with_progress(&session, destination, filter, progress)
    })
    .await?;

    Ok(Json(report))
}
