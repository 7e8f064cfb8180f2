//! REST API routes for live sessions.

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::api::sessions::handlers::{
    copy_session, get_session, list_session_files, list_sessions, refresh_sessions,
};
use crate::state::AppState;

/// Session endpoints mounted at `/api/v1`.
///
/// `refresh` is a static segment, so it takes precedence over `{key}`.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/sessions", get(list_sessions))
        .route("/api/v1/sessions/refresh", post(refresh_sessions))
        .route("/api/v1/sessions/{key}", get(get_session))
        .route("/api/v1/sessions/{key}/files", get(list_session_files))
        .route("/api/v1/sessions/{key}/copy", post(copy_session))
}
