//! REST API routes for copy requests.

use axum::{Router, routing::post};
use std::sync::Arc;

use crate::api::transfers::handlers::copy_files;
use crate::state::AppState;

/// Copy endpoints mounted at `/api/v1`.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/v1/copy", post(copy_files))
}
