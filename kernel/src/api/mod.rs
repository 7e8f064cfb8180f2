//! REST API for the harvest kernel.
//!
//! This module provides HTTP endpoints for listing live sessions, forcing a
//! rescan, listing sandbox files and copying them out.

pub mod error;
pub mod sessions;
pub mod transfers;

pub use error::ApiError;
pub use sessions::routes as session_routes;
pub use transfers::routes as transfer_routes;

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// Every REST route, ready for state.
pub fn routes() -> Router<Arc<AppState>> {
    session_routes().merge(transfer_routes())
}
