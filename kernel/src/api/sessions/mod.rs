//! REST API endpoints for live sessions.
//!
//! Sessions are read from the registry the monitor maintains; they are never
//! created or deleted through the API.

pub mod handlers;
pub mod routes;
pub mod types;

pub use routes::routes;
pub use types::{
    CopySessionRequest, FilesQuery, FilesResponse, ListSessionsResponse, RefreshResponse,
    SessionResponse,
};
