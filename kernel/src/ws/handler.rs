//! WebSocket upgrade handler.

use axum::{
    extract::{State, ws::WebSocketUpgrade},
    response::Response,
};
use std::sync::Arc;
use tracing::info;

use crate::state::AppState;
use crate::ws::connection::Connection;

/// Handles WebSocket upgrade requests.
///
/// The subscription is taken before the upgrade completes, so no event
/// published after the handshake is missed.
pub async fn handle_ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    info!("WebSocket upgrade requested");
    let receiver = state.broadcaster().subscribe();
    ws.on_upgrade(move |socket| async move {
        let connection = Connection::new(socket, receiver);
        if let Err(e) = connection.run().await {
            tracing::error!(error = %e, "WebSocket connection error");
        }
    })
}

/// Creates a router with WebSocket handling at `/ws`.
pub fn ws_router(state: Arc<AppState>) -> axum::Router {
    axum::Router::new()
        .route("/ws", axum::routing::get(handle_ws_upgrade))
        .with_state(state)
}
