use crate::api;
use crate::infrastructure::config::{BindAddress, Settings};
use crate::state::AppState;
use crate::ws::handler::ws_router;
use axum::{Router, routing::get};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;

async fn health_check() -> &'static str {
    "OK"
}

/// Installs the global Prometheus recorder.
///
/// # Errors
///
/// Returns an error if a recorder is already installed.
pub fn install_metrics() -> anyhow::Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {e}"))
}

/// Builds the full control-plane router: health, metrics, REST and `/ws`.
///
/// Without a metrics handle `/metrics` is not mounted.
pub fn router(state: Arc<AppState>, metrics: Option<PrometheusHandle>) -> Router {
    let mut control_plane = Router::new()
        .route("/health/live", get(health_check))
        .route("/health/ready", get(health_check));

    if let Some(handle) = metrics {
        control_plane = control_plane.route("/metrics", get(move || std::future::ready(handle.render())));
    }

    control_plane
        .merge(api::routes().with_state(Arc::clone(&state)))
        .merge(ws_router(state))
}

/// Runs the control plane HTTP server with WebSocket support until `shutdown`
/// resolves.
///
/// # Errors
///
/// Returns an error if the server fails to start or encounters an error while running.
pub async fn run_server<S>(
    config: &Settings,
    state: Arc<AppState>,
    metrics: PrometheusHandle,
    shutdown: S,
) -> anyhow::Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let app = router(state, Some(metrics));
    let addr = BindAddress::from(&config.server).to_socket_addr()?;

    tracing::info!("Control Plane listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
