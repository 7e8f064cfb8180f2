//! Harvest kernel binary: scan loop plus control plane.

use anyhow::Context;
use harvest_kernel::discovery::{SessionRegistry, SessionScanner, resolve};
use harvest_kernel::infrastructure::{audit, config::Settings, server, telemetry::TelemetryBuilder};
use harvest_kernel::monitor::SessionMonitor;
use harvest_kernel::state::AppState;
use harvest_kernel::transfer::{CopyEngine, DestinationPolicy};
use harvest_kernel::ws::{BroadcastMessage, Broadcaster};
use std::sync::Arc;
use tokio::signal;
use tokio::sync::oneshot;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Settings::new().expect("Failed to load configuration");

    TelemetryBuilder::from_settings(&config.telemetry, env!("CARGO_PKG_VERSION"))
        .init()
        .expect("Failed to initialize telemetry");
    let metrics = server::install_metrics()?;

    info!("Harvest Kernel Starting...");
    audit::log_audit(&audit::AuditEvent::SystemStartup {
        component: "Kernel".into(),
    });

    let monitor_config = &config.monitor;
    let Some(root) = resolve::resolve_root(
        monitor_config.root.as_deref(),
        monitor_config.project_file.as_deref(),
        monitor_config.engine_dir.as_deref(),
    ) else {
        error!(
            project_file = ?monitor_config.project_file,
            engine_dir = ?monitor_config.engine_dir,
            "No multi-user root found; set HARVEST__MONITOR__ROOT"
        );
        anyhow::bail!("no monitored root could be resolved");
    };

    let policy = DestinationPolicy::new(&config.transfer)
        .context("Invalid transfer.allowed_destinations")?;
    let default_destination = config.transfer.default_destination.clone().or_else(|| {
        monitor_config
            .project_file
            .as_deref()
            .map(resolve::project_content_dir)
    });

    let broadcaster = Broadcaster::new();
    let monitor = Arc::new(SessionMonitor::new(
        root,
        SessionScanner::new(monitor_config.scan_limits()),
        Arc::new(SessionRegistry::new()),
        broadcaster.clone(),
        monitor_config.poll_interval(),
    ));
    let state = Arc::new(AppState::new(
        Arc::clone(&monitor),
        CopyEngine::new(policy),
        broadcaster.clone(),
        default_destination,
    ));

    let monitor_task = tokio::spawn(Arc::clone(&monitor).run());

    let (stop_server, server_stopped) = oneshot::channel::<()>();
    let server_config = config.clone();
    let server_task = tokio::spawn(async move {
        let shutdown = async move {
            let _ = server_stopped.await;
        };
        if let Err(e) = server::run_server(&server_config, state, metrics, shutdown).await {
            error!("Control Plane failed: {:?}", e);
        }
    });

    info!("Harvest Kernel Initialized. Waiting for shutdown signal...");

    shutdown_signal().await;

    info!("Shutdown signal received, cleaning up...");
    audit::log_audit(&audit::AuditEvent::SystemShutdown {
        reason: "Signal received".into(),
    });

    monitor.stop();
    let notified = broadcaster.broadcast(BroadcastMessage::Shutdown);
    info!(clients = notified, "Shutdown broadcast sent");
    let _ = stop_server.send(());

    if let Err(e) = monitor_task.await {
        error!(error = %e, "Monitor task failed");
    }
    if let Err(e) = server_task.await {
        error!(error = %e, "Server task failed");
    }

    info!("Harvest Kernel Shutdown Complete.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
