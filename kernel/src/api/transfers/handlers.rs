//! Handlers for copy requests.
//!
//! Copies run on a blocking worker. Progress is pushed to WebSocket
//! subscribers as the engine reports it.

use axum::extract::{Json, State};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::api::ApiError;
use crate::api::transfers::types::{CopyFilesRequest, CopyReport};
use crate::infrastructure::audit::{AuditEvent, log_audit};
use crate::state::AppState;
use crate::transfer::{CopyEngine, CopyOperation, CopySummary, TransferError};
use crate::ws::{BroadcastMessage, CopyCompleted, CopyProgress, CopyRequestId};

/// Picks the requested destination, else the configured default.
///
/// # Errors
///
/// Returns a validation error when neither is set.
pub(crate) fn resolve_destination(
    state: &AppState,
    requested: Option<PathBuf>,
) -> Result<PathBuf, ApiError> {
    requested
        .or_else(|| state.default_destination().map(Path::to_path_buf))
        .ok_or_else(|| {
            ApiError::ValidationError(
                "destination is required (no default destination configured)".to_string(),
            )
        })
}

/// Runs `job` on a blocking worker and reports the outcome.
///
/// `job` receives the engine, the destination and a progress sink that
/// publishes `copy_progress` frames.
pub(crate) async fn run_copy<F>(
    state: &AppState,
    destination: PathBuf,
    job: F,
) -> Result<CopyReport, ApiError>
where
    F: FnOnce(&CopyEngine, &Path, &mut dyn FnMut(usize, usize)) -> Result<Vec<CopyOperation>, TransferError>
        + Send
        + 'static,
{
    let request_id = CopyRequestId::generate();
    let engine = Arc::clone(state.engine());
    let broadcaster = state.broadcaster().clone();
    let worker_destination = destination.clone();

    let result = tokio::task::spawn_blocking(move || {
        let mut progress = |completed: usize, total: usize| {
            broadcaster.broadcast(BroadcastMessage::CopyProgress(CopyProgress {
                request_id,
                completed,
                total,
            }));
        };
        job(&engine, &worker_destination, &mut progress)
    })
    .await?;

    let destination_display = destination.display().to_string();
    let operations = match result {
        Ok(operations) => operations,
        Err(e) => {
            if let TransferError::PolicyViolation(ref reason) = e {
                log_audit(&AuditEvent::CopyDenied {
                    destination: destination_display,
                    reason: reason.to_string(),
                });
            }
            return Err(e.into());
        }
    };

    let summary = CopySummary::from_operations(&operations);
    info!(%request_id, destination = %destination_display, %summary, "Copy request finished");
    log_audit(&AuditEvent::CopyExecuted {
        destination: destination_display.clone(),
        succeeded: summary.succeeded,
        failed: summary.failed,
    });
    state
        .broadcaster()
        .broadcast(BroadcastMessage::CopyCompleted(CopyCompleted {
            request_id,
            destination: destination_display.clone(),
            summary,
        }));

    Ok(CopyReport {
        request_id,
        destination: destination_display,
        summary,
        message: summary.to_string(),
        operations,
    })
}

/// POST /api/v1/copy
///
/// Copies an explicit file selection.
pub async fn copy_files(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CopyFilesRequest>,
) -> Result<Json<CopyReport>, ApiError> {
    if req.files.is_empty() {
        return Err(ApiError::ValidationError("files must not be empty".to_string()));
    }
    let destination = resolve_destination(&state, req.destination)?;
    let CopyFilesRequest {
        files,
        sandbox_hint,
        preserve_structure,
        ..
    } = req;

    let report = run_copy(&state, destination, move |engine, destination, progress| {
        engine.copy_selected_with_progress(
            &files,
            destination,
            sandbox_hint.as_deref(),
            preserve_structure,
            progress,
        )
    })
    .await?;

    Ok(Json(report))
}
