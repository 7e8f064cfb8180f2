//! Per-file copy engine.
//!
//! Files are copied one at a time and each outcome is recorded independently;
//! one failure never stops the rest. Contents are reflinked when the
//! filesystem supports it and copied otherwise, then permissions and mtime
//! are carried over.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

use super::filter::FileFilter;
use super::layout::{self, Placement};
use super::policy::DestinationPolicy;
use super::summary::CopySummary;
use super::types::{CopyOperation, TransferError};
use crate::discovery::scanner;
use crate::discovery::session::Session;

/// Message recorded when the copy call returned but no destination exists.
pub const VERIFICATION_FAILED: &str = "copy did not produce a destination file";

/// Copies session files into destination trees.
#[derive(Debug, Clone, Default)]
pub struct CopyEngine {
    policy: DestinationPolicy,
}

impl CopyEngine {
    /// Creates an engine that enforces `policy` on every destination root.
    #[must_use]
    pub fn new(policy: DestinationPolicy) -> Self {
        Self { policy }
    }

    /// Copies every file of `session` that passes `filter`, keeping the layout
    /// relative to the sandbox.
    ///
    /// # Errors
    ///
    /// Returns an error only if the destination root is denied by policy or
    /// cannot be created. Per-file failures are part of the returned list.
    pub fn copy_session(
        &self,
        session: &Session,
        destination_dir: &Path,
        filter: FileFilter,
    ) -> Result<Vec<CopyOperation>, TransferError> {
        self.copy_session_with_progress(session, destination_dir, filter, |_, _| {})
    }

    /// Like [`CopyEngine::copy_session`], calling `progress(completed, total)`
    /// after each file.
    ///
    /// # Errors
    ///
    /// See [`CopyEngine::copy_session`].
    #[instrument(skip(self, session, progress), fields(session = %session.key(), destination = %destination_dir.display()))]
    pub fn copy_session_with_progress<F>(
        &self,
        session: &Session,
        destination_dir: &Path,
        filter: FileFilter,
        mut progress: F,
    ) -> Result<Vec<CopyOperation>, TransferError>
    where
        F: FnMut(usize, usize),
    {
        self.prepare_destination(destination_dir)?;
        info!(?filter, "Starting session copy");

        let files: Vec<PathBuf> = scanner::session_files(&session.sandbox_path)
            .into_iter()
            .filter(|file| filter.matches(file))
            .collect();
        let total = files.len();

        let mut operations = Vec::with_capacity(total);
        for (index, source) in files.into_iter().enumerate() {
            let destination = match source.strip_prefix(&session.sandbox_path) {
                Ok(relative) => destination_dir.join(relative),
                Err(_) => destination_dir.join(source.file_name().unwrap_or_default()),
            };
            operations.push(copy_file(source, destination));
            progress(index + 1, total);
        }

        log_completion(&operations);
        Ok(operations)
    }

    /// Copies an explicit list of files.
    ///
    /// With `preserve_structure`, layout is kept relative to `sandbox_hint`
    /// when it exists, else relative to the files' common root. Without a
    /// usable root every file lands directly in `destination_dir`, and
    /// same-name files overwrite each other.
    ///
    /// # Errors
    ///
    /// Returns an error only if the destination root is denied by policy or
    /// cannot be created. Per-file failures are part of the returned list.
    pub fn copy_selected(
        &self,
        sources: &[PathBuf],
        destination_dir: &Path,
        sandbox_hint: Option<&Path>,
        preserve_structure: bool,
    ) -> Result<Vec<CopyOperation>, TransferError> {
        self.copy_selected_with_progress(
            sources,
            destination_dir,
            sandbox_hint,
            preserve_structure,
            |_, _| {},
        )
    }

    /// Like [`CopyEngine::copy_selected`], calling `progress(completed, total)`
    /// after each file.
    ///
    /// # Errors
    ///
    /// See [`CopyEngine::copy_selected`].
    #[instrument(skip(self, sources, progress), fields(files = sources.len(), destination = %destination_dir.display()))]
    pub fn copy_selected_with_progress<F>(
        &self,
        sources: &[PathBuf],
        destination_dir: &Path,
        sandbox_hint: Option<&Path>,
        preserve_structure: bool,
        mut progress: F,
    ) -> Result<Vec<CopyOperation>, TransferError>
    where
        F: FnMut(usize, usize),
    {
        self.prepare_destination(destination_dir)?;

        let resolved: Vec<PathBuf> = sources.iter().map(|p| layout::resolve_path(p)).collect();
        let base_root = layout::base_root(&resolved, sandbox_hint, preserve_structure);
        match (&base_root, preserve_structure) {
            (Some(root), _) => info!(base_root = %root.display(), "Preserving structure"),
            (None, true) => warn!("No sandbox hint or common root found, copying flat"),
            (None, false) => info!("Flat copy requested"),
        }

        let total = sources.len();
        let mut operations = Vec::with_capacity(total);
        for (index, (source, resolved)) in sources.iter().zip(&resolved).enumerate() {
            let (destination, placement) =
                layout::destination_for(resolved, base_root.as_deref(), destination_dir);
            if placement == Placement::OutsideRoot {
                warn!(
                    source = %source.display(),
                    destination = %destination.display(),
                    "File not within base root, using flat copy"
                );
            }

            let operation = if resolved.exists() {
                copy_file(source.clone(), destination)
            } else {
                let message = format!("source missing: {}", source.display());
                warn!(source = %source.display(), "Source file does not exist");
                record(CopyOperation::failed(source.clone(), destination, message))
            };
            operations.push(operation);
            progress(index + 1, total);
        }

        log_completion(&operations);
        Ok(operations)
    }

    fn prepare_destination(&self, destination_dir: &Path) -> Result<(), TransferError> {
        self.policy.validate(destination_dir)?;
        fs::create_dir_all(destination_dir).map_err(|source| TransferError::DestinationSetup {
            path: destination_dir.to_path_buf(),
            source,
        })
    }
}

/// Copies one file, creating parent directories, and verifies the result.
fn copy_file(source: PathBuf, destination: PathBuf) -> CopyOperation {
    if let Some(parent) = destination.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        let message = format!("create directory {}: {e}", parent.display());
        return record(CopyOperation::failed(source, destination, message));
    }

    if let Err(e) = copy_with_metadata(&source, &destination) {
        let message = format!("copy {}: {e}", source.display());
        return record(CopyOperation::failed(source, destination, message));
    }

    let operation = match fs::metadata(&destination) {
        Ok(meta) => {
            debug!(source = %source.display(), destination = %destination.display(), "Copied");
            CopyOperation::succeeded(source, destination, meta.len())
        }
        Err(_) => CopyOperation::failed(source, destination, VERIFICATION_FAILED),
    };
    record(operation)
}

/// Reflinks or copies `source` over `destination`, then restores permissions and mtime.
fn copy_with_metadata(source: &Path, destination: &Path) -> io::Result<()> {
    let metadata = fs::metadata(source)?;
    make_writable(destination);

    match reflink::reflink(source, destination) {
        Ok(()) => debug!(source = %source.display(), "Reflinked"),
        Err(e) => {
            debug!(error = %e, source = %source.display(), "Reflink failed, falling back to copy");
            fs::copy(source, destination)?;
        }
    }

    if let Ok(modified) = metadata.modified()
        && let Err(e) = fs::File::open(destination).and_then(|file| file.set_modified(modified))
    {
        debug!(error = %e, destination = %destination.display(), "Could not preserve mtime");
    }
    fs::set_permissions(destination, metadata.permissions())
}

/// Clears the read-only bit of an earlier copy so it can be overwritten.
fn make_writable(destination: &Path) {
    let Ok(existing) = fs::metadata(destination) else {
        return;
    };
    let mut permissions = existing.permissions();
    if !permissions.readonly() {
        return;
    }
    #[allow(clippy::permissions_set_readonly_false)]
    permissions.set_readonly(false);
    if let Err(e) = fs::set_permissions(destination, permissions) {
        debug!(error = %e, destination = %destination.display(), "Could not clear read-only bit");
    }
}

fn record(operation: CopyOperation) -> CopyOperation {
    if operation.success {
        metrics::counter!("harvest_copy_files_total", "outcome" => "success").increment(1);
        metrics::counter!("harvest_copy_bytes_total").increment(operation.file_size);
    } else {
        tracing::error!(
            source = %operation.source_path.display(),
            error = operation.error_message.as_deref().unwrap_or_default(),
            "Failed to copy"
        );
        metrics::counter!("harvest_copy_files_total", "outcome" => "failure").increment(1);
    }
    operation
}

fn log_completion(operations: &[CopyOperation]) {
    let summary = CopySummary::from_operations(operations);
    info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        bytes = summary.bytes_copied,
        "Copy operation completed"
    );
}
