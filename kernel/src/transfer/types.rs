//! Result and error types for copy operations.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

use super::policy::PolicyError;

/// Failure of a whole copy call, before any file is processed.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The destination root could not be created or accessed.
    #[error("Cannot prepare destination '{path}': {source}")]
    DestinationSetup {
        /// Destination root.
        path: PathBuf,
        /// Source error.
        #[source]
        source: std::io::Error,
    },
    /// The destination is outside the allowed roots.
    #[error(transparent)]
    PolicyViolation(#[from] PolicyError),
}

/// Outcome of copying exactly one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopyOperation {
    /// File that was copied.
    pub source_path: PathBuf,
    /// Where it was (or would have been) copied to.
    pub destination_path: PathBuf,
    /// Whether the copy succeeded.
    pub success: bool,
    /// Failure description, only set when `success` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Bytes copied, zero on failure.
    pub file_size: u64,
}

impl CopyOperation {
    pub(crate) fn succeeded(source_path: PathBuf, destination_path: PathBuf, file_size: u64) -> Self {
        Self {
            source_path,
            destination_path,
            success: true,
            error_message: None,
            file_size,
        }
    }

    pub(crate) fn failed(
        source_path: PathBuf,
        destination_path: PathBuf,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            source_path,
            destination_path,
            success: false,
            error_message: Some(error_message.into()),
            file_size: 0,
        }
    }
}

impl std::fmt::Display for CopyOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Copy {} -> {} ({})",
            self.source_path.display(),
            self.destination_path.display(),
            if self.success { "Success" } else { "Failed" }
        )
    }
}
