//! Report helpers for copy results and file selections.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::types::CopyOperation;

/// Group label for files without an extension.
pub const NO_EXTENSION: &str = "No Extension";

/// Aggregate view of one copy call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CopySummary {
    /// Files attempted.
    pub total: usize,
    /// Files copied.
    pub succeeded: usize,
    /// Files that failed.
    pub failed: usize,
    /// Bytes copied by the successful files.
    pub bytes_copied: u64,
}

impl CopySummary {
    /// Summarizes a list of per-file results.
    #[must_use]
    pub fn from_operations(operations: &[CopyOperation]) -> Self {
        operations.iter().fold(
            Self {
                total: operations.len(),
                ..Self::default()
            },
            |mut summary, op| {
                if op.success {
                    summary.succeeded += 1;
                    summary.bytes_copied += op.file_size;
                } else {
                    summary.failed += 1;
                }
                summary
            },
        )
    }
}

impl std::fmt::Display for CopySummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} succeeded, {} failed ({})",
            self.succeeded,
            self.failed,
            format_size(self.bytes_copied)
        )
    }
}

/// Groups paths by lower-cased extension (with its leading dot).
#[must_use]
pub fn group_by_extension(paths: &[PathBuf]) -> BTreeMap<String, Vec<PathBuf>> {
    let mut groups: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    for path in paths {
        let key = path
            .extension()
            .map_or_else(
                || NO_EXTENSION.to_string(),
                |ext| format!(".{}", ext.to_string_lossy().to_lowercase()),
            );
        groups.entry(key).or_default().push(path.clone());
    }
    groups
}

/// Sum of the sizes of `paths`; unreadable files count as zero.
#[must_use]
pub fn total_size<P: AsRef<Path>>(paths: &[P]) -> u64 {
    paths
        .iter()
        .filter_map(|path| std::fs::metadata(path).ok())
        .map(|meta| meta.len())
        .sum()
}

/// Human-readable size with one decimal, in 1024 steps.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
