//! Bounded scan of the monitored root.
//!
//! A scan never fails: unreadable directories and unstatable files are
//! logged and skipped, so the caller always gets a (possibly partial)
//! snapshot. Aggregation inside a sandbox walks an explicit worklist bounded
//! by [`ScanLimits`].

use chrono::{DateTime, Utc};
use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime};
use tracing::{debug, instrument, warn};
use walkdir::{DirEntry, WalkDir};

use super::session::{Session, SessionMap};
use super::validator;

/// Default number of directory levels aggregated below a sandbox root.
pub const DEFAULT_MAX_DEPTH: usize = 5;
/// Default number of entries read from a single directory.
pub const DEFAULT_MAX_ENTRIES_PER_DIR: usize = 1000;

/// Caps applied to the per-sandbox aggregation walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanLimits {
    /// Directories at this depth or deeper are not listed (the sandbox root is depth 0).
    pub max_depth: usize,
    /// Entries read from one directory before the rest are skipped.
    pub max_entries_per_dir: usize,
}

impl Default for ScanLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_entries_per_dir: DEFAULT_MAX_ENTRIES_PER_DIR,
        }
    }
}

/// Aggregated statistics for one sandbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SandboxStats {
    /// Newest mtime seen, starting from the sandbox directory's own mtime.
    pub last_modified: SystemTime,
    /// Files counted.
    pub file_count: u64,
    /// Bytes of the counted files.
    pub total_size: u64,
    /// Directories whose listing stopped at the entry cap.
    pub truncated_dirs: usize,
    /// Directories left unlisted because of the depth cap.
    pub depth_pruned_dirs: usize,
}

impl SandboxStats {
    fn starting_at(last_modified: SystemTime) -> Self {
        Self {
            last_modified,
            file_count: 0,
            total_size: 0,
            truncated_dirs: 0,
            depth_pruned_dirs: 0,
        }
    }

    fn record_file(&mut self, metadata: &Metadata) {
        self.file_count += 1;
        self.total_size += metadata.len();
        if let Ok(modified) = metadata.modified()
            && modified > self.last_modified
        {
            self.last_modified = modified;
        }
    }

    /// Returns `true` if any part of the sandbox was left out by a cap.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.truncated_dirs > 0 || self.depth_pruned_dirs > 0
    }
}

/// Walks the monitored root and snapshots every valid sandbox.
#[derive(Debug, Clone, Default)]
pub struct SessionScanner {
    limits: ScanLimits,
}

impl SessionScanner {
    /// Creates a scanner with the given limits.
    #[must_use]
    pub fn new(limits: ScanLimits) -> Self {
        Self { limits }
    }

    /// The limits used by this scanner.
    #[must_use]
    pub fn limits(&self) -> ScanLimits {
        self.limits
    }

    /// Scans `root` and returns every observable session.
    ///
    /// A missing root yields an empty map.
    #[instrument(skip(self), fields(root = %root.display()))]
    pub fn scan(&self, root: &Path) -> SessionMap {
        let started = Instant::now();
        let mut sessions = SessionMap::new();

        for (session_id, session_dir) in identifier_dirs(root) {
            for (user_id, user_dir) in identifier_dirs(&session_dir) {
                if !validator::is_sandbox_root(&user_dir) {
                    continue;
                }

                let sandbox_path = validator::sandbox_path(&user_dir);
                let stats = self.aggregate(&sandbox_path);
                let session = Session {
                    session_id: session_id.clone(),
                    user_id,
                    sandbox_path,
                    last_modified: DateTime::<Utc>::from(stats.last_modified),
                    file_count: stats.file_count,
                    total_size: stats.total_size,
                };
                debug!(
                    session = %session.key(),
                    files = session.file_count,
                    bytes = session.total_size,
                    "Session scanned"
                );
                sessions.insert(session.key(), session);
            }
        }

        debug!(
            sessions = sessions.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "Scan complete"
        );
        sessions
    }

    /// Aggregates file statistics below `sandbox` within the scan limits.
    pub fn aggregate(&self, sandbox: &Path) -> SandboxStats {
        let baseline = fs::metadata(sandbox)
            .and_then(|meta| meta.modified())
            .unwrap_or_else(|_| SystemTime::now());
        let mut stats = SandboxStats::starting_at(baseline);
        let mut pending = vec![(sandbox.to_path_buf(), 0_usize)];

        while let Some((dir, depth)) = pending.pop() {
            if depth >= self.limits.max_depth {
                stats.depth_pruned_dirs += 1;
                continue;
            }

            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) => {
                    debug!(dir = %dir.display(), error = %e, "Cannot access directory");
                    continue;
                }
            };

            let mut read = 0_usize;
            for entry in entries {
                if read == self.limits.max_entries_per_dir {
                    warn!(
                        dir = %dir.display(),
                        cap = self.limits.max_entries_per_dir,
                        "Too many entries, limiting scan"
                    );
                    stats.truncated_dirs += 1;
                    break;
                }
                read += 1;

                let Ok(entry) = entry else { continue };
                let Ok(file_type) = entry.file_type() else {
                    continue;
                };

                if file_type.is_dir() {
                    pending.push((entry.path(), depth + 1));
                    continue;
                }

                // Links are followed; the depth cap bounds cycles.
                let metadata = if file_type.is_symlink() {
                    fs::metadata(entry.path())
                } else {
                    entry.metadata()
                };
                match metadata {
                    Ok(metadata) if metadata.is_dir() => pending.push((entry.path(), depth + 1)),
                    Ok(metadata) if metadata.is_file() => stats.record_file(&metadata),
                    Ok(_) => {}
                    Err(e) => {
                        debug!(path = %entry.path().display(), error = %e, "Skipping dangling entry");
                    }
                }
            }
        }

        if stats.depth_pruned_dirs > 0 {
            warn!(
                sandbox = %sandbox.display(),
                max_depth = self.limits.max_depth,
                pruned = stats.depth_pruned_dirs,
                "Depth limit reached, deeper entries excluded from session stats"
            );
        }

        stats
    }
}

/// Immediate child directories of `dir` whose names are valid identifiers.
fn identifier_dirs(dir: &Path) -> Vec<(String, PathBuf)> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "Cannot list directory");
            return Vec::new();
        }
    };

    entries
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!(dir = %dir.display(), error = %e, "Skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| {
            let name = entry.file_name().into_string().ok()?;
            validator::is_valid_identifier(&name).then(|| (name, entry.path()))
        })
        .collect()
}

fn walk_files(root: &Path) -> impl Iterator<Item = DirEntry> + '_ {
    WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(move |entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(root = %root.display(), error = %e, "Error walking sandbox");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
}

/// Every file below `sandbox`, without depth or entry caps.
#[must_use]
pub fn session_files(sandbox: &Path) -> Vec<PathBuf> {
    walk_files(sandbox).map(DirEntry::into_path).collect()
}

/// Files below `sandbox` whose mtime is strictly newer than `since`.
#[must_use]
pub fn modified_since(sandbox: &Path, since: DateTime<Utc>) -> Vec<PathBuf> {
    let since = SystemTime::from(since);
    walk_files(sandbox)
        .filter(|entry| {
            fs::metadata(entry.path())
                .and_then(|meta| meta.modified())
                .is_ok_and(|modified| modified > since)
        })
        .map(DirEntry::into_path)
        .collect()
}
