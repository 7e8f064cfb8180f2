//! Destination layout for copied files.
//!
//! Structure is preserved relative to a base root: the session's sandbox when
//! known, otherwise the deepest directory shared by every selected file.

use std::path::{Component, Path, PathBuf};

/// How a destination path was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Relative layout under the base root was kept.
    Preserved,
    /// No base root; file name only.
    Flat,
    /// A base root exists but the file is not below it; file name only.
    OutsideRoot,
}

/// Absolute, symlink-resolved form of `path`, best effort.
///
/// Paths that cannot be canonicalized (usually because they no longer exist)
/// are made absolute against the working directory instead.
#[must_use]
pub fn resolve_path(path: &Path) -> PathBuf {
    dunce::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Deepest directory containing every path in `files`.
///
/// A single file yields its parent. Several files yield the longest shared
/// run of leading directory components; sharing nothing but the filesystem
/// root counts as no common root.
#[must_use]
pub fn common_root(files: &[PathBuf]) -> Option<PathBuf> {
    let (first, rest) = files.split_first()?;
    if rest.is_empty() {
        return first.parent().map(Path::to_path_buf);
    }

    let parents: Vec<Vec<Component<'_>>> = files
        .iter()
        .map(|file| file.parent().unwrap_or(file).components().collect())
        .collect();

    let shared: Vec<Component<'_>> = parents[0]
        .iter()
        .enumerate()
        .take_while(|(i, component)| {
            parents[1..]
                .iter()
                .all(|other| other.get(*i) == Some(*component))
        })
        .map(|(_, component)| *component)
        .collect();

    if !shared.iter().any(|c| matches!(c, Component::Normal(_))) {
        return None;
    }
    Some(shared.into_iter().collect())
}

/// Chooses the base root for a selected-files copy.
///
/// `resolved_sources` must already be passed through [`resolve_path`].
#[must_use]
pub fn base_root(
    resolved_sources: &[PathBuf],
    sandbox_hint: Option<&Path>,
    preserve_structure: bool,
) -> Option<PathBuf> {
    if !preserve_structure {
        return None;
    }
    match sandbox_hint {
        Some(hint) if hint.exists() => Some(resolve_path(hint)),
        _ => common_root(resolved_sources),
    }
}

/// Destination of `source` inside `destination_dir`.
#[must_use]
pub fn destination_for(
    source: &Path,
    base_root: Option<&Path>,
    destination_dir: &Path,
) -> (PathBuf, Placement) {
    let flat = || destination_dir.join(source.file_name().unwrap_or_default());

    let Some(root) = base_root else {
        return (flat(), Placement::Flat);
    };
    match source.strip_prefix(root) {
        Ok(relative) if !relative.as_os_str().is_empty() => {
            (destination_dir.join(relative), Placement::Preserved)
        }
        _ => (flat(), Placement::OutsideRoot),
    }
}
