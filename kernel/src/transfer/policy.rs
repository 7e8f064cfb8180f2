//! Destination policy for copy operations.
//!
//! Restricts where copies may write. Destinations are checked before they are
//! created, so the nearest existing ancestor is canonicalized and the
//! not-yet-existing remainder is appended verbatim.

use crate::infrastructure::config::TransferSettings;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Destination policy failures.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// No ancestor of the destination could be canonicalized.
    #[error("Invalid destination '{path}': {source}")]
    InvalidPath {
        /// Destination that was checked.
        path: PathBuf,
        /// Source error.
        #[source]
        source: std::io::Error,
    },
    /// The not-yet-existing part of the destination climbs with `..`.
    #[error("Destination '{path}' contains parent traversal below its existing ancestor")]
    Traversal {
        /// Destination that was checked.
        path: PathBuf,
    },
    /// The destination is outside every allowed root.
    #[error("Security Violation: Destination '{target:?}' is outside the allowed destination roots.")]
    SecurityViolation {
        /// Canonical form of the destination.
        target: PathBuf,
    },
    /// An allowed root from the configuration could not be canonicalized.
    #[error("Invalid allowed destination configuration '{path}': {source}")]
    InvalidConfig {
        /// Configured path.
        path: PathBuf,
        /// Source error.
        #[source]
        source: std::io::Error,
    },
}

/// Allow-list of destination roots. Empty means unrestricted.
#[derive(Debug, Clone, Default)]
pub struct DestinationPolicy {
    allowed_roots: Vec<PathBuf>,
}

impl DestinationPolicy {
    /// Builds the policy from transfer settings.
    ///
    /// # Errors
    ///
    /// Returns an error if any configured root cannot be canonicalized.
    pub fn new(settings: &TransferSettings) -> Result<Self, PolicyError> {
        let allowed_roots = settings
            .allowed_destinations
            .iter()
            .map(PathBuf::from)
            .map(|path| {
                dunce::canonicalize(&path).map_err(|source| PolicyError::InvalidConfig { path, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { allowed_roots })
    }

    /// A policy that allows every destination.
    #[must_use]
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// Checks that `destination` lies inside an allowed root.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination cannot be resolved, climbs out of
    /// its existing ancestor, or falls outside every allowed root.
    pub fn validate(&self, destination: &Path) -> Result<PathBuf, PolicyError> {
        let resolved = resolve_pending(destination)?;
        if self.allowed_roots.is_empty()
            || self.allowed_roots.iter().any(|root| resolved.starts_with(root))
        {
            return Ok(resolved);
        }
        Err(PolicyError::SecurityViolation { target: resolved })
    }
}

/// Canonical form of a path that may not exist yet.
fn resolve_pending(destination: &Path) -> Result<PathBuf, PolicyError> {
    let absolute = std::path::absolute(destination).map_err(|source| PolicyError::InvalidPath {
        path: destination.to_path_buf(),
        source,
    })?;

    let mut existing = absolute.as_path();
    let mut pending = Vec::new();
    while !existing.exists() {
        let Some(parent) = existing.parent() else {
            break;
        };
        match existing.components().next_back() {
            Some(Component::Normal(name)) => pending.push(name.to_os_string()),
            Some(Component::ParentDir) => {
                return Err(PolicyError::Traversal {
                    path: destination.to_path_buf(),
                });
            }
            _ => {}
        }
        existing = parent;
    }

    let mut resolved = dunce::canonicalize(existing).map_err(|source| PolicyError::InvalidPath {
        path: destination.to_path_buf(),
        source,
    })?;
    resolved.extend(pending.iter().rev());
    Ok(resolved)
}
