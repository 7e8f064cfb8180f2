//! Resolution of the monitored root from project and engine locations.
//!
//! Multi-user servers keep their intermediate session data either next to the
//! project or inside the engine's standalone server program. When both exist,
//! the one actually holding sessions wins.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::validator;

/// Project-relative location of the multi-user intermediate directory.
const PROJECT_MULTIUSER: [&str; 3] = ["Intermediate", "Concert", "MultiUser"];
/// Engine-relative location of the standalone server's intermediate directory.
const ENGINE_MULTIUSER: [&str; 4] = [
    "Programs",
    "UnrealMultiUserSlateServer",
    "Intermediate",
    "MultiUser",
];

fn join_all(base: &Path, parts: &[&str]) -> PathBuf {
    parts.iter().fold(base.to_path_buf(), |path, part| path.join(part))
}

fn project_dir(project_file: &Path) -> PathBuf {
    project_file
        .parent()
        .map_or_else(PathBuf::new, Path::to_path_buf)
}

/// Existing candidate roots, project location first.
#[must_use]
pub fn candidate_roots(project_file: Option<&Path>, engine_dir: Option<&Path>) -> Vec<PathBuf> {
    let project = project_file.map(|file| join_all(&project_dir(file), &PROJECT_MULTIUSER));
    let engine = engine_dir.map(|dir| join_all(dir, &ENGINE_MULTIUSER));

    project
        .into_iter()
        .chain(engine)
        .filter(|path| path.is_dir())
        .collect()
}

/// Returns `true` if `root` holds at least one valid session sandbox.
#[must_use]
pub fn has_active_sessions(root: &Path) -> bool {
    let Ok(sessions) = fs::read_dir(root) else {
        return false;
    };

    sessions
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_dir())
        .filter(|entry| entry.file_name().to_str().is_some_and(validator::is_valid_identifier))
        .any(|session| {
            fs::read_dir(session.path()).is_ok_and(|users| {
                users.filter_map(Result::ok).any(|user| {
                    user.file_name().to_str().is_some_and(validator::is_valid_identifier)
                        && validator::is_sandbox_root(&user.path())
                })
            })
        })
}

/// Picks the directory to monitor.
///
/// An explicit root is used as-is. Otherwise the first candidate holding
/// sessions is chosen, then the first existing candidate.
#[must_use]
pub fn resolve_root(
    explicit: Option<&Path>,
    project_file: Option<&Path>,
    engine_dir: Option<&Path>,
) -> Option<PathBuf> {
    if let Some(root) = explicit {
        return Some(root.to_path_buf());
    }

    let candidates = candidate_roots(project_file, engine_dir);
    debug!(?candidates, "Resolving monitored root");

    let chosen = candidates
        .iter()
        .find(|root| has_active_sessions(root))
        .or_else(|| candidates.first())
        .cloned();

    if let Some(root) = &chosen {
        info!(root = %root.display(), "Resolved monitored root");
    }
    chosen
}

/// The project's `Content` directory, the usual copy destination.
#[must_use]
pub fn project_content_dir(project_file: &Path) -> PathBuf {
    project_dir(project_file).join("Content")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn add_session(root: &Path) -> anyhow::Result<()> {
        fs::create_dir_all(
            root.join("1234ABCD5678")
                .join("ABCDEF1234567890")
                .join("Sandbox")
                .join("Game"),
        )?;
        Ok(())
    }

    #[test]
    fn explicit_root_wins() {
        let explicit = Path::new("/srv/multiuser");
        assert_eq!(
            resolve_root(Some(explicit), None, None),
            Some(explicit.to_path_buf())
        );
    }

    #[test]
    fn nothing_configured_resolves_to_none() {
        assert_eq!(resolve_root(None, None, None), None);
    }

    #[test]
    fn prefers_candidate_with_sessions() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let project_file = dir.path().join("Project").join("Show.uproject");
        let project_root = join_all(&dir.path().join("Project"), &PROJECT_MULTIUSER);
        fs::create_dir_all(&project_root)?;

        let engine_dir = dir.path().join("Engine");
        let engine_root = join_all(&engine_dir, &ENGINE_MULTIUSER);
        fs::create_dir_all(&engine_root)?;
        add_session(&engine_root)?;

        assert_eq!(
            candidate_roots(Some(&project_file), Some(&engine_dir)),
            vec![project_root.clone(), engine_root.clone()]
        );
        assert_eq!(
            resolve_root(None, Some(&project_file), Some(&engine_dir)),
            Some(engine_root)
        );
        Ok(())
    }

    #[test]
    fn falls_back_to_first_existing_candidate() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let project_file = dir.path().join("Show.uproject");
        let project_root = join_all(dir.path(), &PROJECT_MULTIUSER);
        fs::create_dir_all(&project_root)?;

        assert_eq!(
            resolve_root(None, Some(&project_file), Some(&dir.path().join("NoEngine"))),
            Some(project_root)
        );
        Ok(())
    }

    #[test]
    fn detects_active_sessions() -> anyhow::Result<()> {
        let dir = tempdir()?;
        assert!(!has_active_sessions(dir.path()));
        add_session(dir.path())?;
        assert!(has_active_sessions(dir.path()));
        Ok(())
    }

    #[test]
    fn content_dir_sits_next_to_project_file() {
        assert_eq!(
            project_content_dir(Path::new("/work/Show/Show.uproject")),
            PathBuf::from("/work/Show/Content")
        );
    }
}
