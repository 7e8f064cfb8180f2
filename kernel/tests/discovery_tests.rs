//! Scanner and registry tests over real directory trees.

use anyhow::Result;
use harvest_kernel::discovery::{
    ScanLimits, SessionEvent, SessionKey, SessionRegistry, SessionScanner, resolve,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn sandbox(root: &Path, session_id: &str, user_id: &str) -> PathBuf {
    root.join(session_id)
        .join(user_id)
        .join("Sandbox")
        .join("Game")
}

fn add_file(root: &Path, session_id: &str, user_id: &str, name: &str, contents: &str) -> Result<()> {
    let dir = sandbox(root, session_id, user_id);
    fs::create_dir_all(&dir)?;
    fs::write(dir.join(name), contents)?;
    Ok(())
}

// =============================================================================
// Scanning
// =============================================================================

#[test]
fn test_root_without_valid_sessions_scans_empty() -> Result<()> {
    let root = tempdir()?;
    // Too short, not hex, and a valid pair without a sandbox.
    fs::create_dir_all(root.path().join("ABC").join("ABCDEF1234567890"))?;
    fs::create_dir_all(root.path().join("session-one").join("ABCDEF1234567890"))?;
    fs::create_dir_all(root.path().join("1234ABCD5678").join("ABCDEF1234567890"))?;
    fs::write(root.path().join("1234ABCD5678").join("notes.txt"), "x")?;

    let scanner = SessionScanner::new(ScanLimits::default());
    assert!(scanner.scan(root.path()).is_empty());
    assert!(scanner.scan(&root.path().join("missing")).is_empty());
    Ok(())
}

#[test]
fn test_scan_finds_every_user_of_every_session() -> Result<()> {
    let root = tempdir()?;
    add_file(root.path(), "1234ABCD5678", "ABCDEF1234567890", "a.uasset", "a")?;
    add_file(root.path(), "1234ABCD5678", "0123456789ABCDEF", "b.uasset", "bb")?;
    add_file(root.path(), "FEDCBA987654", "ABCDEF1234567890", "c.uasset", "ccc")?;

    let sessions = SessionScanner::new(ScanLimits::default()).scan(root.path());
    assert_eq!(sessions.len(), 3);

    let key = SessionKey::new("1234ABCD5678", "0123456789ABCDEF");
    let session = &sessions[&key];
    assert_eq!(session.file_count, 1);
    assert_eq!(session.total_size, 2);
    assert_eq!(session.sandbox_path, sandbox(root.path(), "1234ABCD5678", "0123456789ABCDEF"));
    Ok(())
}

#[test]
fn test_deep_tree_is_capped_not_failed() -> Result<()> {
    let root = tempdir()?;
    let mut dir = sandbox(root.path(), "1234ABCD5678", "ABCDEF1234567890");
    for level in 0..10 {
        fs::create_dir_all(&dir)?;
        fs::write(dir.join(format!("level{level}.uasset")), "x")?;
        dir = dir.join(format!("sub{level}"));
    }

    let limits = ScanLimits {
        max_depth: 5,
        ..ScanLimits::default()
    };
    let sessions = SessionScanner::new(limits).scan(root.path());
    let session = sessions
        .values()
        .next()
        .ok_or_else(|| anyhow::anyhow!("session not found"))?;
    assert_eq!(session.file_count, 5);
    Ok(())
}

// =============================================================================
// Registry
// =============================================================================

#[test]
fn test_diff_reports_found_and_removed_but_not_unchanged() -> Result<()> {
    let root = tempdir()?;
    let scanner = SessionScanner::new(ScanLimits::default());
    let registry = SessionRegistry::new();

    add_file(root.path(), "AAAAAAAA0001", "ABCDEF1234567890", "a.uasset", "a")?;
    add_file(root.path(), "BBBBBBBB0002", "ABCDEF1234567890", "b.uasset", "b")?;
    assert_eq!(registry.apply_scan(scanner.scan(root.path())).len(), 2);

    fs::remove_dir_all(root.path().join("AAAAAAAA0001"))?;
    add_file(root.path(), "CCCCCCCC0003", "ABCDEF1234567890", "c.uasset", "c")?;
    let events = registry.apply_scan(scanner.scan(root.path()));

    assert_eq!(events.len(), 2);
    assert!(events.iter().any(|e| matches!(
        e,
        SessionEvent::Found(s) if s.session_id == "CCCCCCCC0003"
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        SessionEvent::Removed(k) if k.session_id() == "AAAAAAAA0001"
    )));
    assert!(!events.iter().any(|e| e.key().session_id() == "BBBBBBBB0002"));
    Ok(())
}

#[test]
fn test_snapshot_is_detached_from_registry() -> Result<()> {
    let root = tempdir()?;
    let scanner = SessionScanner::new(ScanLimits::default());
    let registry = SessionRegistry::new();
    add_file(root.path(), "1234ABCD5678", "ABCDEF1234567890", "a.uasset", "a")?;
    registry.apply_scan(scanner.scan(root.path()));

    let snapshot = registry.snapshot();
    fs::remove_dir_all(root.path().join("1234ABCD5678"))?;
    registry.apply_scan(scanner.scan(root.path()));

    assert_eq!(snapshot.len(), 1);
    assert!(registry.is_empty());
    Ok(())
}

// =============================================================================
// Root resolution
// =============================================================================

#[test]
fn test_project_root_with_sessions_is_preferred() -> Result<()> {
    let project = tempdir()?;
    let engine = tempdir()?;
    let project_file = project.path().join("Game.uproject");
    fs::write(&project_file, "{}")?;

    let project_root = project
        .path()
        .join("Intermediate")
        .join("Concert")
        .join("MultiUser");
    let engine_root = engine
        .path()
        .join("Programs")
        .join("UnrealMultiUserSlateServer")
        .join("Intermediate")
        .join("MultiUser");
    fs::create_dir_all(&project_root)?;
    add_file(&engine_root, "1234ABCD5678", "ABCDEF1234567890", "a.uasset", "a")?;

    // Only the engine root holds sessions.
    let chosen = resolve::resolve_root(None, Some(project_file.as_path()), Some(engine.path()));
    assert_eq!(chosen, Some(engine_root));

    add_file(&project_root, "1234ABCD5678", "ABCDEF1234567890", "a.uasset", "a")?;
    let chosen = resolve::resolve_root(None, Some(project_file.as_path()), Some(engine.path()));
    assert_eq!(chosen, Some(project_root));
    Ok(())
}
