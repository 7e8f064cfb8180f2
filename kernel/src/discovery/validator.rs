//! Predicates deciding what part of the monitored tree is a session.
//!
//! Identifiers are at least eight characters of hex digits or underscores.

use std::path::{Path, PathBuf};

/// Minimum length of a session or user directory name.
pub const MIN_IDENTIFIER_LEN: usize = 8;

/// Path of the sandbox content root relative to a user directory.
pub const SANDBOX_SUBPATH: [&str; 2] = ["Sandbox", "Game"];

/// Returns `true` if `name` looks like a session or user identifier.
#[must_use]
pub fn is_valid_identifier(name: &str) -> bool {
    name.len() >= MIN_IDENTIFIER_LEN && name.chars().all(|c| c.is_ascii_hexdigit() || c == '_')
}

/// Returns the `Sandbox/Game` directory for a user directory.
#[must_use]
pub fn sandbox_path(user_dir: &Path) -> PathBuf {
    SANDBOX_SUBPATH
        .iter()
        .fold(user_dir.to_path_buf(), |path, part| path.join(part))
}

/// Returns `true` if `user_dir/Sandbox/Game` exists and is a directory.
///
/// Any error while probing the filesystem counts as "not a sandbox root".
#[must_use]
pub fn is_sandbox_root(user_dir: &Path) -> bool {
    std::fs::metadata(sandbox_path(user_dir)).is_ok_and(|meta| meta.is_dir())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn accepts_hex_and_underscore_identifiers() {
        assert!(is_valid_identifier("1234ABCD"));
        assert!(is_valid_identifier("abcdef0123456789"));
        assert!(is_valid_identifier("1234ABCD_5678ef"));
        assert!(is_valid_identifier("________"));
    }

    #[test]
    fn rejects_short_or_non_hex_identifiers() {
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("1234ABC"));
        assert!(!is_valid_identifier("1234-ABCD-5678"));
        assert!(!is_valid_identifier("Sandbox_Game"));
        assert!(!is_valid_identifier("12345678g"));
        assert!(!is_valid_identifier("１２３４５６７８"));
    }

    #[test]
    fn sandbox_root_requires_game_directory() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let user = dir.path().join("ABCDEF1234567890");
        fs::create_dir_all(user.join("Sandbox"))?;
        assert!(!is_sandbox_root(&user));

        fs::write(user.join("Sandbox").join("Game"), "not a directory")?;
        assert!(!is_sandbox_root(&user));

        fs::remove_file(user.join("Sandbox").join("Game"))?;
        fs::create_dir(user.join("Sandbox").join("Game"))?;
        assert!(is_sandbox_root(&user));
        Ok(())
    }

    #[test]
    fn missing_user_directory_is_not_a_sandbox_root() {
        assert!(!is_sandbox_root(Path::new("/nonexistent/harvest/user")));
    }
}
