//! Extension allow-lists used by session copies.

use serde::{Deserialize, Serialize};
use std::path::Path;

const ASSET_EXTENSIONS: &[&str] = &["uasset", "umap", "uexp", "ubulk", "uptnl"];
const CONFIG_EXTENSIONS: &[&str] = &["ini", "json", "cfg", "config"];
const SOURCE_EXTENSIONS: &[&str] = &["cpp", "h", "cs", "py", "js", "html", "css"];

/// Which files a session copy takes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileFilter {
    /// Every file.
    #[default]
    All,
    /// Engine asset files.
    Assets,
    /// Configuration files.
    Config,
    /// Source code files.
    Source,
}

impl FileFilter {
    /// Lower-case extensions accepted by this filter, `None` for [`FileFilter::All`].
    #[must_use]
    pub fn extensions(self) -> Option<&'static [&'static str]> {
        match self {
            Self::All => None,
            Self::Assets => Some(ASSET_EXTENSIONS),
            Self::Config => Some(CONFIG_EXTENSIONS),
            Self::Source => Some(SOURCE_EXTENSIONS),
        }
    }

    /// Returns `true` if `path` passes the filter. Extensions compare case-insensitively.
    #[must_use]
    pub fn matches(self, path: &Path) -> bool {
        let Some(allowed) = self.extensions() else {
            return true;
        };
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| allowed.iter().any(|a| a.eq_ignore_ascii_case(ext)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_accepts_anything() {
        assert!(FileFilter::All.matches(Path::new("README")));
        assert!(FileFilter::All.matches(Path::new("a/b.bin")));
    }

    #[test]
    fn asset_filter_is_case_insensitive() {
        assert!(FileFilter::Assets.matches(Path::new("Maps/Level.UMAP")));
        assert!(FileFilter::Assets.matches(Path::new("Mesh.uasset")));
        assert!(!FileFilter::Assets.matches(Path::new("DefaultGame.ini")));
        assert!(!FileFilter::Assets.matches(Path::new("uasset")));
    }

    #[test]
    fn config_and_source_filters() {
        assert!(FileFilter::Config.matches(Path::new("Config/DefaultEngine.ini")));
        assert!(FileFilter::Config.matches(Path::new("settings.json")));
        assert!(!FileFilter::Config.matches(Path::new("main.cpp")));
        assert!(FileFilter::Source.matches(Path::new("Source/Actor.h")));
        assert!(FileFilter::Source.matches(Path::new("tool.py")));
        assert!(!FileFilter::Source.matches(Path::new("Level.umap")));
    }

    #[test]
    fn deserializes_from_snake_case() -> anyhow::Result<()> {
        let filter: FileFilter = serde_json::from_str("\"assets\"")?;
        assert_eq!(filter, FileFilter::Assets);
        Ok(())
    }
}
