//! # Configuration
//!
//! marks configuration is managed by [`clapfig`], which handles layered loading
//! from TOML files, environment variables, and compiled defaults.
//!
//! ## Storage Hierarchy
//!
//! Configuration is resolved in priority order:
//! 1. **Environment variables**: `MARKS__DEFAULT_DB`, `MARKS__WORKERS`, etc.
//! 2. **Config file**: `<data_dir>/marks.toml`.
//! 3. **Compiled Defaults**: Built-in fallbacks via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `default_db` | `bookmarks` | Database used when `--db` is not given |
//! | `git_root` | `<data_dir>/git` | Root of the git repository holding every mirror |
//! | `workers` | 2× CPUs | Size of the load/export worker pool |
//! | `git_program` | `git` | Version-control binary |
//! | `gpg_program` | `gpg` | Encryption binary |

use crate::sync::walker::default_workers;
use confique::Config;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for marks, stored in `marks.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MarksConfig {
    /// Database used when `--db` is not given.
    #[config(default = "bookmarks")]
    pub default_db: String,

    /// Root of the git repository. When absent, `<data_dir>/git`.
    pub git_root: Option<PathBuf>,

    /// Worker pool size for bulk loads and exports.
    pub workers: Option<usize>,

    #[config(default = "git")]
    pub git_program: String,

    #[config(default = "gpg")]
    pub gpg_program: String,
}

impl Default for MarksConfig {
    fn default() -> Self {
        Self {
            default_db: "bookmarks".to_string(),
            git_root: None,
            workers: None,
            git_program: "git".to_string(),
            gpg_program: "gpg".to_string(),
        }
    }
}

impl MarksConfig {
    pub fn workers(&self) -> usize {
        self.workers
            .filter(|n| *n > 0)
            .unwrap_or_else(default_workers)
    }

    pub fn git_root(&self, data_dir: &Path) -> PathBuf {
        self.git_root
            .clone()
            .unwrap_or_else(|| data_dir.join("git"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MarksConfig::default();
        assert_eq!(config.default_db, "bookmarks");
        assert_eq!(config.git_program, "git");
        assert_eq!(config.gpg_program, "gpg");
        assert_eq!(config.workers(), default_workers());
    }

    #[test]
    fn test_git_root_defaults_under_data_dir() {
        let config = MarksConfig::default();
        assert_eq!(config.git_root(Path::new("/data")), PathBuf::from("/data/git"));

        let config = MarksConfig {
            git_root: Some(PathBuf::from("/elsewhere")),
            ..Default::default()
        };
        assert_eq!(config.git_root(Path::new("/data")), PathBuf::from("/elsewhere"));
    }

    #[test]
    fn test_zero_workers_falls_back() {
        let config = MarksConfig {
            workers: Some(0),
            ..Default::default()
        };
        assert_eq!(config.workers(), default_workers());

        let config = MarksConfig {
            workers: Some(3),
            ..Default::default()
        };
        assert_eq!(config.workers(), 3);
    }

    #[test]
    fn test_parse_from_toml() {
        let config: MarksConfig = toml::from_str(
            r#"
            default_db = "work"
            git_root = "/srv/marks"
            workers = 6
            git_program = "git"
            gpg_program = "gpg2"
            "#,
        )
        .unwrap();
        assert_eq!(config.default_db, "work");
        assert_eq!(config.git_root(Path::new("/data")), PathBuf::from("/srv/marks"));
        assert_eq!(config.workers(), 6);
        assert_eq!(config.gpg_program, "gpg2");
    }
}
