//! # Context Initialization
//!
//! Resolves where marks keeps its data and loads configuration. The CLI calls
//! [`initialize`] once per invocation and gets back a [`MarksContext`] that can
//! open databases and their repositories.
//!
//! ## Data Directory
//!
//! 1. An explicit override (the CLI's `--data` flag).
//! 2. `MARKS_DATA`, primarily used by tests to isolate state.
//! 3. The OS data directory from the `directories` crate.
//!
//! ## Git Root
//!
//! 1. `MARKS_GIT_ROOT`.
//! 2. `git_root` in `marks.toml`.
//! 3. `<data_dir>/git`.

use crate::config::MarksConfig;
use crate::error::{MarksError, Result};
use crate::repo::Repository;
use crate::store::json::JsonStore;
use crate::vcs::GitCli;
use clapfig::{Clapfig, SearchMode, SearchPath};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

pub const DATA_ENV: &str = "MARKS_DATA";
pub const GIT_ROOT_ENV: &str = "MARKS_GIT_ROOT";
pub const CONFIG_FILE: &str = "marks.toml";

#[derive(Debug, Clone)]
pub struct MarksContext {
    pub data_dir: PathBuf,
    pub git_root: PathBuf,
    pub config: MarksConfig,
}

impl MarksContext {
    /// The database to use: `db` if given, else the configured default.
    pub fn db_name(&self, db: Option<&str>) -> String {
        db.map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(self.config.default_db.as_str())
            .to_string()
    }

    pub fn db_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", name))
    }

    pub fn open_store(&self, name: &str) -> Result<JsonStore> {
        JsonStore::open(&self.data_dir, name)
    }

    pub fn repository(&self, name: &str) -> Repository<GitCli> {
        Repository::new(
            name,
            &self.db_path(name),
            &self.git_root,
            GitCli::new(&self.config.git_program),
        )
        .with_workers(self.config.workers())
        .with_gpg_program(&self.config.gpg_program)
    }

    pub fn vcs(&self) -> GitCli {
        GitCli::new(&self.config.git_program)
    }
}

pub fn default_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(DATA_ENV) {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    ProjectDirs::from("com", "marks", "marks")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| MarksError::Config("could not determine a data directory".to_string()))
}

pub fn load_config(data_dir: &Path) -> MarksConfig {
    Clapfig::builder()
        .app_name("marks")
        .file_name(CONFIG_FILE)
        .search_paths(vec![SearchPath::Path(data_dir.to_path_buf())])
        .search_mode(SearchMode::Merge)
        .load()
        .unwrap_or_default()
}

pub fn initialize(data_override: Option<PathBuf>) -> Result<MarksContext> {
    let data_dir = match data_override {
        Some(dir) => dir,
        None => default_data_dir()?,
    };
    std::fs::create_dir_all(&data_dir).map_err(MarksError::Io)?;

    let config = load_config(&data_dir);
    let git_root = std::env::var(GIT_ROOT_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| config.git_root(&data_dir));

    tracing::debug!(
        data_dir = %data_dir.display(),
        git_root = %git_root.display(),
        "context initialized"
    );
    Ok(MarksContext {
        data_dir,
        git_root,
        config,
    })
}
