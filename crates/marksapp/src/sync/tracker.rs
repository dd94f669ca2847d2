//! The list of repositories taking part in sync.
//!
//! A repository is identified by the SHA-256 of its database's canonical path,
//! so the id survives renaming the git root but not moving the database file.
//! The list lives in `<git-root>/.tracked.json` as a JSON array of ids.
//!
//! ```text
//! Unloaded ──load()──▶ Loaded
//! ```
//!
//! Every accessor other than `load` fails with `TrackerNotLoaded` while unloaded.

use crate::digest::sha256_hex;
use crate::error::{MarksError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const TRACKER_FILE: &str = ".tracked.json";

/// Stable identifier for the repository mirroring the database at `db_path`.
pub fn repo_id(db_path: &Path) -> String {
    let canonical = fs::canonicalize(db_path).unwrap_or_else(|_| db_path.to_path_buf());
    sha256_hex(canonical.to_string_lossy().as_bytes())
}

#[derive(Debug)]
enum State {
    Unloaded,
    Loaded(Vec<String>),
}

#[derive(Debug)]
pub struct RepositoryTracker {
    path: PathBuf,
    state: State,
}

impl RepositoryTracker {
    pub fn new(git_root: &Path) -> Self {
        Self {
            path: git_root.join(TRACKER_FILE),
            state: State::Unloaded,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, State::Loaded(_))
    }

    /// Read the list from disk. Only the first call touches the filesystem.
    pub fn load(&mut self) -> Result<()> {
        if self.is_loaded() {
            return Ok(());
        }
        let ids = if self.path.exists() {
            let content = fs::read_to_string(&self.path).map_err(MarksError::Io)?;
            serde_json::from_str::<Vec<String>>(&content).map_err(MarksError::Serialization)?
        } else {
            Vec::new()
        };
        tracing::debug!(count = ids.len(), path = %self.path.display(), "tracker loaded");
        self.state = State::Loaded(ids);
        Ok(())
    }

    fn ids_mut(&mut self) -> Result<&mut Vec<String>> {
        match &mut self.state {
            State::Loaded(ids) => Ok(ids),
            State::Unloaded => Err(MarksError::TrackerNotLoaded),
        }
    }

    pub fn ids(&self) -> Result<&[String]> {
        match &self.state {
            State::Loaded(ids) => Ok(ids.as_slice()),
            State::Unloaded => Err(MarksError::TrackerNotLoaded),
        }
    }

    pub fn contains(&self, id: &str) -> Result<bool> {
        Ok(self.ids()?.iter().any(|t| t == id))
    }

    pub fn track(&mut self, id: &str) -> Result<()> {
        let ids = self.ids_mut()?;
        if !ids.iter().any(|t| t == id) {
            ids.push(id.to_string());
        }
        Ok(())
    }

    pub fn untrack(&mut self, id: &str) -> Result<()> {
        self.ids_mut()?.retain(|t| t != id);
        Ok(())
    }

    /// Persist the de-duplicated list, keeping first-seen order.
    pub fn save(&self) -> Result<()> {
        let mut unique: Vec<&String> = Vec::new();
        for id in self.ids()? {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }

        let dir = self
            .path
            .parent()
            .ok_or_else(|| MarksError::Store(format!("invalid path: {}", self.path.display())))?;
        fs::create_dir_all(dir).map_err(MarksError::Io)?;

        let content = serde_json::to_string_pretty(&unique).map_err(MarksError::Serialization)?;

        // Atomic write
        let tmp = dir.join(format!(".tracked-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp, content).map_err(MarksError::Io)?;
        fs::rename(&tmp, &self.path).map_err(MarksError::Io)?;
        Ok(())
    }
}
