use super::memory::InMemoryStore;
use super::{BookmarkStore, Table};
use crate::error::{MarksError, Result};
use crate::model::Bookmark;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// An [`InMemoryStore`] persisted to a single JSON file after every mutation.
pub struct JsonStore {
    path: PathBuf,
    inner: InMemoryStore,
}

impl JsonStore {
    /// Open `<data_dir>/<name>.json`, starting empty if it does not exist yet.
    pub fn open(data_dir: &Path, name: &str) -> Result<Self> {
        let path = data_dir.join(format!("{}.json", name));
        let mut inner = if path.exists() {
            let content = fs::read_to_string(&path).map_err(MarksError::Io)?;
            serde_json::from_str::<InMemoryStore>(&content).map_err(MarksError::Serialization)?
        } else {
            InMemoryStore::new(name)
        };
        // The file name is authoritative if the database was renamed on disk.
        inner.set_name(name);
        Ok(Self { path, inner })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        let dir = self
            .path
            .parent()
            .ok_or_else(|| MarksError::Store(format!("invalid path: {}", self.path.display())))?;
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(MarksError::Io)?;
        }

        let content = serde_json::to_string_pretty(&self.inner).map_err(MarksError::Serialization)?;

        // Atomic write
        let tmp = dir.join(format!(".db-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp, content).map_err(MarksError::Io)?;
        fs::rename(&tmp, &self.path).map_err(MarksError::Io)?;
        Ok(())
    }
}

impl BookmarkStore for JsonStore {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn count(&self, table: Table) -> Result<usize> {
        self.inner.count(table)
    }

    fn all(&self) -> Result<Vec<Bookmark>> {
        self.inner.all()
    }

    fn by_url(&self, url: &str) -> Result<Option<Bookmark>> {
        self.inner.by_url(url)
    }

    fn insert_many(&mut self, records: Vec<Bookmark>) -> Result<Vec<Bookmark>> {
        let inserted = self.inner.insert_many(records)?;
        if !inserted.is_empty() {
            self.flush()?;
        }
        Ok(inserted)
    }

    fn remove(&mut self, url: &str) -> Result<Option<Bookmark>> {
        let removed = self.inner.remove(url)?;
        if removed.is_some() {
            self.flush()?;
        }
        Ok(removed)
    }
}
