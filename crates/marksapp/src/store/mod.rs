//! # Storage Layer
//!
//! The [`BookmarkStore`] trait is the seam between marks and its relational
//! database. The git mirror never talks to the database directly; it goes
//! through this trait for counts (manifest stats), full scans (export),
//! URL lookups (dedup), and batch inserts (import).
//!
//! ## Implementations
//!
//! - [`memory::InMemoryStore`]: Sequential ids, unique URLs, no I/O. Used by tests
//!   and as the engine behind [`json::JsonStore`].
//! - [`json::JsonStore`]: The same semantics persisted to `<data_dir>/<name>.json`.
//!
//! ## Storage Layout
//!
//! ```text
//! <data_dir>/
//! ├── marks.toml          # Configuration
//! ├── bookmarks.json      # Default database
//! └── <name>.json         # Other databases
//! ```

use crate::error::Result;
use crate::model::Bookmark;

pub mod json;
pub mod memory;

/// Aggregate a [`BookmarkStore`] can count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Bookmarks,
    /// Distinct tags across all bookmarks.
    Tags,
    Favorites,
}

/// Abstract interface for the relational bookmark database.
pub trait BookmarkStore {
    /// Database name; also the repository directory name under the git root.
    fn name(&self) -> &str;

    fn count(&self, table: Table) -> Result<usize>;

    /// Every bookmark, ordered by id.
    fn all(&self) -> Result<Vec<Bookmark>>;

    fn by_url(&self, url: &str) -> Result<Option<Bookmark>>;

    fn has_url(&self, url: &str) -> Result<bool> {
        Ok(self.by_url(url)?.is_some())
    }

    /// Insert a batch, assigning fresh ids. Fails without inserting anything
    /// if any URL already exists.
    fn insert_many(&mut self, records: Vec<Bookmark>) -> Result<Vec<Bookmark>>;

    /// Remove by URL, returning the removed record.
    fn remove(&mut self, url: &str) -> Result<Option<Bookmark>>;
}
