use super::{BookmarkStore, Table};
use crate::error::{MarksError, Result};
use crate::model::Bookmark;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InMemoryStore {
    name: String,
    next_id: i64,
    records: Vec<Bookmark>,
}

impl InMemoryStore {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            next_id: 1,
            records: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }
}

impl BookmarkStore for InMemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn count(&self, table: Table) -> Result<usize> {
        Ok(match table {
            Table::Bookmarks => self.records.len(),
            Table::Favorites => self.records.iter().filter(|b| b.favorite).count(),
            Table::Tags => self
                .records
                .iter()
                .flat_map(|b| b.tags.iter())
                .collect::<BTreeSet<_>>()
                .len(),
        })
    }

    fn all(&self) -> Result<Vec<Bookmark>> {
        Ok(self.records.clone())
    }

    fn by_url(&self, url: &str) -> Result<Option<Bookmark>> {
        Ok(self.records.iter().find(|b| b.url == url).cloned())
    }

    fn insert_many(&mut self, records: Vec<Bookmark>) -> Result<Vec<Bookmark>> {
        // Validate the whole batch first so a failure inserts nothing.
        let existing: HashSet<&str> = self.records.iter().map(|b| b.url.as_str()).collect();
        let mut batch = HashSet::new();
        for record in &records {
            if existing.contains(record.url.as_str()) || !batch.insert(record.url.as_str()) {
                return Err(MarksError::Store(format!(
                    "duplicate url: {}",
                    record.url
                )));
            }
        }

        let mut inserted = Vec::with_capacity(records.len());
        for mut record in records {
            record.id = self.next_id;
            self.next_id += 1;
            record.seal();
            inserted.push(record);
        }
        self.records.extend(inserted.iter().cloned());
        Ok(inserted)
    }

    fn remove(&mut self, url: &str) -> Result<Option<Bookmark>> {
        match self.records.iter().position(|b| b.url == url) {
            Some(idx) => Ok(Some(self.records.remove(idx))),
            None => Ok(None),
        }
    }
}
