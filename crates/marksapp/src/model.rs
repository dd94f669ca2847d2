//! # Domain Model: Bookmarks and Their Checksums
//!
//! A [`Bookmark`] is the single record type marks stores. The relational store
//! owns its `id`; the URL is the unique key everywhere else (dedup, paths, lookups).
//!
//! ## Checksum
//!
//! Every bookmark carries a `checksum`: lower-case hex SHA-256 over a compact
//! JSON view of **all other fields**, serialized in a fixed order:
//!
//! ```text
//! {"id":..,"url":..,"title":..,"desc":..,"tags":[..],"favorite":..,"created_at":..,"updated_at":..}
//! ```
//!
//! The checksum must always match the current content. Anything that changes a
//! field must reseal (see [`Bookmark::seal`]). A mismatch read back from disk is
//! corruption and is never silently repaired.
//!
//! ## Tags
//!
//! Tags are a set: trimmed, lower-cased, empty entries dropped, stored sorted
//! (`BTreeSet`) so the canonical view is independent of insertion order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::digest::sha256_hex;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub desc: String,
    pub tags: BTreeSet<String>,
    pub favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub checksum: String,
}

// Field order here defines the canonical checksum input.
#[derive(Serialize)]
struct ChecksumView<'a> {
    id: i64,
    url: &'a str,
    title: &'a str,
    desc: &'a str,
    tags: &'a BTreeSet<String>,
    favorite: bool,
    created_at: &'a DateTime<Utc>,
    updated_at: &'a DateTime<Utc>,
}

impl Bookmark {
    pub fn new<I, T>(url: &str, title: &str, desc: &str, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let now = Utc::now();
        let mut bookmark = Self {
            id: 0,
            url: url.trim().to_string(),
            title: title.trim().to_string(),
            desc: desc.trim().to_string(),
            tags: normalize_tags(tags),
            favorite: false,
            created_at: now,
            updated_at: now,
            checksum: String::new(),
        };
        bookmark.seal();
        bookmark
    }

    pub fn with_favorite(mut self, favorite: bool) -> Self {
        self.favorite = favorite;
        self.seal();
        self
    }

    /// Recompute the checksum from the current content.
    pub fn compute_checksum(&self) -> String {
        let view = ChecksumView {
            id: self.id,
            url: &self.url,
            title: &self.title,
            desc: &self.desc,
            tags: &self.tags,
            favorite: self.favorite,
            created_at: &self.created_at,
            updated_at: &self.updated_at,
        };
        // Serializing plain strings, integers and a string set cannot fail.
        let bytes = serde_json::to_vec(&view).unwrap_or_default();
        sha256_hex(&bytes)
    }

    /// Store the freshly computed checksum.
    pub fn seal(&mut self) {
        self.checksum = self.compute_checksum();
    }

    /// Whether the stored checksum matches the content.
    pub fn verify(&self) -> bool {
        self.checksum == self.compute_checksum()
    }

    /// Mark the bookmark as modified now and reseal.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
        self.seal();
    }

    pub fn tags_joined(&self) -> String {
        self.tags.iter().cloned().collect::<Vec<_>>().join(",")
    }
}

pub fn normalize_tags<I, T>(tags: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    tags.into_iter()
        .flat_map(|t| {
            t.as_ref()
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .collect::<Vec<_>>()
        })
        .filter(|t| !t.is_empty())
        .collect()
}
