//! Filtering incoming bookmarks against an existing store by URL.

use crate::error::Result;
use crate::model::Bookmark;
use crate::store::BookmarkStore;
use std::collections::HashSet;

/// Candidates whose URL is absent from `existing`, in their original order.
/// `existing` is only read.
pub fn filter<S: BookmarkStore + ?Sized>(existing: &S, candidates: Vec<Bookmark>) -> Result<Vec<Bookmark>> {
    let mut kept = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !existing.has_url(&candidate.url)? {
            kept.push(candidate);
        }
    }
    Ok(kept)
}

/// Drops later occurrences of a URL already seen in the same batch.
pub fn unique_by_url(records: Vec<Bookmark>) -> Vec<Bookmark> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|b| seen.insert(b.url.clone()))
        .collect()
}
