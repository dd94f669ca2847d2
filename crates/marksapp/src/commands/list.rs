use crate::commands::CmdResult;
use crate::error::Result;
use crate::model::normalize_tags;
use crate::store::BookmarkStore;

#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    /// Keep bookmarks carrying every one of these tags.
    pub tags: Vec<String>,
    pub favorites_only: bool,
}

pub fn run<S: BookmarkStore + ?Sized>(store: &S, filter: &ListFilter) -> Result<CmdResult> {
    let wanted = normalize_tags(&filter.tags);
    let bookmarks = store
        .all()?
        .into_iter()
        .filter(|b| !filter.favorites_only || b.favorite)
        .filter(|b| wanted.is_subset(&b.tags))
        .collect();
    Ok(CmdResult::default().with_bookmarks(bookmarks))
}
