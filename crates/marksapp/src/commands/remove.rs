use crate::commands::{CmdMessage, CmdResult};
use crate::error::{MarksError, Result};
use crate::repo::Repository;
use crate::store::BookmarkStore;
use crate::vcs::Vcs;

/// Remove a bookmark by URL, deleting its mirrored file when tracked.
pub fn run<S: BookmarkStore + ?Sized, V: Vcs>(
    store: &mut S,
    repo: &mut Repository<V>,
    url: &str,
) -> Result<CmdResult> {
    let removed = store
        .remove(url.trim())?
        .ok_or_else(|| MarksError::Store(format!("No bookmark with URL {}", url.trim())))?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Removed {}", removed.url)));

    if repo.is_initialized() && repo.is_tracked()? && repo.remove(&removed)? {
        result.add_message(CmdMessage::info(format!("Deleted from {}", repo.name())));
    }

    Ok(result.with_bookmarks(vec![removed]))
}
