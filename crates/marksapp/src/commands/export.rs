use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::repo::Repository;
use crate::store::BookmarkStore;
use crate::vcs::Vcs;

/// Write every bookmark in `store` into its mirror.
pub fn run<S: BookmarkStore + ?Sized, V: Vcs>(
    store: &S,
    repo: &Repository<V>,
    force: bool,
) -> Result<CmdResult> {
    let records = store.all()?;
    let report = repo.export(&records, force)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Exported {} bookmarks to {} ({} written, {} unchanged)",
        records.len(),
        repo.loc().display(),
        report.written,
        report.skipped
    )));
    Ok(result)
}
