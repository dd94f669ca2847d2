use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::repo::{CommitOutcome, Repository};
use crate::store::BookmarkStore;
use crate::vcs::Vcs;

pub const DEFAULT_MESSAGE: &str = "sync bookmarks";

/// Refresh the manifest and commit the mirror. A clean tree is not an error.
pub fn run<S: BookmarkStore + ?Sized, V: Vcs>(
    store: &S,
    repo: &Repository<V>,
    message: Option<&str>,
) -> Result<CmdResult> {
    let message = message
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(DEFAULT_MESSAGE);

    let mut result = CmdResult::default();
    match repo.commit(store, message)? {
        CommitOutcome::Committed { message, manifest } => {
            result.add_message(CmdMessage::success(format!("Committed: {}", message)));
            Ok(result.with_manifest(manifest))
        }
        CommitOutcome::NothingToCommit => {
            result.add_message(CmdMessage::info("Nothing to commit"));
            Ok(result)
        }
    }
}
