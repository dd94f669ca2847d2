use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::repo::Repository;
use crate::store::BookmarkStore;
use crate::vcs::Vcs;

/// Current manifest, plus drift against the last committed one.
pub fn run<S: BookmarkStore + ?Sized, V: Vcs>(store: &S, repo: &mut Repository<V>) -> Result<CmdResult> {
    let manifest = repo.summary(store)?;
    let drift = repo.drift(store)?;

    let mut result = CmdResult::default();
    if !repo.is_tracked()? {
        result.add_message(CmdMessage::warning(format!(
            "{} is not tracked; run `marks git track`",
            repo.name()
        )));
    }
    match &drift {
        None => result.add_message(CmdMessage::info("Never committed")),
        Some(fields) if fields.is_empty() => {
            result.add_message(CmdMessage::success("Up to date with last commit"))
        }
        Some(fields) => result.add_message(CmdMessage::warning(format!(
            "{} field(s) changed since last commit",
            fields.len()
        ))),
    }

    result.drift = drift;
    Ok(result.with_manifest(manifest))
}
