use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::repo::Repository;
use crate::store::BookmarkStore;
use crate::vcs::Vcs;

/// Start tracking the database and export it so the mirror is complete.
pub fn track<S: BookmarkStore + ?Sized, V: Vcs>(store: &S, repo: &mut Repository<V>) -> Result<CmdResult> {
    repo.ensure_initialized()?;
    let mut result = CmdResult::default();
    if repo.is_tracked()? {
        result.add_message(CmdMessage::info(format!("{} is already tracked", repo.name())));
        return Ok(result);
    }

    repo.track()?;
    let report = repo.export(&store.all()?, false)?;
    result.add_message(CmdMessage::success(format!(
        "Tracking {} ({} bookmarks exported)",
        repo.name(),
        report.written
    )));
    Ok(result)
}

pub fn untrack<V: Vcs>(repo: &mut Repository<V>) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    if !repo.is_tracked()? {
        result.add_message(CmdMessage::info(format!("{} is not tracked", repo.name())));
        return Ok(result);
    }
    repo.untrack()?;
    result.add_message(CmdMessage::success(format!("Stopped tracking {}", repo.name())));
    Ok(result)
}
