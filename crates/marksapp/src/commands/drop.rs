use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::repo::Repository;
use crate::vcs::Vcs;

/// Delete the mirror's record files and stop tracking it. The database is
/// untouched.
pub fn run<V: Vcs>(repo: &mut Repository<V>) -> Result<CmdResult> {
    repo.ensure_initialized()?;
    let deleted = repo.drop_files()?;
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Dropped {} files from {}",
        deleted,
        repo.name()
    )));
    Ok(result)
}
