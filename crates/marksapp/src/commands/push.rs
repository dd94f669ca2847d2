use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::repo::Repository;
use crate::vcs::Vcs;

pub fn run<V: Vcs>(repo: &Repository<V>) -> Result<CmdResult> {
    repo.push()?;
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success("Pushed"));
    Ok(result)
}
