use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::repo::Repository;
use crate::vcs::Vcs;

/// Create the git root, optionally switching it to encrypted mode.
pub fn run<V: Vcs>(repo: &Repository<V>, recipients: &[String]) -> Result<CmdResult> {
    let existed = repo.is_initialized();
    repo.init(recipients)?;

    let mut result = CmdResult::default();
    let root = repo.git_root().display();
    if existed {
        result.add_message(CmdMessage::info(format!("Git repository already exists at {}", root)));
    } else {
        result.add_message(CmdMessage::success(format!("Initialized git repository at {}", root)));
    }
    if !recipients.is_empty() {
        result.add_message(CmdMessage::success(format!(
            "Encryption enabled for {}",
            recipients.join(", ")
        )));
    }
    Ok(result)
}
