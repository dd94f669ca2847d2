use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::repo::Repository;
use crate::vcs::Vcs;
use std::path::Path;

pub fn run<V: Vcs>(vcs: &V, url: &str, git_root: &Path) -> Result<CmdResult> {
    Repository::clone_into(vcs, url, git_root)?;
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Cloned {} into {}",
        url,
        git_root.display()
    )));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FakeVcs, TestEnv};

    #[test]
    fn test_clone_into_missing_dir() {
        let env = TestEnv::new();
        let result = run(&FakeVcs::default(), "git@example.com:me/marks.git", env.git_root()).unwrap();
        assert!(env.git_root().join(".git").is_dir());
        assert_eq!(result.messages.len(), 1);
    }

    #[test]
    fn test_clone_refuses_existing_repo() {
        let env = TestEnv::initialized();
        assert!(run(&FakeVcs::default(), "git@example.com:me/marks.git", env.git_root()).is_err());
    }
}
