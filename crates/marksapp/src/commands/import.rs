use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::repo::Repository;
use crate::store::BookmarkStore;
use crate::vcs::Vcs;

/// Load the mirror and insert the bookmarks `store` does not have yet.
pub fn run<S: BookmarkStore + ?Sized, V: Vcs>(store: &mut S, repo: &Repository<V>) -> Result<CmdResult> {
    let report = repo.import_into(store)?;

    let mut result = CmdResult::default();
    if report.imported == 0 {
        result.add_message(CmdMessage::info(format!(
            "Nothing new to import ({} found)",
            report.found
        )));
    } else {
        result.add_message(CmdMessage::success(format!(
            "Imported {} of {} bookmarks",
            report.imported, report.found
        )));
    }
    if report.duplicates > 0 {
        result.add_message(CmdMessage::info(format!(
            "{} duplicates skipped",
            report.duplicates
        )));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use crate::model::Bookmark;
    use crate::store::memory::InMemoryStore;
    use crate::test_utils::{FakeVcs, TestEnv};

    #[test]
    fn test_import_into_empty_store() {
        let env = TestEnv::initialized();
        let repo = env.repo(FakeVcs::default());
        repo.export(
            &[
                Bookmark::new("https://a.com", "", "", ["x"]),
                Bookmark::new("https://b.com", "", "", ["y"]),
            ],
            false,
        )
        .unwrap();

        let mut store = InMemoryStore::new("bookmarks");
        let result = run(&mut store, &repo).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(result.messages_at(MessageLevel::Success), vec!["Imported 2 of 2 bookmarks"]);

        let again = run(&mut store, &repo).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(again.messages_at(MessageLevel::Info).len(), 2);
    }

    #[test]
    fn test_import_missing_repo_dir() {
        let env = TestEnv::initialized();
        let repo = env.repo(FakeVcs::default());
        let mut store = InMemoryStore::new("bookmarks");
        assert!(matches!(
            run(&mut store, &repo),
            Err(crate::error::MarksError::RepoNotFound(_))
        ));
    }
}
