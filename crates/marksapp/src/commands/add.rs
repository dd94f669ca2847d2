use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::Bookmark;
use crate::repo::Repository;
use crate::store::BookmarkStore;
use crate::sync::conflict::WriteDecision;
use crate::sync::paths::domain_of;
use crate::vcs::Vcs;

#[derive(Debug, Clone, Default)]
pub struct NewBookmark {
    pub url: String,
    pub title: String,
    pub desc: String,
    pub tags: Vec<String>,
    pub favorite: bool,
}

/// Insert a bookmark and, when the database is tracked, mirror it.
pub fn run<S: BookmarkStore + ?Sized, V: Vcs>(
    store: &mut S,
    repo: &mut Repository<V>,
    input: NewBookmark,
) -> Result<CmdResult> {
    // Reject anything the mirror could not place.
    domain_of(&input.url)?;

    let mut result = CmdResult::default();
    if let Some(existing) = store.by_url(input.url.trim())? {
        result.add_message(CmdMessage::warning(format!(
            "Already bookmarked: {}",
            existing.url
        )));
        return Ok(result.with_bookmarks(vec![existing]));
    }

    let bookmark = Bookmark::new(&input.url, &input.title, &input.desc, &input.tags)
        .with_favorite(input.favorite);
    let inserted = store.insert_many(vec![bookmark])?;
    result.add_message(CmdMessage::success(format!("Added {}", input.url.trim())));

    if repo.is_initialized() && repo.is_tracked()? {
        for bookmark in &inserted {
            if repo.store_one(bookmark, false)? == WriteDecision::Write {
                result.add_message(CmdMessage::info(format!("Mirrored to {}", repo.name())));
            }
        }
    }

    Ok(result.with_bookmarks(inserted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MarksError;
    use crate::store::memory::InMemoryStore;
    use crate::test_utils::{FakeVcs, TestEnv};

    fn input(url: &str) -> NewBookmark {
        NewBookmark {
            url: url.to_string(),
            title: "Title".to_string(),
            tags: vec!["Rust".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_add_inserts_with_id() {
        let env = TestEnv::new();
        let mut repo = env.repo(FakeVcs::default());
        let mut store = InMemoryStore::new("bookmarks");

        let result = run(&mut store, &mut repo, input("https://a.com")).unwrap();
        assert_eq!(result.bookmarks.len(), 1);
        assert_eq!(result.bookmarks[0].id, 1);
        assert!(result.bookmarks[0].tags.contains("rust"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_add_duplicate_warns() {
        let env = TestEnv::new();
        let mut repo = env.repo(FakeVcs::default());
        let mut store = InMemoryStore::new("bookmarks");
        run(&mut store, &mut repo, input("https://a.com")).unwrap();

        let result = run(&mut store, &mut repo, input("https://a.com")).unwrap();
        assert_eq!(result.messages_at(crate::commands::MessageLevel::Warning).len(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_add_invalid_url() {
        let env = TestEnv::new();
        let mut repo = env.repo(FakeVcs::default());
        let mut store = InMemoryStore::new("bookmarks");
        let err = run(&mut store, &mut repo, input("http://")).unwrap_err();
        assert!(matches!(err, MarksError::InvalidUrl(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_mirrors_when_tracked() {
        let env = TestEnv::initialized();
        let mut repo = env.repo(FakeVcs::default());
        repo.track().unwrap();
        let mut store = InMemoryStore::new("bookmarks");

        let result = run(&mut store, &mut repo, input("https://a.com/page")).unwrap();
        let path = repo.resolver().resolve(&result.bookmarks[0]).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_add_does_not_mirror_untracked() {
        let env = TestEnv::initialized();
        let mut repo = env.repo(FakeVcs::default());
        let mut store = InMemoryStore::new("bookmarks");

        let result = run(&mut store, &mut repo, input("https://a.com/page")).unwrap();
        let path = repo.resolver().resolve(&result.bookmarks[0]).unwrap();
        assert!(!path.exists());
    }
}
