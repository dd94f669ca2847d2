use marksapp::error::{MarksError, Result};
use marksapp::repo::Repository;
use marksapp::vcs::Vcs;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A [`Vcs`] that never runs git and always reports a dirty tree.
#[derive(Debug, Default)]
pub struct OfflineVcs;

impl Vcs for OfflineVcs {
    fn init(&self, root: &Path) -> Result<()> {
        fs::create_dir_all(root.join(".git")).map_err(MarksError::Io)
    }
    fn add_all(&self, _: &Path, _: &str) -> Result<()> {
        Ok(())
    }
    fn commit(&self, _: &Path, _: &str) -> Result<()> {
        Ok(())
    }
    fn status(&self, _: &Path, _: &str) -> Result<String> {
        Ok("1 modified".to_string())
    }
    fn branch(&self, _: &Path) -> Result<String> {
        Ok("main".to_string())
    }
    fn remote(&self, _: &Path) -> Result<String> {
        Ok(String::new())
    }
    fn has_changes(&self, _: &Path, _: &str) -> Result<bool> {
        Ok(true)
    }
    fn clone_repo(&self, _: &str, dest: &Path) -> Result<()> {
        fs::create_dir_all(dest.join(".git")).map_err(MarksError::Io)
    }
    fn push(&self, _: &Path) -> Result<()> {
        Ok(())
    }
}

pub struct Workspace {
    pub _dir: TempDir,
    pub data_dir: PathBuf,
    pub git_root: PathBuf,
}

pub fn workspace() -> Workspace {
    let dir = TempDir::new().unwrap();
    let data_dir = dir.path().join("data");
    let git_root = dir.path().join("git");
    fs::create_dir_all(&data_dir).unwrap();
    fs::create_dir_all(git_root.join(".git")).unwrap();
    Workspace {
        _dir: dir,
        data_dir,
        git_root,
    }
}

impl Workspace {
    pub fn repo(&self, name: &str) -> Repository<OfflineVcs> {
        Repository::new(
            name,
            &self.data_dir.join(format!("{}.json", name)),
            &self.git_root,
            OfflineVcs,
        )
        .with_workers(4)
    }
}
