use crate::error::{MarksError, Result};
use crate::repo::Repository;
use crate::sync::crypto::Encryptor;
use crate::vcs::Vcs;
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub struct TestEnv {
    // We keep _temp_dir to ensure the directory is not dropped until the test is done
    pub _temp_dir: TempDir,
    data_dir: PathBuf,
    git_root: PathBuf,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let data_dir = temp_dir.path().join("data");
        let git_root = temp_dir.path().join("git");
        fs::create_dir_all(&data_dir).expect("failed to create data dir");
        Self {
            _temp_dir: temp_dir,
            data_dir,
            git_root,
        }
    }

    /// A git root that already looks like a repository.
    pub fn initialized() -> Self {
        let env = Self::new();
        fs::create_dir_all(env.git_root.join(".git")).expect("failed to create .git");
        env
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn git_root(&self) -> &Path {
        &self.git_root
    }

    pub fn db_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", name))
    }

    /// Repository for the default `bookmarks` database.
    pub fn repo<V: Vcs>(&self, vcs: V) -> Repository<V> {
        Repository::new("bookmarks", &self.db_path("bookmarks"), &self.git_root, vcs).with_workers(4)
    }
}

/// In-process [`Vcs`] that records what it was asked to do.
#[derive(Debug, Default)]
pub struct FakeVcs {
    /// Status summary to report; `None` means a clean tree.
    changes: Option<String>,
    commits: Mutex<Vec<String>>,
    staged: Mutex<Vec<String>>,
    pushes: Mutex<usize>,
}

impl FakeVcs {
    pub fn with_changes(status: &str) -> Self {
        Self {
            changes: Some(status.to_string()),
            ..Default::default()
        }
    }

    pub fn commits(&self) -> Vec<String> {
        self.commits.lock().clone()
    }

    pub fn staged(&self) -> Vec<String> {
        self.staged.lock().clone()
    }

    pub fn pushes(&self) -> usize {
        *self.pushes.lock()
    }
}

impl Vcs for FakeVcs {
    fn init(&self, root: &Path) -> Result<()> {
        fs::create_dir_all(root.join(".git")).map_err(MarksError::Io)
    }

    fn add_all(&self, _root: &Path, pathspec: &str) -> Result<()> {
        self.staged.lock().push(pathspec.to_string());
        Ok(())
    }

    fn commit(&self, _root: &Path, message: &str) -> Result<()> {
        self.commits.lock().push(message.to_string());
        Ok(())
    }

    fn status(&self, _root: &Path, _pathspec: &str) -> Result<String> {
        Ok(self.changes.clone().unwrap_or_else(|| "no changes".to_string()))
    }

    fn branch(&self, _root: &Path) -> Result<String> {
        Ok("main".to_string())
    }

    fn remote(&self, _root: &Path) -> Result<String> {
        Ok(String::new())
    }

    fn has_changes(&self, _root: &Path, _pathspec: &str) -> Result<bool> {
        Ok(self.changes.is_some())
    }

    fn clone_repo(&self, _url: &str, dest: &Path) -> Result<()> {
        fs::create_dir_all(dest.join(".git")).map_err(MarksError::Io)
    }

    fn push(&self, _root: &Path) -> Result<()> {
        *self.pushes.lock() += 1;
        Ok(())
    }
}

/// Identity "encryption": writes the plaintext under the encrypted extension.
pub struct PlainCipher;

impl Encryptor for PlainCipher {
    fn encrypt(&self, path: &Path, plaintext: &[u8]) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(MarksError::Io)?;
        }
        fs::write(path, plaintext).map_err(MarksError::Io)
    }

    fn decrypt(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path).map_err(MarksError::Io)
    }

    fn is_initialized(&self, _root: &Path) -> bool {
        true
    }
}

#[derive(Debug, Default)]
struct WarmupState {
    warmed: AtomicBool,
    calls: AtomicUsize,
    early_concurrent_calls: AtomicUsize,
}

/// Identity cipher that records whether any decryption started before the
/// first one finished. The first call lingers so an eager fan-out overlaps it.
/// Clones share their counters.
#[derive(Debug, Clone, Default)]
pub struct WarmupCipher {
    state: Arc<WarmupState>,
}

impl WarmupCipher {
    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    pub fn early_concurrent_calls(&self) -> usize {
        self.state.early_concurrent_calls.load(Ordering::SeqCst)
    }
}

impl Encryptor for WarmupCipher {
    fn encrypt(&self, path: &Path, plaintext: &[u8]) -> Result<()> {
        PlainCipher.encrypt(path, plaintext)
    }

    fn decrypt(&self, path: &Path) -> Result<Vec<u8>> {
        let state = &self.state;
        let call = state.calls.fetch_add(1, Ordering::SeqCst);
        if call > 0 && !state.warmed.load(Ordering::SeqCst) {
            state.early_concurrent_calls.fetch_add(1, Ordering::SeqCst);
        }
        let bytes = fs::read(path).map_err(MarksError::Io)?;
        if call == 0 {
            std::thread::sleep(Duration::from_millis(20));
            state.warmed.store(true, Ordering::SeqCst);
        }
        Ok(bytes)
    }

    fn is_initialized(&self, _root: &Path) -> bool {
        true
    }
}
