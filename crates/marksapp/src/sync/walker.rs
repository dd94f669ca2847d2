//! # Bulk Loading
//!
//! [`BulkWalker::load_all`] reads every record file under a repository root.
//!
//! ## Scheduling
//!
//! The directory walk itself is sequential (`walkdir`, sorted by file name). Each
//! candidate file is dispatched as an independent task onto a bounded rayon pool
//! (2× available parallelism by default), so reading, decrypting and parsing
//! run in parallel while the walk keeps enumerating. The walk only blocks at the
//! end of the scope, when every dispatched task has finished.
//!
//! ## Encrypted Repositories: Warm-up, then Fan-out
//!
//! Decryption may need a passphrase. Two phases, in this order:
//!
//! 1. **Warm-up**: the first candidate is decrypted alone on the calling thread.
//!    This is the only call allowed to prompt. If it fails, loading stops here.
//! 2. **Fan-out**: every remaining file is dispatched concurrently, relying on
//!    the gpg agent having cached the secret during phase 1.
//!
//! Running phase 2 without phase 1 would have N workers race on the same prompt.
//!
//! ## Failures
//!
//! A failed load does not stop the others. The first error to reach the
//! [`FirstError`] cell is kept, in-flight work drains, and that error is returned
//! instead of the (incomplete) record list. "First" means first to take the
//! lock, not first in wall-clock time.
//!
//! ## Shared State
//!
//! Results are appended under a mutex held only for the push, never across I/O.
//! Completion order is unspecified; callers must not rely on walk order.

use super::codec::RecordCodec;
use super::manifest::MANIFEST_FILE;
use crate::error::{MarksError, Result};
use crate::model::Bookmark;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use walkdir::{DirEntry, WalkDir};

/// Default pool size: twice the available parallelism.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        * 2
}

/// Keeps the first error recorded across concurrent workers.
#[derive(Default)]
pub struct FirstError {
    slot: Mutex<Option<MarksError>>,
}

impl FirstError {
    /// Returns true if this call set the error.
    pub fn record(&self, err: MarksError) -> bool {
        let mut slot = self.slot.lock();
        if slot.is_none() {
            *slot = Some(err);
            true
        } else {
            tracing::debug!(error = %err, "additional load failure suppressed");
            false
        }
    }

    pub fn is_set(&self) -> bool {
        self.slot.lock().is_some()
    }

    pub fn into_result(self) -> Result<()> {
        match self.slot.into_inner() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Record files under `root` whose names end in `ext`, in walk order.
/// Hidden entries and the manifest are skipped.
pub fn record_files(root: &Path, ext: &str) -> impl Iterator<Item = Result<PathBuf>> {
    let ext = ext.to_string();
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry))
        .filter_map(move |entry| match entry {
            Ok(entry) => {
                let is_candidate = entry.file_type().is_file()
                    && entry.file_name() != MANIFEST_FILE
                    && entry.file_name().to_string_lossy().ends_with(&ext);
                is_candidate.then(|| Ok(entry.into_path()))
            }
            Err(err) => Some(Err(MarksError::Walk(err))),
        })
}

/// Whether any readable record file ending in `ext` exists under `root`.
pub fn holds_records(root: &Path, ext: &str) -> bool {
    record_files(root, ext).any(|file| file.is_ok())
}

type Progress<'a> = &'a (dyn Fn(usize) + Sync);

pub struct BulkWalker<'a> {
    codec: RecordCodec<'a>,
    workers: usize,
    progress: Option<Progress<'a>>,
}

impl<'a> BulkWalker<'a> {
    pub fn new(codec: RecordCodec<'a>) -> Self {
        Self {
            codec,
            workers: default_workers(),
            progress: None,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Called with the running count after each successful load.
    pub fn on_progress(mut self, progress: Progress<'a>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Record files under `root` matching the codec's extension.
    pub fn candidates(&self, root: &Path) -> impl Iterator<Item = Result<PathBuf>> + '_ {
        record_files(root, self.codec.extension())
    }

    pub fn load_all(&self, root: &Path) -> Result<Vec<Bookmark>> {
        if !root.is_dir() {
            return Err(MarksError::RepoNotFound(root.to_path_buf()));
        }

        let results = Mutex::new(Vec::new());
        let loaded = AtomicUsize::new(0);
        let first_error = FirstError::default();
        let mut files = self.candidates(root);

        if self.codec.is_encrypted() {
            match files.next() {
                Some(first) => {
                    let bookmark = self.codec.read(&first?)?;
                    results.lock().push(bookmark);
                    self.report(&loaded);
                }
                None => return Ok(Vec::new()),
            }
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("marks-load-{}", i))
            .build()?;

        pool.scope(|scope| {
            for candidate in files {
                let path = match candidate {
                    Ok(path) => path,
                    Err(err) => {
                        first_error.record(err);
                        break;
                    }
                };
                let (results, loaded, first_error) = (&results, &loaded, &first_error);
                scope.spawn(move |_| match self.codec.read(&path) {
                    Ok(bookmark) => {
                        results.lock().push(bookmark);
                        self.report(loaded);
                    }
                    Err(err) => {
                        tracing::debug!(path = %path.display(), error = %err, "load failed");
                        first_error.record(err);
                    }
                });
            }
        });

        first_error.into_result()?;
        let records = results.into_inner();
        tracing::info!(count = records.len(), root = %root.display(), "loaded records");
        Ok(records)
    }

    fn report(&self, loaded: &AtomicUsize) {
        let count = loaded.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(progress) = self.progress {
            progress(count);
        }
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}
