//! # Repository: One Database, Mirrored
//!
//! A [`Repository`] ties one bookmark database to its directory under the git
//! root (`<git-root>/<db-name>/`) and owns everything needed to keep the two in
//! step: path resolution, the record codec, conflict resolution, the bulk
//! walker, the tracker and the manifest. Version control itself is delegated
//! to a [`Vcs`].
//!
//! ## Write Path
//!
//! ```text
//! Bookmark ─▶ PathResolver ─▶ ConflictResolver ─▶ RecordCodec (+ Encryptor) ─▶ file
//! ```
//!
//! [`Repository::export`] writes the first record for each path in parallel on a
//! bounded pool. Paths are content-addressed, so no two tasks ever target the
//! same file. Any later record resolving to an already-seen path is applied
//! sequentially afterwards, which turns exact duplicates into skips.
//!
//! A failed write fails the whole export, but files already written stay on
//! disk. Re-running is cheap: unchanged records are skipped.
//!
//! ## Read Path
//!
//! ```text
//! file ─▶ BulkWalker ─▶ RecordCodec (verify) ─▶ dedup ─▶ BookmarkStore
//! ```
//!
//! ## Sessions
//!
//! When the git root carries a key marker, each bulk operation opens one
//! [`GpgSession`] and lends it to the codec for the duration of the call.
//! Nothing about the session outlives the operation.
//!
//! ## Last Synced vs Current
//!
//! - [`Repository::last_synced`]: the persisted `summary.json`, written at the
//!   last commit.
//! - [`Repository::summary`]: recomputed from the store and git right now.
//! - [`Repository::drift`]: the fields where the two disagree.

use crate::error::{MarksError, Result};
use crate::model::Bookmark;
use crate::store::BookmarkStore;
use crate::sync::codec::RecordCodec;
use crate::sync::conflict::{ConflictResolver, WriteDecision};
use crate::sync::crypto::{self, Encryptor, GpgSession, GPG_EXT, KEY_MARKER};
use crate::sync::dedup;
use crate::sync::manifest::{ClientInfo, Drift, RepoStats, SyncManifest, MANIFEST_FILE};
use crate::sync::paths::{PathResolver, JSON_EXT};
use crate::sync::tracker::{repo_id, RepositoryTracker};
use crate::sync::walker::{default_workers, holds_records, BulkWalker, FirstError};
use crate::vcs::{self, Vcs};
use chrono::Utc;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    pub written: usize,
    pub skipped: usize,
}

impl ExportReport {
    fn count(&mut self, decision: WriteDecision) {
        match decision {
            WriteDecision::Write => self.written += 1,
            WriteDecision::Skip => self.skipped += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Records read from the repository.
    pub found: usize,
    pub imported: usize,
    /// Records dropped because their URL was already stored or repeated.
    pub duplicates: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed {
        message: String,
        manifest: SyncManifest,
    },
    NothingToCommit,
}

enum Session<'a> {
    Plain,
    Shared(&'a dyn Encryptor),
    Gpg(GpgSession),
}

impl Session<'_> {
    fn codec(&self) -> RecordCodec<'_> {
        match self {
            Session::Plain => RecordCodec::plain(),
            Session::Shared(cipher) => RecordCodec::encrypted(*cipher),
            Session::Gpg(gpg) => RecordCodec::encrypted(gpg),
        }
    }
}

pub type ProgressFn = dyn Fn(usize) + Sync;

pub struct Repository<V: Vcs> {
    name: String,
    db_path: PathBuf,
    git_root: PathBuf,
    vcs: V,
    tracker: RepositoryTracker,
    workers: usize,
    gpg_program: String,
    cipher: Option<Box<dyn Encryptor>>,
    progress: Option<Box<ProgressFn>>,
}

impl<V: Vcs> Repository<V> {
    pub fn new(name: &str, db_path: &Path, git_root: &Path, vcs: V) -> Self {
        Self {
            name: name.to_string(),
            db_path: db_path.to_path_buf(),
            git_root: git_root.to_path_buf(),
            vcs,
            tracker: RepositoryTracker::new(git_root),
            workers: default_workers(),
            gpg_program: "gpg".to_string(),
            cipher: None,
            progress: None,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_gpg_program(mut self, program: &str) -> Self {
        self.gpg_program = program.to_string();
        self
    }

    /// Use `cipher` for every record instead of a gpg session.
    pub fn with_encryptor(mut self, cipher: Box<dyn Encryptor>) -> Self {
        self.cipher = Some(cipher);
        self
    }

    /// Called with a running count during bulk loads and exports.
    pub fn with_progress(mut self, progress: Box<ProgressFn>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn git_root(&self) -> &Path {
        &self.git_root
    }

    pub fn vcs(&self) -> &V {
        &self.vcs
    }

    /// `<git-root>/<db-name>`
    pub fn loc(&self) -> PathBuf {
        self.git_root.join(&self.name)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.loc().join(MANIFEST_FILE)
    }

    pub fn id(&self) -> String {
        repo_id(&self.db_path)
    }

    pub fn is_encrypted(&self) -> bool {
        self.cipher.is_some() || crypto::is_encrypted(&self.git_root)
    }

    pub fn is_initialized(&self) -> bool {
        vcs::is_repo(&self.git_root)
    }

    pub fn ensure_initialized(&self) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(MarksError::RepoNotInitialized(self.git_root.clone()))
        }
    }

    fn extension(&self) -> &str {
        match &self.cipher {
            Some(cipher) => cipher.extension(),
            None if crypto::is_encrypted(&self.git_root) => GPG_EXT,
            None => JSON_EXT,
        }
    }

    pub fn resolver(&self) -> PathResolver {
        PathResolver::new(&self.loc(), self.extension())
    }

    fn session(&self) -> Result<Session<'_>> {
        if let Some(cipher) = &self.cipher {
            return Ok(Session::Shared(cipher.as_ref()));
        }
        if crypto::is_encrypted(&self.git_root) {
            let gpg = GpgSession::open(&self.git_root, &self.gpg_program)?;
            tracing::debug!(recipients = gpg.recipients().len(), "gpg session opened");
            return Ok(Session::Gpg(gpg));
        }
        // `.gpg` records with no marker: never read or write them as plaintext.
        let loc = self.loc();
        if holds_records(&loc, GPG_EXT) {
            return Err(MarksError::Encryption(format!(
                "{} holds encrypted records but {} is missing",
                loc.display(),
                crypto::key_marker_path(&self.git_root).display()
            )));
        }
        Ok(Session::Plain)
    }

    /// Create the git repository, and the key marker when `recipients` is
    /// non-empty. Already-initialized roots are left as they are.
    ///
    /// The marker switches every repository under the git root, so it is
    /// refused while any of them still holds plaintext records. Once written it
    /// is staged, so clones see the same mode.
    pub fn init(&self, recipients: &[String]) -> Result<()> {
        if !self.is_initialized() {
            self.vcs.init(&self.git_root)?;
            tracing::info!(root = %self.git_root.display(), "initialized git repository");
        }
        if recipients.is_empty() {
            return Ok(());
        }

        if holds_records(&self.git_root, JSON_EXT) {
            return Err(MarksError::Encryption(format!(
                "{} already holds plaintext records",
                self.git_root.display()
            )));
        }
        crypto::init_key_marker(&self.git_root, recipients)?;
        self.vcs.add_all(&self.git_root, KEY_MARKER)
    }

    /// Clone `url` into `git_root`, which must be missing or empty.
    pub fn clone_into(vcs: &V, url: &str, git_root: &Path) -> Result<()> {
        if git_root.exists() {
            let occupied = fs::read_dir(git_root)
                .map_err(MarksError::Io)?
                .next()
                .is_some();
            if occupied {
                return Err(MarksError::Store(format!(
                    "destination is not empty: {}",
                    git_root.display()
                )));
            }
        }
        vcs.clone_repo(url, git_root)?;
        tracing::info!(url, root = %git_root.display(), "cloned");
        Ok(())
    }

    pub fn export(&self, records: &[Bookmark], force: bool) -> Result<ExportReport> {
        self.ensure_initialized()?;
        let session = self.session()?;
        let codec = session.codec();
        let resolver = PathResolver::new(&self.loc(), codec.extension());
        let conflicts = ConflictResolver::new(codec);

        let mut seen = HashSet::new();
        let mut first: Vec<(PathBuf, &Bookmark)> = Vec::new();
        let mut repeated = Vec::new();
        for record in records {
            let path = resolver.resolve(record)?;
            if seen.insert(path.clone()) {
                first.push((path, record));
            } else {
                repeated.push((path, record));
            }
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("marks-export-{}", i))
            .build()?;

        let done = AtomicUsize::new(0);
        let progress = self.progress.as_deref();

        // Comparing against an existing encrypted file decrypts it. Do one on
        // this thread before fanning out so only that call can prompt.
        let mut decisions = Vec::with_capacity(first.len());
        if codec.is_encrypted() && !force {
            if let Some(at) = first.iter().position(|(path, _)| path.exists()) {
                let (path, record) = first.remove(at);
                decisions.push(conflicts.apply(&path, record, force)?);
                tick(&done, progress);
            }
        }

        let first_error = FirstError::default();
        let fanned_out: Vec<WriteDecision> = pool.install(|| {
            first
                .par_iter()
                .filter_map(|(path, record)| match conflicts.apply(path, record, force) {
                    Ok(decision) => {
                        tick(&done, progress);
                        Some(decision)
                    }
                    Err(err) => {
                        tracing::debug!(url = %record.url, error = %err, "export failed");
                        first_error.record(err);
                        None
                    }
                })
                .collect()
        });
        first_error.into_result()?;
        decisions.extend(fanned_out);

        let mut report = ExportReport::default();
        for decision in decisions {
            report.count(decision);
        }
        for (path, record) in repeated {
            report.count(conflicts.apply(&path, record, force)?);
            tick(&done, progress);
        }

        tracing::info!(
            repo = %self.name,
            written = report.written,
            skipped = report.skipped,
            "export finished"
        );
        Ok(report)
    }

    /// Mirror a single record.
    pub fn store_one(&self, record: &Bookmark, force: bool) -> Result<WriteDecision> {
        self.ensure_initialized()?;
        let session = self.session()?;
        let codec = session.codec();
        let path = PathResolver::new(&self.loc(), codec.extension()).resolve(record)?;
        ConflictResolver::new(codec).apply(&path, record, force)
    }

    /// Delete a record's file, and its domain directory once empty. Returns
    /// whether a file was removed.
    pub fn remove(&self, record: &Bookmark) -> Result<bool> {
        self.ensure_initialized()?;
        let path = self.resolver().resolve(record)?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(MarksError::Io)?;
        if let Some(dir) = path.parent() {
            let empty = fs::read_dir(dir).map_err(MarksError::Io)?.next().is_none();
            if empty {
                fs::remove_dir(dir).map_err(MarksError::Io)?;
            }
        }
        tracing::debug!(url = %record.url, "removed from repository");
        Ok(true)
    }

    pub fn load(&self) -> Result<Vec<Bookmark>> {
        let session = self.session()?;
        let mut walker = BulkWalker::new(session.codec()).with_workers(self.workers);
        if let Some(progress) = self.progress.as_deref() {
            walker = walker.on_progress(progress);
        }
        walker.load_all(&self.loc())
    }

    /// Load every record and insert the ones `store` does not already have.
    pub fn import_into<S: BookmarkStore + ?Sized>(&self, store: &mut S) -> Result<ImportReport> {
        let mut records = self.load()?;
        let found = records.len();
        // Load order is unspecified; keep the source's own id order.
        records.sort_by(|a, b| a.id.cmp(&b.id).then_with(|| a.url.cmp(&b.url)));

        let fresh = dedup::filter(store, dedup::unique_by_url(records))?;
        let imported = store.insert_many(fresh)?.len();

        let report = ImportReport {
            found,
            imported,
            duplicates: found - imported,
        };
        tracing::info!(
            repo = %self.name,
            found = report.found,
            imported = report.imported,
            duplicates = report.duplicates,
            "import finished"
        );
        Ok(report)
    }

    /// Delete every record file, reset the manifest stats to zero and stop
    /// tracking. Returns the number of files deleted.
    pub fn drop_files(&mut self) -> Result<usize> {
        let loc = self.loc();
        if !loc.is_dir() {
            return Err(MarksError::RepoNotFound(loc));
        }

        let mut deleted = 0;
        for entry in fs::read_dir(&loc).map_err(MarksError::Io)? {
            let path = entry.map_err(MarksError::Io)?.path();
            let hidden = path
                .file_name()
                .map(|n| n.to_string_lossy().starts_with('.'))
                .unwrap_or(false);
            if !path.is_dir() || hidden {
                continue;
            }
            for file in WalkDir::new(&path) {
                if file?.file_type().is_file() {
                    deleted += 1;
                }
            }
            fs::remove_dir_all(&path).map_err(MarksError::Io)?;
        }

        let mut manifest = match self.last_synced()? {
            Some(existing) => existing,
            None => self.fresh_manifest(RepoStats::empty(&self.name))?,
        };
        manifest.stats = RepoStats::empty(&self.name);
        manifest.seal();
        manifest.save(&self.manifest_path())?;

        self.untrack()?;
        tracing::info!(repo = %self.name, deleted, "dropped repository files");
        Ok(deleted)
    }

    fn fresh_manifest(&self, stats: RepoStats) -> Result<SyncManifest> {
        let branch = self.vcs.branch(&self.git_root)?;
        let remote = self.vcs.remote(&self.git_root)?;
        Ok(SyncManifest::new(stats, &branch, &remote, ClientInfo::current()))
    }

    /// Recompute stats from `store` into the persisted manifest, keeping its
    /// other fields, or create one.
    pub fn write_stats<S: BookmarkStore + ?Sized>(&self, store: &S) -> Result<SyncManifest> {
        let stats = RepoStats::collect(store)?;
        let manifest = match self.last_synced()? {
            Some(mut existing) => {
                existing.stats = stats;
                existing.seal();
                existing
            }
            None => self.fresh_manifest(stats)?,
        };
        manifest.save(&self.manifest_path())?;
        Ok(manifest)
    }

    pub fn commit<S: BookmarkStore + ?Sized>(&self, store: &S, message: &str) -> Result<CommitOutcome> {
        self.ensure_initialized()?;
        let mut manifest = self.write_stats(store)?;
        let encrypted = crypto::is_encrypted(&self.git_root);
        let marker_pending = encrypted && self.vcs.has_changes(&self.git_root, KEY_MARKER)?;

        if !marker_pending && !self.vcs.has_changes(&self.git_root, &self.name)? {
            tracing::info!(repo = %self.name, "nothing to commit");
            return Ok(CommitOutcome::NothingToCommit);
        }

        manifest.git_branch = self.vcs.branch(&self.git_root)?;
        manifest.git_remote = self.vcs.remote(&self.git_root)?;
        manifest.client_info = ClientInfo::current();
        manifest.stamp(Utc::now());
        manifest.seal();
        manifest.save(&self.manifest_path())?;

        self.vcs.add_all(&self.git_root, &self.name)?;
        if encrypted {
            self.vcs.add_all(&self.git_root, KEY_MARKER)?;
        }
        let status = self.vcs.status(&self.git_root, &self.name)?;
        let message = format!("[{}] {} ({})", self.name, message, status);
        self.vcs.commit(&self.git_root, &message)?;

        tracing::info!(repo = %self.name, %message, "committed");
        Ok(CommitOutcome::Committed { message, manifest })
    }

    pub fn push(&self) -> Result<()> {
        self.ensure_initialized()?;
        self.vcs.push(&self.git_root)
    }

    /// The manifest as of the last commit.
    pub fn last_synced(&self) -> Result<Option<SyncManifest>> {
        SyncManifest::load(&self.manifest_path())
    }

    /// The manifest as it would be written right now. Nothing is saved.
    pub fn summary<S: BookmarkStore + ?Sized>(&self, store: &S) -> Result<SyncManifest> {
        self.ensure_initialized()?;
        let mut manifest = self.fresh_manifest(RepoStats::collect(store)?)?;
        if let Some(last) = self.last_synced()? {
            manifest.last_sync = last.last_sync;
        }
        Ok(manifest)
    }

    /// `None` when the repository has never been committed.
    pub fn drift<S: BookmarkStore + ?Sized>(&self, store: &S) -> Result<Option<Vec<Drift>>> {
        let Some(last) = self.last_synced()? else {
            return Ok(None);
        };
        let current = self.summary(store)?;
        Ok(Some(last.drift(&current)))
    }

    pub fn track(&mut self) -> Result<()> {
        let id = self.id();
        self.tracker.load()?;
        self.tracker.track(&id)?;
        self.tracker.save()
    }

    pub fn untrack(&mut self) -> Result<()> {
        let id = self.id();
        self.tracker.load()?;
        self.tracker.untrack(&id)?;
        self.tracker.save()
    }

    pub fn is_tracked(&mut self) -> Result<bool> {
        let id = self.id();
        self.tracker.load()?;
        self.tracker.contains(&id)
    }
}

fn tick(done: &AtomicUsize, progress: Option<&ProgressFn>) {
    let count = done.fetch_add(1, Ordering::SeqCst) + 1;
    if let Some(progress) = progress {
        progress(count);
    }
}
