//! # Sync Manifest (`summary.json`)
//!
//! Each repository directory carries one manifest describing the snapshot that
//! was last committed: git branch and remote, aggregate counts, the client that
//! wrote it, and a checksum.
//!
//! ```json
//! {
//!   "git_branch": "main",
//!   "git_remote": "git@example.com:me/marks.git",
//!   "last_sync": "2026-10-19T08:15:00+00:00",
//!   "conflict_resolution": "checksum",
//!   "hash_algorithm": "sha256",
//!   "stats": { "dbname": "bookmarks", "bookmarks": 120, "tags": 31, "favorites": 4 },
//!   "client_info": { "hostname": "laptop", "platform": "linux", "architecture": "x86_64", "app_version": "0.3.0" },
//!   "checksum": "…"
//! }
//! ```
//!
//! ## Checksum
//!
//! SHA-256 over every field except `last_sync` and `checksum` itself. Two
//! manifests generated from the same state therefore share a checksum no matter
//! when they were generated.
//!
//! ## Persisted vs Live
//!
//! The file on disk is the *last committed* truth. A manifest computed from the
//! current store and git state is the *current local* truth. The two are kept
//! apart at the API level (`Repository::last_synced` vs `Repository::summary`);
//! [`SyncManifest::drift`] reports how they differ.

use crate::digest::{sha256_hex, HASH_ALGORITHM};
use crate::error::{MarksError, Result};
use crate::store::{BookmarkStore, Table};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use uuid::Uuid;

pub const MANIFEST_FILE: &str = "summary.json";

/// The only resolution policy implemented: compare record checksums, the
/// differing writer wins.
pub const CONFLICT_RESOLUTION: &str = "checksum";

static HOSTNAME: Lazy<String> = Lazy::new(detect_hostname);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoStats {
    #[serde(rename = "dbname")]
    pub name: String,
    pub bookmarks: usize,
    pub tags: usize,
    pub favorites: usize,
}

impl RepoStats {
    pub fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            bookmarks: 0,
            tags: 0,
            favorites: 0,
        }
    }

    pub fn collect<S: BookmarkStore + ?Sized>(store: &S) -> Result<Self> {
        Ok(Self {
            name: store.name().to_string(),
            bookmarks: store.count(Table::Bookmarks)?,
            tags: store.count(Table::Tags)?,
            favorites: store.count(Table::Favorites)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub hostname: String,
    pub platform: String,
    pub architecture: String,
    pub app_version: String,
}

impl ClientInfo {
    pub fn current() -> Self {
        Self {
            hostname: HOSTNAME.clone(),
            platform: std::env::consts::OS.to_string(),
            architecture: std::env::consts::ARCH.to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

fn detect_hostname() -> String {
    if let Ok(name) = std::env::var("HOSTNAME") {
        if !name.trim().is_empty() {
            return name.trim().to_string();
        }
    }
    std::process::Command::new("hostname")
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncManifest {
    pub git_branch: String,
    #[serde(default)]
    pub git_remote: String,
    #[serde(default)]
    pub last_sync: String,
    pub conflict_resolution: String,
    pub hash_algorithm: String,
    pub stats: RepoStats,
    pub client_info: ClientInfo,
    pub checksum: String,
}

#[derive(Serialize)]
struct ChecksumView<'a> {
    git_branch: &'a str,
    git_remote: &'a str,
    conflict_resolution: &'a str,
    hash_algorithm: &'a str,
    stats: &'a RepoStats,
    client_info: &'a ClientInfo,
}

/// One field that differs between two manifests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Drift {
    pub field: &'static str,
    pub recorded: String,
    pub current: String,
}

impl SyncManifest {
    pub fn new(stats: RepoStats, branch: &str, remote: &str, client_info: ClientInfo) -> Self {
        let mut manifest = Self {
            git_branch: branch.to_string(),
            git_remote: remote.to_string(),
            last_sync: String::new(),
            conflict_resolution: CONFLICT_RESOLUTION.to_string(),
            hash_algorithm: HASH_ALGORITHM.to_string(),
            stats,
            client_info,
            checksum: String::new(),
        };
        manifest.seal();
        manifest
    }

    pub fn compute_checksum(&self) -> String {
        let view = ChecksumView {
            git_branch: &self.git_branch,
            git_remote: &self.git_remote,
            conflict_resolution: &self.conflict_resolution,
            hash_algorithm: &self.hash_algorithm,
            stats: &self.stats,
            client_info: &self.client_info,
        };
        // Strings and integers only; serialization cannot fail.
        let bytes = serde_json::to_vec(&view).unwrap_or_default();
        sha256_hex(&bytes)
    }

    pub fn seal(&mut self) {
        self.checksum = self.compute_checksum();
    }

    pub fn verify(&self) -> bool {
        self.checksum == self.compute_checksum()
    }

    pub fn stamp(&mut self, at: DateTime<Utc>) {
        self.last_sync = at.to_rfc3339();
    }

    pub fn last_sync_time(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.last_sync)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    /// `Ok(None)` when the file does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(MarksError::Io)?;
        let manifest: SyncManifest = serde_json::from_str(&content).map_err(|source| MarksError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        if !manifest.verify() {
            tracing::warn!(path = %path.display(), "manifest checksum does not match its content");
        }
        Ok(Some(manifest))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = path
            .parent()
            .ok_or_else(|| MarksError::Store(format!("invalid path: {}", path.display())))?;
        fs::create_dir_all(dir).map_err(MarksError::Io)?;

        let mut content = serde_json::to_string_pretty(self).map_err(MarksError::Serialization)?;
        content.push('\n');

        // Atomic write
        let tmp = dir.join(format!(".summary-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp, content).map_err(MarksError::Io)?;
        fs::rename(&tmp, path).map_err(MarksError::Io)?;
        Ok(())
    }

    /// Fields where `current` no longer matches `self`. Client info and the
    /// sync timestamp are expected to vary and are not reported.
    pub fn drift(&self, current: &SyncManifest) -> Vec<Drift> {
        let mut drift = Vec::new();
        let mut check = |field: &'static str, recorded: String, now: String| {
            if recorded != now {
                drift.push(Drift {
                    field,
                    recorded,
                    current: now,
                });
            }
        };
        check("git_branch", self.git_branch.clone(), current.git_branch.clone());
        check("git_remote", self.git_remote.clone(), current.git_remote.clone());
        check(
            "stats.bookmarks",
            self.stats.bookmarks.to_string(),
            current.stats.bookmarks.to_string(),
        );
        check(
            "stats.tags",
            self.stats.tags.to_string(),
            current.stats.tags.to_string(),
        );
        check(
            "stats.favorites",
            self.stats.favorites.to_string(),
            current.stats.favorites.to_string(),
        );
        drift
    }
}
