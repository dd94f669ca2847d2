//! # Command Layer
//!
//! This module contains the business logic behind every `marks` subcommand.
//! Each command lives in its own submodule as a plain function over a
//! [`BookmarkStore`](crate::store::BookmarkStore) and, for git commands, a
//! [`Repository`](crate::repo::Repository).
//!
//! ## What Commands Do NOT Do
//!
//! - **Any terminal I/O**: no stdout, stderr, colors or prompts
//! - **Argument parsing**: that's the CLI layer's job
//! - **Exit codes**: return `Result`, let the caller decide
//!
//! ## Structured Returns
//!
//! Commands return [`CmdResult`], not strings. It carries:
//! - `bookmarks`: records the command listed or changed
//! - `manifest`: a sync manifest, for status
//! - `drift`: differences between the last commit and now, for status
//! - `messages`: leveled messages (info, success, warning, error)
//!
//! ## Command Modules
//!
//! - [`add`], [`remove`], [`list`]: the bookmark database
//! - [`init`], [`clone`]: creating the git root
//! - [`export`], [`import`]: moving records between database and mirror
//! - [`commit`], [`push`], [`status`]: version control
//! - [`track`], [`drop`]: tracking and tearing down mirrors

use crate::model::Bookmark;
use crate::sync::manifest::{Drift, SyncManifest};
use serde::Serialize;

pub mod add;
pub mod clone;
pub mod commit;
pub mod drop;
pub mod export;
pub mod import;
pub mod init;
pub mod list;
pub mod push;
pub mod remove;
pub mod status;
pub mod track;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct CmdResult {
    pub bookmarks: Vec<Bookmark>,
    pub manifest: Option<SyncManifest>,
    pub drift: Option<Vec<Drift>>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_bookmarks(mut self, bookmarks: Vec<Bookmark>) -> Self {
        self.bookmarks = bookmarks;
        self
    }

    pub fn with_manifest(mut self, manifest: SyncManifest) -> Self {
        self.manifest = Some(manifest);
        self
    }

    /// Messages at `level`, for assertions and filtering.
    pub fn messages_at(&self, level: MessageLevel) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|m| m.level == level)
            .map(|m| m.content.as_str())
            .collect()
    }
}
