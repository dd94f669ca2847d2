//! # marks Architecture
//!
//! marks is a **UI-agnostic bookmark library** with a git-synchronized mirror.
//! Bookmarks live in a database; every database can also be mirrored into a
//! directory of one-file-per-bookmark JSON documents inside a git repository,
//! so that bookmarks travel between machines through ordinary `git push` and
//! `git pull`, optionally encrypted at rest.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI (crates/marks)                                         │
//! │  - Parses arguments, renders CmdResult, owns stdout/stderr  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - One function per subcommand, returns CmdResult           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!               ┌──────────────┴──────────────┐
//!               ▼                             ▼
//! ┌───────────────────────────┐ ┌───────────────────────────────┐
//! │  Storage (store/)         │ │  Repository (repo.rs)         │
//! │  - BookmarkStore trait    │ │  - sync/* engine + Vcs        │
//! │  - JsonStore, InMemory    │ │  - export, import, commit     │
//! └───────────────────────────┘ └───────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! Nothing in this crate writes to stdout/stderr or exits the process. Library
//! code reports through `tracing` events and never installs a subscriber.
//!
//! ## Module Overview
//!
//! - [`commands`]: Business logic for each command
//! - [`repo`]: The mirror of one database, composing the [`sync`] engine
//! - [`sync`]: Paths, codec, conflicts, bulk loading, dedup, tracker, manifest
//! - [`store`]: Database abstraction and implementations
//! - [`vcs`]: Version-control collaborator (`git` binary)
//! - [`model`]: The `Bookmark` record and its checksum
//! - [`config`], [`init`]: Configuration and context setup
//! - [`error`]: Error types

pub mod commands;
pub mod config;
pub mod digest;
pub mod error;
pub mod init;
pub mod model;
pub mod repo;
pub mod store;
pub mod sync;
pub mod vcs;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
