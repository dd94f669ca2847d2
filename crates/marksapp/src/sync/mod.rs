//! # The Git Mirror
//!
//! Every database can be mirrored into a directory of small JSON files that a
//! version-control tool can diff, merge and push. This module holds the pieces
//! of that mirror, leaves first:
//!
//! - [`paths`]: `root/<domain>/<hash(url)><ext>`, a pure function of the URL.
//! - [`codec`]: canonical JSON with an embedded checksum, verified on every read.
//! - [`crypto`]: optional at-rest encryption through an external gpg process.
//! - [`conflict`]: skip or overwrite when a record's file already exists.
//! - [`walker`]: bounded parallel loading of a whole repository.
//! - [`dedup`]: dropping incoming records whose URL is already stored.
//! - [`tracker`]: which repositories take part in sync.
//! - [`manifest`]: the `summary.json` written on every commit.
//!
//! [`crate::repo::Repository`] composes them.
//!
//! ## On-Disk Layout
//!
//! ```text
//! <git-root>/
//! ├── .git/
//! ├── .gpg-id                      # present only in encrypted mode
//! ├── .tracked.json                # tracked repository ids
//! └── <db-name>/
//!     ├── summary.json
//!     └── <domain>/
//!         └── <url-hash>.json      # or .gpg
//! ```

pub mod codec;
pub mod conflict;
pub mod crypto;
pub mod dedup;
pub mod manifest;
pub mod paths;
pub mod tracker;
pub mod walker;
