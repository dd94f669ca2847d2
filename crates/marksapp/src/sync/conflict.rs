//! Write-time conflict resolution between a candidate record and whatever
//! already sits at its path.
//!
//! | on disk          | force | decision |
//! |------------------|-------|----------|
//! | missing          | any   | Write    |
//! | same checksum    | false | Skip     |
//! | other checksum   | false | Write    |
//! | corrupt          | false | error    |
//! | anything         | true  | Write    |
//!
//! Last writer with different content wins; there is no merge.

use super::codec::RecordCodec;
use crate::error::Result;
use crate::model::Bookmark;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteDecision {
    Skip,
    Write,
}

#[derive(Clone, Copy)]
pub struct ConflictResolver<'a> {
    codec: RecordCodec<'a>,
}

impl<'a> ConflictResolver<'a> {
    pub fn new(codec: RecordCodec<'a>) -> Self {
        Self { codec }
    }

    pub fn resolve_write(&self, path: &Path, candidate: &Bookmark, force: bool) -> Result<WriteDecision> {
        if force || !path.exists() {
            return Ok(WriteDecision::Write);
        }

        let existing = self.codec.read(path)?;
        if existing.checksum == candidate.compute_checksum() {
            Ok(WriteDecision::Skip)
        } else {
            Ok(WriteDecision::Write)
        }
    }

    /// Resolve, then write if needed.
    pub fn apply(&self, path: &Path, candidate: &Bookmark, force: bool) -> Result<WriteDecision> {
        let decision = self.resolve_write(path, candidate, force)?;
        match decision {
            WriteDecision::Skip => {
                tracing::debug!(url = %candidate.url, "unchanged, skipping");
            }
            WriteDecision::Write => {
                self.codec.write(path, candidate)?;
                tracing::debug!(url = %candidate.url, path = %path.display(), "written");
            }
        }
        Ok(decision)
    }
}
