//! # Version Control
//!
//! marks never implements version control itself. The [`Vcs`] trait lists the
//! handful of operations the repository layer needs, and [`GitCli`] fulfils
//! them by running the `git` binary.
//!
//! Every call takes the working-tree root explicitly; nothing depends on the
//! process's current directory. A non-zero exit is surfaced as
//! [`MarksError::Command`] carrying git's stderr.
//!
//! ## Status Summaries
//!
//! Commit messages embed a short summary of what changed, built from
//! `git status --porcelain`:
//!
//! ```text
//! 2 added, 1 modified
//! 1 deleted
//! no changes
//! ```

use crate::error::{MarksError, Result};
use std::path::Path;
use std::process::Command;

pub trait Vcs {
    /// Create an empty repository at `root`, creating the directory if needed.
    fn init(&self, root: &Path) -> Result<()>;

    /// Stage every change (additions, edits, deletions) under `pathspec`.
    fn add_all(&self, root: &Path, pathspec: &str) -> Result<()>;

    fn commit(&self, root: &Path, message: &str) -> Result<()>;

    /// Short human summary of pending changes under `pathspec`.
    fn status(&self, root: &Path, pathspec: &str) -> Result<String>;

    fn branch(&self, root: &Path) -> Result<String>;

    /// URL of the `origin` remote, empty when none is configured.
    fn remote(&self, root: &Path) -> Result<String>;

    fn has_changes(&self, root: &Path, pathspec: &str) -> Result<bool>;

    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()>;

    fn push(&self, root: &Path) -> Result<()>;
}

pub fn is_repo(root: &Path) -> bool {
    root.join(".git").exists()
}

#[derive(Debug, Default)]
struct StatusCounts {
    added: usize,
    modified: usize,
    deleted: usize,
}

/// Collapse `git status --porcelain` output into the summary line.
pub fn summarize_porcelain(porcelain: &str) -> String {
    let mut counts = StatusCounts::default();
    for line in porcelain.lines().filter(|l| l.len() >= 2) {
        let code = &line[..2];
        if code == "??" || code.contains('A') {
            counts.added += 1;
        } else if code.contains('D') {
            counts.deleted += 1;
        } else {
            counts.modified += 1;
        }
    }

    let parts: Vec<String> = [
        (counts.added, "added"),
        (counts.modified, "modified"),
        (counts.deleted, "deleted"),
    ]
    .iter()
    .filter(|(n, _)| *n > 0)
    .map(|(n, label)| format!("{} {}", n, label))
    .collect();

    if parts.is_empty() {
        "no changes".to_string()
    } else {
        parts.join(", ")
    }
}

/// [`Vcs`] backed by the git command-line tool.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new("git")
    }
}

impl GitCli {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn run(&self, root: Option<&Path>, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new(&self.program);
        if let Some(root) = root {
            cmd.current_dir(root);
        }
        let output = cmd.args(args).output().map_err(MarksError::Io)?;
        if !output.status.success() {
            return Err(MarksError::Command {
                program: self.program.clone(),
                args: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        tracing::debug!(program = %self.program, args = %args.join(" "), "git ok");
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl Vcs for GitCli {
    fn init(&self, root: &Path) -> Result<()> {
        std::fs::create_dir_all(root).map_err(MarksError::Io)?;
        self.run(Some(root), &["init", "--quiet"])?;
        Ok(())
    }

    fn add_all(&self, root: &Path, pathspec: &str) -> Result<()> {
        self.run(Some(root), &["add", "--all", "--", pathspec])?;
        Ok(())
    }

    fn commit(&self, root: &Path, message: &str) -> Result<()> {
        self.run(Some(root), &["commit", "--quiet", "-m", message])?;
        Ok(())
    }

    fn status(&self, root: &Path, pathspec: &str) -> Result<String> {
        let out = self.run(
            Some(root),
            &["status", "--porcelain", "--untracked-files=all", "--", pathspec],
        )?;
        Ok(summarize_porcelain(&out))
    }

    fn branch(&self, root: &Path) -> Result<String> {
        // symbolic-ref works before the first commit, unlike rev-parse.
        let out = self.run(Some(root), &["symbolic-ref", "--short", "HEAD"])?;
        Ok(out.trim().to_string())
    }

    fn remote(&self, root: &Path) -> Result<String> {
        match self.run(Some(root), &["remote", "get-url", "origin"]) {
            Ok(out) => Ok(out.trim().to_string()),
            Err(MarksError::Command { .. }) => Ok(String::new()),
            Err(err) => Err(err),
        }
    }

    fn has_changes(&self, root: &Path, pathspec: &str) -> Result<bool> {
        let out = self.run(
            Some(root),
            &["status", "--porcelain", "--untracked-files=all", "--", pathspec],
        )?;
        Ok(!out.trim().is_empty())
    }

    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()> {
        let dest_str = dest.to_string_lossy().to_string();
        self.run(None, &["clone", "--quiet", url, dest_str.as_str()])?;
        Ok(())
    }

    fn push(&self, root: &Path) -> Result<()> {
        self.run(Some(root), &["push", "--quiet"])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_empty() {
        assert_eq!(summarize_porcelain(""), "no changes");
    }

    #[test]
    fn test_summary_counts_each_kind() {
        let porcelain = "?? bookmarks/a.com/1.json\n\
                         A  bookmarks/b.com/2.json\n\
                         \x20M bookmarks/summary.json\n\
                         \x20D bookmarks/c.com/3.json\n";
        assert_eq!(summarize_porcelain(porcelain), "2 added, 1 modified, 1 deleted");
    }

    #[test]
    fn test_summary_omits_zero_counts() {
        assert_eq!(summarize_porcelain(" D x.json\n D y.json\n"), "2 deleted");
    }

    #[test]
    fn test_missing_program_is_io_error() {
        let git = GitCli::new("marks-no-such-git-binary");
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(git.branch(dir.path()), Err(MarksError::Io(_))));
    }

    #[test]
    fn test_is_repo() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!is_repo(dir.path()));
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        assert!(is_repo(dir.path()));
    }
}
