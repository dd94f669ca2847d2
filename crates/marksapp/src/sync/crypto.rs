//! # At-Rest Encryption
//!
//! A git root is either plaintext or encrypted, never both. The switch is the
//! key marker file `<git-root>/.gpg-id`: when present, every record file under
//! every repository in that root is written as `<hash>.gpg` and read back by
//! decrypting it.
//!
//! ## Sessions
//!
//! An [`Encryptor`] is created once per bulk operation and lent to the codec and
//! walker. There is no process-wide credential state in marks: the gpg agent
//! caches the passphrase after the first successful decryption, which is why
//! the walker decrypts one file alone before fanning out (see [`super::walker`]).

use crate::error::{MarksError, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use uuid::Uuid;

pub const KEY_MARKER: &str = ".gpg-id";
pub const GPG_EXT: &str = ".gpg";

/// Pluggable wrapping of record payloads on their way to and from disk.
pub trait Encryptor: Send + Sync {
    /// Encrypt `plaintext` into `path`, replacing any existing file.
    fn encrypt(&self, path: &Path, plaintext: &[u8]) -> Result<()>;

    fn decrypt(&self, path: &Path) -> Result<Vec<u8>>;

    /// Whether `root` is set up for this transform.
    fn is_initialized(&self, root: &Path) -> bool;

    fn extension(&self) -> &str {
        GPG_EXT
    }
}

pub fn key_marker_path(git_root: &Path) -> PathBuf {
    git_root.join(KEY_MARKER)
}

pub fn is_encrypted(git_root: &Path) -> bool {
    key_marker_path(git_root).is_file()
}

/// Write the key marker, one recipient per line.
pub fn init_key_marker(git_root: &Path, recipients: &[String]) -> Result<()> {
    let recipients: Vec<&str> = recipients
        .iter()
        .map(|r| r.trim())
        .filter(|r| !r.is_empty())
        .collect();
    if recipients.is_empty() {
        return Err(MarksError::Encryption("no recipients given".to_string()));
    }
    fs::create_dir_all(git_root).map_err(MarksError::Io)?;
    fs::write(key_marker_path(git_root), format!("{}\n", recipients.join("\n")))
        .map_err(MarksError::Io)?;
    Ok(())
}

pub fn read_recipients(git_root: &Path) -> Result<Vec<String>> {
    let marker = key_marker_path(git_root);
    if !marker.is_file() {
        return Err(MarksError::Encryption(format!(
            "key marker not found: {}",
            marker.display()
        )));
    }
    let content = fs::read_to_string(&marker).map_err(MarksError::Io)?;
    let recipients: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(String::from)
        .collect();
    if recipients.is_empty() {
        return Err(MarksError::Encryption(format!(
            "key marker is empty: {}",
            marker.display()
        )));
    }
    Ok(recipients)
}

/// Shells out to a gpg-compatible program.
#[derive(Debug, Clone)]
pub struct GpgSession {
    program: String,
    recipients: Vec<String>,
}

impl GpgSession {
    /// Build a session from the key marker under `git_root`.
    pub fn open(git_root: &Path, program: &str) -> Result<Self> {
        Ok(Self {
            program: program.to_string(),
            recipients: read_recipients(git_root)?,
        })
    }

    pub fn recipients(&self) -> &[String] {
        &self.recipients
    }

    fn failure(&self, args: &[&str], stderr: &[u8]) -> MarksError {
        MarksError::Command {
            program: self.program.clone(),
            args: args.join(" "),
            stderr: String::from_utf8_lossy(stderr).trim().to_string(),
        }
    }
}

impl Encryptor for GpgSession {
    fn encrypt(&self, path: &Path, plaintext: &[u8]) -> Result<()> {
        let dir = path
            .parent()
            .ok_or_else(|| MarksError::Encryption(format!("invalid path: {}", path.display())))?;
        fs::create_dir_all(dir).map_err(MarksError::Io)?;

        let tmp = dir.join(format!(".enc-{}.tmp", Uuid::new_v4()));
        let tmp_str = tmp.to_string_lossy().to_string();

        let mut args = vec!["--quiet", "--batch", "--yes", "--encrypt"];
        for recipient in &self.recipients {
            args.push("--recipient");
            args.push(recipient);
        }
        args.push("--output");
        args.push(&tmp_str);

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(MarksError::Io)?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(plaintext).map_err(MarksError::Io)?;
        }
        let out = child.wait_with_output().map_err(MarksError::Io)?;
        if !out.status.success() {
            let _ = fs::remove_file(&tmp);
            return Err(self.failure(&args, &out.stderr));
        }

        fs::rename(&tmp, path).map_err(MarksError::Io)?;
        Ok(())
    }

    fn decrypt(&self, path: &Path) -> Result<Vec<u8>> {
        let path_str = path.to_string_lossy().to_string();
        let args = ["--quiet", "--decrypt", path_str.as_str()];

        // stdin is inherited so pinentry can prompt on the first call.
        let out = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::inherit())
            .output()
            .map_err(MarksError::Io)?;
        if !out.status.success() {
            return Err(self.failure(&args, &out.stderr));
        }
        Ok(out.stdout)
    }

    fn is_initialized(&self, root: &Path) -> bool {
        is_encrypted(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!is_encrypted(dir.path()));

        init_key_marker(dir.path(), &["alice@example.com".into(), " bob ".into()]).unwrap();
        assert!(is_encrypted(dir.path()));
        assert_eq!(
            read_recipients(dir.path()).unwrap(),
            vec!["alice@example.com", "bob"]
        );
    }

    #[test]
    fn test_marker_requires_recipients() {
        let dir = tempfile::tempdir().unwrap();
        assert!(init_key_marker(dir.path(), &["  ".into()]).is_err());
        assert!(!is_encrypted(dir.path()));
    }

    #[test]
    fn test_session_reads_marker() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(key_marker_path(dir.path()), "# comment\nalice\n\n").unwrap();
        let session = GpgSession::open(dir.path(), "gpg").unwrap();
        assert_eq!(session.recipients(), ["alice".to_string()]);
        assert!(session.is_initialized(dir.path()));
        assert_eq!(session.extension(), ".gpg");
    }

    #[test]
    fn test_session_without_marker_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            GpgSession::open(dir.path(), "gpg"),
            Err(MarksError::Encryption(_))
        ));
    }

    #[test]
    fn test_missing_program_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        init_key_marker(dir.path(), &["alice".into()]).unwrap();
        let session = GpgSession::open(dir.path(), "marks-no-such-gpg-binary").unwrap();
        let err = session.decrypt(&dir.path().join("x.gpg")).unwrap_err();
        assert!(matches!(err, MarksError::Io(_)));
    }
}
