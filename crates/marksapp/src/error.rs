use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarksError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Checksum mismatch for {url}: stored {stored}, computed {computed}")]
    ChecksumMismatch {
        url: String,
        stored: String,
        computed: String,
    },

    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Repository not found: {0}")]
    RepoNotFound(PathBuf),

    #[error("Repository not initialized: {0}")]
    RepoNotInitialized(PathBuf),

    #[error("Tracker used before load")]
    TrackerNotLoaded,

    #[error("`{program} {args}` failed: {stderr}")]
    Command {
        program: String,
        args: String,
        stderr: String,
    },

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Worker pool error: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl MarksError {
    /// True for errors that mean on-disk data can no longer be trusted.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            MarksError::ChecksumMismatch { .. } | MarksError::Decode { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, MarksError>;
