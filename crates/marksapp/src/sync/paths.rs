//! Content-addressed paths: `root/<domain>/<hash(url)><ext>`.

use crate::digest::short_hash;
use crate::error::{MarksError, Result};
use crate::model::Bookmark;
use std::path::{Path, PathBuf};
use url::{ParseError, Url};

/// Hex digits of the URL hash used as the file stem (128 bits).
pub const URL_HASH_LEN: usize = 32;

pub const JSON_EXT: &str = ".json";

/// Maps bookmarks to their single on-disk location inside one repository.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
    ext: String,
}

impl PathResolver {
    pub fn new(root: &Path, ext: &str) -> Self {
        let ext = if ext.starts_with('.') {
            ext.to_string()
        } else {
            format!(".{}", ext)
        };
        Self {
            root: root.to_path_buf(),
            ext,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ext(&self) -> &str {
        &self.ext
    }

    pub fn resolve(&self, bookmark: &Bookmark) -> Result<PathBuf> {
        self.resolve_url(&bookmark.url)
    }

    pub fn resolve_url(&self, url: &str) -> Result<PathBuf> {
        let domain = domain_of(url)?;
        Ok(self
            .root
            .join(domain)
            .join(format!("{}{}", url_hash(url), self.ext)))
    }
}

/// Stable file stem for a URL.
pub fn url_hash(url: &str) -> String {
    short_hash(url.trim().as_bytes(), URL_HASH_LEN)
}

/// Domain bucket for a URL: lower-cased host, with `_port` appended only for
/// non-default ports. Scheme-less input (`example.com/page`) is read as https.
pub fn domain_of(url: &str) -> Result<String> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(MarksError::InvalidUrl(url.to_string()));
    }

    let parsed = match Url::parse(trimmed) {
        Ok(parsed) => parsed,
        Err(ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("https://{}", trimmed))
            .map_err(|_| MarksError::InvalidUrl(url.to_string()))?,
        Err(_) => return Err(MarksError::InvalidUrl(url.to_string())),
    };

    let host = parsed
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| MarksError::InvalidUrl(url.to_string()))?
        .trim_start_matches('[')
        .trim_end_matches(']')
        .replace(':', "-")
        .to_lowercase();

    // `port()` is None when the port is the scheme default.
    Ok(match parsed.port() {
        Some(port) => format!("{}_{}", host, port),
        None => host,
    })
}
