use super::crypto::Encryptor;
use super::paths::JSON_EXT;
use crate::error::{MarksError, Result};
use crate::model::Bookmark;
use std::fs;
use std::path::Path;
use uuid::Uuid;

/// Serializes bookmarks to canonical indented JSON and back, validating the
/// checksum on every decode. With an [`Encryptor`] the JSON is wrapped through
/// it on the way to and from disk.
#[derive(Clone, Copy)]
pub struct RecordCodec<'a> {
    cipher: Option<&'a dyn Encryptor>,
}

impl<'a> RecordCodec<'a> {
    pub fn plain() -> Self {
        Self { cipher: None }
    }

    pub fn encrypted(cipher: &'a dyn Encryptor) -> Self {
        Self {
            cipher: Some(cipher),
        }
    }

    pub fn is_encrypted(&self) -> bool {
        self.cipher.is_some()
    }

    pub fn extension(&self) -> &str {
        match self.cipher {
            Some(cipher) => cipher.extension(),
            None => JSON_EXT,
        }
    }

    /// Canonical bytes for `bookmark` with a freshly computed checksum.
    pub fn encode(bookmark: &Bookmark) -> Result<Vec<u8>> {
        let mut sealed = bookmark.clone();
        sealed.seal();
        let mut bytes = serde_json::to_vec_pretty(&sealed).map_err(MarksError::Serialization)?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Parse and verify. A checksum disagreement is corruption.
    pub fn decode(bytes: &[u8]) -> Result<Bookmark> {
        let bookmark: Bookmark = serde_json::from_slice(bytes).map_err(MarksError::Serialization)?;
        let computed = bookmark.compute_checksum();
        if computed != bookmark.checksum {
            return Err(MarksError::ChecksumMismatch {
                url: bookmark.url,
                stored: bookmark.checksum,
                computed,
            });
        }
        Ok(bookmark)
    }

    pub fn write(&self, path: &Path, bookmark: &Bookmark) -> Result<()> {
        let bytes = Self::encode(bookmark)?;
        if let Some(cipher) = self.cipher {
            return cipher.encrypt(path, &bytes);
        }

        let dir = path
            .parent()
            .ok_or_else(|| MarksError::Store(format!("invalid path: {}", path.display())))?;
        fs::create_dir_all(dir).map_err(MarksError::Io)?;

        // Atomic write
        let tmp = dir.join(format!(".bm-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp, bytes).map_err(MarksError::Io)?;
        fs::rename(&tmp, path).map_err(MarksError::Io)?;
        Ok(())
    }

    pub fn read(&self, path: &Path) -> Result<Bookmark> {
        let bytes = match self.cipher {
            Some(cipher) => cipher.decrypt(path)?,
            None => fs::read(path).map_err(MarksError::Io)?,
        };
        Self::decode(&bytes).map_err(|err| match err {
            MarksError::Serialization(source) => MarksError::Decode {
                path: path.to_path_buf(),
                source,
            },
            MarksError::ChecksumMismatch { .. } => {
                tracing::warn!(path = %path.display(), "checksum mismatch, refusing record");
                err
            }
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Bookmark {
        let mut bm = Bookmark::new(
            "https://example.com/rust",
            "The Rust Book",
            "Learn Rust",
            ["rust", "docs"],
        )
        .with_favorite(true);
        bm.id = 7;
        bm.seal();
        bm
    }

    #[test]
    fn test_roundtrip_preserves_fields() {
        let bm = sample();
        let decoded = RecordCodec::decode(&RecordCodec::encode(&bm).unwrap()).unwrap();
        assert_eq!(decoded, bm);
        assert!(decoded.verify());
    }

    #[test]
    fn test_encode_reseals_stale_checksum() {
        let mut bm = sample();
        bm.title = "Edited".into();
        assert!(!bm.verify());

        let decoded = RecordCodec::decode(&RecordCodec::encode(&bm).unwrap()).unwrap();
        assert_eq!(decoded.title, "Edited");
        assert!(decoded.verify());
    }

    #[test]
    fn test_encode_is_indented_json() {
        let bytes = RecordCodec::encode(&sample()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("{\n  \"id\": 7,"));
        assert!(text.contains("\"checksum\":"));
    }

    #[test]
    fn test_flipped_byte_is_checksum_mismatch() {
        let bytes = RecordCodec::encode(&sample()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let pos = text.find("The Rust Book").unwrap();

        let mut corrupted = text.into_bytes();
        corrupted[pos] ^= 0x01; // 'T' -> 'U'

        let err = RecordCodec::decode(&corrupted).unwrap_err();
        assert!(matches!(err, MarksError::ChecksumMismatch { .. }));
        assert!(err.is_corruption());
    }

    #[test]
    fn test_read_write_plain_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("example.com").join("abc.json");
        let codec = RecordCodec::plain();
        assert_eq!(codec.extension(), ".json");

        codec.write(&path, &sample()).unwrap();
        assert_eq!(codec.read(&path).unwrap(), sample());
    }

    #[test]
    fn test_read_garbage_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();

        let err = RecordCodec::plain().read(&path).unwrap_err();
        assert!(matches!(err, MarksError::Decode { .. }));
        assert!(err.is_corruption());
    }
}
