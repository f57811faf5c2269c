//! Sidecar cache files and resumption rules for one input PDF.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::{IngestError, Result};

/// The set of sidecar paths for one input PDF under a cache root.
///
/// Every path is `{cache_root}/{stem}.{suffix}`, where `stem` is the PDF's
/// file stem (no extension).
#[derive(Debug, Clone)]
pub struct CacheLayer {
    stem: String,
    cache_root: PathBuf,
}

impl CacheLayer {
    /// Builds a cache layer for the PDF at `pdf_path`, rooted at `cache_root`.
    #[must_use]
    pub fn new(pdf_path: &Path, cache_root: impl Into<PathBuf>) -> Self {
        let stem = pdf_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            stem,
            cache_root: cache_root.into(),
        }
    }

    fn sidecar(&self, suffix: &str) -> PathBuf {
        self.cache_root.join(format!("{}.{suffix}", self.stem))
    }

    /// Path to the checksum sidecar.
    #[must_use]
    pub fn checksum_path(&self) -> PathBuf {
        self.sidecar("checksum")
    }

    /// Path to the converter-output sidecar.
    #[must_use]
    pub fn converted_path(&self) -> PathBuf {
        self.sidecar("json")
    }

    /// Path to the structured-text sidecar.
    #[must_use]
    pub fn text_path(&self) -> PathBuf {
        self.sidecar("text.json")
    }

    /// Path to the filtered-table sidecar.
    #[must_use]
    pub fn table_path(&self) -> PathBuf {
        self.sidecar("table.json")
    }

    /// Path to the chunk-array sidecar.
    #[must_use]
    pub fn chunks_path(&self) -> PathBuf {
        self.sidecar("chunks.json")
    }

    /// Computes the SHA-256 hex checksum of the PDF's raw bytes.
    pub fn checksum(pdf_path: &Path) -> Result<String> {
        let bytes = std::fs::read(pdf_path).map_err(|source| IngestError::Io {
            path: pdf_path.to_path_buf(),
            source,
        })?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(format!("{:x}", hasher.finalize()))
    }

    /// Decides whether conversion must re-run: true if the checksum sidecar
    /// is absent or differs from the PDF's current checksum.
    pub fn needs_conversion(&self, pdf_path: &Path) -> Result<bool> {
        let fresh = Self::checksum(pdf_path)?;
        let path = self.checksum_path();
        match std::fs::read_to_string(&path) {
            Ok(existing) => Ok(existing.trim() != fresh),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(true),
            Err(source) => Err(IngestError::Io { path, source }),
        }
    }

    /// Writes the fresh checksum sidecar.
    pub fn write_checksum(&self, pdf_path: &Path) -> Result<()> {
        let fresh = Self::checksum(pdf_path)?;
        let path = self.checksum_path();
        write_sidecar_bytes(&path, fresh.as_bytes())
    }

    /// Whether the text sidecar already exists (text stage may be skipped).
    #[must_use]
    pub fn has_text(&self) -> bool {
        self.text_path().exists()
    }

    /// Whether the table sidecar already exists (table stage may be skipped).
    #[must_use]
    pub fn has_table(&self) -> bool {
        self.table_path().exists()
    }

    /// Whether the chunks sidecar already exists (chunk stage may be skipped).
    #[must_use]
    pub fn has_chunks(&self) -> bool {
        self.chunks_path().exists()
    }

    /// Serializes `value` as pretty JSON to `path`, creating the cache root
    /// if it does not already exist.
    pub fn write_json<T: serde::Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let json = serde_json::to_vec_pretty(value).map_err(|source| IngestError::Serde {
            path: path.to_path_buf(),
            source,
        })?;
        write_sidecar_bytes(path, &json)
    }

    /// Deserializes JSON from `path`.
    pub fn read_json<T: serde::de::DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let bytes = std::fs::read(path).map_err(|source| IngestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|source| IngestError::Serde {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn write_sidecar_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| IngestError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, bytes).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_is_stable_for_same_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let pdf_path = dir.path().join("doc.pdf");
        std::fs::write(&pdf_path, b"%PDF-1.4 fake").unwrap();

        let a = CacheLayer::checksum(&pdf_path).unwrap();
        let b = CacheLayer::checksum(&pdf_path).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn needs_conversion_true_when_checksum_absent() {
        let dir = tempfile::tempdir().unwrap();
        let pdf_path = dir.path().join("doc.pdf");
        std::fs::write(&pdf_path, b"%PDF-1.4 fake").unwrap();
        let cache = CacheLayer::new(&pdf_path, dir.path().join("cache"));

        assert!(cache.needs_conversion(&pdf_path).unwrap());
    }

    #[test]
    fn needs_conversion_false_after_write_checksum() {
        let dir = tempfile::tempdir().unwrap();
        let pdf_path = dir.path().join("doc.pdf");
        std::fs::write(&pdf_path, b"%PDF-1.4 fake").unwrap();
        let cache = CacheLayer::new(&pdf_path, dir.path().join("cache"));

        cache.write_checksum(&pdf_path).unwrap();
        assert!(!cache.needs_conversion(&pdf_path).unwrap());

        std::fs::write(&pdf_path, b"%PDF-1.4 changed").unwrap();
        assert!(cache.needs_conversion(&pdf_path).unwrap());
    }

    #[test]
    fn write_and_read_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let pdf_path = dir.path().join("doc.pdf");
        let cache = CacheLayer::new(&pdf_path, dir.path().join("cache"));

        let value = vec!["a".to_string(), "b".to_string()];
        cache.write_json(&cache.text_path(), &value).unwrap();
        assert!(cache.has_text());

        let round_tripped: Vec<String> = cache.read_json(&cache.text_path()).unwrap();
        assert_eq!(round_tripped, value);
    }
}
