use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;

const MAX_FILENAME_BYTES: usize = 255;

/// Metadata for a file written to the uploads directory.
#[derive(Debug, Clone, Serialize)]
pub struct StoredFile {
    pub filename: String,
    pub size: usize,
    pub path: PathBuf,
}

/// Writes uploaded payloads into a single flat directory.
///
/// Writes go straight to the target file: concurrent uploads with the same
/// name race and the last write wins.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the uploads directory if it does not exist yet and pins it to
    /// its absolute path, so reported storage paths do not depend on the
    /// working directory.
    pub async fn init(self) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create uploads dir {}", self.dir().display()))?;
        let dir = tokio::fs::canonicalize(&self.dir)
            .await
            .with_context(|| format!("Failed to resolve uploads dir {}", self.dir().display()))?;
        info!("Uploads directory ready at {}", dir.display());
        Ok(Self { dir })
    }

    pub async fn store(&self, filename: &str, bytes: &[u8]) -> Result<StoredFile, AppError> {
        let filename = sanitize_filename(filename)?;
        let path = self.dir.join(filename);

        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        Ok(StoredFile {
            filename: filename.to_string(),
            size: bytes.len(),
            path,
        })
    }
}

/// Accepts only a bare file name that resolves inside the uploads directory.
pub fn sanitize_filename(name: &str) -> Result<&str, AppError> {
    let invalid = || AppError::Validation(format!("Invalid filename: {name:?}"));

    if name.is_empty()
        || name.len() > MAX_FILENAME_BYTES
        || name == "."
        || name == ".."
        || name.contains(['/', '\\'])
        || name.chars().any(char::is_control)
    {
        return Err(invalid());
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_names_accepted() {
        for name in [
            "a.txt",
            "cover letter.pdf",
            "upload-1700000000000",
            ".hidden",
            "resume..v2.pdf",
            "..dotted",
        ] {
            assert_eq!(sanitize_filename(name).unwrap(), name);
        }
    }

    #[test]
    fn test_traversal_rejected() {
        for name in [
            "",
            ".",
            "..",
            "../etc/passwd",
            "a/../../b",
            "nested/file.txt",
            "/abs.txt",
            "..\\win.ini",
            "dir\\file",
            "nul\0byte",
            "line\nbreak",
        ] {
            assert!(
                matches!(sanitize_filename(name), Err(AppError::Validation(_))),
                "expected {name:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_overlong_name_rejected() {
        let name = "a".repeat(256);
        assert!(sanitize_filename(&name).is_err());
        assert!(sanitize_filename(&name[..255]).is_ok());
    }

    #[tokio::test]
    async fn test_store_writes_exact_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        let payload = [0u8, 1, 2, 255, 10, 13];
        let stored = store.store("blob.bin", &payload).await.unwrap();

        assert_eq!(stored.filename, "blob.bin");
        assert_eq!(stored.size, payload.len());
        assert_eq!(stored.path, dir.path().join("blob.bin"));
        assert_eq!(tokio::fs::read(&stored.path).await.unwrap(), payload);
    }

    #[tokio::test]
    async fn test_store_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        store.store("a.txt", b"first version").await.unwrap();
        let stored = store.store("a.txt", b"second").await.unwrap();

        assert_eq!(stored.size, 6);
        assert_eq!(tokio::fs::read(&stored.path).await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_init_creates_nested_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path().join("a").join("uploads"))
            .init()
            .await
            .unwrap();
        assert!(store.dir().is_dir());
        // idempotent
        let again = UploadStore::new(store.dir()).init().await.unwrap();
        assert_eq!(again.dir(), store.dir());
    }

    #[tokio::test]
    async fn test_relative_dir_reports_absolute_path() {
        let rel = format!("uploads-relative-{}", std::process::id());
        let store = UploadStore::new(&rel).init().await.unwrap();
        let stored = store.store("a.txt", b"hello").await.unwrap();
        tokio::fs::remove_dir_all(&rel).await.unwrap();

        assert!(stored.path.is_absolute());
        assert!(stored.path.ends_with(format!("{rel}/a.txt")));
        assert_eq!(stored.size, 5);
    }

    #[tokio::test]
    async fn test_write_failure_is_internal() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path().join("missing"));
        let err = store.store("a.txt", b"data").await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
