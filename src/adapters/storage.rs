use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Filesystem storage rooted at `base_path`. Writes go to a temp file first and are
/// renamed into place so a failed run never leaves a half-written build file.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.base_path.join(path)
    }
}

impl Storage for LocalStorage {
    async fn exists(&self, path: &Path) -> Result<bool> {
        Ok(fs::try_exists(self.resolve(path)).await?)
    }

    async fn write_file(&self, path: &Path, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);

        if let Some(parent) = full_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let mut temp_name = full_path.file_name().unwrap_or_default().to_os_string();
        temp_name.push(".tmp");
        let temp_path = full_path.with_file_name(temp_name);

        fs::write(&temp_path, data).await?;
        fs::rename(&temp_path, &full_path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());

        storage
            .write_file(Path::new("src/main/smithy/main.smithy"), b"namespace a")
            .await
            .unwrap();

        let written = std::fs::read_to_string(temp_dir.path().join("src/main/smithy/main.smithy")).unwrap();
        assert_eq!(written, "namespace a");
        assert!(!temp_dir.path().join("src/main/smithy/main.smithy.tmp").exists());
    }

    #[tokio::test]
    async fn test_exists_and_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());
        let path = Path::new("build.gradle");

        assert!(!storage.exists(path).await.unwrap());
        storage.write_file(path, b"one").await.unwrap();
        storage.write_file(path, b"two").await.unwrap();

        assert!(storage.exists(path).await.unwrap());
        assert_eq!(std::fs::read_to_string(temp_dir.path().join(path)).unwrap(), "two");
    }
}
