//! Durable string key-value storage for the local cache snapshot.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use crate::error::{Error, Result};

/// Minimal device storage abstraction (the app's async storage slot).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_string(&self, key: &str) -> Result<Option<String>>;

    async fn set_string(&self, key: &str, value: &str) -> Result<()>;

    async fn remove(&self, key: &str) -> Result<()>;
}

/// One file per key under a directory.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// crash mid-write leaves the previous snapshot intact.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`. Path separators and other unsafe characters are replaced.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", name.trim_start_matches('.')))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Io(e)),
        }
    }

    async fn set_string(&self, key: &str, value: &str) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await.map_err(|e| {
            Error::storage(format!("failed to persist {}: {}", path.display(), e))
        })?;

        tracing::trace!(key, bytes = value.len(), "Persisted snapshot");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Io(e)),
        }
    }
}

/// Volatile store, used in tests and for `--ephemeral` runs.
#[derive(Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set_string(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.values.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        assert_eq!(store.get_string("yester-ai-content-cache").await.unwrap(), None);

        store.set_string("yester-ai-content-cache", "{}").await.unwrap();
        store.set_string("yester-ai-content-cache", r#"{"a":1}"#).await.unwrap();
        assert_eq!(
            store.get_string("yester-ai-content-cache").await.unwrap().as_deref(),
            Some(r#"{"a":1}"#)
        );
        assert!(!store.path_for("yester-ai-content-cache").with_extension("json.tmp").exists());

        store.remove("yester-ai-content-cache").await.unwrap();
        store.remove("yester-ai-content-cache").await.unwrap();
        assert_eq!(store.get_string("yester-ai-content-cache").await.unwrap(), None);
    }

    #[test]
    fn test_file_store_sanitizes_keys() {
        let store = FileStore::new("/tmp/yester");
        let path = store.path_for("../../etc/passwd");
        assert_eq!(path.parent(), Some(Path::new("/tmp/yester")));
        assert_eq!(path.file_name().unwrap(), "_.._etc_passwd.json");
    }

    #[test]
    fn test_memory_store() {
        tokio_test::block_on(async {
            let store = MemoryStore::new();
            store.set_string("k", "v").await.unwrap();
            assert_eq!(store.get_string("k").await.unwrap().as_deref(), Some("v"));
            store.remove("k").await.unwrap();
            assert!(store.get_string("k").await.unwrap().is_none());
        });
    }
}
