//! File-backed store: one JSON document on disk.
//!
//! ## Durability
//! Every mutation rewrites the whole document to a temp file in the same
//! directory and renames it over the old one, so a crash mid-write leaves
//! either the old document or the new one, never a torn file.
//!
//! ## Corrupted Document
//! A document that fails to parse at open time is logged and replaced by an
//! empty store rather than failing the whole app (the safe default is an
//! unauthenticated, preference-less client).

use async_trait::async_trait;
use directories::ProjectDirs;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::KeyValueStore;

/// A [`KeyValueStore`] persisted as a single JSON object on disk.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl FileStore {
    /// Opens (or creates) the store at `path`.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => match serde_json::from_str::<HashMap<String, String>>(&raw) {
                Ok(entries) => {
                    debug!(path = %path.display(), entries = entries.len(), "Store loaded");
                    entries
                }
                Err(err) => {
                    warn!(path = %path.display(), %err, "Store document corrupted, starting empty");
                    HashMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No store document yet, starting empty");
                HashMap::new()
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.display().to_string(),
                    source,
                });
            }
        };

        Ok(FileStore {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Opens the store at the platform default location
    /// (e.g. `~/.local/share/carman/store.json` on Linux).
    pub async fn open_default() -> StoreResult<Self> {
        let dirs = ProjectDirs::from("com", "carman", "carman").ok_or(StoreError::NoDataDir)?;
        let dir = dirs.data_dir();
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| StoreError::Io {
                path: dir.display().to_string(),
                source,
            })?;
        Self::open(dir.join("store.json")).await
    }

    /// Path of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serializes the current map and renames it over the document.
    /// Callers must hold the write lock for the whole mutation so the
    /// on-disk document always matches some consistent in-memory state.
    async fn persist(&self, entries: &HashMap<String, String>) -> StoreResult<()> {
        let raw = serde_json::to_string_pretty(entries).map_err(|err| StoreError::Corrupted {
            key: String::new(),
            reason: err.to_string(),
        })?;

        let tmp = self.path.with_extension("json.tmp");
        let io_err = |source| StoreError::Io {
            path: self.path.display().to_string(),
            source,
        };
        tokio::fs::write(&tmp, raw.as_bytes()).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(io_err)?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries).await
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        let mut entries = self.entries.write().await;
        if entries.remove(key).is_some() {
            self.persist(&entries).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        {
            let store = FileStore::open(&path).await.unwrap();
            store.set("auth_token", "T1").await.unwrap();
            store.set("language", "es").await.unwrap();
        }

        let store = FileStore::open(&path).await.unwrap();
        assert_eq!(store.get("auth_token").await.unwrap().as_deref(), Some("T1"));
        assert_eq!(store.get("language").await.unwrap().as_deref(), Some("es"));
    }

    #[tokio::test]
    async fn test_remove_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = FileStore::open(&path).await.unwrap();
        store.set("auth_token", "T1").await.unwrap();
        store.remove("auth_token").await.unwrap();
        drop(store);

        let store = FileStore::open(&path).await.unwrap();
        assert!(store.get("auth_token").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupted_document_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        tokio::fs::write(&path, b"{ this is not json")
            .await
            .unwrap();

        let store = FileStore::open(&path).await.unwrap();
        assert!(store.get("auth_token").await.unwrap().is_none());

        // Still usable after the reset
        store.set("auth_token", "T2").await.unwrap();
        assert_eq!(store.get("auth_token").await.unwrap().as_deref(), Some("T2"));
    }

    #[tokio::test]
    async fn test_no_tmp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = FileStore::open(&path).await.unwrap();
        store.set("k", "v").await.unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }
}
