//! # carman-store: Persisted Key-Value Store
//!
//! Durable client-side state for the Carman client: an async get/set/remove
//! store keyed by strings, surviving app restarts.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storage Layer                                    │
//! │                                                                         │
//! │  SessionManager ──────► auth_token / refresh_token / user_data          │
//! │  (single writer for session keys)                                       │
//! │                                                                         │
//! │  App preferences ─────► establishment_data / language / theme           │
//! │                                                                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  ┌─────────────────────┐          ┌─────────────────────┐               │
//! │  │     FileStore       │          │     MemoryStore     │               │
//! │  │  JSON document on   │          │  HashMap, for tests │               │
//! │  │  disk, atomic write │          │  and ephemeral runs │               │
//! │  └─────────────────────┘          └─────────────────────┘               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Single-Writer Discipline
//! The session keys ([`keys::AUTH_TOKEN`], [`keys::REFRESH_TOKEN`],
//! [`keys::USER_DATA`]) are only ever written by the Session Manager.
//! Other consumers read them (e.g. the HTTP client attaches the bearer
//! token) but never mutate them.
//!
//! ## No Encryption
//! Values are stored as-is. Credential encryption beyond what the platform
//! gives the data directory is explicitly out of scope.

pub mod error;
pub mod file;
pub mod keys;
pub mod memory;

pub use error::{StoreError, StoreResult};
pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

// =============================================================================
// Store Trait
// =============================================================================

/// Async string key-value store, durable across restarts (for the file-backed
/// implementation).
///
/// Object-safe on purpose: consumers hold `Arc<dyn KeyValueStore>` so tests
/// can swap in [`MemoryStore`].
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value for `key`, or `None` if absent.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Sets `key` to `value`, creating or overwriting.
    async fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Removes `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> StoreResult<()>;
}

// =============================================================================
// Typed JSON Helpers
// =============================================================================
// Generic methods would make the trait non-object-safe, so these live as
// free functions over `dyn KeyValueStore`.

/// Reads `key` and deserializes it as JSON.
///
/// A value that fails to deserialize yields [`StoreError::Corrupted`] so the
/// caller can decide to purge it; the entry itself is left untouched here.
pub async fn get_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> StoreResult<Option<T>> {
    match store.get(key).await? {
        None => Ok(None),
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Corrupted {
                key: key.to_string(),
                reason: source.to_string(),
            }),
    }
}

/// Serializes `value` as JSON and stores it under `key`.
pub async fn set_json<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> StoreResult<()> {
    let raw = serde_json::to_string(value).map_err(|source| StoreError::Corrupted {
        key: key.to_string(),
        reason: source.to_string(),
    })?;
    store.set(key, &raw).await
}

// =============================================================================
// Unit Tests
// =============================================================================
