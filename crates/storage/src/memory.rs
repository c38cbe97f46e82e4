//! In-memory storage backend implementation.
//!
//! [`MemoryBackend`] implements [`StorageBackend`] over a [`BTreeMap`]
//! guarded by a [`parking_lot::RwLock`]. It is used by tests and by local
//! development setups that have no cluster to talk to.
//!
//! # Example
//!
//! ```
//! use edgeauth_storage::{MemoryBackend, StorageBackend};
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = MemoryBackend::new();
//!
//!     backend.set("greeting".to_owned(), b"hello".to_vec()).await.unwrap();
//!     let value = backend.get("greeting").await.unwrap();
//!
//!     assert_eq!(value.unwrap().as_ref(), b"hello");
//! }
//! ```

use std::{collections::BTreeMap, sync::Arc, time::Instant};

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;

use crate::{
    backend::StorageBackend,
    error::StorageResult,
    health::{HealthMetadata, HealthStatus},
};

/// In-memory storage backend using [`BTreeMap`].
///
/// # Cloning
///
/// `MemoryBackend` is cheaply cloneable via [`Arc`]. All clones share the
/// same underlying data store.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    data: Arc<RwLock<BTreeMap<String, Bytes>>>,
}

impl MemoryBackend {
    /// Creates a new, empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Returns `true` if no keys are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl std::fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBackend").field("entries", &self.len()).finish()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    #[tracing::instrument(skip(self))]
    async fn get(&self, key: &str) -> StorageResult<Option<Bytes>> {
        Ok(self.data.read().get(key).cloned())
    }

    #[tracing::instrument(skip(self, value), fields(value_len = value.len()))]
    async fn set(&self, key: String, value: Vec<u8>) -> StorageResult<()> {
        self.data.write().insert(key, Bytes::from(value));
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.data.write().remove(key);
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn health_check(&self) -> StorageResult<HealthStatus> {
        let start = Instant::now();
        let entries = self.len();
        Ok(HealthStatus::healthy(
            HealthMetadata::new(start.elapsed(), "memory")
                .with_detail("entry_count", entries.to_string()),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[tokio::test]
    async fn test_get_missing_key_returns_none() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let backend = MemoryBackend::new();
        backend.set("k".to_owned(), b"one".to_vec()).await.unwrap();
        backend.set("k".to_owned(), b"two".to_vec()).await.unwrap();

        assert_eq!(backend.get("k").await.unwrap(), Some(Bytes::from("two")));
        assert_eq!(backend.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_missing_key_is_noop() {
        let backend = MemoryBackend::new();
        backend.delete("never-set").await.unwrap();
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_clones_share_data() {
        let backend = MemoryBackend::new();
        let clone = backend.clone();
        clone.set("shared".to_owned(), b"v".to_vec()).await.unwrap();

        assert_eq!(backend.get("shared").await.unwrap(), Some(Bytes::from("v")));
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Doc {
        name: String,
    }

    #[tokio::test]
    async fn test_set_json_stores_json_bytes() {
        let backend = MemoryBackend::new();
        let doc = Doc { name: "edge".to_owned() };

        backend.set_json("doc".to_owned(), &doc).await.unwrap();

        let stored = backend.get("doc").await.unwrap().unwrap();
        assert_eq!(serde_json::from_slice::<Doc>(&stored).unwrap(), doc);
    }

    #[tokio::test]
    async fn test_health_check_reports_entry_count() {
        let backend = MemoryBackend::new();
        backend.set("a".to_owned(), b"1".to_vec()).await.unwrap();

        let status = backend.health_check().await.unwrap();
        assert!(status.is_healthy());
        assert_eq!(status.metadata().details.get("entry_count"), Some(&"1".to_owned()));
    }
}
