//! Storage backend trait definition.
//!
//! [`StorageBackend`] is the key-value interface the keyset store is written
//! against. The cluster session implements it per bucket; [`MemoryBackend`]
//! implements it for tests.
//!
//! Keys are strings because every production key is a delivery-service
//! identifier and the cluster's HTTP interface addresses keys by path
//! segment. Values are opaque bytes.
//!
//! [`MemoryBackend`]: crate::MemoryBackend

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;

use crate::{
    error::{StorageError, StorageResult},
    health::HealthStatus,
};

/// Abstract storage backend for key-value operations.
///
/// Backends are expected to be thread-safe (`Send + Sync`) and support
/// concurrent operations.
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use edgeauth_storage::{MemoryBackend, StorageBackend};
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// let backend = MemoryBackend::new();
///
/// backend.set("ds-1".to_owned(), b"{}".to_vec()).await.unwrap();
/// let value = backend.get("ds-1").await.unwrap();
/// assert_eq!(value, Some(Bytes::from("{}")));
/// # });
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Retrieves a value by key.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(bytes))` if the key exists
    /// - `Ok(None)` if the key doesn't exist
    /// - `Err(...)` on storage errors
    #[must_use = "storage operations may fail and errors must be handled"]
    async fn get(&self, key: &str) -> StorageResult<Option<Bytes>>;

    /// Stores a key-value pair, overwriting any existing value.
    #[must_use = "storage operations may fail and errors must be handled"]
    async fn set(&self, key: String, value: Vec<u8>) -> StorageResult<()>;

    /// Deletes a key.
    ///
    /// If the key doesn't exist, this is a no-op (returns `Ok(())`).
    #[must_use = "storage operations may fail and errors must be handled"]
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Checks whether the backend can currently serve requests.
    ///
    /// - `Ok(HealthStatus::Healthy(_))`: the check passed
    /// - `Ok(HealthStatus::Unhealthy(_, reason))`: the check failed
    /// - `Err(...)`: the health check itself could not be performed
    #[must_use = "health check results indicate backend availability and must be inspected"]
    async fn health_check(&self) -> StorageResult<HealthStatus>;

    /// Serializes a value to JSON and stores it.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Serialization`] if `value` cannot be
    /// serialized, in addition to any error from [`set`](Self::set).
    async fn set_json<T>(&self, key: String, value: &T) -> StorageResult<()>
    where
        T: Serialize + Sync,
    {
        let bytes = serde_json::to_vec(value)
            .map_err(|e| StorageError::serialization_with_source(format!("key {key}"), e))?;
        self.set(key, bytes).await
    }
}
