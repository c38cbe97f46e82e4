//! Key-value storage abstraction for URI-signing key material.
//!
//! This crate provides the [`StorageBackend`] trait the keyset store is
//! written against, the [`StorageError`] vocabulary every backend maps its
//! failures into, and an in-memory [`MemoryBackend`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Keyset flows (urisign)                     │
//! │        get_keys │ save_keys │ delete_keys                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │                    KeysetStore<B>                           │
//! │          (parse, validate, serialize keysets)               │
//! ├─────────────────────────────────────────────────────────────┤
//! │                 edgeauth-storage                            │
//! │              StorageBackend trait                           │
//! │          (get, set, delete, health_check)                   │
//! ├──────────────┬──────────────────────────────────────────────┤
//! │ MemoryBackend│        ClusterBucket (edgeauth-cluster)      │
//! │   (testing)  │          HTTPS session to the cluster        │
//! └──────────────┴──────────────────────────────────────────────┘
//! ```
//!
//! # Error Handling
//!
//! All operations return [`StorageResult<T>`]. Backends map their internal
//! errors to [`StorageError`] variants and keep the source chain.

#![deny(unsafe_code)]

pub mod backend;
pub mod error;
pub mod health;
pub mod memory;

pub use backend::StorageBackend;
pub use error::{BoxError, StorageError, StorageResult};
pub use health::{HealthMetadata, HealthStatus};
pub use memory::MemoryBackend;
