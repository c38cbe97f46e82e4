//! Node discovery and authenticated sessions for the key-value cluster that
//! stores URI-signing keys.
//!
//! The relational store's server inventory is the system of record for
//! cluster membership. [`get_cluster`] reads it, keeps the online cluster
//! members, and assembles a [`ClusterSession`] that authenticates every
//! request with the configured credentials over TLS.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐  list_cluster_nodes   ┌─────────────────────────┐
//! │      get_cluster      │ ───────────────────▶ │ relational store (sqlx) │
//! │  (auth → discover →   │ ◀─────────────────── │ server ⋈ type ⋈ status  │
//! │   assemble)           │   Vec<ClusterNode>   └─────────────────────────┘
//! └──────────┬───────────┘
//!            │ ClusterSession (HTTPS, basic auth, round-robin)
//!            ▼
//! ┌──────────────────────┐
//! │ ClusterBucket        │  GET/PUT/DELETE /types/default/buckets/{b}/keys/{k}
//! │ (StorageBackend)     │
//! └──────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! // Requires a reachable relational store and cluster.
//! use edgeauth_cluster::{ClusterAuthOptions, ClusterConfig, get_cluster};
//! use edgeauth_storage::StorageBackend;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! sqlx::any::install_default_drivers();
//! let db = sqlx::AnyPool::connect("postgres://traffic_ops@localhost/traffic_ops").await?;
//!
//! let auth = ClusterAuthOptions::builder().user("riakuser").password("password").build();
//! let config = ClusterConfig::builder().auth_options(auth).build();
//!
//! let session = get_cluster(&db, &config).await?;
//! let keys = session.bucket("cdn_uri_sig_keys").get("demo-ds").await?;
//! session.close();
//! # let _ = keys;
//! # Ok(())
//! # }
//! ```
//!
//! # Errors
//!
//! [`get_cluster`] fails with a [`ClusterError`] whose variant tells the
//! caller what went wrong: configuration ([`ConfigError`]), availability
//! ([`AvailabilityError`]), or infrastructure ([`InfraError`]). Requests
//! through a session return [`StorageError`](edgeauth_storage::StorageError).
//!
//! # Feature Flags
//!
//! - **`testutil`**: Enables the [`testutil`] module with an in-memory server inventory and
//!   plaintext sessions for mock servers.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod builder;
pub mod config;
pub mod discovery;
mod error;
mod node;
pub mod session;

/// Shared test utilities for cluster session testing.
#[cfg(any(test, feature = "testutil"))]
#[allow(clippy::expect_used)]
pub mod testutil;

/// Session builder.
pub use builder::{DiscoveredSessions, SessionSource, get_cluster};
/// Configuration types and default constants.
pub use config::{
    ClusterAuthOptions, ClusterConfig, DEFAULT_CONNECT_TIMEOUT, DEFAULT_POOL_MAX_IDLE_PER_HOST,
    DEFAULT_PORT, DEFAULT_TIMEOUT, TlsOptions,
};
/// Node discovery.
pub use discovery::{NodeDiscovery, list_cluster_nodes};
/// Error types and result alias.
pub use error::{AvailabilityError, ClusterError, ConfigError, InfraError, Result};
/// Cluster member address.
pub use node::ClusterNode;
/// Session and bucket handles.
pub use session::{ClusterBucket, ClusterSession};
