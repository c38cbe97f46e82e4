//! Error types for building cluster sessions.
//!
//! Failures fall into three categories with different remedies:
//!
//! | Error | Cause | Retry? |
//! |-------|-------|--------|
//! | [`ConfigError`] | credentials/TLS absent or unusable | no, needs an operator |
//! | [`AvailabilityError`] | discovery found no cluster members | later, registration may lag |
//! | [`InfraError`] | the relational store query failed | caller's policy |
//!
//! [`ClusterError`] wraps all three so [`get_cluster`](crate::get_cluster)
//! has a single error type while callers can still match on the category.

use thiserror::Error;

/// Result type alias for cluster session operations.
pub type Result<T> = std::result::Result<T, ClusterError>;

/// Configuration required to build a session is absent or invalid.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// No authentication options were configured.
    ///
    /// A session is never built without credentials and TLS material.
    #[error("cluster authentication options are not configured")]
    AuthMissing,

    /// The supplied TLS trust or identity material could not be loaded.
    #[error("invalid cluster TLS configuration: {message}")]
    InvalidTls {
        /// Which piece of TLS material was rejected.
        message: String,
        /// The underlying client-construction error.
        #[source]
        source: Option<reqwest::Error>,
    },

    /// A discovered node does not form a valid HTTPS address.
    #[error("invalid cluster node address '{address}': {message}")]
    InvalidNodeAddress {
        /// The address as assembled from the node row.
        address: String,
        /// Why it was rejected.
        message: String,
    },
}

/// Discovery succeeded but produced nothing usable.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AvailabilityError {
    /// The relational store lists no online cluster members.
    #[error("no cluster nodes available")]
    NoNodesAvailable,
}

/// The relational store could not be queried.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InfraError {
    /// The node discovery query failed.
    #[error("cluster node query failed: {0}")]
    Query(#[from] sqlx::Error),
}

/// Any failure of [`get_cluster`](crate::get_cluster).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClusterError {
    /// See [`ConfigError`].
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// See [`AvailabilityError`].
    #[error(transparent)]
    Availability(#[from] AvailabilityError),

    /// See [`InfraError`].
    #[error(transparent)]
    Infra(#[from] InfraError),
}

impl ClusterError {
    /// Returns `true` if a later attempt could succeed without operator
    /// intervention.
    ///
    /// Configuration errors never are. The builder itself never retries.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Availability(_) | Self::Infra(_))
    }
}
