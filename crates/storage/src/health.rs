//! Health check types for storage backends.
//!
//! [`StorageBackend::health_check`](crate::StorageBackend::health_check)
//! returns a [`HealthStatus`] instead of a bare boolean so a failed check
//! carries its reason and timing.

use std::{collections::HashMap, fmt, time::Duration};

/// Health status returned by [`StorageBackend::health_check`](crate::StorageBackend::health_check).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use edgeauth_storage::health::{HealthMetadata, HealthStatus};
///
/// let status = HealthStatus::healthy(HealthMetadata::new(Duration::from_millis(2), "memory"));
/// assert!(status.is_healthy());
/// ```
#[derive(Debug, Clone)]
pub enum HealthStatus {
    /// Backend is fully operational.
    Healthy(HealthMetadata),
    /// Backend cannot serve traffic reliably.
    ///
    /// The `String` describes the failure reason.
    Unhealthy(HealthMetadata, String),
}

impl HealthStatus {
    /// Creates a `Healthy` status.
    #[must_use = "creating a status has no side effects"]
    pub fn healthy(metadata: HealthMetadata) -> Self {
        Self::Healthy(metadata)
    }

    /// Creates an `Unhealthy` status with a reason.
    #[must_use = "creating a status has no side effects"]
    pub fn unhealthy(metadata: HealthMetadata, reason: impl Into<String>) -> Self {
        Self::Unhealthy(metadata, reason.into())
    }

    /// Returns `true` if the backend is healthy.
    #[must_use = "health status predicates should be checked"]
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy(_))
    }

    /// Returns the metadata associated with this health status.
    #[must_use]
    pub fn metadata(&self) -> &HealthMetadata {
        match self {
            Self::Healthy(m) | Self::Unhealthy(m, _) => m,
        }
    }

    /// Returns the failure reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Healthy(_) => None,
            Self::Unhealthy(_, reason) => Some(reason),
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Healthy(m) => write!(f, "healthy ({}ms)", m.check_duration.as_millis()),
            Self::Unhealthy(m, reason) => {
                write!(f, "unhealthy: {} ({}ms)", reason, m.check_duration.as_millis())
            },
        }
    }
}

/// Metadata about a health check result.
#[derive(Debug, Clone)]
pub struct HealthMetadata {
    /// How long the health check itself took.
    pub check_duration: Duration,
    /// Identifier for the backend type (e.g., "memory", "cluster").
    pub backend: String,
    /// Backend-specific details, such as the node that answered.
    pub details: HashMap<String, String>,
}

impl HealthMetadata {
    /// Creates a new `HealthMetadata` with the given check duration and backend name.
    #[must_use]
    pub fn new(check_duration: Duration, backend: impl Into<String>) -> Self {
        Self { check_duration, backend: backend.into(), details: HashMap::new() }
    }

    /// Adds a detail entry, returning `self` for chaining.
    #[must_use = "returns the modified metadata for chaining"]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_healthy_status() {
        let meta = HealthMetadata::new(Duration::from_millis(5), "memory");
        let status = HealthStatus::healthy(meta);

        assert!(status.is_healthy());
        assert!(status.reason().is_none());
        assert_eq!(status.metadata().backend, "memory");
        assert_eq!(status.metadata().check_duration, Duration::from_millis(5));
    }

    #[test]
    fn test_unhealthy_status() {
        let meta = HealthMetadata::new(Duration::from_millis(1000), "cluster");
        let status = HealthStatus::unhealthy(meta, "connection refused");

        assert!(!status.is_healthy());
        assert_eq!(status.reason(), Some("connection refused"));
    }

    #[test]
    fn test_metadata_with_details() {
        let meta = HealthMetadata::new(Duration::from_millis(3), "cluster")
            .with_detail("node", "https://riak-1.cdn.example:8098/")
            .with_detail("bucket", "cdn_uri_sig_keys");

        assert_eq!(meta.details.len(), 2);
        assert_eq!(meta.details.get("bucket"), Some(&"cdn_uri_sig_keys".to_owned()));
    }

    #[test]
    fn test_display() {
        let status = HealthStatus::healthy(HealthMetadata::new(Duration::from_millis(2), "memory"));
        assert_eq!(status.to_string(), "healthy (2ms)");

        let status = HealthStatus::unhealthy(
            HealthMetadata::new(Duration::from_secs(5), "cluster"),
            "timeout",
        );
        assert_eq!(status.to_string(), "unhealthy: timeout (5000ms)");
    }
}
