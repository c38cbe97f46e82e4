//! Keyset error types.
//!
//! [`ValidationError`] reports a parseable document that breaks the rotation
//! rules. [`KeysetError`] covers the whole read/write flow, from parsing
//! through cluster access.

use edgeauth_cluster::ClusterError;
use edgeauth_storage::StorageError;
use thiserror::Error;

/// A keyset document is well-formed but must not be trusted.
///
/// # Non-exhaustive
///
/// New variants may be added in future minor releases without a
/// semver-breaking change. Downstream match expressions must include a
/// wildcard arm (`_ =>`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ValidationError {
    /// The authority names no renewal key.
    #[error("signing authority '{authority}' has no renewal_kid")]
    MissingRenewalKid {
        /// Authority whose `renewal_kid` is empty or absent.
        authority: String,
    },

    /// The authority's renewal key is not among its keys.
    #[error("signing authority '{authority}' has no key with kid '{renewal_kid}'")]
    RenewalKeyNotFound {
        /// Authority whose key set is missing the renewal key.
        authority: String,
        /// The `renewal_kid` that matched no key.
        renewal_kid: String,
    },
}

impl ValidationError {
    /// Returns the offending authority name.
    #[must_use]
    pub fn authority(&self) -> &str {
        match self {
            Self::MissingRenewalKid { authority } | Self::RenewalKeyNotFound { authority, .. } => {
                authority
            },
        }
    }
}

/// Errors from reading, writing, or deleting keysets.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KeysetError {
    /// The document is not well-formed JSON of the expected shape.
    #[error("malformed keyset document: {0}")]
    Parse(#[source] serde_json::Error),

    /// The document parsed but breaks the rotation rules.
    #[error("invalid keyset: {0}")]
    Validation(#[from] ValidationError),

    /// The backing store failed.
    #[error("keyset storage failed: {0}")]
    Storage(#[from] StorageError),

    /// No keyset is stored for the delivery service.
    #[error("no URI signing keys for delivery service '{xml_id}'")]
    NotFound {
        /// Delivery service identifier.
        xml_id: String,
    },

    /// A cluster session could not be built.
    #[error("cluster unavailable: {0}")]
    Cluster(#[from] ClusterError),
}

impl KeysetError {
    /// Returns `true` if the caller supplied an unusable document.
    ///
    /// These errors go back to whoever published the keyset; everything
    /// else is a server-side failure.
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::Parse(_) | Self::Validation(_))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use edgeauth_cluster::AvailabilityError;
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_validation_error_display() {
        assert_eq!(
            ValidationError::MissingRenewalKid { authority: "Auth1".into() }.to_string(),
            "signing authority 'Auth1' has no renewal_kid"
        );
        assert_eq!(
            ValidationError::RenewalKeyNotFound {
                authority: "Auth1".into(),
                renewal_kid: "K2".into(),
            }
            .to_string(),
            "signing authority 'Auth1' has no key with kid 'K2'"
        );
    }

    #[test]
    fn test_validation_error_authority() {
        let err = ValidationError::RenewalKeyNotFound {
            authority: "Auth1".into(),
            renewal_kid: "K2".into(),
        };
        assert_eq!(err.authority(), "Auth1");
    }

    fn parse_error() -> KeysetError {
        KeysetError::Parse(serde_json::from_str::<serde_json::Value>("{").unwrap_err())
    }

    #[rstest]
    #[case::parse(parse_error(), true)]
    #[case::validation(
        ValidationError::MissingRenewalKid { authority: "a".into() }.into(),
        true
    )]
    #[case::storage(StorageError::timeout().into(), false)]
    #[case::not_found(KeysetError::NotFound { xml_id: "ds".into() }, false)]
    #[case::cluster(ClusterError::from(AvailabilityError::NoNodesAvailable).into(), false)]
    fn test_is_invalid_input(#[case] err: KeysetError, #[case] expected: bool) {
        assert_eq!(err.is_invalid_input(), expected);
    }
}
