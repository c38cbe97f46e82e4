//! Validation and storage of URI-signing keysets.
//!
//! CDN edges authenticate signed URLs with per-authority keys. Each
//! authority publishes a set of keys and names one of them, the renewal
//! key, as the target of the current rotation. A keyset is only trusted
//! once every authority's renewal key is present in its key set.
//!
//! # Layers
//!
//! - [`parse_keyset`] / [`validate_keyset`]: pure document checks.
//! - [`KeysetStore`]: validated reads and writes over any
//!   [`StorageBackend`](edgeauth_storage::StorageBackend).
//! - [`UriSigningKeys`]: per-call cluster sessions built with
//!   [`get_cluster`](edgeauth_cluster::get_cluster).
//!
//! # Example
//!
//! ```
//! use edgeauth_urisign::{KeysetError, ValidationError, parse_and_validate};
//!
//! let body = br#"{"Auth1": {"keys": [{"alg": "HS256", "kid": "K1", "kty": "oct", "k": "a"}]}}"#;
//!
//! assert!(matches!(
//!     parse_and_validate(body),
//!     Err(KeysetError::Validation(ValidationError::MissingRenewalKid { .. }))
//! ));
//! ```
//!
//! # Feature Flags
//!
//! - **`testutil`**: Enables the [`testutil`] module with keyset fixtures.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
pub mod keyset;
mod service;
mod store;
pub mod validation;

/// Keyset fixtures for tests.
#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

/// Error types.
pub use error::{KeysetError, ValidationError};
/// Keyset document types.
pub use keyset::{Key, KeySet, Keyset, parse_keyset};
/// Cluster-backed key flows.
pub use service::UriSigningKeys;
/// Validated keyset persistence.
pub use store::{KeysetStore, URI_SIGNING_BUCKET};
/// Document validation.
pub use validation::{parse_and_validate, validate_keyset};
