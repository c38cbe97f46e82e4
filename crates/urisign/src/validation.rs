//! Rotation checks for keyset documents.
//!
//! Every authority must name a renewal key, and that key must be present in
//! the authority's key set. Publishing a rotation pointer to a key that does
//! not exist breaks signature verification for every client that advances
//! to it.

use crate::{
    error::{KeysetError, ValidationError},
    keyset::{Keyset, parse_keyset},
};

/// Checks the rotation rules of every authority in `keyset`.
///
/// Stops at the first violation. Authorities are checked in name order, so
/// the reported violation is deterministic. An empty document is valid.
///
/// # Errors
///
/// - [`ValidationError::MissingRenewalKid`] if an authority's `renewal_kid` is empty.
/// - [`ValidationError::RenewalKeyNotFound`] if no key's `kid` equals the `renewal_kid`.
///
/// # Examples
///
/// ```
/// use edgeauth_urisign::{Key, KeySet, Keyset, ValidationError, validate_keyset};
///
/// let key = Key::builder().alg("HS256").kid("K1").kty("oct").k("secret").build();
/// let mut keyset = Keyset::new();
/// keyset.insert("Auth1", KeySet::new("K2", vec![key]));
///
/// assert!(matches!(
///     validate_keyset(&keyset),
///     Err(ValidationError::RenewalKeyNotFound { .. })
/// ));
/// ```
pub fn validate_keyset(keyset: &Keyset) -> Result<(), ValidationError> {
    for (authority, key_set) in keyset {
        if key_set.renewal_kid.is_empty() {
            return Err(ValidationError::MissingRenewalKid { authority: authority.clone() });
        }
        if key_set.renewal_key().is_none() {
            return Err(ValidationError::RenewalKeyNotFound {
                authority: authority.clone(),
                renewal_kid: key_set.renewal_kid.clone(),
            });
        }
    }
    Ok(())
}

/// Parses a keyset document and validates it.
///
/// # Errors
///
/// Returns [`KeysetError::Parse`] for malformed input, which never reaches
/// validation, and [`KeysetError::Validation`] for rotation violations.
pub fn parse_and_validate(bytes: &[u8]) -> Result<Keyset, KeysetError> {
    let keyset = parse_keyset(bytes)?;
    validate_keyset(&keyset)?;
    Ok(keyset)
}
