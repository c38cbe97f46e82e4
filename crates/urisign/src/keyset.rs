//! URI-signing keyset documents.
//!
//! A keyset document maps each signing authority to its [`KeySet`]:
//!
//! ```json
//! {
//!   "Kabletown URI Authority 1": {
//!     "renewal_kid": "Second Key",
//!     "keys": [
//!       { "alg": "HS256", "kid": "First Key", "kty": "oct", "k": "..." },
//!       { "alg": "HS256", "kid": "Second Key", "kty": "oct", "k": "..." }
//!     ]
//!   }
//! }
//! ```
//!
//! Documents are transient: parsed from a request or a stored value,
//! validated, used, and dropped. Key material is zeroed on drop and never
//! printed by `Debug`.

use std::{
    collections::{BTreeMap, btree_map},
    fmt,
};

use serde::{Deserialize, Deserializer, Serialize};
use zeroize::Zeroizing;

use crate::error::KeysetError;

/// A single signing key in JWK form.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, bon::Builder)]
pub struct Key {
    /// Signing algorithm, e.g. `HS256`.
    #[builder(into)]
    pub alg: String,

    /// Key identifier. Uniqueness within a [`KeySet`] is not enforced.
    #[builder(into)]
    pub kid: String,

    /// Key type, e.g. `oct`.
    #[builder(into)]
    pub kty: String,

    /// Secret key material (base64url).
    #[builder(with = |k: impl Into<String>| Zeroizing::new(k.into()))]
    pub k: Zeroizing<String>,
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("alg", &self.alg)
            .field("kid", &self.kid)
            .field("kty", &self.kty)
            .field("k", &"[REDACTED]")
            .finish()
    }
}

/// The keys of one signing authority and the rotation target among them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySet {
    /// `kid` of the key signing clients should migrate to.
    ///
    /// An absent or `null` field deserializes to the empty string, which
    /// fails validation rather than parsing.
    #[serde(default, deserialize_with = "null_as_default")]
    pub renewal_kid: String,

    /// Keys in document order. Absent or `null` means no keys.
    #[serde(default, deserialize_with = "null_as_default")]
    pub keys: Vec<Key>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl KeySet {
    /// Creates a key set.
    #[must_use]
    pub fn new(renewal_kid: impl Into<String>, keys: Vec<Key>) -> Self {
        Self { renewal_kid: renewal_kid.into(), keys }
    }

    /// Returns the first key whose `kid` equals `renewal_kid`.
    #[must_use]
    pub fn renewal_key(&self) -> Option<&Key> {
        self.keys.iter().find(|key| key.kid == self.renewal_kid)
    }
}

/// A keyset document: signing authority name to [`KeySet`].
///
/// Authorities are kept in name order, so iteration and serialization are
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Keyset(BTreeMap<String, KeySet>);

impl Keyset {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an authority, returning the previous key set.
    pub fn insert(&mut self, authority: impl Into<String>, key_set: KeySet) -> Option<KeySet> {
        self.0.insert(authority.into(), key_set)
    }

    /// Returns the key set of `authority`.
    #[must_use]
    pub fn get(&self, authority: &str) -> Option<&KeySet> {
        self.0.get(authority)
    }

    /// Iterates authorities in name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, KeySet> {
        self.0.iter()
    }

    /// Iterates authority names in order.
    pub fn authorities(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of authorities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the document has no authorities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, KeySet)> for Keyset {
    fn from_iter<I: IntoIterator<Item = (String, KeySet)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Keyset {
    type Item = (&'a String, &'a KeySet);
    type IntoIter = btree_map::Iter<'a, String, KeySet>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Parses a keyset document without validating it.
///
/// Unknown fields are ignored.
///
/// # Errors
///
/// Returns [`KeysetError::Parse`] if `bytes` is not a well-formed document.
pub fn parse_keyset(bytes: &[u8]) -> Result<Keyset, KeysetError> {
    serde_json::from_slice(bytes).map_err(KeysetError::Parse)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn key(kid: &str) -> Key {
        Key::builder().alg("HS256").kid(kid).kty("oct").k("c2VjcmV0").build()
    }

    #[test]
    fn test_parse_document() {
        let keyset = parse_keyset(
            br#"{"Auth1": {"renewal_kid": "K2", "keys": [
                {"alg": "HS256", "kid": "K1", "kty": "oct", "k": "a"},
                {"alg": "HS256", "kid": "K2", "kty": "oct", "k": "b"}
            ]}}"#,
        )
        .unwrap();

        let auth = keyset.get("Auth1").unwrap();
        assert_eq!(auth.renewal_kid, "K2");
        assert_eq!(auth.keys.len(), 2);
        assert_eq!(auth.renewal_key().map(|k| k.k.as_str()), Some("b"));
    }

    #[test]
    fn test_missing_renewal_kid_parses_as_empty() {
        let keyset = parse_keyset(br#"{"Auth1": {"keys": []}}"#).unwrap();
        assert_eq!(keyset.get("Auth1").unwrap().renewal_kid, "");
    }

    #[test]
    fn test_null_fields_parse_as_empty() {
        let keyset = parse_keyset(br#"{"Auth1": {"renewal_kid": null, "keys": null}}"#).unwrap();

        let auth = keyset.get("Auth1").unwrap();
        assert_eq!(auth.renewal_kid, "");
        assert!(auth.keys.is_empty());
    }

    #[test]
    fn test_wrongly_typed_field_is_parse_error() {
        let err = parse_keyset(br#"{"Auth1": {"renewal_kid": 7, "keys": []}}"#).unwrap_err();
        assert!(matches!(err, KeysetError::Parse(_)));
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let keyset =
            parse_keyset(br#"{"Auth1": {"renewal_kid": "K1", "keys": [], "comment": "x"}}"#)
                .unwrap();
        assert_eq!(keyset.len(), 1);
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = parse_keyset(br#""Auth1": {"renewal_kid": "K1"}}"#).unwrap_err();
        assert!(matches!(err, KeysetError::Parse(_)));
    }

    #[test]
    fn test_authorities_are_ordered() {
        let keyset: Keyset = [
            ("b".to_owned(), KeySet::default()),
            ("a".to_owned(), KeySet::default()),
            ("c".to_owned(), KeySet::default()),
        ]
        .into_iter()
        .collect();

        assert_eq!(keyset.authorities().collect::<Vec<_>>(), ["a", "b", "c"]);
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let mut keyset = Keyset::new();
        keyset.insert("Auth1", KeySet::new("K1", vec![key("K1")]));

        let json = serde_json::to_value(&keyset).unwrap();
        assert_eq!(json["Auth1"]["renewal_kid"], "K1");
        assert_eq!(json["Auth1"]["keys"][0]["k"], "c2VjcmV0");
    }

    #[test]
    fn test_debug_redacts_key_material() {
        let debug = format!("{:?}", key("K1"));
        assert!(debug.contains("K1"));
        assert!(!debug.contains("c2VjcmV0"));
    }

    #[test]
    fn test_renewal_key_picks_first_match() {
        let mut second = key("K1");
        second.k = Zeroizing::new("other".to_owned());
        let set = KeySet::new("K1", vec![key("K1"), second]);

        assert_eq!(set.renewal_key().map(|k| k.k.as_str()), Some("c2VjcmV0"));
    }
}
