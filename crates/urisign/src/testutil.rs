//! Keyset fixtures for tests.
//!
//! Feature-gated behind `testutil`.

use crate::keyset::{Key, KeySet, Keyset};

/// Two authorities, each with a renewal key present in its key set.
pub const GOOD_KEYSET: &str = r#"{
  "Kabletown URI Authority 1": {
    "renewal_kid": "Second Key",
    "keys": [
      {
        "alg": "HS256", "kid": "First Key", "kty": "oct",
        "k": "Kh_RkUMj-fzbD37qBnDf_3e_RvQ3RP9PaSmVEpE24AM"
      },
      {
        "alg": "HS256", "kid": "Second Key", "kty": "oct",
        "k": "fZBpDBNbk2GqhwoB_DGBAsBxqQZVix04rIoLJ7p_RlE"
      }
    ]
  },
  "Kabletown URI Authority 2": {
    "renewal_kid": "Third Key",
    "keys": [
      {
        "alg": "HS256", "kid": "First Key", "kty": "oct",
        "k": "Kh_RkUMj-fzbD37qBnDf_3e_RvQ3RP9PaSmVEpE24AM"
      },
      {
        "alg": "HS256", "kid": "Third Key", "kty": "oct",
        "k": "fZBpDBNbk2GqhwoB_DGBAsBxqQZVix04rIoLJ7p_RlE"
      }
    ]
  }
}"#;

/// A document missing its opening brace.
pub const BAD_JSON_KEYSET: &str = r#"
  "Kabletown URI Authority 1": {
    "renewal_kid": "Second Key",
    "keys": [
      {
        "alg": "HS256", "kid": "First Key", "kty": "oct",
        "k": "Kh_RkUMj-fzbD37qBnDf_3e_RvQ3RP9PaSmVEpE24AM"
      }
    ]
  }
}"#;

/// An authority without `renewal_kid`.
pub const NO_RENEWAL_KID_KEYSET: &str = r#"{
  "Kabletown URI Authority 1": {
    "keys": [
      {
        "alg": "HS256", "kid": "First Key", "kty": "oct",
        "k": "Kh_RkUMj-fzbD37qBnDf_3e_RvQ3RP9PaSmVEpE24AM"
      },
      {
        "alg": "HS256", "kid": "Second Key", "kty": "oct",
        "k": "fZBpDBNbk2GqhwoB_DGBAsBxqQZVix04rIoLJ7p_RlE"
      }
    ]
  }
}"#;

/// An authority whose `renewal_kid` matches none of its keys.
pub const NO_MATCHING_RENEWAL_KID_KEYSET: &str = r#"{
  "Kabletown URI Authority 1": {
    "renewal_kid": "Second Key",
    "keys": [
      {
        "alg": "HS256", "kid": "First Key", "kty": "oct",
        "k": "Kh_RkUMj-fzbD37qBnDf_3e_RvQ3RP9PaSmVEpE24AM"
      },
      {
        "alg": "HS256", "kid": "Other Key", "kty": "oct",
        "k": "fZBpDBNbk2GqhwoB_DGBAsBxqQZVix04rIoLJ7p_RlE"
      }
    ]
  }
}"#;

/// An `HS256` octet key with fixed material.
pub fn test_key(kid: &str) -> Key {
    Key::builder().alg("HS256").kid(kid).kty("oct").k("c2VjcmV0LW1hdGVyaWFs").build()
}

/// A single-authority keyset with the given renewal kid and key ids.
pub fn single_authority(authority: &str, renewal_kid: &str, kids: &[&str]) -> Keyset {
    let mut keyset = Keyset::new();
    let keys = kids.iter().map(|kid| test_key(kid)).collect();
    keyset.insert(authority, KeySet::new(renewal_kid, keys));
    keyset
}
