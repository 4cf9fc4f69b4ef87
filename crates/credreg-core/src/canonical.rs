//! # Canonical Serialization
//!
//! `CanonicalBytes` is the only input accepted by [`sha256_digest()`]. Ledger
//! entries are hashed through it so that the same logical entry always yields
//! the same digest, whatever field order or whitespace it was stored with.
//!
//! The pipeline is: serialize to a `serde_json::Value`, reject any float,
//! then emit RFC 8785 (JCS) text: sorted keys, compact separators.
//!
//! [`sha256_digest()`]: crate::digest::sha256_digest

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced by JCS canonicalization with float rejection.
///
/// The inner buffer is private; [`CanonicalBytes::new`] is the sole constructor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonicalize any serializable value.
    ///
    /// # Errors
    ///
    /// `FloatRejected` if the value contains a non-integer number,
    /// `SerializationFailed` if serde cannot represent it as JSON.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        reject_floats(&value)?;
        let text = serde_jcs::to_string(&value)?;
        Ok(Self(text.into_bytes()))
    }

    /// The canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

fn reject_floats(value: &Value) -> Result<(), CanonicalizationError> {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(()),
        Value::Number(n) => {
            if !n.is_i64() && !n.is_u64() {
                if let Some(f) = n.as_f64() {
                    return Err(CanonicalizationError::FloatRejected(f));
                }
            }
            Ok(())
        }
        Value::Array(items) => items.iter().try_for_each(reject_floats),
        Value::Object(map) => map.values().try_for_each(reject_floats),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(cb: &CanonicalBytes) -> &str {
        std::str::from_utf8(cb.as_bytes()).unwrap()
    }

    #[test]
    fn test_sorted_compact_output() {
        let data = serde_json::json!({"b": 2, "a": 1, "c": {"z": true, "y": null}});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(text(&cb), r#"{"a":1,"b":2,"c":{"y":null,"z":true}}"#);
    }

    #[test]
    fn test_float_rejected_at_any_depth() {
        let data = serde_json::json!({"a": {"b": [{"c": 3.5}]}});
        match CanonicalBytes::new(&data) {
            Err(CanonicalizationError::FloatRejected(f)) => assert_eq!(f, 3.5),
            other => panic!("expected FloatRejected, got {other:?}"),
        }
    }

    #[test]
    fn test_integers_accepted() {
        let data = serde_json::json!({"neg": -42, "big": 9_999_999_999i64});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(text(&cb), r#"{"big":9999999999,"neg":-42}"#);
    }

    #[test]
    fn test_unicode_passthrough() {
        let data = serde_json::json!({"name": "Adébáyọ̀"});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert!(text(&cb).contains("Adébáyọ̀"));
    }

    #[test]
    fn test_empty_object() {
        let cb = CanonicalBytes::new(&serde_json::json!({})).unwrap();
        assert_eq!(cb.as_bytes(), b"{}");
        assert!(!cb.is_empty());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Key insertion order never changes the canonical bytes.
        #[test]
        fn canonical_bytes_ignore_key_order(
            entries in prop::collection::btree_map("[a-z]{1,8}", any::<i64>(), 1..8)
        ) {
            let forward: serde_json::Map<String, Value> = entries
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::json!(v)))
                .collect();
            let reversed: serde_json::Map<String, Value> = entries
                .iter()
                .rev()
                .map(|(k, v)| (k.clone(), serde_json::json!(v)))
                .collect();
            let a = CanonicalBytes::new(&Value::Object(forward)).unwrap();
            let b = CanonicalBytes::new(&Value::Object(reversed)).unwrap();
            prop_assert_eq!(a.as_bytes(), b.as_bytes());
        }

        /// Canonical output always parses back as JSON.
        #[test]
        fn canonical_bytes_valid_json(s in "[a-zA-Z0-9 _-]{0,40}", n in any::<i64>()) {
            let cb = CanonicalBytes::new(&serde_json::json!({"s": s, "n": n})).unwrap();
            let parsed: Result<Value, _> = serde_json::from_slice(cb.as_bytes());
            prop_assert!(parsed.is_ok());
        }
    }
}
