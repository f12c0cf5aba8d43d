//! Union codec
//!
//! A union is encoded as a single-key object whose key names the populated
//! variant: `{"Rate": {...}}`. Decoding tolerates variants this client does not
//! know about, preserving them as [`UnknownVariant`] so they can be inspected
//! or forwarded unchanged.

use crate::error::{Error, Result};
use crate::projector::{EncodeContext, Object};
use crate::scalar;
use serde_json::Value;

/// A variant key the client was not built with, kept verbatim
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownVariant {
    pub key: String,
    pub value: Value,
}

/// A tagged union with exactly one populated variant
pub trait Union: Sized {
    /// Union name, used in error messages
    const NAME: &'static str;

    /// Known variant keys, in declaration order
    const VARIANTS: &'static [&'static str];

    /// Wire key of the populated variant
    fn variant_key(&self) -> &str;

    /// Encode the populated variant's value
    fn encode_variant(&self, cx: &EncodeContext<'_>) -> Result<Value>;

    /// Decode a known variant; `key` is always one of [`Union::VARIANTS`]
    fn decode_variant(key: &str, value: &Value) -> Result<Self>;

    /// Wrap a variant this client does not recognise
    fn unknown(variant: UnknownVariant) -> Self;
}

/// `WireValue::to_wire` for unions
pub fn encode_union<U: Union>(union: &U, cx: &EncodeContext<'_>) -> Result<Value> {
    let key = union.variant_key();
    let value = union.encode_variant(cx).map_err(|e| e.in_field(key))?;
    let mut out = Object::new();
    out.insert(key.to_owned(), value);
    Ok(Value::Object(out))
}

/// `WireValue::from_wire` for unions
///
/// The first declared variant present with a non-null value wins. Otherwise
/// the object's first entry, whatever its value, becomes the unknown variant.
/// Only `{}` is [`Error::EmptyUnion`].
pub fn decode_union<U: Union>(value: &Value) -> Result<U> {
    let wire = match value {
        Value::Object(wire) => wire,
        other => {
            return Err(Error::TypeMismatch {
                expected: "union",
                found: scalar::json_type(other),
            })
        }
    };

    let known = U::VARIANTS
        .iter()
        .find_map(|key| wire.get(*key).filter(|v| !v.is_null()).map(|v| (*key, v)));
    if let Some((key, value)) = known {
        return U::decode_variant(key, value).map_err(|e| e.in_field(key));
    }

    match wire.iter().next() {
        Some((key, value)) => {
            tracing::debug!(union = U::NAME, variant = %key, "Decoded unknown union variant");
            Ok(U::unknown(UnknownVariant {
                key: key.clone(),
                value: value.clone(),
            }))
        }
        None => Err(Error::EmptyUnion(U::NAME)),
    }
}
