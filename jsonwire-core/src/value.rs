//! Type-driven wire codec
//!
//! [`WireValue`] ties a Rust type to the coercion used for it on the wire.
//! Scalars delegate to [`crate::scalar`]; shapes and unions get their impls
//! from `#[derive(Shape)]` / `#[derive(Union)]`; collections recurse.
//!
//! Collections follow the protocol's null handling: `null` list elements are
//! dropped (not preserved as holes) and map entries with `null` values are
//! skipped. Failures inside a collection are tagged with the element index
//! or map key.

use crate::error::{Error, Result};
use crate::projector::EncodeContext;
use crate::scalar::{self, Blob, LazyJson, Timestamp};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// A value with a defined wire (JSON) representation
pub trait WireValue: Sized {
    /// Encode into wire JSON
    ///
    /// The context supplies collaborators such as the idempotency token
    /// source; scalar impls ignore it.
    fn to_wire(&self, cx: &EncodeContext<'_>) -> Result<Value>;

    /// Decode from wire JSON
    ///
    /// Never called with `null` by the field projector; a direct call with
    /// `null` is a type mismatch.
    fn from_wire(value: &Value) -> Result<Self>;
}

macro_rules! scalar_wire_value {
    ($ty:ty, $encode:expr, $decode:path) => {
        impl WireValue for $ty {
            fn to_wire(&self, _cx: &EncodeContext<'_>) -> Result<Value> {
                Ok($encode(self))
            }

            fn from_wire(value: &Value) -> Result<Self> {
                $decode(value)
            }
        }
    };
}

scalar_wire_value!(String, |v: &String| scalar::encode_string(v), scalar::decode_string);
scalar_wire_value!(bool, |v: &bool| scalar::encode_bool(*v), scalar::decode_bool);
scalar_wire_value!(i32, |v: &i32| scalar::encode_i32(*v), scalar::decode_i32);
scalar_wire_value!(i64, |v: &i64| scalar::encode_i64(*v), scalar::decode_i64);
scalar_wire_value!(f32, |v: &f32| scalar::encode_f32(*v), scalar::decode_f32);
scalar_wire_value!(f64, |v: &f64| scalar::encode_f64(*v), scalar::decode_f64);
scalar_wire_value!(Timestamp, scalar::encode_timestamp, scalar::decode_timestamp);
scalar_wire_value!(LazyJson, scalar::encode_lazy_json, scalar::decode_lazy_json);
scalar_wire_value!(Blob, scalar::encode_blob, scalar::decode_blob);

/// Untyped documents pass through unchanged
impl WireValue for Value {
    fn to_wire(&self, _cx: &EncodeContext<'_>) -> Result<Value> {
        Ok(self.clone())
    }

    fn from_wire(value: &Value) -> Result<Self> {
        Ok(value.clone())
    }
}

/// Recursive shapes box their self-referencing members
impl<T: WireValue> WireValue for Box<T> {
    fn to_wire(&self, cx: &EncodeContext<'_>) -> Result<Value> {
        (**self).to_wire(cx)
    }

    fn from_wire(value: &Value) -> Result<Self> {
        T::from_wire(value).map(Box::new)
    }
}

impl<T: WireValue> WireValue for Vec<T> {
    fn to_wire(&self, cx: &EncodeContext<'_>) -> Result<Value> {
        self.iter()
            .enumerate()
            .map(|(i, item)| item.to_wire(cx).map_err(|e| e.in_field(format!("[{}]", i))))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)
    }

    fn from_wire(value: &Value) -> Result<Self> {
        let items = match value {
            Value::Array(items) => items,
            other => {
                return Err(Error::TypeMismatch {
                    expected: "list",
                    found: scalar::json_type(other),
                })
            }
        };
        items
            .iter()
            .enumerate()
            .filter(|(_, item)| !item.is_null())
            .map(|(i, item)| T::from_wire(item).map_err(|e| e.in_field(format!("[{}]", i))))
            .collect()
    }
}

fn map_entries_to_wire<'a, T, I>(entries: I, cx: &EncodeContext<'_>) -> Result<Value>
where
    T: WireValue + 'a,
    I: Iterator<Item = (&'a String, &'a T)>,
{
    let mut out = serde_json::Map::new();
    for (key, value) in entries {
        let encoded = value.to_wire(cx).map_err(|e| e.in_field(key.as_str()))?;
        out.insert(key.clone(), encoded);
    }
    Ok(Value::Object(out))
}

fn map_entries_from_wire<T, C>(value: &Value) -> Result<C>
where
    T: WireValue,
    C: FromIterator<(String, T)>,
{
    let entries = match value {
        Value::Object(entries) => entries,
        other => {
            return Err(Error::TypeMismatch {
                expected: "map",
                found: scalar::json_type(other),
            })
        }
    };
    entries
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| {
            T::from_wire(value)
                .map(|decoded| (key.clone(), decoded))
                .map_err(|e| e.in_field(key.as_str()))
        })
        .collect()
}

impl<T: WireValue> WireValue for HashMap<String, T> {
    fn to_wire(&self, cx: &EncodeContext<'_>) -> Result<Value> {
        map_entries_to_wire(self.iter(), cx)
    }

    fn from_wire(value: &Value) -> Result<Self> {
        map_entries_from_wire(value)
    }
}

impl<T: WireValue> WireValue for BTreeMap<String, T> {
    fn to_wire(&self, cx: &EncodeContext<'_>) -> Result<Value> {
        map_entries_to_wire(self.iter(), cx)
    }

    fn from_wire(value: &Value) -> Result<Self> {
        map_entries_from_wire(value)
    }
}
