//! Scalar coercion library
//!
//! Paired, pure functions converting untyped wire JSON into typed scalars and
//! back. Decoders are strict about JSON types: a string where a number is
//! expected is a [`Error::TypeMismatch`], never a silent parse. The two
//! deliberate relaxations are:
//!
//! - floating point fields accept the sentinels `"NaN"`, `"Infinity"` and
//!   `"-Infinity"`, since strict JSON has no literal for them
//! - the `lenient_*` modules accept numeric strings for APIs that send big
//!   integers quoted
//!
//! The wrapper types here ([`Timestamp`], [`LazyJson`], [`Blob`]) carry the
//! wire format in their type so shapes pick the right coercion by declaring
//! the field type. Formats that differ from a type's default are selected with
//! `#[wire(with = "...")]` and one of the codec modules ([`date_time`],
//! [`lenient_i64`], [`lenient_i32`]).

use crate::error::{Error, Result};
use base64::Engine as _;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Number, Value};
use std::fmt;

const NAN: &str = "NaN";
const INFINITY: &str = "Infinity";
const NEG_INFINITY: &str = "-Infinity";

/// Name of a JSON value's type, as reported in type mismatch errors
pub fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn mismatch(expected: &'static str, found: &Value) -> Error {
    Error::TypeMismatch {
        expected,
        found: json_type(found),
    }
}

pub fn encode_string(value: &str) -> Value {
    Value::String(value.to_owned())
}

pub fn decode_string(value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(mismatch("string", other)),
    }
}

pub fn encode_bool(value: bool) -> Value {
    Value::Bool(value)
}

pub fn decode_bool(value: &Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        other => Err(mismatch("boolean", other)),
    }
}

pub fn encode_i64(value: i64) -> Value {
    Value::Number(value.into())
}

/// Decode a JSON integer into an `i64`
///
/// Fractional numbers and integers beyond the `i64` range are rejected.
pub fn decode_i64(value: &Value) -> Result<i64> {
    match value {
        Value::Number(n) => integer_from_number(n, "int64"),
        other => Err(mismatch("int64", other)),
    }
}

pub fn encode_i32(value: i32) -> Value {
    Value::Number(value.into())
}

pub fn decode_i32(value: &Value) -> Result<i32> {
    match value {
        Value::Number(n) => narrow_i32(integer_from_number(n, "int32")?),
        other => Err(mismatch("int32", other)),
    }
}

fn integer_from_number(n: &Number, expected: &'static str) -> Result<i64> {
    if let Some(i) = n.as_i64() {
        return Ok(i);
    }
    if n.is_u64() {
        return Err(Error::NumberOutOfRange {
            expected,
            value: n.to_string(),
        });
    }
    Err(Error::TypeMismatch {
        expected,
        found: "fractional number",
    })
}

fn narrow_i32(value: i64) -> Result<i32> {
    i32::try_from(value).map_err(|_| Error::NumberOutOfRange {
        expected: "int32",
        value: value.to_string(),
    })
}

/// Decode an `i64` that may arrive either as a JSON number or a numeric string
pub fn decode_i64_lenient(value: &Value) -> Result<i64> {
    match value {
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| Error::TypeMismatch {
            expected: "int64",
            found: "non-numeric string",
        }),
        other => decode_i64(other),
    }
}

/// Decode an `i32` that may arrive either as a JSON number or a numeric string
pub fn decode_i32_lenient(value: &Value) -> Result<i32> {
    match value {
        Value::String(_) => narrow_i32(decode_i64_lenient(value)?),
        other => decode_i32(other),
    }
}

/// Encode a double, emitting non-finite values as string sentinels
pub fn encode_f64(value: f64) -> Value {
    match Number::from_f64(value) {
        Some(n) => Value::Number(n),
        None if value.is_nan() => Value::String(NAN.into()),
        None if value.is_sign_positive() => Value::String(INFINITY.into()),
        None => Value::String(NEG_INFINITY.into()),
    }
}

/// Decode a double ("limited parse")
///
/// Accepts any JSON number plus the three non-finite sentinels. Other
/// strings are rejected.
pub fn decode_f64(value: &Value) -> Result<f64> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| mismatch("double", value)),
        Value::String(s) => match s.as_str() {
            NAN => Ok(f64::NAN),
            INFINITY => Ok(f64::INFINITY),
            NEG_INFINITY => Ok(f64::NEG_INFINITY),
            _ => Err(Error::TypeMismatch {
                expected: "double",
                found: "non-numeric string",
            }),
        },
        other => Err(mismatch("double", other)),
    }
}

pub fn encode_f32(value: f32) -> Value {
    encode_f64(f64::from(value))
}

/// Finite doubles beyond `f32` range are rejected rather than saturated
pub fn decode_f32(value: &Value) -> Result<f32> {
    let wide = decode_f64(value)?;
    let narrow = wide as f32;
    if wide.is_finite() && narrow.is_infinite() {
        return Err(Error::NumberOutOfRange {
            expected: "float",
            value: wide.to_string(),
        });
    }
    Ok(narrow)
}

/// A point in time with millisecond precision
///
/// On the wire a timestamp is epoch seconds as a JSON number, fractional part
/// preserved (`1700000000.25`). Sub-millisecond precision is dropped when a
/// timestamp is constructed, so encode/decode round trips are exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self::from(Utc::now())
    }

    pub fn from_epoch_millis(millis: i64) -> Result<Self> {
        DateTime::from_timestamp_millis(millis)
            .map(Self)
            .ok_or_else(|| Error::InvalidTimestamp(format!("{} ms is out of range", millis)))
    }

    /// Build a timestamp from (possibly fractional) seconds since the epoch
    pub fn from_epoch_seconds(seconds: f64) -> Result<Self> {
        if !seconds.is_finite() {
            return Err(Error::InvalidTimestamp(format!("{} is not finite", seconds)));
        }
        let millis = (seconds * 1000.0).round();
        if millis < i64::MIN as f64 || millis > i64::MAX as f64 {
            return Err(Error::InvalidTimestamp(format!("{} s is out of range", seconds)));
        }
        Self::from_epoch_millis(millis as i64)
    }

    pub fn epoch_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Seconds since the epoch, fractional milliseconds included
    pub fn epoch_seconds(&self) -> f64 {
        self.epoch_millis() as f64 / 1000.0
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value.trunc_subsecs(3))
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(value: Timestamp) -> Self {
        value.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

pub fn encode_timestamp(value: &Timestamp) -> Value {
    encode_f64(value.epoch_seconds())
}

/// Decode epoch seconds into a [`Timestamp`]
///
/// `null` is rejected: a field declared as a timestamp never silently
/// decodes to an invalid date. Numeric strings are tolerated.
pub fn decode_timestamp(value: &Value) -> Result<Timestamp> {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(seconds) => Timestamp::from_epoch_seconds(seconds),
            None => Err(mismatch("timestamp", value)),
        },
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(seconds) => Timestamp::from_epoch_seconds(seconds),
            Err(_) => Err(Error::TypeMismatch {
                expected: "timestamp",
                found: "non-numeric string",
            }),
        },
        other => Err(mismatch("timestamp", other)),
    }
}

/// A JSON document carried as a JSON-encoded string
///
/// The raw text is kept as received and only parsed when asked, so callers
/// that pass the value through never pay for a second parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct LazyJson(String);

impl LazyJson {
    /// Wrap text that is already JSON
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Serialize a value into its JSON text form
    pub fn from_value<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        serde_json::to_string(value)
            .map(Self)
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn parse(&self) -> Result<Value> {
        serde_json::from_str(&self.0).map_err(|e| Error::MalformedJson(e.to_string()))
    }

    pub fn parse_as<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.0).map_err(Error::from)
    }
}

impl From<String> for LazyJson {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&str> for LazyJson {
    fn from(raw: &str) -> Self {
        Self(raw.to_owned())
    }
}

impl fmt::Display for LazyJson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn encode_lazy_json(value: &LazyJson) -> Value {
    Value::String(value.0.clone())
}

/// Decode a lazy JSON string
///
/// Servers occasionally inline the document instead of quoting it; such
/// values are re-serialized so the wrapper always holds JSON text.
pub fn decode_lazy_json(value: &Value) -> Result<LazyJson> {
    match value {
        Value::String(s) => Ok(LazyJson(s.clone())),
        Value::Null => Err(mismatch("JSON string", value)),
        other => LazyJson::from_value(other),
    }
}

/// Binary payload, base64 encoded on the wire
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Blob(Vec<u8>);

impl Blob {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

pub fn encode_blob(value: &Blob) -> Value {
    Value::String(base64::engine::general_purpose::STANDARD.encode(&value.0))
}

pub fn decode_blob(value: &Value) -> Result<Blob> {
    let text = match value {
        Value::String(s) => s,
        other => return Err(mismatch("blob", other)),
    };
    base64::engine::general_purpose::STANDARD
        .decode(text)
        .map(Blob)
        .map_err(|e| Error::InvalidBlob(e.to_string()))
}

/// ISO-8601 date-time codec for timestamp fields declared with that format
pub mod date_time {
    use super::*;

    pub fn encode(value: &Timestamp) -> Result<Value> {
        Ok(Value::String(value.to_string()))
    }

    pub fn decode(value: &Value) -> Result<Timestamp> {
        let text = decode_string(value).map_err(|_| mismatch("date-time", value))?;
        DateTime::parse_from_rfc3339(&text)
            .map(|parsed| Timestamp::from(parsed.with_timezone(&Utc)))
            .map_err(|e| Error::InvalidTimestamp(format!("{}: {}", text, e)))
    }
}

/// `i64` codec accepting numeric strings on decode
pub mod lenient_i64 {
    use super::*;

    pub fn encode(value: &i64) -> Result<Value> {
        Ok(encode_i64(*value))
    }

    pub fn decode(value: &Value) -> Result<i64> {
        decode_i64_lenient(value)
    }
}

/// `i32` codec accepting numeric strings on decode
pub mod lenient_i32 {
    use super::*;

    pub fn encode(value: &i32) -> Result<Value> {
        Ok(encode_i32(*value))
    }

    pub fn decode(value: &Value) -> Result<i32> {
        decode_i32_lenient(value)
    }
}
