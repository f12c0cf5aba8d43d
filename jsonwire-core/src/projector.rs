//! Field projector
//!
//! Every shape serializer and deserializer is a thin wrapper around the two
//! functions in this module: [`encode_fields`] and [`decode_fields`]. Both are
//! driven by the shape's static directive table (`&'static [Field<S>]`), never
//! by the source object, which gives the protocol's allow-list semantics:
//!
//! - members not in the table are never emitted, and unknown wire keys are
//!   ignored on decode
//! - absent and `null` values are omitted from the output (no key with a
//!   `null` value is ever written), except for idempotency-token members
//!   which are generated when the caller left them empty
//! - output order is table order
//! - a failure for one member is tagged with that member's wire name
//!
//! Tables are normally generated by `#[derive(Shape)]`. Writing one by hand
//! looks like this:
//!
//! ```rust
//! use jsonwire_core::{Directive, EncodeContext, Field, Fields, Result, Shape, WireValue};
//!
//! struct DeleteJob {
//!     job_id: String,
//!     client_token: Option<String>,
//! }
//!
//! impl Shape for DeleteJob {
//!     const NAME: &'static str = "DeleteJob";
//!
//!     fn fields() -> &'static [Field<Self>] {
//!         const FIELDS: &[Field<DeleteJob>] = &[
//!             Field {
//!                 member: "job_id",
//!                 wire: "JobId",
//!                 aliases: &[],
//!                 required: true,
//!                 directive: Directive::Member,
//!                 encode: |s, cx| s.job_id.to_wire(cx).map(Some),
//!             },
//!             Field {
//!                 member: "client_token",
//!                 wire: "ClientToken",
//!                 aliases: &[],
//!                 required: false,
//!                 directive: Directive::IdempotencyToken,
//!                 encode: |s, cx| s.client_token.as_ref().map(|v| v.to_wire(cx)).transpose(),
//!             },
//!         ];
//!         FIELDS
//!     }
//!
//!     fn from_fields(fields: &Fields<'_, Self>) -> Result<Self> {
//!         Ok(DeleteJob {
//!             job_id: fields.required(0)?,
//!             client_token: fields.optional(1)?,
//!         })
//!     }
//! }
//!
//! let input = DeleteJob { job_id: "j-1".into(), client_token: None };
//! let wire = input.encode(&EncodeContext::default()).unwrap();
//! assert_eq!(wire["JobId"], "j-1");
//! assert!(wire["ClientToken"].is_string());
//! ```

use crate::error::{Error, Result};
use crate::scalar;
use serde_json::{Map, Value};

/// JSON object as produced and consumed by shape codecs
pub type Object = Map<String, Value>;

/// Source of idempotency tokens
///
/// Implementations must return a fresh value on every call.
pub trait TokenSource: Send + Sync {
    fn generate(&self) -> String;
}

/// Random (v4) UUID tokens
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidTokenSource;

impl TokenSource for UuidTokenSource {
    fn generate(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

static DEFAULT_TOKENS: UuidTokenSource = UuidTokenSource;

/// Collaborators available while encoding
#[derive(Clone, Copy)]
pub struct EncodeContext<'a> {
    tokens: &'a dyn TokenSource,
}

impl<'a> EncodeContext<'a> {
    pub fn new(tokens: &'a dyn TokenSource) -> Self {
        Self { tokens }
    }

    pub fn generate_token(&self) -> String {
        self.tokens.generate()
    }
}

impl Default for EncodeContext<'static> {
    fn default() -> Self {
        Self::new(&DEFAULT_TOKENS)
    }
}

impl std::fmt::Debug for EncodeContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodeContext").finish_non_exhaustive()
    }
}

/// How the projector treats a member beyond its type-driven codec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Copy, coerce or recurse according to the member's type
    Member,
    /// Use the caller's value if present, otherwise generate a token
    IdempotencyToken,
}

/// Encoder for one member: `Ok(None)` means "absent, omit the key"
pub type FieldEncoder<S> = fn(&S, &EncodeContext<'_>) -> Result<Option<Value>>;

/// One row of a shape's directive table
pub struct Field<S> {
    /// In-memory member name
    pub member: &'static str,
    /// Key used on the wire
    pub wire: &'static str,
    /// Additional keys accepted on decode, checked after `wire`
    pub aliases: &'static [&'static str],
    /// Whether decode fails when the member is absent or `null`
    pub required: bool,
    pub directive: Directive,
    pub encode: FieldEncoder<S>,
}

impl<S> std::fmt::Debug for Field<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("member", &self.member)
            .field("wire", &self.wire)
            .field("aliases", &self.aliases)
            .field("required", &self.required)
            .field("directive", &self.directive)
            .finish()
    }
}

/// Project a shape onto its wire object
pub fn encode_fields<S>(source: &S, table: &[Field<S>], cx: &EncodeContext<'_>) -> Result<Object> {
    let mut out = Object::new();
    for field in table {
        let encoded = (field.encode)(source, cx).map_err(|e| e.in_field(field.wire))?;
        let value = match (encoded, field.directive) {
            (Some(value), _) if !value.is_null() => Some(value),
            (_, Directive::IdempotencyToken) => Some(Value::String(cx.generate_token())),
            _ => None,
        };
        if let Some(value) = value {
            out.insert(field.wire.to_owned(), value);
        }
    }
    Ok(out)
}

/// Resolve a wire object against a directive table
///
/// Returns the per-member wire values in table order, ready to be decoded
/// through [`Fields`]. Required members that are absent or `null` fail here
/// with [`Error::MissingField`].
pub fn decode_fields<'a, S: 'static>(wire: &'a Object, table: &'static [Field<S>]) -> Result<Fields<'a, S>> {
    let mut values = Vec::with_capacity(table.len());
    for field in table {
        let value = std::iter::once(field.wire)
            .chain(field.aliases.iter().copied())
            .find_map(|key| wire.get(key).filter(|v| !v.is_null()));
        if value.is_none() && field.required {
            return Err(Error::MissingField(field.wire.to_owned()));
        }
        values.push(value);
    }
    Ok(Fields { table, values })
}

/// Wire values resolved for each row of a directive table
pub struct Fields<'a, S: 'static> {
    table: &'static [Field<S>],
    values: Vec<Option<&'a Value>>,
}

impl<'a, S: 'static> Fields<'a, S> {
    fn slot(&self, index: usize) -> Result<(&'static Field<S>, Option<&'a Value>)> {
        match (self.table.get(index), self.values.get(index)) {
            (Some(field), Some(value)) => Ok((field, *value)),
            _ => Err(Error::Serialization(format!(
                "no member at index {} of a {}-member table",
                index,
                self.table.len()
            ))),
        }
    }

    /// Decode a required member with its type's codec
    pub fn required<T: crate::WireValue>(&self, index: usize) -> Result<T> {
        self.required_with(index, T::from_wire)
    }

    /// Decode an optional member with its type's codec
    pub fn optional<T: crate::WireValue>(&self, index: usize) -> Result<Option<T>> {
        self.optional_with(index, T::from_wire)
    }

    /// Decode a required member with an explicit coercion
    pub fn required_with<T>(&self, index: usize, decode: impl Fn(&Value) -> Result<T>) -> Result<T> {
        let (field, _) = self.slot(index)?;
        self.optional_with(index, decode)?
            .ok_or_else(|| Error::MissingField(field.wire.to_owned()))
    }

    /// Decode an optional member with an explicit coercion
    pub fn optional_with<T>(&self, index: usize, decode: impl Fn(&Value) -> Result<T>) -> Result<Option<T>> {
        let (field, value) = self.slot(index)?;
        value
            .map(|v| decode(v).map_err(|e| e.in_field(field.wire)))
            .transpose()
    }
}

/// A structure with a static directive table
pub trait Shape: Sized + 'static {
    /// Shape name, used in logs and error messages
    const NAME: &'static str;

    /// The directive table, in wire emission order
    fn fields() -> &'static [Field<Self>];

    /// Build the shape from resolved member values
    fn from_fields(fields: &Fields<'_, Self>) -> Result<Self>;

    fn encode(&self, cx: &EncodeContext<'_>) -> Result<Object> {
        encode_fields(self, Self::fields(), cx)
    }

    fn decode(wire: &Object) -> Result<Self> {
        let fields = decode_fields(wire, Self::fields())?;
        Self::from_fields(&fields)
    }
}

/// `WireValue::to_wire` for shapes
pub fn encode_shape<S: Shape>(shape: &S, cx: &EncodeContext<'_>) -> Result<Value> {
    shape.encode(cx).map(Value::Object)
}

/// `WireValue::from_wire` for shapes: the value must be a JSON object
pub fn decode_shape<S: Shape>(value: &Value) -> Result<S> {
    match value {
        Value::Object(wire) => S::decode(wire),
        other => Err(Error::TypeMismatch {
            expected: "structure",
            found: scalar::json_type(other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::Timestamp;
    use crate::WireValue;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq)]
    struct Job {
        name: String,
        priority: Option<i32>,
        started_at: Option<Timestamp>,
        token: Option<String>,
    }

    impl Shape for Job {
        const NAME: &'static str = "Job";

        fn fields() -> &'static [Field<Self>] {
            const FIELDS: &[Field<Job>] = &[
                Field {
                    member: "name",
                    wire: "Name",
                    aliases: &["name"],
                    required: true,
                    directive: Directive::Member,
                    encode: |s, cx| s.name.to_wire(cx).map(Some),
                },
                Field {
                    member: "priority",
                    wire: "Priority",
                    aliases: &[],
                    required: false,
                    directive: Directive::Member,
                    encode: |s, cx| s.priority.as_ref().map(|v| v.to_wire(cx)).transpose(),
                },
                Field {
                    member: "started_at",
                    wire: "StartedAt",
                    aliases: &[],
                    required: false,
                    directive: Directive::Member,
                    encode: |s, cx| s.started_at.as_ref().map(|v| v.to_wire(cx)).transpose(),
                },
                Field {
                    member: "token",
                    wire: "ClientToken",
                    aliases: &[],
                    required: false,
                    directive: Directive::IdempotencyToken,
                    encode: |s, cx| s.token.as_ref().map(|v| v.to_wire(cx)).transpose(),
                },
            ];
            FIELDS
        }

        fn from_fields(fields: &Fields<'_, Self>) -> Result<Self> {
            Ok(Job {
                name: fields.required(0)?,
                priority: fields.optional(1)?,
                started_at: fields.optional(2)?,
                token: fields.optional(3)?,
            })
        }
    }

    struct CountingTokens(AtomicUsize);

    impl TokenSource for CountingTokens {
        fn generate(&self) -> String {
            format!("token-{}", self.0.fetch_add(1, Ordering::SeqCst))
        }
    }

    fn job(name: &str) -> Job {
        Job {
            name: name.into(),
            priority: None,
            started_at: None,
            token: None,
        }
    }

    #[test]
    fn test_absent_members_are_omitted() {
        let tokens = CountingTokens(AtomicUsize::new(0));
        let cx = EncodeContext::new(&tokens);
        let wire = job("nightly").encode(&cx).unwrap();

        assert_eq!(wire.get("Name"), Some(&json!("nightly")));
        assert!(!wire.contains_key("Priority"));
        assert!(!wire.contains_key("StartedAt"));
    }

    #[test]
    fn test_emission_follows_table_order() {
        let mut input = job("z");
        input.priority = Some(1);
        input.token = Some("t".into());
        let wire = input.encode(&EncodeContext::default()).unwrap();

        let keys: Vec<&str> = wire.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Name", "Priority", "ClientToken"]);
    }

    #[test]
    fn test_token_generated_only_when_absent() {
        let tokens = CountingTokens(AtomicUsize::new(0));
        let cx = EncodeContext::new(&tokens);

        let first = job("a").encode(&cx).unwrap();
        let second = job("a").encode(&cx).unwrap();
        assert_eq!(first["ClientToken"], "token-0");
        assert_eq!(second["ClientToken"], "token-1");

        let mut explicit = job("a");
        explicit.token = Some("mine".into());
        assert_eq!(explicit.encode(&cx).unwrap()["ClientToken"], "mine");
        assert_eq!(explicit.encode(&cx).unwrap()["ClientToken"], "mine");
    }

    #[test]
    fn test_decode_ignores_unknown_and_null_members() {
        let wire = json!({"Name": "x", "Priority": null, "Extra": 42});
        let decoded: Job = decode_shape(&wire).unwrap();
        assert_eq!(decoded, job("x"));
    }

    #[test]
    fn test_decode_accepts_alias() {
        let decoded: Job = decode_shape(&json!({"name": "lower"})).unwrap();
        assert_eq!(decoded.name, "lower");
    }

    #[test]
    fn test_missing_required_member() {
        let result: Result<Job> = decode_shape(&json!({"Priority": 3}));
        assert_eq!(result.unwrap_err(), Error::MissingField("Name".into()));

        let result: Result<Job> = decode_shape(&json!({"Name": null}));
        assert_eq!(result.unwrap_err(), Error::MissingField("Name".into()));
    }

    #[test]
    fn test_decode_error_tagged_with_wire_name() {
        let result: Result<Job> = decode_shape(&json!({"Name": "x", "StartedAt": "soon"}));
        let err = result.unwrap_err();
        assert_eq!(err.path().as_deref(), Some("StartedAt"));
        assert!(matches!(err.root_cause(), Error::TypeMismatch { expected: "timestamp", .. }));
    }

    #[test]
    fn test_shape_requires_object() {
        let result: Result<Job> = decode_shape(&json!(["Name"]));
        assert!(matches!(result, Err(Error::TypeMismatch { expected: "structure", found: "array" })));
    }

    #[test]
    fn test_round_trip() {
        let original = Job {
            name: "backup".into(),
            priority: Some(-3),
            started_at: Some(Timestamp::from_epoch_millis(1_700_000_000_250).unwrap()),
            token: Some("abc".into()),
        };
        let wire = encode_shape(&original, &EncodeContext::default()).unwrap();
        assert_eq!(decode_shape::<Job>(&wire).unwrap(), original);
    }

    #[test]
    fn test_out_of_range_index_is_an_error() {
        let wire = Object::new();
        let fields = decode_fields(&wire, &[] as &'static [Field<Job>]).unwrap();
        assert!(fields.optional::<String>(0).is_err());
    }
}
