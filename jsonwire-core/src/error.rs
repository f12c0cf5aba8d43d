//! Error types for jsonwire
//!
//! Every failure the codec can produce while turning shapes into wire JSON
//! (or wire JSON back into shapes) is a variant of [`Error`]. These are the
//! *protocol* errors: malformed JSON, scalar type mismatches, missing required
//! fields, undecodable unions. Service errors reported by the server live in
//! `jsonwire-client`, which wraps this type.
//!
//! # Field paths
//!
//! The field projector wraps any failure raised while handling a member in
//! [`Error::Field`], tagged with the member's wire name. Nested shapes, lists
//! and maps wrap again, so a failure deep inside a request carries its full
//! location:
//!
//! ```rust
//! use jsonwire_core::Error;
//!
//! let err = Error::TypeMismatch { expected: "int32", found: "string" }
//!     .in_field("MaxAttempts")
//!     .in_field("[0]")
//!     .in_field("Policies");
//!
//! assert_eq!(err.path().as_deref(), Some("Policies[0].MaxAttempts"));
//! ```

use thiserror::Error;

/// Result type for jsonwire operations
pub type Result<T> = std::result::Result<T, Error>;

/// Protocol-level error raised by the codec
///
/// The codec never retries and never substitutes defaults: a value that
/// cannot be decoded into its declared type surfaces as one of these.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The wire value has a different JSON type than the field declares
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// The coercion that was attempted (e.g. `int64`, `timestamp`)
        expected: &'static str,
        /// The JSON type actually present on the wire
        found: &'static str,
    },

    /// A numeric value does not fit the declared integer width
    #[error("number out of range for {expected}: {value}")]
    NumberOutOfRange {
        expected: &'static str,
        value: String,
    },

    /// A required member is absent or `null`
    #[error("missing required field `{0}`")]
    MissingField(String),

    /// A failure inside a named member, list index, or map key
    #[error("field `{field}`: {source}")]
    Field {
        /// Wire name (or `[index]` for list elements)
        field: String,
        #[source]
        source: Box<Error>,
    },

    /// Epoch seconds or date-time text that cannot be represented
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Base64 payload that cannot be decoded
    #[error("invalid blob: {0}")]
    InvalidBlob(String),

    /// A union object with no populated member
    #[error("union `{0}` has no populated variant")]
    EmptyUnion(&'static str),

    /// The body (or a lazy JSON string) is not valid JSON
    #[error("malformed JSON: {0}")]
    MalformedJson(String),

    /// Encoding a value to JSON text failed
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Draining the response body failed
    #[error("body error: {0}")]
    Body(String),

    /// Draining the response body exceeded the configured limit
    #[error("timed out draining response body")]
    Timeout,

    /// The endpoint resolver could not produce an endpoint
    #[error("endpoint error: {0}")]
    Endpoint(String),

    /// A header name or value that HTTP does not allow
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// The caller-supplied transport failed to deliver the request
    #[error("transport error: {0}")]
    Transport(String),
}

impl Error {
    /// Wrap this error with the location it occurred at
    pub fn in_field(self, field: impl Into<String>) -> Self {
        Error::Field {
            field: field.into(),
            source: Box::new(self),
        }
    }

    /// Dotted path of the failing member, if the error is field-tagged
    ///
    /// List indices are rendered without a separator (`Items[2].Name`).
    pub fn path(&self) -> Option<String> {
        let mut path = String::new();
        let mut current = self;
        while let Error::Field { field, source } = current {
            if !path.is_empty() && !field.starts_with('[') {
                path.push('.');
            }
            path.push_str(field);
            current = source;
        }
        (!path.is_empty()).then_some(path)
    }

    /// The innermost error once all field tags are stripped
    pub fn root_cause(&self) -> &Error {
        let mut current = self;
        while let Error::Field { source, .. } = current {
            current = source;
        }
        current
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_syntax() || err.is_eof() {
            Error::MalformedJson(err.to_string())
        } else {
            Error::Serialization(err.to_string())
        }
    }
}
