//! Core codec for JSON 1.1 RPC shapes
//!
//! This crate turns typed request shapes into wire JSON objects and wire JSON
//! objects back into typed output and error shapes. It knows nothing about
//! HTTP; `jsonwire-client` builds requests and interprets responses on top of
//! it.
//!
//! - **Scalars** ([`scalar`]): strict coercions for strings, booleans, integers,
//!   floats (with `NaN`/`Infinity` sentinels), epoch-second timestamps, blobs and
//!   lazy JSON strings
//! - **Shapes** ([`Shape`], [`Field`]): structures described by a static
//!   directive table and projected member by member
//! - **Unions** ([`Union`]): single-key objects with forward-compatible unknown
//!   variants
//! - **Errors** ([`Error`]): protocol failures tagged with the failing member's
//!   path
//! - **Observability**: optional OpenTelemetry bootstrap
//!
//! # Example
//!
//! ```rust
//! use jsonwire_core::{EncodeContext, Shape, Timestamp};
//!
//! #[derive(Debug, PartialEq, Shape)]
//! struct PauseJob {
//!     job_name: String,
//!     resume_at: Option<Timestamp>,
//!     #[wire(rename = "note")]
//!     comment: Option<String>,
//! }
//!
//! let input = PauseJob {
//!     job_name: "nightly".into(),
//!     resume_at: Some(Timestamp::from_epoch_millis(1_700_000_000_250).unwrap()),
//!     comment: None,
//! };
//!
//! let wire = input.encode(&EncodeContext::default()).unwrap();
//! assert_eq!(
//!     serde_json::Value::Object(wire.clone()),
//!     serde_json::json!({"JobName": "nightly", "ResumeAt": 1700000000.25})
//! );
//! assert_eq!(PauseJob::decode(&wire).unwrap(), input);
//! ```

pub mod error;
pub mod metadata;
pub mod observability;
pub mod projector;
pub mod scalar;
pub mod union;
pub mod value;

pub use error::{Error, Result};
pub use metadata::{Output, ResponseMetadata};
pub use observability::{init_observability, shutdown_observability, ObservabilityConfig};
pub use projector::{
    decode_fields, decode_shape, encode_fields, encode_shape, Directive, EncodeContext, Field,
    FieldEncoder, Fields, Object, Shape, TokenSource, UuidTokenSource,
};
pub use scalar::{Blob, LazyJson, Timestamp};
pub use serde_json::Value;
pub use union::{decode_union, encode_union, Union, UnknownVariant};
pub use value::WireValue;

// Derive macros share their trait's name, as serde does
pub use jsonwire_macros::{Shape, Union};
