//! Service errors and the error decoder
//!
//! Any response with status >= 300 becomes an `Err`. The decoder reads the
//! error code from the body (`__type`, then `code`, then `Code`) or, failing
//! that, the `x-amzn-errortype` header, strips namespace and suffix
//! decorations, and looks the bare code up in the operation's error table and
//! then the service-wide table. A hit produces the typed exception; a miss
//! produces [`UnhandledError`] with the code, message and raw body preserved.

use crate::http::Headers;
use crate::operation::{OperationDescriptor, Service};
use jsonwire_core::{scalar, Object, ResponseMetadata, Shape, Value};
use std::ops::Deref;
use thiserror::Error;

/// Code reported when neither body nor headers carry one
pub const UNKNOWN_ERROR_CODE: &str = "UnknownError";

const ERROR_TYPE_HEADER: &str = "x-amzn-errortype";
const BODY_CODE_KEYS: &[&str] = &["__type", "code", "Code"];
const REQUEST_ID_HEADERS: &[&str] = &["x-amzn-requestid", "x-amzn-request-id", "x-amz-request-id"];
const EXTENDED_REQUEST_ID_HEADER: &str = "x-amz-id-2";
const CF_ID_HEADER: &str = "x-amz-cf-id";

/// Implemented by each service's error enum
pub trait ServiceError: std::error::Error + Send + Sync + 'static {
    /// Sanitized error code, e.g. `ResourceNotFoundException`
    fn code(&self) -> &str;

    fn metadata(&self) -> &ResponseMetadata;
}

/// A typed exception: the decoded error shape plus response metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Exception<T> {
    pub metadata: ResponseMetadata,
    pub details: T,
}

impl<T: Shape> Exception<T> {
    /// Decode the error body into `T`
    pub fn decode(body: &Object, metadata: ResponseMetadata) -> jsonwire_core::Result<Self> {
        Ok(Self {
            details: T::decode(body)?,
            metadata,
        })
    }
}

impl<T> Deref for Exception<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.details
    }
}

/// A service error whose code is not in any table this client knows
#[derive(Debug, Clone, PartialEq, Error)]
#[error("unhandled service error {code} (HTTP {status}): {}", .message.as_deref().unwrap_or("no message"))]
pub struct UnhandledError {
    pub code: String,
    pub message: Option<String>,
    pub status: u16,
    /// The error body exactly as received (lossy UTF-8)
    pub raw_body: String,
    pub metadata: ResponseMetadata,
}

/// Failure of a single operation call
#[derive(Debug, Error)]
pub enum OperationError<E: std::error::Error + 'static> {
    /// The codec or its collaborators failed before a response arrived
    #[error("protocol error: {0}")]
    Protocol(#[from] jsonwire_core::Error),

    /// A response arrived but its body could not be read or decoded
    #[error("response error (HTTP {}): {source}", .metadata.http_status_code)]
    Response {
        source: jsonwire_core::Error,
        metadata: ResponseMetadata,
    },

    /// A modeled service error
    #[error(transparent)]
    Service(E),

    /// A service error with an unrecognised code
    #[error(transparent)]
    Unhandled(UnhandledError),
}

impl<E: ServiceError> OperationError<E> {
    pub fn metadata(&self) -> Option<&ResponseMetadata> {
        match self {
            OperationError::Protocol(_) => None,
            OperationError::Response { metadata, .. } => Some(metadata),
            OperationError::Service(e) => Some(e.metadata()),
            OperationError::Unhandled(e) => Some(&e.metadata),
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        self.metadata().map(|m| m.http_status_code)
    }

    /// Service error code, if the server reported an error
    pub fn code(&self) -> Option<&str> {
        match self {
            OperationError::Protocol(_) | OperationError::Response { .. } => None,
            OperationError::Service(e) => Some(e.code()),
            OperationError::Unhandled(e) => Some(&e.code),
        }
    }

    /// The codec failure behind a `Protocol` or `Response` error
    pub fn protocol_error(&self) -> Option<&jsonwire_core::Error> {
        match self {
            OperationError::Protocol(e) | OperationError::Response { source: e, .. } => Some(e),
            _ => None,
        }
    }

    pub fn as_service(&self) -> Option<&E> {
        match self {
            OperationError::Service(e) => Some(e),
            _ => None,
        }
    }

    pub fn into_service(self) -> Option<E> {
        match self {
            OperationError::Service(e) => Some(e),
            _ => None,
        }
    }
}

/// Collect request ids from conventional response headers
pub fn response_metadata(status: u16, headers: &Headers) -> ResponseMetadata {
    ResponseMetadata {
        http_status_code: status,
        request_id: headers.first_of(REQUEST_ID_HEADERS).map(str::to_owned),
        extended_request_id: headers.get(EXTENDED_REQUEST_ID_HEADER).map(str::to_owned),
        cf_id: headers.get(CF_ID_HEADER).map(str::to_owned),
    }
}

/// Reduce a reported code to the bare name used in error tables
///
/// `com.example#ResourceNotFound:http://internal/` becomes
/// `ResourceNotFound`; `ThrottlingException,Sender` becomes
/// `ThrottlingException`.
pub fn sanitize_error_code(raw: &str) -> &str {
    let code = raw.split(',').next().unwrap_or(raw);
    let code = code.split(':').next().unwrap_or(code);
    let code = code.rsplit('#').next().unwrap_or(code);
    code.trim()
}

/// Find the error code in the body, then the headers
///
/// Candidates that sanitize to nothing are skipped.
pub fn error_code(body: Option<&Object>, headers: &Headers) -> Option<String> {
    let from_body = body.into_iter().flat_map(|body| {
        BODY_CODE_KEYS
            .iter()
            .filter_map(move |key| body.get(*key).and_then(code_text))
    });
    from_body
        .chain(headers.get(ERROR_TYPE_HEADER).map(str::to_owned))
        .find_map(|raw| {
            let code = sanitize_error_code(&raw);
            (!code.is_empty()).then(|| code.to_owned())
        })
}

fn code_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn error_message(body: Option<&Object>) -> Option<String> {
    let body = body?;
    ["message", "Message"]
        .iter()
        .find_map(|key| body.get(*key))
        .and_then(|v| scalar::decode_string(v).ok())
}

/// Parse an error body leniently: anything but a JSON object yields `None`
fn error_body(raw: &[u8]) -> Option<Object> {
    match serde_json::from_slice::<Value>(raw) {
        Ok(Value::Object(body)) => Some(body),
        _ => None,
    }
}

/// Turn a non-2xx response into the operation's error
pub fn decode_error<S: Service>(
    operation: &OperationDescriptor<S::Error>,
    metadata: ResponseMetadata,
    headers: &Headers,
    raw: &[u8],
) -> OperationError<S::Error> {
    let body = error_body(raw);
    let status = metadata.http_status_code;
    let code = error_code(body.as_ref(), headers);

    let descriptor = code.as_deref().and_then(|code| S::find_error(operation, code));
    if let Some(descriptor) = descriptor {
        tracing::debug!(
            operation = operation.name,
            status,
            code = descriptor.code,
            request_id = metadata.request_id.as_deref().unwrap_or_default(),
            "Decoded modeled service error"
        );
        let empty = Object::new();
        return match (descriptor.build)(body.as_ref().unwrap_or(&empty), metadata.clone()) {
            Ok(error) => OperationError::Service(error),
            Err(source) => OperationError::Response { source, metadata },
        };
    }

    let code = code.unwrap_or_else(|| UNKNOWN_ERROR_CODE.to_owned());
    tracing::warn!(
        operation = operation.name,
        status,
        code = %code,
        request_id = metadata.request_id.as_deref().unwrap_or_default(),
        "Unhandled service error code"
    );
    OperationError::Unhandled(UnhandledError {
        message: error_message(body.as_ref()),
        code,
        status,
        raw_body: String::from_utf8_lossy(raw).into_owned(),
        metadata,
    })
}
