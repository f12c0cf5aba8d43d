//! Operation dispatcher and error decoder for JSON 1.1 RPC services
//!
//! This crate sits between typed operations (described with
//! `jsonwire-core` shapes) and whatever HTTP stack the caller uses:
//!
//! - **Dispatcher**: builds the `POST` request for an operation (content type,
//!   target header, encoded body) and turns the response into
//!   `Output<O::Output>` or an [`OperationError`]
//! - **Error decoder**: extracts and sanitizes the service error code and maps
//!   it to the operation's typed exception, or to [`UnhandledError`]
//! - **Descriptors**: [`Service`] and [`Operation`] bind names, shapes and
//!   error tables at compile time
//! - **Collaborators**: [`EndpointResolver`], [`BodyReader`], [`Transport`]
//! - **Metrics**: optional OpenTelemetry instruments ([`CodecMetrics`])
//!
//! Connections, TLS, signing, credentials and retries are out of scope; the
//! dispatcher only ever sees an [`HttpRequest`] and an [`HttpResponse`].

pub mod body;
pub mod dispatcher;
pub mod endpoint;
pub mod errors;
pub mod http;
pub mod metrics;
pub mod operation;
pub mod transport;

pub use body::{BodyReader, StreamBodyReader};
pub use dispatcher::{Dispatcher, DispatcherBuilder, OperationResult};
pub use endpoint::{Endpoint, EndpointResolver, StaticEndpoint};
pub use errors::{
    decode_error, error_code, response_metadata, sanitize_error_code, Exception, OperationError,
    ServiceError, UnhandledError, UNKNOWN_ERROR_CODE,
};
pub use http::{BodyStream, Headers, HttpRequest, HttpResponse};
pub use metrics::CodecMetrics;
pub use operation::{
    ErrorBuilder, ErrorDescriptor, ErrorOf, Operation, OperationDescriptor, Service,
    ServiceProtocol, JSON_1_1_CONTENT_TYPE, TARGET_HEADER,
};
pub use transport::Transport;
