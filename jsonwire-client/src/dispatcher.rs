//! Operation dispatcher
//!
//! Builds the HTTP request for an operation and interprets its response. The
//! dispatcher holds no per-call state: it is `Send + Sync` and meant to be
//! shared (wrap it in an `Arc` to share across tasks).
//!
//! # Examples
//!
//! ```rust,ignore
//! use jsonwire_client::{Dispatcher, HttpResponse, StaticEndpoint};
//! use std::time::Duration;
//!
//! let dispatcher = Dispatcher::builder(StaticEndpoint::from_url("https://scheduler.local")?)
//!     .with_drain_timeout(Duration::from_secs(10))
//!     .with_metrics(true)
//!     .build();
//!
//! let request = dispatcher.serialize::<GetSchedule>(&input)?;
//! let response: HttpResponse = my_http_stack.send(request).await?;
//! let output = dispatcher.deserialize::<GetSchedule>(response).await?;
//! println!("request id: {:?}", output.metadata.request_id);
//! ```

use crate::body::{BodyReader, StreamBodyReader};
use crate::endpoint::EndpointResolver;
use crate::errors::{self, OperationError};
use crate::http::{BodyStream, Headers, HttpRequest, HttpResponse};
use crate::metrics::CodecMetrics;
use crate::operation::{ErrorOf, Operation, Service};
use crate::transport::Transport;
use http::Method;
use jsonwire_core::{
    scalar, EncodeContext, Error, Object, Output, Result, Shape, TokenSource, UuidTokenSource,
    Value,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Result of a dispatched operation
pub type OperationResult<O> =
    std::result::Result<Output<<O as Operation>::Output>, OperationError<ErrorOf<O>>>;

/// Serializes operation inputs and deserializes their responses
pub struct Dispatcher {
    endpoint: Arc<dyn EndpointResolver>,
    tokens: Arc<dyn TokenSource>,
    body_reader: Arc<dyn BodyReader>,
    drain_timeout: Option<Duration>,
    metrics: Option<Arc<CodecMetrics>>,
}

impl Dispatcher {
    pub fn builder(endpoint: impl EndpointResolver + 'static) -> DispatcherBuilder {
        DispatcherBuilder::new(endpoint)
    }

    /// Build the HTTP request for `O`
    ///
    /// `POST <base path>/` with the service's content type and target header.
    /// Inputs without members send no body; absent optional members are
    /// omitted; idempotency tokens are filled in.
    pub fn serialize<O: Operation>(&self, input: &O::Input) -> Result<HttpRequest> {
        let descriptor = O::descriptor();
        let protocol = <O::Service as Service>::PROTOCOL;
        let result = self.build_request::<O>(input);

        match &result {
            Ok(request) => {
                tracing::debug!(
                    operation = descriptor.name,
                    target = %protocol.target(descriptor.name),
                    url = %request.url(),
                    body_len = request.body.as_ref().map_or(0, String::len),
                    "Serialized request"
                );
                if let Some(metrics) = &self.metrics {
                    metrics.record_serialized(descriptor.name);
                }
            }
            Err(e) => {
                tracing::debug!(operation = descriptor.name, error = %e, "Failed to serialize request");
                if let Some(metrics) = &self.metrics {
                    metrics.record_protocol_error(descriptor.name);
                }
            }
        }
        result
    }

    fn build_request<O: Operation>(&self, input: &O::Input) -> Result<HttpRequest> {
        let descriptor = O::descriptor();
        let protocol = <O::Service as Service>::PROTOCOL;
        let endpoint = self.endpoint.resolve()?;

        let body = if <O::Input as Shape>::fields().is_empty() {
            None
        } else {
            let cx = EncodeContext::new(self.tokens.as_ref());
            let wire = input.encode(&cx)?;
            Some(serde_json::to_string(&wire)?)
        };

        let mut headers = Headers::new();
        headers.insert("content-type", protocol.content_type)?;
        headers.insert(protocol.target_header, protocol.target(descriptor.name))?;

        Ok(HttpRequest {
            method: Method::POST,
            path: endpoint.request_path(),
            protocol: endpoint.protocol,
            hostname: endpoint.hostname,
            port: endpoint.port,
            headers,
            body,
        })
    }

    /// Interpret the response to `O`
    ///
    /// The body is always drained, even for outputs without members. Status
    /// >= 300 goes through the error decoder and is always an `Err`.
    pub async fn deserialize<O: Operation>(&self, response: HttpResponse) -> OperationResult<O> {
        let descriptor = O::descriptor();
        let started = Instant::now();
        let status = response.status_code;

        let result = self.decode_response::<O>(response).await;

        match &result {
            Ok(output) => {
                tracing::debug!(
                    operation = descriptor.name,
                    status,
                    request_id = output.metadata.request_id.as_deref().unwrap_or_default(),
                    "Decoded response"
                );
                if let Some(metrics) = &self.metrics {
                    metrics.record_decoded(descriptor.name, status, started.elapsed().as_secs_f64());
                }
            }
            Err(OperationError::Protocol(e) | OperationError::Response { source: e, .. }) => {
                tracing::debug!(operation = descriptor.name, status, error = %e, "Failed to decode response");
                if let Some(metrics) = &self.metrics {
                    metrics.record_protocol_error(descriptor.name);
                }
            }
            Err(e) => {
                if let (Some(metrics), Some(code)) = (&self.metrics, e.code()) {
                    metrics.record_service_error(descriptor.name, code);
                }
            }
        }
        result
    }

    async fn decode_response<O: Operation>(&self, response: HttpResponse) -> OperationResult<O> {
        let HttpResponse {
            status_code,
            headers,
            body,
        } = response;
        let metadata = errors::response_metadata(status_code, &headers);
        let raw = match self.drain(body).await {
            Ok(raw) => raw,
            Err(source) => return Err(OperationError::Response { source, metadata }),
        };
        if let Some(metrics) = &self.metrics {
            metrics.record_body_size(raw.len());
        }

        if status_code >= 300 {
            return Err(errors::decode_error::<O::Service>(
                O::descriptor(),
                metadata,
                &headers,
                &raw,
            ));
        }

        match parse_output_body(&raw).and_then(|wire| <O::Output as Shape>::decode(&wire)) {
            Ok(body) => Ok(Output::new(body, metadata)),
            Err(source) => Err(OperationError::Response { source, metadata }),
        }
    }

    async fn drain(&self, body: BodyStream) -> Result<Vec<u8>> {
        let read = self.body_reader.read_to_end(body);
        match self.drain_timeout {
            Some(limit) => tokio::time::timeout(limit, read)
                .await
                .map_err(|_| Error::Timeout)?,
            None => read.await,
        }
    }

    /// Serialize, send through `transport`, and deserialize
    pub async fn call<O, T>(&self, transport: &T, input: &O::Input) -> OperationResult<O>
    where
        O: Operation,
        T: Transport + ?Sized,
    {
        let request = self.serialize::<O>(input)?;
        let response = transport.send(request).await?;
        self.deserialize::<O>(response).await
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("drain_timeout", &self.drain_timeout)
            .field("metrics", &self.metrics.is_some())
            .finish_non_exhaustive()
    }
}

/// Empty, whitespace-only and `null` bodies decode as `{}`
fn parse_output_body(raw: &[u8]) -> Result<Object> {
    let text = std::str::from_utf8(raw).map_err(|e| Error::MalformedJson(e.to_string()))?;
    if text.trim().is_empty() {
        return Ok(Object::new());
    }
    match serde_json::from_str::<Value>(text)? {
        Value::Object(wire) => Ok(wire),
        Value::Null => Ok(Object::new()),
        other => Err(Error::TypeMismatch {
            expected: "structure",
            found: scalar::json_type(&other),
        }),
    }
}

/// Builder for [`Dispatcher`]
pub struct DispatcherBuilder {
    endpoint: Arc<dyn EndpointResolver>,
    tokens: Option<Arc<dyn TokenSource>>,
    body_reader: Option<Arc<dyn BodyReader>>,
    drain_timeout: Option<Duration>,
    enable_metrics: bool,
    service_name: Option<String>,
}

impl DispatcherBuilder {
    pub fn new(endpoint: impl EndpointResolver + 'static) -> Self {
        Self {
            endpoint: Arc::new(endpoint),
            tokens: None,
            body_reader: None,
            drain_timeout: None,
            enable_metrics: false,
            service_name: None,
        }
    }

    /// Source of idempotency tokens (default: random UUIDs)
    pub fn with_token_source(mut self, tokens: impl TokenSource + 'static) -> Self {
        self.tokens = Some(Arc::new(tokens));
        self
    }

    /// Body reader used to drain responses (default: [`StreamBodyReader`])
    pub fn with_body_reader(mut self, reader: impl BodyReader + 'static) -> Self {
        self.body_reader = Some(Arc::new(reader));
        self
    }

    /// Upper bound on draining a response body
    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = Some(timeout);
        self
    }

    /// Record [`CodecMetrics`] through the global meter provider
    pub fn with_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = enable;
        self
    }

    /// Meter name used for metrics (default: `jsonwire`)
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    pub fn build(self) -> Dispatcher {
        let metrics = self.enable_metrics.then(|| {
            let name = self.service_name.unwrap_or_else(|| "jsonwire".to_string());
            Arc::new(CodecMetrics::new(name))
        });

        Dispatcher {
            endpoint: self.endpoint,
            tokens: self.tokens.unwrap_or_else(|| Arc::new(UuidTokenSource)),
            body_reader: self.body_reader.unwrap_or_else(|| Arc::new(StreamBodyReader)),
            drain_timeout: self.drain_timeout,
            metrics,
        }
    }
}
