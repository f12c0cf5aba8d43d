//! Dispatcher integration tests
//!
//! A small catalog service exercises request building, output decoding and
//! error dispatch end to end, without any network.

use async_trait::async_trait;
use jsonwire_client::{
    Dispatcher, ErrorDescriptor, Exception, Headers, HttpRequest, HttpResponse, Operation,
    OperationDescriptor, OperationError, Service, ServiceError, ServiceProtocol, StaticEndpoint,
    Transport,
};
use jsonwire_core::{Error, ResponseMetadata, Shape, Timestamp, TokenSource};
use serde_json::{json, Value};
use std::io;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Shape)]
struct GetItemInput {
    item_id: String,
    #[wire(idempotency_token)]
    client_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Shape)]
struct GetItemOutput {
    item_id: String,
    price: Option<f64>,
    updated_at: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Shape)]
struct PingInput;

#[derive(Debug, Clone, PartialEq, Shape)]
struct PingOutput;

#[derive(Debug, Clone, PartialEq, Shape)]
struct ErrorDetails {
    #[wire(alias = "message")]
    message: Option<String>,
}

#[derive(Debug, thiserror::Error)]
enum CatalogError {
    #[error("ResourceNotFound: {}", .0.message.as_deref().unwrap_or_default())]
    ResourceNotFound(Exception<ErrorDetails>),
    #[error("ThrottlingException: {}", .0.message.as_deref().unwrap_or_default())]
    Throttling(Exception<ErrorDetails>),
}

impl ServiceError for CatalogError {
    fn code(&self) -> &str {
        match self {
            CatalogError::ResourceNotFound(_) => "ResourceNotFound",
            CatalogError::Throttling(_) => "ThrottlingException",
        }
    }

    fn metadata(&self) -> &ResponseMetadata {
        match self {
            CatalogError::ResourceNotFound(e) => &e.metadata,
            CatalogError::Throttling(e) => &e.metadata,
        }
    }
}

const RESOURCE_NOT_FOUND: ErrorDescriptor<CatalogError> = ErrorDescriptor {
    code: "ResourceNotFound",
    build: |body, metadata| Exception::decode(body, metadata).map(CatalogError::ResourceNotFound),
};

const THROTTLING: ErrorDescriptor<CatalogError> = ErrorDescriptor {
    code: "ThrottlingException",
    build: |body, metadata| Exception::decode(body, metadata).map(CatalogError::Throttling),
};

static GET_ITEM: OperationDescriptor<CatalogError> = OperationDescriptor {
    name: "GetItem",
    errors: &[RESOURCE_NOT_FOUND],
};

static PING: OperationDescriptor<CatalogError> = OperationDescriptor {
    name: "Ping",
    errors: &[],
};

static OPERATIONS: &[&OperationDescriptor<CatalogError>] = &[&GET_ITEM, &PING];

static SERVICE_ERRORS: &[ErrorDescriptor<CatalogError>] = &[THROTTLING];

struct Catalog;

impl Service for Catalog {
    const PROTOCOL: ServiceProtocol = ServiceProtocol::json_1_1("Catalog_20240101");
    type Error = CatalogError;

    fn errors() -> &'static [ErrorDescriptor<CatalogError>] {
        SERVICE_ERRORS
    }

    fn operations() -> &'static [&'static OperationDescriptor<CatalogError>] {
        OPERATIONS
    }
}

struct GetItem;

impl Operation for GetItem {
    type Service = Catalog;
    type Input = GetItemInput;
    type Output = GetItemOutput;

    fn descriptor() -> &'static OperationDescriptor<CatalogError> {
        &GET_ITEM
    }
}

struct Ping;

impl Operation for Ping {
    type Service = Catalog;
    type Input = PingInput;
    type Output = PingOutput;

    fn descriptor() -> &'static OperationDescriptor<CatalogError> {
        &PING
    }
}

struct FixedTokens;

impl TokenSource for FixedTokens {
    fn generate(&self) -> String {
        "generated-token".to_string()
    }
}

fn dispatcher() -> Dispatcher {
    Dispatcher::builder(StaticEndpoint::from_url("https://catalog.local/api/").unwrap())
        .with_token_source(FixedTokens)
        .build()
}

fn get_item(id: &str) -> GetItemInput {
    GetItemInput {
        item_id: id.to_string(),
        client_token: None,
    }
}

fn json_response(status: u16, body: Value) -> HttpResponse {
    let headers =
        Headers::try_from_pairs([("X-Amzn-RequestId", "req-123"), ("x-amz-id-2", "ext-456")])
            .unwrap();
    HttpResponse::from_bytes(status, headers, body.to_string())
}

#[test]
fn test_serialize_builds_post_with_target_header() {
    let request = dispatcher().serialize::<GetItem>(&get_item("sku-1")).unwrap();

    assert_eq!(request.method, "POST");
    assert_eq!(request.protocol, "https");
    assert_eq!(request.hostname, "catalog.local");
    assert_eq!(request.path, "/api/");
    assert_eq!(
        request.headers.get("content-type"),
        Some("application/x-amz-json-1.1")
    );
    assert_eq!(
        request.headers.get("X-Amz-Target"),
        Some("Catalog_20240101.GetItem")
    );

    let body: Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
    assert_eq!(body, json!({"ItemId": "sku-1", "ClientToken": "generated-token"}));
}

#[test]
fn test_serialize_keeps_explicit_token() {
    let mut input = get_item("sku-1");
    input.client_token = Some("caller-token".into());
    let request = dispatcher().serialize::<GetItem>(&input).unwrap();

    let body: Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
    assert_eq!(body["ClientToken"], "caller-token");
}

#[test]
fn test_default_tokens_are_unique() {
    let dispatcher =
        Dispatcher::builder(StaticEndpoint::from_url("https://catalog.local").unwrap()).build();
    let first = dispatcher.serialize::<GetItem>(&get_item("a")).unwrap();
    let second = dispatcher.serialize::<GetItem>(&get_item("a")).unwrap();
    assert_ne!(first.body, second.body);
}

#[test]
fn test_empty_input_sends_no_body() {
    let request = dispatcher().serialize::<Ping>(&PingInput).unwrap();
    assert_eq!(request.body, None);
    assert_eq!(request.headers.get("x-amz-target"), Some("Catalog_20240101.Ping"));
}

#[tokio::test]
async fn test_deserialize_output_with_metadata() {
    let response = json_response(
        200,
        json!({"ItemId": "sku-1", "Price": 12.5, "UpdatedAt": 1700000000.25, "Unmodeled": true}),
    );
    let output = dispatcher().deserialize::<GetItem>(response).await.unwrap();

    assert_eq!(output.item_id, "sku-1");
    assert_eq!(output.price, Some(12.5));
    assert_eq!(output.updated_at.unwrap().epoch_millis(), 1_700_000_000_250);
    assert_eq!(output.metadata.http_status_code, 200);
    assert_eq!(output.metadata.request_id.as_deref(), Some("req-123"));
    assert_eq!(output.metadata.extended_request_id.as_deref(), Some("ext-456"));
}

#[tokio::test]
async fn test_empty_output_body_is_accepted() {
    let response = HttpResponse::empty(200, Headers::new());
    let output = dispatcher().deserialize::<Ping>(response).await.unwrap();
    assert_eq!(output.body, PingOutput);

    let response = HttpResponse::from_bytes(200, Headers::new(), "   ");
    assert!(dispatcher().deserialize::<Ping>(response).await.is_ok());
}

#[tokio::test]
async fn test_non_object_output_is_response_error() {
    let response = HttpResponse::from_bytes(200, Headers::new(), "[]");
    let err = dispatcher().deserialize::<GetItem>(response).await.unwrap_err();
    assert!(matches!(
        err,
        OperationError::Response {
            source: Error::TypeMismatch { found: "array", .. },
            ..
        }
    ));
    assert_eq!(err.status_code(), Some(200));
}

#[tokio::test]
async fn test_missing_required_output_member() {
    let response = json_response(200, json!({"Price": 1.0}));
    let err = dispatcher().deserialize::<GetItem>(response).await.unwrap_err();
    assert!(matches!(err.protocol_error(), Some(Error::MissingField(f)) if f == "ItemId"));
    assert_eq!(err.code(), None);
}

#[tokio::test]
async fn test_output_decode_failure_keeps_metadata() {
    let response = json_response(200, json!({"ItemId": 5}));
    let err = dispatcher().deserialize::<GetItem>(response).await.unwrap_err();

    let metadata = err.metadata().unwrap();
    assert_eq!(metadata.http_status_code, 200);
    assert_eq!(metadata.request_id.as_deref(), Some("req-123"));
    assert_eq!(err.protocol_error().unwrap().path().as_deref(), Some("ItemId"));
}

#[tokio::test]
async fn test_malformed_exception_body_keeps_metadata() {
    let response = json_response(400, json!({"__type": "ResourceNotFound", "Message": ["x"]}));
    let err = dispatcher().deserialize::<GetItem>(response).await.unwrap_err();

    match &err {
        OperationError::Response { source, metadata } => {
            assert_eq!(source.path().as_deref(), Some("Message"));
            assert_eq!(metadata.http_status_code, 400);
            assert_eq!(metadata.request_id.as_deref(), Some("req-123"));
        }
        other => panic!("Expected Response, got {:?}", other),
    }
    assert_eq!(err.status_code(), Some(400));
}

#[tokio::test]
async fn test_body_read_failure_keeps_metadata() {
    let chunks: Vec<io::Result<Vec<u8>>> = vec![
        Ok(b"{\"ItemId\"".to_vec()),
        Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
    ];
    let headers = Headers::try_from_pairs([("x-amzn-requestid", "req-5")]).unwrap();
    let response = HttpResponse::new(200, headers, Box::pin(futures::stream::iter(chunks)));

    let err = dispatcher().deserialize::<GetItem>(response).await.unwrap_err();
    assert!(matches!(err.protocol_error(), Some(Error::Body(_))));
    assert_eq!(err.metadata().unwrap().request_id.as_deref(), Some("req-5"));
}

#[tokio::test]
async fn test_error_dispatch_to_typed_exception() {
    let response = json_response(
        400,
        json!({"__type": "com.example#ResourceNotFound", "Message": "x"}),
    );
    let err = dispatcher().deserialize::<GetItem>(response).await.unwrap_err();

    assert_eq!(err.code(), Some("ResourceNotFound"));
    assert_eq!(err.status_code(), Some(400));
    match err {
        OperationError::Service(CatalogError::ResourceNotFound(e)) => {
            assert_eq!(e.message.as_deref(), Some("x"));
            assert_eq!(e.metadata.request_id.as_deref(), Some("req-123"));
        }
        other => panic!("Expected ResourceNotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_service_wide_error_from_header() {
    let mut headers = Headers::new();
    headers
        .insert("x-amzn-errortype", "ThrottlingException:http://internal/")
        .unwrap();
    let response = HttpResponse::from_bytes(400, headers, r#"{"message": "slow down"}"#);

    let err = dispatcher().deserialize::<GetItem>(response).await.unwrap_err();
    match err {
        OperationError::Service(CatalogError::Throttling(e)) => {
            assert_eq!(e.message.as_deref(), Some("slow down"));
        }
        other => panic!("Expected Throttling, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unknown_code_is_unhandled() {
    let response = json_response(
        400,
        json!({"__type": "com.example#QuotaExhausted", "message": "too many"}),
    );
    let err = dispatcher().deserialize::<GetItem>(response).await.unwrap_err();

    match err {
        OperationError::Unhandled(e) => {
            assert_eq!(e.code, "QuotaExhausted");
            assert_eq!(e.message.as_deref(), Some("too many"));
            assert_eq!(e.status, 400);
            assert!(e.raw_body.contains("QuotaExhausted"));
        }
        other => panic!("Expected Unhandled, got {:?}", other),
    }
}

#[tokio::test]
async fn test_operation_table_is_scoped() {
    // ResourceNotFound is only modeled for GetItem
    let response = json_response(404, json!({"__type": "ResourceNotFound"}));
    let err = dispatcher().deserialize::<Ping>(response).await.unwrap_err();
    assert!(matches!(err, OperationError::Unhandled(ref e) if e.code == "ResourceNotFound"));
}

#[tokio::test]
async fn test_unparsable_error_body_keeps_raw_text() {
    let response = HttpResponse::from_bytes(502, Headers::new(), "<html>Bad Gateway</html>");
    let err = dispatcher().deserialize::<GetItem>(response).await.unwrap_err();

    match err {
        OperationError::Unhandled(e) => {
            assert_eq!(e.code, "UnknownError");
            assert_eq!(e.status, 502);
            assert_eq!(e.raw_body, "<html>Bad Gateway</html>");
            assert_eq!(e.message, None);
        }
        other => panic!("Expected Unhandled, got {:?}", other),
    }
}

#[tokio::test]
async fn test_drain_timeout() {
    let dispatcher = Dispatcher::builder(StaticEndpoint::from_url("https://catalog.local").unwrap())
        .with_drain_timeout(Duration::from_millis(20))
        .build();
    let body = futures::stream::pending::<io::Result<Vec<u8>>>();
    let response = HttpResponse::new(200, Headers::new(), Box::pin(body));

    let err = dispatcher.deserialize::<Ping>(response).await.unwrap_err();
    assert!(matches!(err, OperationError::Response { source: Error::Timeout, .. }));
    assert_eq!(err.status_code(), Some(200));
}

struct RecordingTransport {
    sent: Mutex<Vec<HttpRequest>>,
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: HttpRequest) -> jsonwire_core::Result<HttpResponse> {
        self.sent.lock().unwrap().push(request);
        Ok(json_response(200, json!({"ItemId": "sku-9"})))
    }
}

#[tokio::test]
async fn test_call_through_transport() {
    let transport = RecordingTransport {
        sent: Mutex::new(Vec::new()),
    };
    let output = dispatcher()
        .call::<GetItem, _>(&transport, &get_item("sku-9"))
        .await
        .unwrap();

    assert_eq!(output.item_id, "sku-9");
    let sent = transport.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].url(), "https://catalog.local/api/");
}

#[test]
fn test_find_operation_by_name() {
    assert_eq!(Catalog::find_operation("Ping").map(|op| op.name), Some("Ping"));
    assert!(Catalog::find_operation("DeleteItem").is_none());
}
