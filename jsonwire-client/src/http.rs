//! Transport-neutral HTTP request and response
//!
//! The dispatcher produces [`HttpRequest`] and consumes [`HttpResponse`]; it
//! never opens a connection. Callers move these across whatever HTTP stack
//! they use.

use futures::Stream;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::Method;
use jsonwire_core::{Error, Result};
use std::fmt;
use std::io;
use std::pin::Pin;

/// Chunked response body
pub type BodyStream = Pin<Box<dyn Stream<Item = io::Result<Vec<u8>>> + Send>>;

/// HTTP headers with case-insensitive names
///
/// A name may carry several values; [`Headers::get`] returns the first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(HeaderMap);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from name/value pairs, keeping repeated names
    pub fn try_from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut headers = Self::new();
        for (name, value) in pairs {
            headers.append(name.as_ref(), value.as_ref())?;
        }
        Ok(headers)
    }

    /// Set a header, replacing any previous values
    pub fn insert(&mut self, name: &str, value: impl AsRef<str>) -> Result<()> {
        let (name, value) = header_pair(name, value.as_ref())?;
        self.0.insert(name, value);
        Ok(())
    }

    /// Add a value, keeping any already present for `name`
    pub fn append(&mut self, name: &str, value: impl AsRef<str>) -> Result<()> {
        let (name, value) = header_pair(name, value.as_ref())?;
        self.0.append(name, value);
        Ok(())
    }

    /// First value for `name`; `None` when absent or not visible ASCII
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.0
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    /// First header present among `names`
    pub fn first_of(&self, names: &[&str]) -> Option<&str> {
        names.iter().find_map(|name| self.get(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &HeaderValue)> {
        self.0.iter()
    }

    /// Number of values, counting repeats
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &HeaderMap {
        &self.0
    }

    pub fn into_map(self) -> HeaderMap {
        self.0
    }
}

fn header_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let header_name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| Error::InvalidHeader(format!("name `{}`: {}", name, e)))?;
    let header_value = HeaderValue::from_str(value)
        .map_err(|e| Error::InvalidHeader(format!("value for `{}`: {}", name, e)))?;
    Ok((header_name, header_value))
}

impl From<HeaderMap> for Headers {
    fn from(map: HeaderMap) -> Self {
        Self(map)
    }
}

/// A request ready to hand to a transport
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub protocol: String,
    pub hostname: String,
    pub port: Option<u16>,
    pub path: String,
    pub headers: Headers,
    /// JSON text; `None` for operations whose input has no members
    pub body: Option<String>,
}

impl HttpRequest {
    /// `protocol://hostname[:port]path`
    pub fn url(&self) -> String {
        match self.port {
            Some(port) => format!("{}://{}:{}{}", self.protocol, self.hostname, port, self.path),
            None => format!("{}://{}{}", self.protocol, self.hostname, self.path),
        }
    }

    /// Convert for HTTP stacks built on the `http` crate
    ///
    /// A missing body becomes an empty one.
    pub fn into_http(self) -> Result<http::Request<String>> {
        let mut request = http::Request::builder()
            .method(self.method.clone())
            .uri(self.url())
            .body(self.body.unwrap_or_default())
            .map_err(|e| Error::Endpoint(e.to_string()))?;
        *request.headers_mut() = self.headers.into_map();
        Ok(request)
    }
}

/// A response as received from the transport
pub struct HttpResponse {
    pub status_code: u16,
    pub headers: Headers,
    pub body: BodyStream,
}

impl HttpResponse {
    pub fn new(status_code: u16, headers: Headers, body: BodyStream) -> Self {
        Self {
            status_code,
            headers,
            body,
        }
    }

    /// Response whose body arrives as a single chunk
    pub fn from_bytes(status_code: u16, headers: Headers, body: impl Into<Vec<u8>>) -> Self {
        let chunk: io::Result<Vec<u8>> = Ok(body.into());
        Self::new(status_code, headers, Box::pin(futures::stream::iter([chunk])))
    }

    /// Response from an `http` crate response with a buffered body
    pub fn from_http<B: Into<Vec<u8>>>(response: http::Response<B>) -> Self {
        let (parts, body) = response.into_parts();
        Self::from_bytes(parts.status.as_u16(), parts.headers.into(), body)
    }

    /// Response with no body at all
    pub fn empty(status_code: u16, headers: Headers) -> Self {
        Self::new(status_code, headers, Box::pin(futures::stream::empty()))
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status_code", &self.status_code)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> HttpRequest {
        let mut headers = Headers::new();
        headers.insert("Content-Type", "application/x-amz-json-1.1").unwrap();
        HttpRequest {
            method: Method::POST,
            protocol: "https".into(),
            hostname: "scheduler.local".into(),
            port: Some(8443),
            path: "/".into(),
            headers,
            body: Some("{}".into()),
        }
    }

    #[test]
    fn test_headers_are_case_insensitive() {
        let mut headers = Headers::new();
        headers.insert("X-Amzn-RequestId", "req-1").unwrap();

        assert_eq!(headers.get("x-amzn-requestid"), Some("req-1"));
        assert_eq!(headers.get("X-AMZN-REQUESTID"), Some("req-1"));
        let (name, value) = headers.iter().next().unwrap();
        assert_eq!(name.as_str(), "x-amzn-requestid");
        assert_eq!(value, "req-1");
    }

    #[test]
    fn test_repeated_headers_are_kept() {
        let headers =
            Headers::try_from_pairs([("x-amzn-requestid", "a"), ("X-Amzn-RequestId", "b")]).unwrap();

        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("x-amzn-requestid"), Some("a"));
        assert_eq!(headers.get_all("x-amzn-requestid"), vec!["a", "b"]);
    }

    #[test]
    fn test_insert_replaces_all_values() {
        let mut headers = Headers::try_from_pairs([("x-tag", "a"), ("x-tag", "b")]).unwrap();
        headers.insert("X-Tag", "c").unwrap();
        assert_eq!(headers.get_all("x-tag"), vec!["c"]);
    }

    #[test]
    fn test_invalid_headers_are_rejected() {
        let mut headers = Headers::new();
        assert!(matches!(headers.insert("bad name", "v"), Err(Error::InvalidHeader(_))));
        assert!(matches!(headers.insert("x-ok", "line\nbreak"), Err(Error::InvalidHeader(_))));
        assert!(headers.is_empty());
    }

    #[test]
    fn test_first_of_prefers_earlier_names() {
        let headers =
            Headers::try_from_pairs([("x-amz-request-id", "b"), ("x-amzn-requestid", "a")]).unwrap();
        assert_eq!(headers.first_of(&["x-amzn-requestid", "x-amz-request-id"]), Some("a"));
        assert_eq!(headers.first_of(&["missing"]), None);
    }

    #[test]
    fn test_request_url() {
        assert_eq!(request().url(), "https://scheduler.local:8443/");
    }

    #[test]
    fn test_into_http_request() {
        let converted = request().into_http().unwrap();
        assert_eq!(*converted.method(), Method::POST);
        assert_eq!(converted.uri(), "https://scheduler.local:8443/");
        assert_eq!(
            converted.headers().get("content-type").unwrap(),
            "application/x-amz-json-1.1"
        );
        assert_eq!(converted.body(), "{}");
    }

    #[test]
    fn test_from_http_response() {
        let response = http::Response::builder()
            .status(404)
            .header("X-Amzn-RequestId", "req-7")
            .body("{}")
            .unwrap();

        let response = HttpResponse::from_http(response);
        assert_eq!(response.status_code, 404);
        assert_eq!(response.headers.get("x-amzn-requestid"), Some("req-7"));
    }
}
