//! Caller-supplied HTTP transport

use crate::http::{HttpRequest, HttpResponse};
use async_trait::async_trait;
use jsonwire_core::Result;

/// Sends a serialized request and returns the raw response
///
/// Connection handling, TLS, signing and retries all live behind this trait.
/// Failures to deliver map to `Error::Transport`; a delivered non-2xx
/// response is a successful send.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}
