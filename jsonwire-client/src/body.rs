//! Response body draining

use crate::http::BodyStream;
use async_trait::async_trait;
use futures::StreamExt;
use jsonwire_core::{Error, Result};

/// Collects a streamed response body into memory
#[async_trait]
pub trait BodyReader: Send + Sync {
    async fn read_to_end(&self, body: BodyStream) -> Result<Vec<u8>>;
}

/// Concatenates chunks as they arrive
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamBodyReader;

#[async_trait]
impl BodyReader for StreamBodyReader {
    async fn read_to_end(&self, mut body: BodyStream) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| Error::Body(e.to_string()))?;
            out.extend_from_slice(&chunk);
        }
        Ok(out)
    }
}
