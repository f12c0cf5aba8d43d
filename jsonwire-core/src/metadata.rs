//! Response metadata attached to every decoded output and service error

use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// Transport-level facts about a response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    pub http_status_code: u16,
    pub request_id: Option<String>,
    pub extended_request_id: Option<String>,
    pub cf_id: Option<String>,
}

impl ResponseMetadata {
    pub fn new(http_status_code: u16) -> Self {
        Self {
            http_status_code,
            ..Default::default()
        }
    }
}

/// A decoded output shape together with its response metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Output<T> {
    pub metadata: ResponseMetadata,
    pub body: T,
}

impl<T> Output<T> {
    pub fn new(body: T, metadata: ResponseMetadata) -> Self {
        Self { metadata, body }
    }

    pub fn into_body(self) -> T {
        self.body
    }

    pub fn into_parts(self) -> (T, ResponseMetadata) {
        (self.body, self.metadata)
    }
}

impl<T> Deref for Output<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.body
    }
}
