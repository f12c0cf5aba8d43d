//! Static service and operation descriptors
//!
//! A service is described once, at compile time: its protocol settings, its
//! operations, and the error codes each operation (and the service as a whole)
//! can return. Nothing here is built or mutated at runtime.
//!
//! ```rust,ignore
//! pub struct Scheduler;
//!
//! impl Service for Scheduler {
//!     const PROTOCOL: ServiceProtocol = ServiceProtocol::json_1_1("JobScheduler_20240601");
//!     type Error = SchedulerError;
//!
//!     fn errors() -> &'static [ErrorDescriptor<SchedulerError>] {
//!         &[THROTTLING, INTERNAL_SERVER]
//!     }
//!
//!     fn operations() -> &'static [&'static OperationDescriptor<SchedulerError>] {
//!         OPERATIONS
//!     }
//! }
//! ```

use crate::errors::ServiceError;
use jsonwire_core::{Object, ResponseMetadata, Shape};

/// Content type used by JSON 1.1 services
pub const JSON_1_1_CONTENT_TYPE: &str = "application/x-amz-json-1.1";

/// Header carrying `<Namespace>.<OperationName>`
pub const TARGET_HEADER: &str = "x-amz-target";

/// Wire-level settings shared by every operation of a service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceProtocol {
    pub namespace: &'static str,
    pub content_type: &'static str,
    pub target_header: &'static str,
}

impl ServiceProtocol {
    pub const fn json_1_1(namespace: &'static str) -> Self {
        Self {
            namespace,
            content_type: JSON_1_1_CONTENT_TYPE,
            target_header: TARGET_HEADER,
        }
    }

    pub const fn with_content_type(mut self, content_type: &'static str) -> Self {
        self.content_type = content_type;
        self
    }

    pub const fn with_target_header(mut self, target_header: &'static str) -> Self {
        self.target_header = target_header;
        self
    }

    /// Value of the target header for `operation`
    pub fn target(&self, operation: &str) -> String {
        format!("{}.{}", self.namespace, operation)
    }
}

/// Builds a typed service error from an error body and response metadata
pub type ErrorBuilder<E> = fn(&Object, ResponseMetadata) -> jsonwire_core::Result<E>;

/// Maps one sanitized error code to its typed exception
pub struct ErrorDescriptor<E: 'static> {
    pub code: &'static str,
    pub build: ErrorBuilder<E>,
}

impl<E: 'static> std::fmt::Debug for ErrorDescriptor<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorDescriptor").field("code", &self.code).finish()
    }
}

/// Name and error table of one operation
pub struct OperationDescriptor<E: 'static> {
    pub name: &'static str,
    pub errors: &'static [ErrorDescriptor<E>],
}

impl<E: 'static> OperationDescriptor<E> {
    pub fn find_error(&self, code: &str) -> Option<&'static ErrorDescriptor<E>> {
        self.errors.iter().find(|e| e.code == code)
    }
}

impl<E: 'static> std::fmt::Debug for OperationDescriptor<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationDescriptor")
            .field("name", &self.name)
            .field("errors", &self.errors)
            .finish()
    }
}

/// A JSON 1.1 service
pub trait Service: 'static {
    const PROTOCOL: ServiceProtocol;

    type Error: ServiceError;

    /// Errors any operation of the service may return
    fn errors() -> &'static [ErrorDescriptor<Self::Error>];

    fn operations() -> &'static [&'static OperationDescriptor<Self::Error>];

    fn find_operation(name: &str) -> Option<&'static OperationDescriptor<Self::Error>> {
        Self::operations().iter().copied().find(|op| op.name == name)
    }

    /// Operation table first, then the service-wide table
    fn find_error(
        operation: &OperationDescriptor<Self::Error>,
        code: &str,
    ) -> Option<&'static ErrorDescriptor<Self::Error>> {
        operation
            .find_error(code)
            .or_else(|| Self::errors().iter().find(|e| e.code == code))
    }
}

/// Compile-time binding of an operation to its service and shapes
pub trait Operation {
    type Service: Service;
    type Input: Shape;
    type Output: Shape;

    fn descriptor() -> &'static OperationDescriptor<ErrorOf<Self>>;
}

/// The typed error of an operation's service
pub type ErrorOf<O> = <<O as Operation>::Service as Service>::Error;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_1_1_protocol() {
        let protocol = ServiceProtocol::json_1_1("JobScheduler_20240601");
        assert_eq!(protocol.content_type, "application/x-amz-json-1.1");
        assert_eq!(protocol.target_header, "x-amz-target");
        assert_eq!(protocol.target("GetSchedule"), "JobScheduler_20240601.GetSchedule");
    }

    #[test]
    fn test_protocol_overrides() {
        const PROTOCOL: ServiceProtocol = ServiceProtocol::json_1_1("Ns")
            .with_content_type("application/x-amz-json-1.0")
            .with_target_header("x-target");
        assert_eq!(PROTOCOL.content_type, "application/x-amz-json-1.0");
        assert_eq!(PROTOCOL.target_header, "x-target");
    }
}
