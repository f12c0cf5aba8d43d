//! Scheduler service errors

use jsonwire_client::{ErrorDescriptor, Exception, ServiceError};
use jsonwire_core::{ResponseMetadata, Shape};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Shape)]
pub struct ResourceNotFoundException {
    #[wire(alias = "message")]
    pub message: Option<String>,
    pub resource_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Shape)]
pub struct ConflictException {
    #[wire(alias = "message")]
    pub message: Option<String>,
    pub resource_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Shape)]
pub struct ValidationException {
    #[wire(alias = "message")]
    pub message: Option<String>,
    pub reason: Option<String>,
    pub field_list: Option<Vec<ValidationField>>,
}

/// One rejected input member
#[derive(Debug, Clone, PartialEq, Shape)]
pub struct ValidationField {
    pub name: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Shape)]
pub struct ServiceQuotaExceededException {
    #[wire(alias = "message")]
    pub message: Option<String>,
    pub quota_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Shape)]
pub struct ThrottlingException {
    #[wire(alias = "message")]
    pub message: Option<String>,
    /// Some gateways send this as a numeric string
    #[wire(with = "jsonwire_core::scalar::lenient_i32")]
    pub retry_after_seconds: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Shape)]
pub struct InternalServerException {
    #[wire(alias = "message")]
    pub message: Option<String>,
}

/// Every modeled error the scheduler service returns
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("ResourceNotFoundException: {}", .0.message.as_deref().unwrap_or_default())]
    ResourceNotFound(Exception<ResourceNotFoundException>),

    #[error("ConflictException: {}", .0.message.as_deref().unwrap_or_default())]
    Conflict(Exception<ConflictException>),

    #[error("ValidationException: {}", .0.message.as_deref().unwrap_or_default())]
    Validation(Exception<ValidationException>),

    #[error("ServiceQuotaExceededException: {}", .0.message.as_deref().unwrap_or_default())]
    ServiceQuotaExceeded(Exception<ServiceQuotaExceededException>),

    #[error("ThrottlingException: {}", .0.message.as_deref().unwrap_or_default())]
    Throttling(Exception<ThrottlingException>),

    #[error("InternalServerException: {}", .0.message.as_deref().unwrap_or_default())]
    InternalServer(Exception<InternalServerException>),
}

impl ServiceError for SchedulerError {
    fn code(&self) -> &str {
        match self {
            SchedulerError::ResourceNotFound(_) => RESOURCE_NOT_FOUND.code,
            SchedulerError::Conflict(_) => CONFLICT.code,
            SchedulerError::Validation(_) => VALIDATION.code,
            SchedulerError::ServiceQuotaExceeded(_) => SERVICE_QUOTA_EXCEEDED.code,
            SchedulerError::Throttling(_) => THROTTLING.code,
            SchedulerError::InternalServer(_) => INTERNAL_SERVER.code,
        }
    }

    fn metadata(&self) -> &ResponseMetadata {
        match self {
            SchedulerError::ResourceNotFound(e) => &e.metadata,
            SchedulerError::Conflict(e) => &e.metadata,
            SchedulerError::Validation(e) => &e.metadata,
            SchedulerError::ServiceQuotaExceeded(e) => &e.metadata,
            SchedulerError::Throttling(e) => &e.metadata,
            SchedulerError::InternalServer(e) => &e.metadata,
        }
    }
}

impl SchedulerError {
    /// Whether the caller may retry the same request later
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SchedulerError::Throttling(_) | SchedulerError::InternalServer(_)
        )
    }
}

pub const RESOURCE_NOT_FOUND: ErrorDescriptor<SchedulerError> = ErrorDescriptor {
    code: "ResourceNotFoundException",
    build: |body, metadata| Exception::decode(body, metadata).map(SchedulerError::ResourceNotFound),
};

pub const CONFLICT: ErrorDescriptor<SchedulerError> = ErrorDescriptor {
    code: "ConflictException",
    build: |body, metadata| Exception::decode(body, metadata).map(SchedulerError::Conflict),
};

pub const VALIDATION: ErrorDescriptor<SchedulerError> = ErrorDescriptor {
    code: "ValidationException",
    build: |body, metadata| Exception::decode(body, metadata).map(SchedulerError::Validation),
};

pub const SERVICE_QUOTA_EXCEEDED: ErrorDescriptor<SchedulerError> = ErrorDescriptor {
    code: "ServiceQuotaExceededException",
    build: |body, metadata| {
        Exception::decode(body, metadata).map(SchedulerError::ServiceQuotaExceeded)
    },
};

pub const THROTTLING: ErrorDescriptor<SchedulerError> = ErrorDescriptor {
    code: "ThrottlingException",
    build: |body, metadata| Exception::decode(body, metadata).map(SchedulerError::Throttling),
};

pub const INTERNAL_SERVER: ErrorDescriptor<SchedulerError> = ErrorDescriptor {
    code: "InternalServerException",
    build: |body, metadata| Exception::decode(body, metadata).map(SchedulerError::InternalServer),
};

/// Errors any scheduler operation may return
pub static SERVICE_ERRORS: &[ErrorDescriptor<SchedulerError>] = &[THROTTLING, INTERNAL_SERVER];
