//! Codec metrics
//!
//! OpenTelemetry instruments recorded by the [`Dispatcher`](crate::Dispatcher)
//! when metrics are enabled on its builder. They are exported through the
//! global meter provider, so nothing leaves the process unless the
//! application installed one (see `jsonwire_core::init_observability`).
//!
//! - **requests_serialized**: requests built, by operation
//! - **responses_decoded**: successful outputs, by operation
//! - **service_errors**: modeled and unhandled service errors, by code
//! - **protocol_errors**: codec failures, by operation
//! - **body_size**: drained response body size in bytes
//! - **decode_duration**: time from response to decoded output, in seconds

use opentelemetry::{
    global,
    metrics::{Counter, Histogram, Meter},
    InstrumentationScope, KeyValue,
};

/// Instruments for one dispatcher
pub struct CodecMetrics {
    pub requests_serialized: Counter<u64>,
    pub responses_decoded: Counter<u64>,
    pub service_errors: Counter<u64>,
    pub protocol_errors: Counter<u64>,
    pub body_size: Histogram<u64>,
    pub decode_duration: Histogram<f64>,
}

impl CodecMetrics {
    pub fn new(service_name: impl Into<String>) -> Self {
        let scope = InstrumentationScope::builder(service_name.into())
            .with_version(env!("CARGO_PKG_VERSION"))
            .build();
        let meter = global::meter_with_scope(scope);
        Self::new_with_meter(&meter)
    }

    pub fn new_with_meter(meter: &Meter) -> Self {
        Self {
            requests_serialized: meter
                .u64_counter("jsonwire.requests.serialized")
                .with_description("Requests serialized")
                .build(),
            responses_decoded: meter
                .u64_counter("jsonwire.responses.decoded")
                .with_description("Responses decoded into output shapes")
                .build(),
            service_errors: meter
                .u64_counter("jsonwire.service_errors.total")
                .with_description("Service errors returned, by code")
                .build(),
            protocol_errors: meter
                .u64_counter("jsonwire.protocol_errors.total")
                .with_description("Codec failures while building or reading messages")
                .build(),
            body_size: meter
                .u64_histogram("jsonwire.response.body_size")
                .with_description("Drained response body size in bytes")
                .build(),
            decode_duration: meter
                .f64_histogram("jsonwire.response.decode_duration")
                .with_description("Response decode duration in seconds")
                .build(),
        }
    }

    pub fn record_serialized(&self, operation: &str) {
        self.requests_serialized
            .add(1, &[KeyValue::new("operation", operation.to_string())]);
    }

    pub fn record_decoded(&self, operation: &str, status: u16, duration_secs: f64) {
        let attributes = &[
            KeyValue::new("operation", operation.to_string()),
            KeyValue::new("status", i64::from(status)),
        ];
        self.responses_decoded.add(1, attributes);
        self.decode_duration.record(duration_secs, attributes);
    }

    pub fn record_service_error(&self, operation: &str, code: &str) {
        let attributes = &[
            KeyValue::new("operation", operation.to_string()),
            KeyValue::new("code", code.to_string()),
        ];
        self.service_errors.add(1, attributes);
    }

    pub fn record_protocol_error(&self, operation: &str) {
        self.protocol_errors
            .add(1, &[KeyValue::new("operation", operation.to_string())]);
    }

    pub fn record_body_size(&self, bytes: usize) {
        self.body_size.record(bytes as u64, &[]);
    }
}
