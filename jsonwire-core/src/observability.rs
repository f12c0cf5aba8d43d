//! OpenTelemetry and `tracing` bootstrap for applications using jsonwire
//!
//! The codec itself only emits `tracing` events and OpenTelemetry metrics
//! through the global providers; it never installs a subscriber. Applications
//! that want those signals exported call [`init_observability`] once at
//! startup and [`shutdown_observability`] before exiting:
//!
//! ```rust,no_run
//! use jsonwire_core::ObservabilityConfig;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ObservabilityConfig::new("scheduler-cli")
//!         .with_endpoint("http://collector:4317")
//!         .with_log_level("jsonwire_client=debug,info");
//!
//!     jsonwire_core::init_observability(config).expect("Failed to init observability");
//!
//!     // ... issue requests ...
//!
//!     jsonwire_core::shutdown_observability();
//! }
//! ```
//!
//! `OTEL_EXPORTER_OTLP_ENDPOINT` and `RUST_LOG` supply the defaults.

use opentelemetry::{global, trace::TracerProvider as _, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::trace::{RandomIdGenerator, Sampler, SdkTracerProvider};
use opentelemetry_sdk::Resource;
use opentelemetry_semantic_conventions::resource::{SERVICE_NAME, SERVICE_VERSION};
use std::sync::OnceLock;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Handles kept so shutdown can flush what the global registry holds
struct Providers {
    tracer: Option<SdkTracerProvider>,
    meter: Option<SdkMeterProvider>,
}

static PROVIDERS: OnceLock<Providers> = OnceLock::new();

/// Which telemetry signals to export, and where
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub service_name: String,
    pub service_version: String,
    /// OTLP/gRPC collector endpoint
    pub otlp_endpoint: String,
    pub enable_traces: bool,
    pub enable_metrics: bool,
    /// Structured JSON logs on stdout
    pub enable_logs: bool,
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub log_level: String,
    /// How often metrics are pushed to the collector
    pub metrics_interval: Duration,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        let env_or = |key: &str, fallback: &str| {
            std::env::var(key).unwrap_or_else(|_| fallback.to_string())
        };
        Self {
            service_name: "jsonwire".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            otlp_endpoint: env_or("OTEL_EXPORTER_OTLP_ENDPOINT", "http://localhost:4317"),
            enable_traces: true,
            enable_metrics: true,
            enable_logs: true,
            log_level: env_or("RUST_LOG", "info"),
            metrics_interval: Duration::from_secs(30),
        }
    }
}

impl ObservabilityConfig {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.otlp_endpoint = endpoint.into();
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = version.into();
        self
    }

    pub fn with_traces(mut self, enable: bool) -> Self {
        self.enable_traces = enable;
        self
    }

    pub fn with_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = enable;
        self
    }

    pub fn with_logs(mut self, enable: bool) -> Self {
        self.enable_logs = enable;
        self
    }

    pub fn with_metrics_interval(mut self, interval: Duration) -> Self {
        self.metrics_interval = interval;
        self
    }

    fn resource(&self) -> Resource {
        Resource::builder_empty()
            .with_attributes([
                KeyValue::new(SERVICE_NAME, self.service_name.clone()),
                KeyValue::new(SERVICE_VERSION, self.service_version.clone()),
            ])
            .build()
    }

    fn tracer_provider(&self) -> Result<SdkTracerProvider, BoxError> {
        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(self.otlp_endpoint.clone())
            .build()?;

        Ok(SdkTracerProvider::builder()
            .with_batch_exporter(exporter)
            .with_resource(self.resource())
            .with_sampler(Sampler::AlwaysOn)
            .with_id_generator(RandomIdGenerator::default())
            .build())
    }

    fn meter_provider(&self) -> Result<SdkMeterProvider, BoxError> {
        let exporter = opentelemetry_otlp::MetricExporter::builder()
            .with_tonic()
            .with_endpoint(self.otlp_endpoint.clone())
            .build()?;
        let reader = PeriodicReader::builder(exporter)
            .with_interval(self.metrics_interval)
            .build();

        Ok(SdkMeterProvider::builder()
            .with_reader(reader)
            .with_resource(self.resource())
            .build())
    }
}

/// Install the global tracer and meter providers and the `tracing` subscriber
///
/// Call once per process; later calls fail.
pub fn init_observability(config: ObservabilityConfig) -> Result<(), BoxError> {
    if PROVIDERS.get().is_some() {
        return Err("observability is already initialized".into());
    }

    let tracer = config
        .enable_traces
        .then(|| config.tracer_provider())
        .transpose()?;
    let meter = config
        .enable_metrics
        .then(|| config.meter_provider())
        .transpose()?;

    if tracer.is_some() || config.enable_logs {
        let filter =
            EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.log_level))?;
        let otel_layer = tracer.as_ref().map(|provider| {
            tracing_opentelemetry::layer().with_tracer(provider.tracer(config.service_name.clone()))
        });
        let json_layer = config.enable_logs.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true)
        });

        tracing_subscriber::registry()
            .with(otel_layer)
            .with(filter)
            .with(json_layer)
            .try_init()?;
    }

    if let Some(provider) = &tracer {
        global::set_tracer_provider(provider.clone());
    }
    if let Some(provider) = &meter {
        global::set_meter_provider(provider.clone());
    }
    if PROVIDERS.set(Providers { tracer, meter }).is_err() {
        return Err("observability is already initialized".into());
    }

    tracing::info!(
        service_name = %config.service_name,
        otlp_endpoint = %config.otlp_endpoint,
        traces = config.enable_traces,
        metrics = config.enable_metrics,
        logs = config.enable_logs,
        "Observability initialized"
    );
    Ok(())
}

/// Flush and stop the providers installed by [`init_observability`]
///
/// Safe to call more than once, or without a prior init.
pub fn shutdown_observability() {
    let Some(providers) = PROVIDERS.get() else {
        return;
    };
    tracing::info!("Shutting down observability");

    if let Some(tracer) = &providers.tracer {
        if let Err(e) = tracer.shutdown() {
            tracing::debug!(error = %e, "Tracer provider shutdown");
        }
    }
    if let Some(meter) = &providers.meter {
        if let Err(e) = meter.shutdown() {
            tracing::debug!(error = %e, "Meter provider shutdown");
        }
    }
}
