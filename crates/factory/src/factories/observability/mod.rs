pub mod implementation;

use opentelemetry_sdk::{metrics::SdkMeterProvider, trace::SdkTracerProvider};
use serde::Deserialize;

#[derive(Deserialize, Clone, Debug, Default)]
pub struct ObservabilityConfig {
    /// OTLP/gRPC collector. Logs go to stdout only when unset.
    pub otel_exporter_otlp_endpoint: Option<String>,
    pub rust_log: Option<String>,
    pub log_format: Option<String>,
    pub tracing_level: Option<String>,
    pub with_file: Option<bool>,
    pub with_line_number: Option<bool>,
}

/// Keeps the exporters alive; dropping it flushes pending spans and metrics.
pub struct Observability {
    pub tracer_provider: Option<SdkTracerProvider>,
    pub meter_provider: Option<SdkMeterProvider>,
}
