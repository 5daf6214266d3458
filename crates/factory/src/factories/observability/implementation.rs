use std::time::Duration;

use opentelemetry::{KeyValue, global, trace::TracerProvider as _};
use opentelemetry_otlp::{
    Compression, MetricExporter, SpanExporter, WithExportConfig, WithTonicConfig,
};
use opentelemetry_sdk::{
    Resource,
    metrics::{PeriodicReader, SdkMeterProvider},
    propagation::TraceContextPropagator,
    trace::{RandomIdGenerator, Sampler, SdkTracerProvider},
};
use opentelemetry_semantic_conventions::{SCHEMA_URL, attribute::SERVICE_VERSION};
use time::macros::format_description;
use tonic::transport::ClientTlsConfig;
use tracing::Level;
use tracing_opentelemetry::{MetricsLayer, OpenTelemetryLayer};
use tracing_subscriber::{
    EnvFilter, Layer, fmt::time::LocalTime, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::factories::observability::{Observability, ObservabilityConfig};

const METRICS_EXPORT_INTERVAL: Duration = Duration::from_secs(30);

impl Drop for Observability {
    fn drop(&mut self) {
        if let Some(Err(err)) = self.tracer_provider.as_ref().map(|p| p.shutdown()) {
            eprintln!("{err:?}");
        }
        if let Some(Err(err)) = self.meter_provider.as_ref().map(|p| p.shutdown()) {
            eprintln!("{err:?}");
        }
    }
}

impl Observability {
    /// Installs the global tracing subscriber.
    ///
    /// Stdout logging is always on. Trace and metric export over OTLP/gRPC is
    /// added only when `otel_exporter_otlp_endpoint` is set.
    pub async fn init(
        cargo_crate_name: String,
        cargo_pkg_version: String,
        cfg: &ObservabilityConfig,
    ) -> Observability {
        global::set_text_map_propagator(TraceContextPropagator::new());

        let (tracer_provider, meter_provider) = match cfg.otel_exporter_otlp_endpoint.as_deref() {
            Some(endpoint) => {
                let resource = Self::get_resource(&cargo_crate_name, &cargo_pkg_version);
                (
                    Some(Self::init_tracer_provider(resource.clone(), endpoint)),
                    Some(Self::init_meter_provider(resource, endpoint)),
                )
            }
            None => (None, None),
        };

        let open_telemetry_layer = tracer_provider
            .as_ref()
            .map(|provider| OpenTelemetryLayer::new(provider.tracer(cargo_crate_name.clone())));
        let metrics_layer = meter_provider
            .as_ref()
            .map(|provider| MetricsLayer::new(provider.clone()));

        // rust_log wins, then RUST_LOG, then tracing_level
        let level = cfg
            .tracing_level
            .as_deref()
            .and_then(|level| level.parse::<Level>().ok())
            .unwrap_or(Level::INFO);
        let env_filter = match cfg.rust_log.as_deref() {
            Some(rust_log) => EnvFilter::new(rust_log),
            None => EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase())),
        };

        let timer = LocalTime::new(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second]"
        ));
        let base = tracing_subscriber::fmt::layer()
            .with_timer(timer)
            .with_target(false)
            .with_file(cfg.with_file.unwrap_or(true))
            .with_line_number(cfg.with_line_number.unwrap_or(true));

        let fmt_layer = match cfg.log_format.as_deref() {
            Some("pretty") => base.with_ansi(true).compact().boxed(),
            _ => base
                .json()
                .flatten_event(true)
                .with_span_list(false)
                .boxed(),
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(metrics_layer)
            .with(open_telemetry_layer)
            .init();

        Observability {
            tracer_provider,
            meter_provider,
        }
    }

    fn get_resource(cargo_crate_name: &str, cargo_pkg_version: &str) -> Resource {
        Resource::builder()
            .with_service_name(cargo_crate_name.to_string())
            .with_schema_url(
                [KeyValue::new(SERVICE_VERSION, cargo_pkg_version.to_string())],
                SCHEMA_URL,
            )
            .build()
    }

    fn init_tracer_provider(resource: Resource, endpoint: &str) -> SdkTracerProvider {
        let exporter = tonic_exporter(SpanExporter::builder().with_tonic(), endpoint)
            .build()
            .expect("Failed to create trace exporter");

        let tracer_provider = SdkTracerProvider::builder()
            .with_id_generator(RandomIdGenerator::default())
            .with_batch_exporter(exporter)
            .with_sampler(Sampler::AlwaysOn)
            .with_resource(resource)
            .build();

        global::set_tracer_provider(tracer_provider.clone());
        tracer_provider
    }

    fn init_meter_provider(resource: Resource, endpoint: &str) -> SdkMeterProvider {
        let exporter = tonic_exporter(MetricExporter::builder().with_tonic(), endpoint)
            .build()
            .expect("Failed to create metric exporter");

        let reader = PeriodicReader::builder(exporter)
            .with_interval(METRICS_EXPORT_INTERVAL)
            .build();

        let meter_provider = SdkMeterProvider::builder()
            .with_resource(resource)
            .with_reader(reader)
            .build();

        global::set_meter_provider(meter_provider.clone());
        meter_provider
    }
}

/// Gzip-compressed gRPC exporter; TLS with native roots for `https://` endpoints.
fn tonic_exporter<B>(builder: B, endpoint: &str) -> B
where
    B: WithExportConfig + WithTonicConfig,
{
    let builder = builder
        .with_endpoint(endpoint)
        .with_compression(Compression::Gzip);

    if endpoint.starts_with("https://") {
        builder.with_tls_config(ClientTlsConfig::new().with_native_roots())
    } else {
        builder
    }
}
