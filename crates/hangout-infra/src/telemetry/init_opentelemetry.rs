use std::sync::OnceLock;
use std::time::Duration;

use hangout_core::TelemetryConfig;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    metrics::{PeriodicReader, SdkMeterProvider, Temporality},
    runtime, Resource,
};
use opentelemetry_semantic_conventions::resource::{SERVICE_NAME, SERVICE_VERSION};

use super::process_metrics::{self, ProcessGauges};
use super::subscriber::init_subscriber;

struct MetricsPipeline {
    provider: SdkMeterProvider,
    _process_gauges: ProcessGauges,
}

static METRICS: OnceLock<MetricsPipeline> = OnceLock::new();

/// Initialize tracing and, when enabled, the OTLP metrics pipeline.
///
/// Must be called from within a tokio runtime: the periodic exporter runs on it.
pub fn init_telemetry(
    config: &TelemetryConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_subscriber(config.log_format)?;

    let endpoint = match config.otel_endpoint.as_deref() {
        Some(endpoint) if config.otel_enabled => endpoint,
        _ => {
            tracing::info!(
                log_format = %config.log_format,
                environment = %config.environment,
                "OpenTelemetry disabled, using standard tracing"
            );
            return Ok(());
        }
    };

    let resource = Resource::new(vec![
        KeyValue::new(SERVICE_NAME, config.otel_service_name.clone()),
        KeyValue::new(SERVICE_VERSION, config.otel_service_version.clone()),
        KeyValue::new("deployment.environment", config.environment.clone()),
    ]);

    let exporter = opentelemetry_otlp::MetricExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .with_temporality(Temporality::Cumulative)
        .build()
        .map_err(|e| format!("Failed to build gRPC metric exporter: {}", e))?;

    let reader = PeriodicReader::builder(exporter, runtime::Tokio)
        .with_interval(Duration::from_secs(config.otel_metrics_interval_secs))
        .build();

    let provider = SdkMeterProvider::builder()
        .with_reader(reader)
        .with_resource(resource)
        .build();

    opentelemetry::global::set_meter_provider(provider.clone());

    let process_gauges =
        process_metrics::register(&opentelemetry::global::meter("hangout.process"));

    if METRICS
        .set(MetricsPipeline {
            provider,
            _process_gauges: process_gauges,
        })
        .is_err()
    {
        return Err("OpenTelemetry metrics already initialized".into());
    }

    tracing::info!(
        endpoint = %endpoint,
        service_name = %config.otel_service_name,
        environment = %config.environment,
        metrics_interval_secs = config.otel_metrics_interval_secs,
        "OpenTelemetry metrics initialized"
    );

    Ok(())
}

/// Flush pending metrics to the collector and stop the exporter.
pub async fn shutdown_telemetry() {
    let Some(pipeline) = METRICS.get() else {
        tracing::debug!("Telemetry shutdown");
        return;
    };

    tracing::info!("Shutting down OpenTelemetry...");

    let provider = pipeline.provider.clone();
    let result = tokio::task::spawn_blocking(move || {
        if let Err(e) = provider.force_flush() {
            tracing::warn!(error = %e, "Failed to flush metrics");
        }
        provider.shutdown()
    })
    .await;

    match result {
        Ok(Ok(())) => tracing::info!("OpenTelemetry shutdown complete"),
        Ok(Err(e)) => tracing::warn!(error = %e, "Meter provider shutdown failed"),
        Err(e) => tracing::error!(error = %e, "Telemetry shutdown task failed"),
    }
}
