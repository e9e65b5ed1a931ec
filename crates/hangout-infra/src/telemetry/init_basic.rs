use hangout_core::TelemetryConfig;

use super::subscriber::init_subscriber;

/// Initialize tracing only. Metrics export needs the `observability-opentelemetry` build.
pub fn init_telemetry(
    config: &TelemetryConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_subscriber(config.log_format)?;

    if config.otel_enabled {
        tracing::warn!(
            "OTEL_ENABLED is set but this build lacks observability-opentelemetry, metrics are not exported"
        );
    }

    tracing::info!(
        log_format = %config.log_format,
        environment = %config.environment,
        "Tracing initialized"
    );
    Ok(())
}

pub async fn shutdown_telemetry() {
    tracing::debug!("Telemetry shutdown");
}
