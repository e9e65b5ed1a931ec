//! Telemetry initialization
//!
//! Tracing is always installed. With `observability-opentelemetry`, metrics are also
//! exported over OTLP.

mod subscriber;

#[cfg(feature = "observability-opentelemetry")]
mod init_opentelemetry;
#[cfg(feature = "observability-opentelemetry")]
mod process_metrics;

#[cfg(not(feature = "observability-opentelemetry"))]
mod init_basic;

#[cfg(feature = "observability-opentelemetry")]
pub use init_opentelemetry::{init_telemetry, shutdown_telemetry};

#[cfg(not(feature = "observability-opentelemetry"))]
pub use init_basic::{init_telemetry, shutdown_telemetry};
