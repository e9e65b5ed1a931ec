//! Configuration module
//!
//! Settings for the HTTP ingestion layer (`BaseConfig`) and for the media pipeline
//! itself (`PipelineConfig`): where uploads are spooled, where processed output lands,
//! and how the dispatcher bounds its per-topic worker pools.

use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::str::FromStr;

const SERVER_PORT: u16 = 8080;
const STORE_PATH: &str = "store";
const MAX_UPLOAD_SIZE_BYTES: usize = 100 * 1024 * 1024;
const PIPELINE_QUEUE_SIZE: usize = 100;
const PIPELINE_MAX_CONCURRENT: usize = 4;
const PROCESSING_TIMEOUT_SECS: u64 = 300;
const HTTP_CONCURRENCY_LIMIT: usize = 10_000;
const OTEL_SERVICE_NAME: &str = "hangout";
const OTEL_METRICS_INTERVAL_SECS: u64 = 60;

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(anyhow::anyhow!("Invalid log format: {}", s)),
        }
    }
}

impl Display for LogFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            LogFormat::Pretty => write!(f, "pretty"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

/// Server-level configuration
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub environment: String,
    pub log_format: LogFormat,
    pub max_upload_size_bytes: usize,
    /// Maximum number of requests served at once.
    pub http_concurrency_limit: usize,
    /// Export metrics over OTLP. Needs the `observability-opentelemetry` build.
    pub otel_enabled: bool,
    pub otel_endpoint: Option<String>,
    pub otel_service_name: String,
    pub otel_metrics_interval_secs: u64,
}

/// Settings consumed by telemetry initialization.
#[derive(Clone, Debug)]
pub struct TelemetryConfig {
    pub log_format: LogFormat,
    pub environment: String,
    pub otel_enabled: bool,
    pub otel_endpoint: Option<String>,
    pub otel_service_name: String,
    pub otel_service_version: String,
    pub otel_metrics_interval_secs: u64,
}

/// Media pipeline configuration
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Directory backing the store. Created on startup if missing.
    pub store_path: PathBuf,
    /// Directory where the ingestion layer spools uploads before dispatch.
    pub upload_path: PathBuf,
    /// Bounded capacity of each topic's channel.
    pub queue_size: usize,
    /// Maximum number of messages processed concurrently per topic.
    pub max_concurrent: usize,
    pub processing_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(STORE_PATH),
            upload_path: default_upload_path(),
            queue_size: PIPELINE_QUEUE_SIZE,
            max_concurrent: PIPELINE_MAX_CONCURRENT,
            processing_timeout_secs: PROCESSING_TIMEOUT_SECS,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.store_path.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("STORE_PATH must not be empty"));
        }
        if self.upload_path.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("UPLOAD_PATH must not be empty"));
        }
        if self.queue_size == 0 {
            return Err(anyhow::anyhow!("PIPELINE_QUEUE_SIZE must be at least 1"));
        }
        if self.max_concurrent == 0 {
            return Err(anyhow::anyhow!(
                "PIPELINE_MAX_CONCURRENT must be at least 1"
            ));
        }
        if self.processing_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "PROCESSING_TIMEOUT_SECS must be at least 1"
            ));
        }
        Ok(())
    }
}

fn default_upload_path() -> PathBuf {
    env::temp_dir().join("hangout-uploads")
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Load configuration from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let log_format = match lookup("LOG_FORMAT") {
            Some(value) => value.parse()?,
            None => LogFormat::default(),
        };

        let base = BaseConfig {
            server_port: parse_or(&lookup, "SERVER_PORT", SERVER_PORT)?,
            environment,
            log_format,
            max_upload_size_bytes: parse_or(&lookup, "MAX_UPLOAD_SIZE_BYTES", MAX_UPLOAD_SIZE_BYTES)?,
            http_concurrency_limit: parse_or(
                &lookup,
                "HTTP_CONCURRENCY_LIMIT",
                HTTP_CONCURRENCY_LIMIT,
            )?,
            otel_enabled: parse_or(&lookup, "OTEL_ENABLED", false)?,
            otel_endpoint: lookup("OTEL_EXPORTER_OTLP_ENDPOINT").filter(|s| !s.trim().is_empty()),
            otel_service_name: lookup("OTEL_SERVICE_NAME")
                .unwrap_or_else(|| OTEL_SERVICE_NAME.to_string()),
            otel_metrics_interval_secs: parse_or(
                &lookup,
                "OTEL_METRICS_INTERVAL_SECS",
                OTEL_METRICS_INTERVAL_SECS,
            )?,
        };

        let pipeline = PipelineConfig {
            store_path: lookup("STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(STORE_PATH)),
            upload_path: lookup("UPLOAD_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(default_upload_path),
            queue_size: parse_or(&lookup, "PIPELINE_QUEUE_SIZE", PIPELINE_QUEUE_SIZE)?,
            max_concurrent: parse_or(&lookup, "PIPELINE_MAX_CONCURRENT", PIPELINE_MAX_CONCURRENT)?,
            processing_timeout_secs: parse_or(
                &lookup,
                "PROCESSING_TIMEOUT_SECS",
                PROCESSING_TIMEOUT_SECS,
            )?,
        };

        Ok(Config { base, pipeline })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!(
                "MAX_UPLOAD_SIZE_BYTES must be at least 1"
            ));
        }
        if self.base.http_concurrency_limit == 0 {
            return Err(anyhow::anyhow!(
                "HTTP_CONCURRENCY_LIMIT must be at least 1"
            ));
        }
        if self.base.otel_enabled {
            if self.base.otel_endpoint.is_none() {
                return Err(anyhow::anyhow!(
                    "OTEL_EXPORTER_OTLP_ENDPOINT must be set when OTEL_ENABLED=true"
                ));
            }
            if self.base.otel_metrics_interval_secs == 0 {
                return Err(anyhow::anyhow!(
                    "OTEL_METRICS_INTERVAL_SECS must be at least 1"
                ));
            }
        }
        self.pipeline.validate()
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn environment(&self) -> &str {
        &self.base.environment
    }

    pub fn log_format(&self) -> LogFormat {
        self.base.log_format
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.base.max_upload_size_bytes
    }

    pub fn http_concurrency_limit(&self) -> usize {
        self.base.http_concurrency_limit
    }

    pub fn telemetry(&self) -> TelemetryConfig {
        TelemetryConfig {
            log_format: self.base.log_format,
            environment: self.base.environment.clone(),
            otel_enabled: self.base.otel_enabled,
            otel_endpoint: self.base.otel_endpoint.clone(),
            otel_service_name: self.base.otel_service_name.clone(),
            otel_service_version: env!("CARGO_PKG_VERSION").to_string(),
            otel_metrics_interval_secs: self.base.otel_metrics_interval_secs,
        }
    }

    pub fn store_path(&self) -> &PathBuf {
        &self.pipeline.store_path
    }

    pub fn upload_path(&self) -> &PathBuf {
        &self.pipeline.upload_path
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, anyhow::Error>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("{} has an invalid value: '{}'", key, raw)),
        None => Ok(default),
    }
}
