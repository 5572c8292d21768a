//! Provides utilities to initialize logging and OpenTelemetry tracing for planner consumers.
use std::env;

use opentelemetry::{trace::TracerProvider, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::Resource;
use thiserror::Error;
use tracing::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

/// Environment variable name for the OTLP collector URL.
pub const OTLP_URL_ENVVAR: &str = "SNOWBRIDGE_PLANNER_OTLP_URL";

/// Environment variable name for the service label, which is appended to the
/// whoami string.
pub const SVC_LABEL_ENVVAR: &str = "SNOWBRIDGE_PLANNER_SVC_LABEL";

/// Name of the tracer registered with the OpenTelemetry provider.
const TRACER_NAME: &str = "snowbridge-planner";

/// Errors that can occur while installing the logging subsystem.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The OTLP span exporter could not be built for the configured endpoint.
    #[error("could not build OTLP exporter for {url}: {reason}")]
    Exporter {
        /// The configured collector URL.
        url: String,

        /// The exporter's own error message.
        reason: String,
    },

    /// A global subscriber has already been installed.
    #[error("global subscriber already set: {0}")]
    AlreadyInitialized(String),
}

/// Configuration for the logger.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// The whoami string, which is used to identify the service in logs.
    whoami: String,

    /// The OpenTelemetry URL for exporting traces.
    otel_url: Option<String>,
}

impl LoggerConfig {
    /// Creates a new empty instance with whoami set.
    pub const fn new(whoami: String) -> Self {
        Self {
            whoami,
            otel_url: None,
        }
    }

    /// Creates a new instance with the whoami string set to the provided
    /// string.
    pub fn with_base_name(s: &str) -> Self {
        Self::new(get_whoami_string(s))
    }

    /// Sets the opentelemetry URL to the provided string.
    pub fn set_otlp_url(&mut self, url: String) {
        self.otel_url = Some(url);
    }

    /// Returns the updated config with the opentelemetry URL set.
    ///
    /// Useful for a builder pattern with dotchaining.
    pub fn with_otlp_url(mut self, url: &str) -> Self {
        self.otel_url = Some(url.to_string());
        self
    }

    /// The whoami string this config will log under.
    pub fn whoami(&self) -> &str {
        &self.whoami
    }

    /// The OpenTelemetry collector URL, if one was set.
    pub fn otlp_url(&self) -> Option<&str> {
        self.otel_url.as_deref()
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::with_base_name("(snowbridge-planner)")
    }
}

/// Initializes the logging subsystem with the provided config.
///
/// Filtering follows `RUST_LOG`. Set `LOG_FILE=1` or `LOG_LINE_NUM=1` to annotate each event with
/// its source location.
pub fn init(config: LoggerConfig) -> Result<(), LoggingError> {
    let filt = tracing_subscriber::EnvFilter::from_default_env();

    let log_file = env::var("LOG_FILE").is_ok_and(|v| v == "1");
    let log_line_num = env::var("LOG_LINE_NUM").is_ok_and(|v| v == "1");

    // Stdout logging.
    let stdout_sub = tracing_subscriber::fmt::layer()
        .compact()
        .event_format(
            tracing_subscriber::fmt::format()
                .with_file(log_file)
                .with_line_number(log_line_num),
        )
        .with_filter(filt);

    // OpenTelemetry output.
    if let Some(otel_url) = &config.otel_url {
        let resource = Resource::builder()
            .with_attribute(KeyValue::new("service.name", config.whoami.clone()))
            .build();

        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(otel_url)
            .build()
            .map_err(|e| LoggingError::Exporter {
                url: otel_url.clone(),
                reason: e.to_string(),
            })?;

        let tp = opentelemetry_sdk::trace::SdkTracerProvider::builder()
            .with_resource(resource)
            .with_batch_exporter(exporter)
            .build();

        let tracer = tp.tracer(TRACER_NAME);

        let otel_sub = tracing_opentelemetry::layer().with_tracer(tracer);

        tracing_subscriber::registry()
            .with(stdout_sub)
            .with(otel_sub)
            .try_init()
            .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;
    } else {
        tracing_subscriber::registry()
            .with(stdout_sub)
            .try_init()
            .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;
    }

    info!(whoami = %config.whoami, "logging started");

    Ok(())
}

/// Gets the OTLP URL from the standard envvar.
pub fn get_otlp_url_from_env() -> Option<String> {
    env::var(OTLP_URL_ENVVAR).ok()
}

/// Gets the service label from the standard envvar, which should be included
/// in the whoami string.
pub fn get_service_label_from_env() -> Option<String> {
    env::var(SVC_LABEL_ENVVAR).ok()
}

/// Computes a standard whoami string.
pub fn get_whoami_string(base: &str) -> String {
    whoami_with_label(base, get_service_label_from_env().as_deref())
}

fn whoami_with_label(base: &str, label: Option<&str>) -> String {
    match label {
        Some(label) => format!("{base}%{label}"),
        None => base.to_owned(),
    }
}
