use std::{env, sync::OnceLock};

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::TracerProvider;
use tracing::*;
use tracing_subscriber::{
    filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

pub const OTLP_URL_ENVVAR: &str = "OPINIT_OTLP_URL";
pub const SVC_LABEL_ENVVAR: &str = "OPINIT_SVC_LABEL";

/// Name of the tracer spans are exported under.
const OTEL_TRACER_NAME: &str = "opinit-log";

/// Provider behind the OTLP layer, shut down by [`finalize`].
static TRACER_PROVIDER: OnceLock<TracerProvider> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    whoami: String,
    otel_url: Option<String>,
}

impl LoggerConfig {
    pub fn new(whoami: String) -> Self {
        Self {
            whoami,
            otel_url: None,
        }
    }

    pub fn with_base_name(s: &str) -> Self {
        Self::new(get_whoami_string(s))
    }

    /// Whoami from `base` plus the service label, OTLP url from the env.
    pub fn from_env(base: &str) -> Self {
        let mut config = Self::with_base_name(base);
        config.otel_url = get_otlp_url_from_env();
        config
    }

    pub fn otlp_url(&self) -> Option<&str> {
        self.otel_url.as_deref()
    }

}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::with_base_name("(opinit-service)")
    }
}

/// Initializes the logging subsystem with the provided config.
///
/// Filtering comes from `RUST_LOG`, defaulting to `info`. If an OTLP url is
/// set this must be called from within a tokio runtime context, the batch
/// exporter spawns onto it.
pub fn init(config: LoggerConfig) {
    let filt = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    // Stdout logging.
    let stdout_sub = tracing_subscriber::fmt::layer().compact().with_filter(filt);

    // OpenTelemetry output, if configured.
    let otel_sub = config.otlp_url().map(|url| {
        let exporter = opentelemetry_otlp::new_exporter()
            .tonic()
            .with_endpoint(url);

        let tp = opentelemetry_otlp::new_pipeline()
            .tracing()
            .with_exporter(exporter)
            .install_batch(opentelemetry_sdk::runtime::Tokio)
            .expect("init: opentelemetry");

        let tracer = tp.tracer(OTEL_TRACER_NAME);
        let _ = TRACER_PROVIDER.set(tp);
        tracing_opentelemetry::layer().with_tracer(tracer)
    });

    tracing_subscriber::registry()
        .with(stdout_sub)
        .with(otel_sub)
        .init();

    info!(whoami = %config.whoami, otlp = config.otel_url.is_some(), "logging started");
}

/// Flushes pending spans to the OTLP collector, if one was set up.
///
/// Must be called while the runtime the exporter runs on is still alive.
pub fn finalize() {
    info!("shutting down logging");
    if let Some(tp) = TRACER_PROVIDER.get() {
        shutdown_provider(tp);
    }
}

/// Flushes and shuts down `tp`, returning whether it went cleanly.
fn shutdown_provider(tp: &TracerProvider) -> bool {
    for res in tp.force_flush() {
        if let Err(err) = res {
            eprintln!("failed to flush spans: {err}");
        }
    }

    match tp.shutdown() {
        Ok(()) => true,
        Err(err) => {
            eprintln!("failed to shut down tracer provider: {err}");
            false
        }
    }
}

pub fn get_otlp_url_from_env() -> Option<String> {
    env::var(OTLP_URL_ENVVAR).ok().filter(|s| !s.is_empty())
}

/// Gets the service label from the standard envvar, which should be included
/// in the whoami string.
pub fn get_service_label_from_env() -> Option<String> {
    env::var(SVC_LABEL_ENVVAR).ok().filter(|s| !s.is_empty())
}

/// Computes a standard whoami string, `base%label` when a label is set.
pub fn get_whoami_string(base: &str) -> String {
    whoami_with_label(base, get_service_label_from_env().as_deref())
}

fn whoami_with_label(base: &str, label: Option<&str>) -> String {
    match label {
        Some(label) => format!("{base}%{label}"),
        None => base.to_string(),
    }
}
