//! Tracing setup
//!
//! Console output is always installed, pretty or JSON per [`LoggingConfig`].
//! When `OTEL_EXPORTER_OTLP_ENDPOINT` names a reachable collector, spans and
//! log records are also exported over OTLP/HTTP.

use std::env;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use anyhow::{Context, Result};
use opentelemetry::trace::TracerProvider;
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_semantic_conventions::resource::SERVICE_VERSION;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingConfig;

const SERVICE_NAME: &str = "dishcast";

/// Keeps exporters alive; flushes and shuts them down on drop
#[derive(Default)]
pub struct TelemetryGuard {
    tracer_provider: Option<SdkTracerProvider>,
    logger_provider: Option<SdkLoggerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.tracer_provider.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("Failed to shut down trace exporter: {e}");
            }
        }
        if let Some(provider) = self.logger_provider.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("Failed to shut down log exporter: {e}");
            }
        }
    }
}

/// `RUST_LOG` wins over the configured level
fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Quick TCP probe so an unreachable collector doesn't swallow every span
fn collector_reachable(endpoint: &str) -> bool {
    let host_port = endpoint
        .trim_start_matches("http://")
        .trim_start_matches("https://")
        .trim_end_matches('/');

    host_port
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .map(|addr| TcpStream::connect_timeout(&addr, Duration::from_millis(100)).is_ok())
        .unwrap_or(false)
}

fn otlp_providers() -> Result<(SdkTracerProvider, SdkLoggerProvider)> {
    let service_name = env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| SERVICE_NAME.to_string());
    let resource = Resource::builder()
        .with_service_name(service_name)
        .with_attribute(opentelemetry::KeyValue::new(SERVICE_VERSION, crate::VERSION))
        .build();

    // Endpoint and signal paths come from the OTEL_* environment
    let span_exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .build()
        .context("Failed to create OTLP span exporter")?;
    let tracer_provider = SdkTracerProvider::builder()
        .with_batch_exporter(span_exporter)
        .with_resource(resource.clone())
        .build();

    let log_exporter = opentelemetry_otlp::LogExporter::builder()
        .with_http()
        .build()
        .context("Failed to create OTLP log exporter")?;
    let logger_provider = SdkLoggerProvider::builder()
        .with_batch_exporter(log_exporter)
        .with_resource(resource)
        .build();

    Ok((tracer_provider, logger_provider))
}

/// Install the global subscriber
pub fn init(config: &LoggingConfig) -> Result<TelemetryGuard> {
    let json = config.format.eq_ignore_ascii_case("json");
    let pretty_layer = (!json).then(tracing_subscriber::fmt::layer);
    let json_layer = json.then(|| tracing_subscriber::fmt::layer().json());

    let endpoint = env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
        .ok()
        .filter(|endpoint| collector_reachable(endpoint));

    let mut guard = TelemetryGuard::default();
    let (trace_layer, log_layer) = match &endpoint {
        Some(_) => {
            let (tracer_provider, logger_provider) = otlp_providers()?;
            let tracer = tracer_provider.tracer(SERVICE_NAME);
            opentelemetry::global::set_tracer_provider(tracer_provider.clone());

            let trace_layer = tracing_opentelemetry::layer().with_tracer(tracer);
            let log_layer = OpenTelemetryTracingBridge::new(&logger_provider);
            guard.tracer_provider = Some(tracer_provider);
            guard.logger_provider = Some(logger_provider);
            (Some(trace_layer), Some(log_layer))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(pretty_layer)
        .with(json_layer)
        .with(trace_layer)
        .with(log_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    match endpoint {
        Some(endpoint) => tracing::info!("OpenTelemetry enabled, exporting to {}", endpoint),
        None => tracing::debug!("No reachable OTLP collector, using console logging only"),
    }

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_collector() {
        assert!(!collector_reachable("http://definitely-not-a-host.invalid:4318"));
        assert!(!collector_reachable("not a url"));
    }
}
