//! Observability wiring: `tracing-subscriber` plus an optional OTLP exporter.
//!
//! All `tracing` spans and events emitted by every crate in the workspace flow
//! through the subscriber installed here. `RUST_LOG` controls filtering and
//! defaults to `info`.

use anyhow::{Context, Result};
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{runtime, trace::TracerProvider};
use tracing::warn;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogFormat;

/// Flushes pending spans when dropped.
pub struct TelemetryGuard {
    provider: Option<TracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(e) = provider.shutdown() {
                warn!(error = %e, "failed to flush OpenTelemetry spans");
            }
        }
    }
}

/// Installs the global subscriber. Must be called from within a Tokio runtime
/// when `otlp_endpoint` is set.
pub fn init(format: LogFormat, otlp_endpoint: Option<&str>) -> Result<TelemetryGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let provider = otlp_endpoint
        .map(|endpoint| {
            let exporter = opentelemetry_otlp::SpanExporter::builder()
                .with_tonic()
                .with_endpoint(endpoint)
                .build()
                .context("Failed to build OTLP span exporter")?;
            Ok::<_, anyhow::Error>(
                TracerProvider::builder()
                    .with_batch_exporter(exporter, runtime::Tokio)
                    .build(),
            )
        })
        .transpose()?;
    let otel_layer = provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer("issuewarden")));

    let registry = tracing_subscriber::registry().with(filter).with(otel_layer);
    let installed = match format {
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
        LogFormat::Text => registry.with(fmt::layer()).try_init(),
    };
    installed.context("Failed to install tracing subscriber")?;

    Ok(TelemetryGuard { provider })
}
