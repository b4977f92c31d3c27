//! Tracing subscriber setup.
//!
//! With the `otel` feature and `OTEL_EXPORTER_OTLP_ENDPOINT` set, spans are
//! also exported over OTLP.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(feature = "otel")]
use opentelemetry::global;
#[cfg(feature = "otel")]
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};

const DEFAULT_FILTER: &str = "info,rates_app=debug,rates_hex=debug";

/// Keeps exporters alive until `shutdown`.
pub struct Telemetry {
    #[cfg(feature = "otel")]
    provider: Option<sdktrace::SdkTracerProvider>,
}

impl Telemetry {
    /// Flushes pending spans.
    pub fn shutdown(self) {
        #[cfg(feature = "otel")]
        if let Some(provider) = self.provider {
            let _ = provider.shutdown();
        }
    }
}

#[cfg(feature = "otel")]
fn init_tracer() -> anyhow::Result<(sdktrace::Tracer, sdktrace::SdkTracerProvider)> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // Use gRPC exporter with batch processing (non-blocking)
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok((provider.tracer("rates-tracker"), provider))
}

/// Installs the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init() -> anyhow::Result<Telemetry> {
    let registry = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer());

    #[cfg(feature = "otel")]
    {
        if std::env::var_os("OTEL_EXPORTER_OTLP_ENDPOINT").is_some() {
            let (tracer, provider) = init_tracer()?;
            registry
                .with(tracing_opentelemetry::layer().with_tracer(tracer))
                .try_init()?;
            return Ok(Telemetry {
                provider: Some(provider),
            });
        }
        registry.try_init()?;
        Ok(Telemetry { provider: None })
    }

    #[cfg(not(feature = "otel"))]
    {
        registry.try_init()?;
        Ok(Telemetry {})
    }
}
