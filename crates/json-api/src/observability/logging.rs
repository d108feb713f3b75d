//! Subscriber setup: compact or JSON events, a filter that keeps dependency
//! chatter down, and the OpenTelemetry layer when trace export is on.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing::Subscriber;
use tracing_subscriber::{
    EnvFilter, Layer, layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt,
};

use crate::config::{ServerConfig, observability::LogFormat};

use super::ObservabilityError;

/// Targets held at `warn` unless `RUST_LOG` says otherwise. `sqlx::query`
/// logs every statement the promo and review services run.
const QUIET_TARGETS: [&str; 5] = ["sqlx::query", "h2", "hyper", "tonic", "opentelemetry"];

pub(super) fn init_subscriber(
    config: &ServerConfig,
    tracer_provider: Option<&SdkTracerProvider>,
) -> Result<(), ObservabilityError> {
    let otel_layer = tracer_provider.map(|provider| {
        tracing_opentelemetry::layer()
            .with_tracer(provider.tracer(config.observability.otel_service_name.clone()))
    });

    tracing_subscriber::registry()
        .with(env_filter(&config.logging.log_level))
        .with(fmt_layer(config.logging.log_format))
        .with(otel_layer)
        .try_init()?;

    Ok(())
}

/// JSON output flattens event fields so log pipelines can index `outcome`,
/// `request_id` and friends without unpacking a nested object.
fn fmt_layer<S>(format: LogFormat) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    match format {
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true)
            .boxed(),
    }
}

fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(log_level)))
}

fn default_directives(log_level: &str) -> String {
    let mut directives = vec![log_level.to_owned()];

    directives.extend(QUIET_TARGETS.iter().map(|target| format!("{target}=warn")));

    directives.join(",")
}
