use crate::config::Environment;
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    layer::{Identity, Layered, SubscriberExt},
    util::SubscriberInitExt,
};

pub(crate) type FilteredRegistry = Layered<EnvFilter, Registry>;

/// Install the global tracing subscriber: pretty output in development,
/// JSON in production.
///
/// Filtering follows `RUST_LOG` and defaults to `info`.
pub fn setup_logging(environment: Environment) {
    init_subscriber(environment, Identity::new());
}

/// Shared by [`setup_logging`] and the telemetry guard, which passes its
/// OpenTelemetry bridge as `extra`.
pub(crate) fn init_subscriber<L>(environment: Environment, extra: L)
where
    L: Layer<FilteredRegistry> + Send + Sync + 'static,
{
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter).with(extra);

    match environment {
        Environment::Production => {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_level(true))
                .init();
        }
        Environment::Development => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty().with_ansi(true))
                .init();
        }
    }
}
