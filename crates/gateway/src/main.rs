use common::{TelemetryGuard, setup_logging};
use gateway::{AppState, GatewayConfig, run_server};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = GatewayConfig::from_env()?;

    let _telemetry = match config.otel_endpoint.as_deref() {
        Some(endpoint) => Some(TelemetryGuard::init("gateway", endpoint, config.environment)?),
        None => {
            setup_logging(config.environment);
            None
        }
    };

    tracing::info!(
        port = config.port,
        environment = config.environment.as_str(),
        default_confidence = config.default_confidence,
        "Gateway starting"
    );

    let detector_config = config.detector.clone();
    let detector =
        tokio::task::spawn_blocking(move || inference::load_detector(&detector_config)).await??;

    let state = AppState::new(Arc::new(detector), &config);
    run_server(&config, state).await
}
