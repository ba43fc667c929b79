use common::{Environment, parse_env};
use inference::DetectorConfig;
use std::env;
use std::net::{Ipv4Addr, SocketAddr};

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_CONFIDENCE: f32 = 0.3;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub environment: Environment,
    pub port: u16,
    /// Used when a request carries no `confidence` value.
    pub default_confidence: f32,
    pub max_upload_bytes: usize,
    /// Append the underlying error chain to 500 responses. Off by default, so
    /// clients see only a category such as `Detection failed` rather than the
    /// raw error text; set `EXPOSE_ERROR_DETAIL=true` to get the full text.
    pub expose_error_detail: bool,
    pub otel_endpoint: Option<String>,
    pub detector: DetectorConfig,
}

impl GatewayConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let default_confidence = parse_env("DEFAULT_CONFIDENCE", DEFAULT_CONFIDENCE);
        if !(0.0..=1.0).contains(&default_confidence) {
            anyhow::bail!("DEFAULT_CONFIDENCE must be within [0, 1], got {default_confidence}");
        }

        let otel_endpoint = env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .map(|endpoint| endpoint.trim().to_string())
            .filter(|endpoint| !endpoint.is_empty());

        Ok(Self {
            environment: Environment::from_env(),
            port: parse_env("PORT", DEFAULT_PORT),
            default_confidence,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
            expose_error_detail: parse_env("EXPOSE_ERROR_DETAIL", false),
            otel_endpoint,
            detector: DetectorConfig::from_env()?,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            port: DEFAULT_PORT,
            default_confidence: DEFAULT_CONFIDENCE,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            expose_error_detail: false,
            otel_endpoint: None,
            detector: DetectorConfig::default(),
        }
    }
}
