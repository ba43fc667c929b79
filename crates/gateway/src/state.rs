use crate::{config::GatewayConfig, metrics::DetectMetrics};
use inference::Detector;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectResponse {
    pub success: bool,
    pub num_potholes: usize,
    /// Annotated JPEG as a `data:image/jpeg;base64,` URI.
    pub output_image: String,
    pub message: String,
}

impl DetectResponse {
    pub fn new(num_potholes: usize, output_image: String) -> Self {
        Self {
            success: true,
            num_potholes,
            output_image,
            message: format!("Found {num_potholes} pothole(s)"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Clone)]
pub struct AppState {
    pub detector: Arc<dyn Detector>,
    pub default_confidence: f32,
    pub expose_error_detail: bool,
    pub metrics: DetectMetrics,
}

impl AppState {
    pub fn new(detector: Arc<dyn Detector>, config: &GatewayConfig) -> Self {
        Self {
            detector,
            default_confidence: config.default_confidence,
            expose_error_detail: config.expose_error_detail,
            metrics: DetectMetrics::new("gateway"),
        }
    }
}
