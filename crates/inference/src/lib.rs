pub mod annotate;
pub mod backend;
pub mod config;
pub mod detector;
pub mod error;
pub mod processing;

// Re-export commonly used types for convenience
pub use backend::{ExecutionProvider, InferenceBackend, InferenceOutput};
pub use config::DetectorConfig;
pub use detector::{DetectionResult, Detector, YoloDetector};
pub use error::DetectorError;
pub use processing::post::Detection;

#[cfg(feature = "ort-backend")]
pub use detector::load_detector;
