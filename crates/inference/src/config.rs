use crate::backend::ExecutionProvider;
use common::parse_env;
use std::env;

pub const DEFAULT_INPUT_SIZE: (u32, u32) = (640, 640);
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.7;
pub const DEFAULT_MAX_DETECTIONS: usize = 300;

#[derive(Debug, Clone)]
pub struct DetectorConfig {
    pub model_path: String,
    pub execution_provider: ExecutionProvider,
    /// Used when the model does not declare a static input shape.
    pub input_size: (u32, u32),
    pub iou_threshold: f32,
    pub max_detections: usize,
    /// One label per model class, in class-index order.
    pub class_names: Vec<String>,
}

impl DetectorConfig {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> anyhow::Result<Self> {
        let model_path = env::var("MODEL_PATH").unwrap_or_else(|_| "best.onnx".to_string());

        let execution_provider = match env::var("EXECUTION_PROVIDER") {
            Ok(raw) => raw.parse().map_err(anyhow::Error::msg)?,
            Err(_) => ExecutionProvider::default(),
        };

        let input_width = parse_env("INPUT_WIDTH", DEFAULT_INPUT_SIZE.0);
        let input_height = parse_env("INPUT_HEIGHT", DEFAULT_INPUT_SIZE.1);

        let iou_threshold = parse_env("IOU_THRESHOLD", DEFAULT_IOU_THRESHOLD);
        let max_detections = parse_env("MAX_DETECTIONS", DEFAULT_MAX_DETECTIONS);

        let class_names = env::var("CLASS_NAMES")
            .map(|raw| parse_class_names(&raw))
            .unwrap_or_else(|_| vec!["pothole".to_string()]);

        let config = Self {
            model_path,
            execution_provider,
            input_size: (input_width, input_height),
            iou_threshold,
            max_detections,
            class_names,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.input_size.0 == 0 || self.input_size.1 == 0 {
            anyhow::bail!(
                "INPUT_WIDTH and INPUT_HEIGHT must be non-zero, got {}x{}",
                self.input_size.0,
                self.input_size.1
            );
        }
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            anyhow::bail!("IOU_THRESHOLD must be within [0, 1], got {}", self.iou_threshold);
        }
        if self.max_detections == 0 {
            anyhow::bail!("MAX_DETECTIONS must be at least 1");
        }
        if self.class_names.is_empty() {
            anyhow::bail!("CLASS_NAMES must name at least one class");
        }
        Ok(())
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_path: "best.onnx".to_string(),
            execution_provider: ExecutionProvider::Cpu,
            input_size: DEFAULT_INPUT_SIZE,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            max_detections: DEFAULT_MAX_DETECTIONS,
            class_names: vec!["pothole".to_string()],
        }
    }
}

fn parse_class_names(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_class_names_trims_and_skips_empty() {
        assert_eq!(
            parse_class_names(" pothole, crack ,,manhole"),
            vec!["pothole", "crack", "manhole"]
        );
        assert!(parse_class_names(" , ").is_empty());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(DetectorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_input_size_is_rejected() {
        for input_size in [(0, 640), (640, 0)] {
            let config = DetectorConfig {
                input_size,
                ..DetectorConfig::default()
            };
            assert!(config.validate().is_err(), "{input_size:?} accepted");
        }
    }

    #[test]
    fn test_iou_threshold_out_of_range_is_rejected() {
        for iou_threshold in [-0.1, 1.5, f32::NAN] {
            let config = DetectorConfig {
                iou_threshold,
                ..DetectorConfig::default()
            };
            assert!(config.validate().is_err(), "{iou_threshold} accepted");
        }
    }

    #[test]
    fn test_zero_max_detections_is_rejected() {
        let config = DetectorConfig {
            max_detections: 0,
            ..DetectorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_class_names_are_rejected() {
        let config = DetectorConfig {
            class_names: Vec::new(),
            ..DetectorConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
