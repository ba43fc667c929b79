use crate::{
    annotate::Annotator,
    backend::{InferenceBackend, InferenceOutput},
    config::DetectorConfig,
    error::DetectorError,
    processing::{
        post::{Detection, PostProcessor, TransformParams},
        pre::{PreProcessor, PreprocessResult},
    },
};
use common::span;
use image::RgbImage;
use std::sync::Mutex;

/// Boxes found in one image, and that image with the boxes drawn on.
#[derive(Debug, Clone)]
pub struct DetectionResult {
    pub detections: Vec<Detection>,
    pub annotated: RgbImage,
}

/// Shared, read-only detection model.
///
/// Implementations block for the full inference duration; async callers are
/// expected to run them on a blocking thread.
pub trait Detector: Send + Sync {
    fn detect(&self, image: &RgbImage, confidence: f32) -> Result<DetectionResult, DetectorError>;
}

/// Mutable per-run state. ONNX Runtime sessions need `&mut` to run, and the
/// preprocessor reuses its letterbox buffer between calls.
struct Session<B> {
    backend: B,
    preprocessor: PreProcessor,
}

pub struct YoloDetector<B: InferenceBackend> {
    session: Mutex<Session<B>>,
    postprocessor: PostProcessor,
    annotator: Annotator,
}

impl<B: InferenceBackend> YoloDetector<B> {
    pub fn new(backend: B, config: &DetectorConfig) -> Result<Self, DetectorError> {
        let input_size = backend.input_size().unwrap_or(config.input_size);
        tracing::info!(
            width = input_size.0,
            height = input_size.1,
            classes = config.class_names.len(),
            "Detector input configured"
        );

        Ok(Self {
            session: Mutex::new(Session {
                backend,
                preprocessor: PreProcessor::new(input_size),
            }),
            postprocessor: PostProcessor::new(
                config.class_names.len(),
                config.iou_threshold,
                config.max_detections,
            ),
            annotator: Annotator::new(config.class_names.clone())?,
        })
    }

    fn run_model(&self, image: &RgbImage) -> Result<(InferenceOutput, TransformParams), DetectorError> {
        let (width, height) = image.dimensions();

        let mut session = self.session.lock().map_err(|_| DetectorError::Lock)?;
        let Session {
            backend,
            preprocessor,
        } = &mut *session;

        let PreprocessResult {
            tensor,
            scale,
            offset_x,
            offset_y,
        } = preprocessor
            .preprocess(image.as_raw(), width, height)
            .map_err(DetectorError::preprocess)?;

        let output = {
            let _infer_span = span!("model_inference");
            backend.infer(&tensor).map_err(DetectorError::inference)?
        };

        let transform = TransformParams {
            orig_width: width,
            orig_height: height,
            scale,
            offset_x,
            offset_y,
        };

        Ok((output, transform))
    }
}

impl<B: InferenceBackend + Send> Detector for YoloDetector<B> {
    fn detect(&self, image: &RgbImage, confidence: f32) -> Result<DetectionResult, DetectorError> {
        let (output, transform) = self.run_model(image)?;

        let detections = self.postprocessor.parse_detections(
            &output.predictions.view(),
            confidence,
            &transform,
        )?;

        let annotated = self.annotator.annotate(image, &detections);

        tracing::debug!(
            width = transform.orig_width,
            height = transform.orig_height,
            confidence,
            detections = detections.len(),
            "Image processed"
        );

        Ok(DetectionResult {
            detections,
            annotated,
        })
    }
}

/// Load the ONNX model named by `config` and wrap it in a detector.
#[cfg(feature = "ort-backend")]
pub fn load_detector(
    config: &DetectorConfig,
) -> anyhow::Result<YoloDetector<crate::backend::ort::OrtBackend>> {
    use crate::backend::ort::OrtBackend;

    config.validate()?;

    tracing::info!(
        model_path = %config.model_path,
        provider = ?config.execution_provider,
        "Loading detection model"
    );
    let backend = OrtBackend::load_model_with_provider(&config.model_path, config.execution_provider)?;
    Ok(YoloDetector::new(backend, config)?)
}
