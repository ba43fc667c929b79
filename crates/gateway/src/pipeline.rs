use crate::{
    encode::{encode_jpeg, to_data_uri},
    error::ApiError,
    ingest::UploadedImage,
    state::DetectResponse,
};
use common::span;
use inference::Detector;

/// Decode, detect, annotate and encode one upload. Blocks for the whole
/// model run.
pub fn run_detection(
    detector: &dyn Detector,
    upload: &UploadedImage,
    confidence: f32,
) -> Result<DetectResponse, ApiError> {
    let image = {
        let _s = span!("decode_image");
        upload.decode()?
    };

    let result = {
        let _s = span!("detect");
        detector.detect(&image, confidence)?
    };

    let jpeg = {
        let _s = span!("encode_jpeg");
        encode_jpeg(&result.annotated).map_err(ApiError::Encode)?
    };

    tracing::debug!(
        width = image.width(),
        height = image.height(),
        jpeg_bytes = jpeg.len(),
        "Result image encoded"
    );

    Ok(DetectResponse::new(
        result.detections.len(),
        to_data_uri(&jpeg),
    ))
}
