use crate::error::ApiError;
use axum::{body::Bytes, extract::Multipart};
use image::RgbImage;

pub const FILE_FIELD: &str = "file";
pub const CONFIDENCE_FIELD: &str = "confidence";

/// One uploaded file as received, before any decoding.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub bytes: Bytes,
    pub content_type: Option<String>,
    pub file_name: Option<String>,
}

impl UploadedImage {
    /// Only the declared media type is checked; the bytes are not sniffed.
    pub fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.trim().to_ascii_lowercase().starts_with("image/"))
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.is_image() {
            Ok(())
        } else {
            Err(ApiError::InvalidInput("File must be an image".to_string()))
        }
    }

    /// Decode to RGB, dropping any alpha channel and expanding grayscale.
    pub fn decode(&self) -> Result<RgbImage, ApiError> {
        let image = image::load_from_memory(&self.bytes).map_err(ApiError::Decode)?;
        Ok(image.to_rgb8())
    }
}

/// The fields of a `/detect` form the handler cares about.
#[derive(Debug, Default)]
pub struct DetectForm {
    pub file: Option<UploadedImage>,
    pub confidence: Option<String>,
}

impl DetectForm {
    /// Drain the multipart stream. Unknown fields are skipped; a repeated
    /// field keeps its last value.
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = DetectForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().map(str::to_string);
            match name.as_deref() {
                Some(FILE_FIELD) => {
                    let content_type = field.content_type().map(str::to_string);
                    let file_name = field.file_name().map(str::to_string);
                    let bytes = field.bytes().await?;
                    form.file = Some(UploadedImage {
                        bytes,
                        content_type,
                        file_name,
                    });
                }
                Some(CONFIDENCE_FIELD) => {
                    form.confidence = Some(field.text().await?);
                }
                other => {
                    tracing::debug!(field = ?other, "Skipping unknown form field");
                }
            }
        }

        Ok(form)
    }
}

/// Parse a confidence threshold, which must be a finite number in `[0, 1]`.
pub fn parse_confidence(raw: &str) -> Result<f32, ApiError> {
    let value: f32 = raw
        .trim()
        .parse()
        .map_err(|_| ApiError::InvalidInput(format!("Invalid confidence value: {raw:?}")))?;

    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(ApiError::InvalidInput(format!(
            "Confidence must be between 0 and 1, got {value}"
        )));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(content_type: Option<&str>, bytes: &'static [u8]) -> UploadedImage {
        UploadedImage {
            bytes: Bytes::from_static(bytes),
            content_type: content_type.map(str::to_string),
            file_name: Some("road.jpg".to_string()),
        }
    }

    fn png_bytes() -> Vec<u8> {
        let image = image::RgbaImage::from_pixel(4, 3, image::Rgba([10, 20, 30, 128]));
        let mut buffer = std::io::Cursor::new(Vec::new());
        image.write_to(&mut buffer, image::ImageFormat::Png).unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_image_content_types_accepted() {
        for ct in ["image/jpeg", "image/png", "IMAGE/WEBP", "image/x-anything"] {
            assert!(upload(Some(ct), b"").validate().is_ok(), "{ct} rejected");
        }
    }

    #[test]
    fn test_non_image_content_types_rejected() {
        for ct in [Some("text/plain"), Some("application/octet-stream"), None] {
            let err = upload(ct, b"").validate().unwrap_err();
            assert_eq!(err.to_string(), "File must be an image");
        }
    }

    #[test]
    fn test_decode_converts_to_rgb() {
        let upload = UploadedImage {
            bytes: Bytes::from(png_bytes()),
            content_type: Some("image/png".to_string()),
            file_name: None,
        };
        let image = upload.decode().unwrap();
        assert_eq!(image.dimensions(), (4, 3));
        assert_eq!(image.as_raw().len(), 4 * 3 * 3);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = upload(Some("image/jpeg"), b"\xFF\xD8 definitely not a jpeg")
            .decode()
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn test_parse_confidence() {
        assert_eq!(parse_confidence("0.5").unwrap(), 0.5);
        assert_eq!(parse_confidence(" 0 ").unwrap(), 0.0);
        assert_eq!(parse_confidence("1").unwrap(), 1.0);

        for bad in ["", "high", "-0.1", "1.01", "NaN", "inf"] {
            assert!(parse_confidence(bad).is_err(), "{bad:?} accepted");
        }
    }
}
