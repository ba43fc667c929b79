use base64::{Engine, engine::general_purpose::STANDARD};
use image::{ImageFormat, RgbImage};
use std::io::Cursor;

const DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

pub fn encode_jpeg(image: &RgbImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buffer = Cursor::new(Vec::with_capacity(image.as_raw().len() / 8));
    image.write_to(&mut buffer, ImageFormat::Jpeg)?;
    Ok(buffer.into_inner())
}

/// Embed JPEG bytes as a `data:` URI usable directly as an `<img src>`.
pub fn to_data_uri(jpeg: &[u8]) -> String {
    let mut uri = String::with_capacity(DATA_URI_PREFIX.len() + jpeg.len().div_ceil(3) * 4);
    uri.push_str(DATA_URI_PREFIX);
    STANDARD.encode_string(jpeg, &mut uri);
    uri
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_encode_jpeg_produces_decodable_jpeg() {
        let image = RgbImage::from_pixel(64, 48, Rgb([200, 30, 30]));
        let jpeg = encode_jpeg(&image).unwrap();

        assert_eq!(&jpeg[..2], &[0xFF, 0xD8], "missing JPEG SOI marker");
        let decoded = image::load_from_memory_with_format(&jpeg, ImageFormat::Jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 48));
    }

    #[test]
    fn test_data_uri_prefix_and_payload() {
        let uri = to_data_uri(&[0xFF, 0xD8, 0xFF]);
        assert_eq!(uri, "data:image/jpeg;base64,/9j/");

        let payload = uri.strip_prefix(DATA_URI_PREFIX).unwrap();
        assert_eq!(STANDARD.decode(payload).unwrap(), vec![0xFF, 0xD8, 0xFF]);
    }
}
