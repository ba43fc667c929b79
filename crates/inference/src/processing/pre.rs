use crate::config::DEFAULT_INPUT_SIZE;
use common::span;
use fast_image_resize::{
    FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer,
    images::{Image, ImageRef},
};
use ndarray::{Array, IxDyn};

const LETTERBOX_COLOR: u8 = 114;

/// Letterboxed model input plus the parameters needed to map boxes back.
#[derive(Debug)]
pub struct PreprocessResult {
    /// `[1, 3, H, W]`, values in `[0, 1]`
    pub tensor: Array<f32, IxDyn>,
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

pub struct PreProcessor {
    pub input_size: (u32, u32),
    letterboxed_buffer: Vec<u8>,
}

impl PreProcessor {
    pub fn new(input_size: (u32, u32)) -> Self {
        Self {
            input_size,
            letterboxed_buffer: vec![LETTERBOX_COLOR; (input_size.0 * input_size.1 * 3) as usize],
        }
    }

    /// Preprocess tightly packed RGB pixels (HWC).
    pub fn preprocess(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> anyhow::Result<PreprocessResult> {
        let _s = span!("preprocess_image");

        tracing::trace!(
            width,
            height,
            pixel_bytes = pixels.len(),
            "Preprocessing image dimensions"
        );

        if width == 0 || height == 0 {
            anyhow::bail!("Image has no pixels ({}x{})", width, height);
        }

        if self.input_size.0 == 0 || self.input_size.1 == 0 {
            anyhow::bail!(
                "Model input size must be non-zero ({}x{})",
                self.input_size.0,
                self.input_size.1
            );
        }

        let expected_size = (width as usize) * (height as usize) * 3;
        if pixels.len() != expected_size {
            anyhow::bail!(
                "Buffer size mismatch: expected {}, got {} bytes",
                expected_size,
                pixels.len()
            );
        }

        let (scale, offset_x, offset_y) = self.resize_and_letterbox(pixels, width, height)?;
        let tensor = self.normalize()?;

        Ok(PreprocessResult {
            tensor,
            scale,
            offset_x,
            offset_y,
        })
    }

    fn resize_and_letterbox(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> anyhow::Result<(f32, f32, f32)> {
        let _s = span!("resize_and_letterbox");

        let scale =
            (self.input_size.0 as f32 / width as f32).min(self.input_size.1 as f32 / height as f32);
        // Extremely thin images would otherwise collapse to zero pixels
        let new_width = ((width as f32 * scale) as u32).clamp(1, self.input_size.0);
        let new_height = ((height as f32 * scale) as u32).clamp(1, self.input_size.1);

        let offset_x = (self.input_size.0 - new_width) / 2;
        let offset_y = (self.input_size.1 - new_height) / 2;

        let src = ImageRef::new(width, height, pixels, PixelType::U8x3)?;

        let mut resized = Image::new(new_width, new_height, PixelType::U8x3);

        Resizer::new().resize(
            &src,
            &mut resized,
            &ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear)),
        )?;

        self.letterboxed_buffer.fill(LETTERBOX_COLOR);

        let resized_data = resized.buffer();
        let stride = self.input_size.0 * 3;
        let row_bytes = (new_width * 3) as usize;

        for y in 0..new_height {
            let src_row = (y * new_width * 3) as usize;
            let dst_row = ((y + offset_y) * stride + offset_x * 3) as usize;

            self.letterboxed_buffer[dst_row..dst_row + row_bytes]
                .copy_from_slice(&resized_data[src_row..src_row + row_bytes]);
        }

        Ok((scale, offset_x as f32, offset_y as f32))
    }

    /// HWC u8 → NCHW f32 scaled to `[0, 1]`.
    fn normalize(&self) -> anyhow::Result<Array<f32, IxDyn>> {
        let _s = span!("normalize");

        let width = self.input_size.0 as usize;
        let height = self.input_size.1 as usize;
        let spatial = width * height;

        let mut output = vec![0.0f32; 3 * spatial];

        for (i, px) in self.letterboxed_buffer.chunks_exact(3).enumerate() {
            output[i] = px[0] as f32 / 255.0;
            output[i + spatial] = px[1] as f32 / 255.0;
            output[i + 2 * spatial] = px[2] as f32 / 255.0;
        }

        Ok(Array::from_shape_vec(
            IxDyn(&[1, 3, height, width]),
            output,
        )?)
    }
}

impl Default for PreProcessor {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_preprocessing() {
        let pixels = vec![
            255, 0, 0, // Red pixel
            0, 255, 0, // Green pixel
            0, 0, 255, // Blue pixel
            255, 255, 255, // White pixel
        ];

        let mut preprocessor = PreProcessor::default();
        let result = preprocessor.preprocess(&pixels, 2, 2);

        assert!(result.is_ok(), "RGB preprocessing should succeed");
        assert_eq!(result.unwrap().tensor.shape(), &[1, 3, 640, 640]);
    }

    #[test]
    fn test_buffer_size_mismatch_detection() {
        let pixels = vec![0u8; 200]; // Wrong size for 10x10

        let mut preprocessor = PreProcessor::default();
        let result = preprocessor.preprocess(&pixels, 10, 10);

        assert!(result.is_err(), "Size mismatch should return error");
        assert!(
            result.unwrap_err().to_string().contains("mismatch"),
            "Error should mention mismatch"
        );
    }

    #[test]
    fn test_empty_image_rejected() {
        let mut preprocessor = PreProcessor::default();
        assert!(preprocessor.preprocess(&[], 0, 0).is_err());
    }

    #[test]
    fn test_zero_input_size_is_an_error() {
        let mut preprocessor = PreProcessor::new((0, 640));
        assert!(preprocessor.preprocess(&[0; 48], 4, 4).is_err());

        let mut preprocessor = PreProcessor::new((640, 0));
        assert!(preprocessor.preprocess(&[0; 48], 4, 4).is_err());
    }

    #[test]
    fn test_letterboxing_preserves_aspect_ratio() {
        // 800x600 image (4:3 aspect ratio)
        let pixels = vec![128u8; 800 * 600 * 3];

        let mut preprocessor = PreProcessor::default();
        let result = preprocessor.preprocess(&pixels, 800, 600).unwrap();

        // Scale should be min(640/800, 640/600) = 0.8
        assert_eq!(result.scale, 0.8, "Scale should preserve aspect ratio");

        // Resized dimensions: 640x480, so the image is centered vertically
        assert_eq!(result.offset_x, 0.0, "X offset should be 0 for wide image");
        assert_eq!(result.offset_y, 80.0, "Y offset should center vertically");

        assert_eq!(result.tensor.shape(), &[1, 3, 640, 640]);
    }

    #[test]
    fn test_pixel_scaling_and_padding() {
        // Wide white image: padding rows above and below
        let pixels = vec![255u8; 100 * 50 * 3];

        let mut preprocessor = PreProcessor::default();
        let result = preprocessor.preprocess(&pixels, 100, 50).unwrap();
        let tensor = &result.tensor;

        assert_eq!(result.offset_y, 160.0);

        // Inside the image region every channel is 1.0
        for c in 0..3 {
            assert!((tensor[[0, c, 320, 320]] - 1.0).abs() < 0.01);
        }

        // Padding keeps the letterbox gray
        let pad = LETTERBOX_COLOR as f32 / 255.0;
        assert!((tensor[[0, 0, 0, 0]] - pad).abs() < 1e-6);
        assert!((tensor[[0, 2, 639, 639]] - pad).abs() < 1e-6);
    }

    #[test]
    fn test_buffer_reuse_does_not_leak_previous_image() {
        let mut preprocessor = PreProcessor::new((64, 64));

        // Square white image fills the whole canvas
        let white = vec![255u8; 32 * 32 * 3];
        preprocessor.preprocess(&white, 32, 32).unwrap();

        // A wide black image afterwards must still have gray padding
        let black = vec![0u8; 64 * 16 * 3];
        let result = preprocessor.preprocess(&black, 64, 16).unwrap();

        let pad = LETTERBOX_COLOR as f32 / 255.0;
        assert!((result.tensor[[0, 0, 0, 0]] - pad).abs() < 1e-6);
        assert!(result.tensor[[0, 0, 32, 32]].abs() < 1e-6);
    }
}
