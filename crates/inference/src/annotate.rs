use crate::error::DetectorError;
use crate::processing::post::Detection;
use ab_glyph::{FontRef, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

const LABEL_FONT: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

pub const DEFAULT_LINE_WIDTH: u32 = 3;
pub const DEFAULT_FONT_SCALE: f32 = 1.5;

/// Glyph height in pixels at font scale 1.0
const BASE_FONT_PX: f32 = 16.0;
const LABEL_PADDING: i32 = 2;
const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Per-class box colors, cycled by class id.
const PALETTE: [[u8; 3]; 6] = [
    [255, 56, 56],
    [255, 157, 151],
    [255, 112, 31],
    [255, 178, 29],
    [207, 210, 49],
    [72, 249, 10],
];

/// Draws detection boxes and `<class> <score>` labels onto a copy of an image.
pub struct Annotator {
    font: FontRef<'static>,
    class_names: Vec<String>,
    line_width: u32,
    font_scale: f32,
}

impl Annotator {
    pub fn new(class_names: Vec<String>) -> Result<Self, DetectorError> {
        Ok(Self {
            font: FontRef::try_from_slice(LABEL_FONT)?,
            class_names,
            line_width: DEFAULT_LINE_WIDTH,
            font_scale: DEFAULT_FONT_SCALE,
        })
    }

    pub fn annotate(&self, image: &RgbImage, detections: &[Detection]) -> RgbImage {
        let _s = common::span_debug!("annotate");

        let mut canvas = image.clone();
        for detection in detections {
            self.draw_detection(&mut canvas, detection);
        }
        canvas
    }

    fn label_for(&self, detection: &Detection) -> String {
        let name = self
            .class_names
            .get(detection.class_id as usize)
            .map(String::as_str)
            .unwrap_or("object");
        format!("{} {:.2}", name, detection.confidence)
    }

    fn draw_detection(&self, image: &mut RgbImage, detection: &Detection) {
        let (w, h) = (image.width() as i32, image.height() as i32);
        if w == 0 || h == 0 {
            return;
        }

        let x_min = (detection.x1.floor() as i32).clamp(0, w - 1);
        let y_min = (detection.y1.floor() as i32).clamp(0, h - 1);
        let x_max = (detection.x2.ceil() as i32).clamp(0, w - 1);
        let y_max = (detection.y2.ceil() as i32).clamp(0, h - 1);

        if x_min >= x_max || y_min >= y_max {
            return;
        }

        let color = Rgb(PALETTE[detection.class_id as usize % PALETTE.len()]);

        // Thick border as nested one-pixel rectangles, shrinking inwards
        for t in 0..self.line_width as i32 {
            let width = x_max - x_min + 1 - 2 * t;
            let height = y_max - y_min + 1 - 2 * t;
            if width <= 0 || height <= 0 {
                break;
            }
            let rect = Rect::at(x_min + t, y_min + t).of_size(width as u32, height as u32);
            draw_hollow_rect_mut(image, rect, color);
        }

        let label = self.label_for(detection);
        let scale = PxScale::from(BASE_FONT_PX * self.font_scale);
        let (text_width, text_height) = text_size(scale, &self.font, &label);

        let label_width = (text_width as i32 + 2 * LABEL_PADDING).min(w - x_min);
        let label_height = text_height as i32 + 2 * LABEL_PADDING;
        if label_width <= 0 || label_height <= 0 {
            return;
        }

        // Above the box when there is room, otherwise just inside its top edge
        let label_y = if y_min >= label_height {
            y_min - label_height
        } else {
            y_min
        };

        let background =
            Rect::at(x_min, label_y).of_size(label_width as u32, label_height as u32);
        draw_filled_rect_mut(image, background, color);
        draw_text_mut(
            image,
            TEXT_COLOR,
            x_min + LABEL_PADDING,
            label_y + LABEL_PADDING,
            scale,
            &self.font,
            &label,
        );
    }
}
