use crate::error::DetectorError;
use ndarray::ArrayViewD;
use std::cmp::Ordering;

/// A detected box in original-image pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub confidence: f32,
    pub class_id: u32,
}

impl Detection {
    fn area(&self) -> f32 {
        (self.x2 - self.x1).max(0.0) * (self.y2 - self.y1).max(0.0)
    }

    fn iou(&self, other: &Detection) -> f32 {
        let x1 = self.x1.max(other.x1);
        let y1 = self.y1.max(other.y1);
        let x2 = self.x2.min(other.x2);
        let y2 = self.y2.min(other.y2);

        let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
        if inter == 0.0 {
            return 0.0;
        }
        inter / (self.area() + other.area() - inter)
    }
}

pub struct TransformParams {
    pub orig_width: u32,
    pub orig_height: u32,
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

pub struct PostProcessor {
    pub num_classes: usize,
    pub iou_threshold: f32,
    pub max_detections: usize,
}

impl PostProcessor {
    pub fn new(num_classes: usize, iou_threshold: f32, max_detections: usize) -> Self {
        Self {
            num_classes,
            iou_threshold,
            max_detections,
        }
    }

    /// Parse raw YOLO predictions into detections at or above `confidence`.
    ///
    /// Accepts `[1, features, candidates]` (the usual export) as well as
    /// `[1, candidates, features]`. Rows are `cx, cy, w, h, class scores...`;
    /// any trailing mask coefficients are ignored.
    #[tracing::instrument(skip(self, predictions, transform))]
    pub fn parse_detections(
        &self,
        predictions: &ArrayViewD<f32>,
        confidence: f32,
        transform: &TransformParams,
    ) -> Result<Vec<Detection>, DetectorError> {
        let shape = predictions.shape();
        if shape.len() != 3 || shape[0] != 1 {
            return Err(DetectorError::Postprocess(format!(
                "expected a [1, features, candidates] tensor, got {:?}",
                shape
            )));
        }

        if shape[1] == 0 || shape[2] == 0 {
            return Ok(Vec::new());
        }

        let min_features = 4 + self.num_classes;
        // Candidates always outnumber features, which disambiguates the layout
        let features_first = shape[1] < shape[2];
        let (num_features, num_candidates) = if features_first {
            (shape[1], shape[2])
        } else {
            (shape[2], shape[1])
        };

        if num_features < min_features {
            return Err(DetectorError::Postprocess(format!(
                "{} features per candidate cannot hold a box and {} class scores",
                num_features, self.num_classes
            )));
        }

        let value = |candidate: usize, feature: usize| {
            if features_first {
                predictions[[0, feature, candidate]]
            } else {
                predictions[[0, candidate, feature]]
            }
        };

        let mut candidates = Vec::new();

        for i in 0..num_candidates {
            let mut best_score = f32::NEG_INFINITY;
            let mut class_id = 0usize;
            for c in 0..self.num_classes {
                let score = value(i, 4 + c);
                if score > best_score {
                    best_score = score;
                    class_id = c;
                }
            }

            if !(best_score >= confidence) {
                continue;
            }

            let (x1, y1, x2, y2) =
                cxcywh_to_xyxy(value(i, 0), value(i, 1), value(i, 2), value(i, 3));

            let detection = Detection {
                x1: transform.unletterbox_x(x1),
                y1: transform.unletterbox_y(y1),
                x2: transform.unletterbox_x(x2),
                y2: transform.unletterbox_y(y2),
                confidence: best_score,
                class_id: class_id as u32,
            };

            // Boxes that fall entirely in the padding collapse after clamping
            if detection.x2 > detection.x1 && detection.y2 > detection.y1 {
                candidates.push(detection);
            }
        }

        let mut kept = nms(candidates, self.iou_threshold);
        kept.truncate(self.max_detections);

        tracing::trace!(detections = kept.len(), "Postprocessing complete");

        Ok(kept)
    }
}

impl TransformParams {
    fn unletterbox_x(&self, x: f32) -> f32 {
        ((x - self.offset_x) / self.scale).clamp(0.0, self.orig_width as f32)
    }

    fn unletterbox_y(&self, y: f32) -> f32 {
        ((y - self.offset_y) / self.scale).clamp(0.0, self.orig_height as f32)
    }
}

/// Convert bounding box from center-width-height format to corner format
#[inline]
fn cxcywh_to_xyxy(cx: f32, cy: f32, w: f32, h: f32) -> (f32, f32, f32, f32) {
    let x1 = cx - w / 2.0;
    let y1 = cy - h / 2.0;
    let x2 = cx + w / 2.0;
    let y2 = cy + h / 2.0;
    (x1, y1, x2, y2)
}

/// Greedy class-agnostic NMS. Output is sorted by confidence, highest first.
fn nms(mut dets: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    dets.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
    });

    let mut keep: Vec<Detection> = Vec::new();
    for det in dets {
        if keep.iter().all(|k| k.iou(&det) <= iou_threshold) {
            keep.push(det);
        }
    }
    keep
}
