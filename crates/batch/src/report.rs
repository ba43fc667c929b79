use std::fmt;
use std::path::{Path, PathBuf};

/// Per-image result line.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub path: PathBuf,
    pub detections: usize,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.detections > 0 {
            write!(f, "✓ {}: {} potholes", self.path.display(), self.detections)
        } else {
            write!(f, "✗ {}: No potholes", self.path.display())
        }
    }
}

#[derive(Debug, Default)]
pub struct Summary {
    pub processed: usize,
    pub with_detections: usize,
    pub failed: usize,
}

impl Summary {
    pub fn record(&mut self, outcome: &Outcome) {
        self.processed += 1;
        if outcome.detections > 0 {
            self.with_detections += 1;
        }
    }

    pub fn record_failure(&mut self, path: &Path) {
        tracing::debug!(path = %path.display(), "Image counted as failed");
        self.failed += 1;
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Summary: {}/{} images had detections",
            self.with_detections, self.processed
        )?;
        if self.failed > 0 {
            write!(f, " ({} failed)", self.failed)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_lines() {
        let hit = Outcome {
            path: PathBuf::from("train/images/a.jpg"),
            detections: 3,
        };
        let miss = Outcome {
            path: PathBuf::from("train/images/b.png"),
            detections: 0,
        };
        assert_eq!(hit.to_string(), "✓ train/images/a.jpg: 3 potholes");
        assert_eq!(miss.to_string(), "✗ train/images/b.png: No potholes");
    }

    #[test]
    fn test_summary_counts_hits() {
        let mut summary = Summary::default();
        for detections in [2, 0, 1] {
            summary.record(&Outcome {
                path: PathBuf::from("x.jpg"),
                detections,
            });
        }
        assert_eq!(summary.to_string(), "Summary: 2/3 images had detections");

        summary.record_failure(Path::new("broken.jpg"));
        assert_eq!(
            summary.to_string(),
            "Summary: 2/3 images had detections (1 failed)"
        );
    }
}
