use anyhow::Context;
use std::path::{Path, PathBuf};

const PATTERNS: [&str; 2] = ["*.jpg", "*.png"];

/// All `.jpg` files in `dir`, then all `.png` files, each group in glob order.
pub fn collect_images(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut images = Vec::new();

    for pattern in PATTERNS {
        let full = dir.join(pattern);
        let full = full
            .to_str()
            .with_context(|| format!("non UTF-8 path: {}", full.display()))?;

        for entry in glob::glob(full)? {
            match entry {
                Ok(path) if path.is_file() => images.push(path),
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "Skipping unreadable path"),
            }
        }
    }

    Ok(images)
}

/// Where the annotated copy of `image` is written. JPEG inputs keep their
/// file name; anything else gets `.jpg` appended so `road.png` and
/// `road.jpg` do not collide.
pub fn output_path(output_dir: &Path, image: &Path) -> PathBuf {
    let name = image
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let is_jpeg = image
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jpg"));

    if is_jpeg {
        output_dir.join(name)
    } else {
        output_dir.join(format!("{name}.jpg"))
    }
}
