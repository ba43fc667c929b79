mod args;
mod images;
mod report;

use anyhow::Context;
use args::{Args, RunTarget};
use clap::Parser;
use common::{Environment, setup_logging};
use indicatif::{ProgressBar, ProgressStyle};
use inference::{Detector, DetectorConfig};
use report::{Outcome, Summary};
use std::fs;
use std::path::Path;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    setup_logging(Environment::from_env());

    let RunTarget { dir, confidence } = args.resolve()?;

    let images = images::collect_images(&dir)?;
    println!("Found {} images", images.len());

    let mut config = DetectorConfig::from_env()?;
    if let Some(model) = &args.model {
        config.model_path = model.clone();
    }
    let detector = inference::load_detector(&config)
        .with_context(|| format!("failed to load model {}", config.model_path))?;

    let selected = &images[..images.len().min(args.limit)];
    println!(
        "\nTesting {} images with confidence {}...",
        selected.len(),
        confidence
    );

    let save_dir = (!args.no_save).then_some(args.output.as_path());
    if let Some(save_dir) = save_dir {
        fs::create_dir_all(save_dir)
            .with_context(|| format!("failed to create {}", save_dir.display()))?;
    }

    let progress = ProgressBar::new(selected.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")?.progress_chars("##-"),
    );

    let mut summary = Summary::default();
    for path in selected {
        progress.set_message(path.display().to_string());
        match run_one(&detector, path, confidence, save_dir) {
            Ok(outcome) => {
                progress.suspend(|| println!("{outcome}"));
                summary.record(&outcome);
            }
            Err(e) => {
                progress.suspend(|| println!("! {}: {:#}", path.display(), e));
                tracing::warn!(path = %path.display(), error = %e, "Image skipped");
                summary.record_failure(path);
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    println!("\n{summary}");
    if let Some(save_dir) = save_dir {
        println!("Results saved to {}/", save_dir.display());
    }

    Ok(())
}

fn run_one(
    detector: &dyn Detector,
    path: &Path,
    confidence: f32,
    save_dir: Option<&Path>,
) -> anyhow::Result<Outcome> {
    let image = image::open(path)?.to_rgb8();
    let result = detector.detect(&image, confidence)?;

    if let Some(save_dir) = save_dir {
        let target = images::output_path(save_dir, path);
        result
            .annotated
            .save_with_format(&target, image::ImageFormat::Jpeg)
            .with_context(|| format!("failed to save {}", target.display()))?;
    }

    Ok(Outcome {
        path: path.to_path_buf(),
        detections: result.detections.len(),
    })
}
