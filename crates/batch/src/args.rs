use clap::Parser;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

pub const DEFAULT_DIR: &str = "train/images";
pub const DEFAULT_CONFIDENCE: f32 = 0.3;

/// Run the pothole detector over a folder of images and report hits.
#[derive(Debug, Parser)]
#[command(name = "batch", version)]
pub struct Args {
    /// Folder containing .jpg / .png images. Prompted for when omitted on a terminal.
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Minimum detection confidence, in [0, 1].
    #[arg(long, value_parser = parse_confidence)]
    pub confidence: Option<f32>,

    /// Number of images to test, in glob order.
    #[arg(long, default_value_t = 10)]
    pub limit: usize,

    /// Where annotated images are written.
    #[arg(long, default_value = "runs/detect/predict")]
    pub output: PathBuf,

    /// ONNX model file. Overrides MODEL_PATH.
    #[arg(long, env = "MODEL_PATH")]
    pub model: Option<String>,

    /// Skip saving annotated images.
    #[arg(long)]
    pub no_save: bool,
}

/// Folder and threshold after prompting.
#[derive(Debug, Clone, PartialEq)]
pub struct RunTarget {
    pub dir: PathBuf,
    pub confidence: f32,
}

pub fn parse_confidence(raw: &str) -> Result<f32, String> {
    let value: f32 = raw
        .trim()
        .parse()
        .map_err(|_| format!("`{raw}` is not a number"))?;
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(format!("confidence must be between 0 and 1, got {value}"));
    }
    Ok(value)
}

impl Args {
    /// Fill in the folder and threshold, asking on stdin when `--dir` is
    /// missing and stdin is a terminal.
    pub fn resolve(&self) -> anyhow::Result<RunTarget> {
        if self.dir.is_none() && io::stdin().is_terminal() {
            let stdin = io::stdin();
            let mut input = stdin.lock();
            let mut output = io::stdout();
            return self.resolve_with(&mut input, &mut output);
        }

        Ok(RunTarget {
            dir: self.dir.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_DIR)),
            confidence: self.confidence.unwrap_or(DEFAULT_CONFIDENCE),
        })
    }

    pub fn resolve_with(
        &self,
        input: &mut impl BufRead,
        output: &mut impl Write,
    ) -> anyhow::Result<RunTarget> {
        let dir = match &self.dir {
            Some(dir) => dir.clone(),
            None => {
                writeln!(output, "Available image folders:")?;
                writeln!(output, "1. train/images/ - Training images")?;
                writeln!(output, "2. valid/images/ - Validation images")?;
                writeln!(output, "3. Custom folder")?;
                let answer = prompt(
                    input,
                    output,
                    "Enter folder path or press Enter for train/images/: ",
                )?;
                if answer.is_empty() {
                    PathBuf::from(DEFAULT_DIR)
                } else {
                    PathBuf::from(answer)
                }
            }
        };

        let confidence = match self.confidence {
            Some(confidence) => confidence,
            None => {
                let answer = prompt(
                    input,
                    output,
                    "Enter confidence threshold (0.1-0.9, default 0.3): ",
                )?;
                if answer.is_empty() {
                    DEFAULT_CONFIDENCE
                } else {
                    parse_confidence(&answer).map_err(anyhow::Error::msg)?
                }
            }
        };

        Ok(RunTarget { dir, confidence })
    }
}

fn prompt(input: &mut impl BufRead, output: &mut impl Write, question: &str) -> io::Result<String> {
    write!(output, "{question}")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}
