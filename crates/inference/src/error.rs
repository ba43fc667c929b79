use thiserror::Error;

/// Failures inside the detection adapter.
///
/// Backend errors arrive as `anyhow::Error` and are flattened to their display
/// chain, since `anyhow::Error` cannot act as an error source.
#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("Preprocessing failed: {0}")]
    Preprocess(String),

    #[error("Model inference failed: {0}")]
    Inference(String),

    #[error("Unexpected model output: {0}")]
    Postprocess(String),

    #[error("Model session lock poisoned")]
    Lock,

    #[error("Invalid label font: {0}")]
    Font(#[from] ab_glyph::InvalidFont),
}

impl DetectorError {
    pub(crate) fn preprocess(err: anyhow::Error) -> Self {
        Self::Preprocess(format!("{err:#}"))
    }

    pub(crate) fn inference(err: anyhow::Error) -> Self {
        Self::Inference(format!("{err:#}"))
    }
}
