use ndarray::{Array, IxDyn};
use std::str::FromStr;

#[cfg(feature = "ort-backend")]
pub mod ort;

pub trait InferenceBackend {
    fn load_model(path: &str) -> anyhow::Result<Self>
    where
        Self: Sized;

    /// Run inference on a `[1, 3, H, W]` float tensor in `[0, 1]`.
    fn infer(&mut self, images: &Array<f32, IxDyn>) -> anyhow::Result<InferenceOutput>;

    /// Input resolution declared by the model, if it is static.
    fn input_size(&self) -> Option<(u32, u32)> {
        None
    }
}

pub struct InferenceOutput {
    /// `[1, 4 + num_classes (+ mask coefficients), num_candidates]`, or its transpose.
    /// Boxes are cxcywh in letterboxed input pixels.
    pub predictions: ndarray::ArrayD<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionProvider {
    #[default]
    Cpu,
    Cuda,
}

impl FromStr for ExecutionProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cpu" => Ok(Self::Cpu),
            "cuda" | "gpu" => Ok(Self::Cuda),
            other => Err(format!(
                "{} is not a supported execution provider. Use either `cpu` or `cuda`.",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_provider_parsing() {
        assert_eq!("CPU".parse::<ExecutionProvider>(), Ok(ExecutionProvider::Cpu));
        assert_eq!("gpu".parse::<ExecutionProvider>(), Ok(ExecutionProvider::Cuda));
        assert!("tpu".parse::<ExecutionProvider>().is_err());
    }
}
