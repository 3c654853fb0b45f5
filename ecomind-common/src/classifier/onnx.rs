//! ONNX runtime for the exported waste classifier
//!
//! The trained model is exported to ONNX and executed with tract. Input is
//! fixed to `f32 [1, 224, 224, 3]`; the first value of the first output is
//! the probability.

use std::path::Path;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::info;
use tract_onnx::prelude::*;

use super::{ModelInput, WasteModel};
use crate::{Error, Result};

type WastePlan = SimplePlan<TypedFact, Box<dyn TypedOp>, TypedModel>;

/// Process-wide model, loaded at most once
static SHARED_MODEL: OnceCell<Arc<OnnxWasteModel>> = OnceCell::new();

/// Get the process-wide model, loading it from `path` on first call
///
/// Later calls return the already loaded model regardless of `path`.
/// A failed load is not cached, so a later call may retry.
pub fn shared_model(path: &Path) -> Result<Arc<OnnxWasteModel>> {
    SHARED_MODEL
        .get_or_try_init(|| OnnxWasteModel::load(path).map(Arc::new))
        .cloned()
}

/// Optimized, runnable ONNX classifier
pub struct OnnxWasteModel {
    plan: WastePlan,
}

impl OnnxWasteModel {
    /// Load and optimize an ONNX model from disk
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ModelUnavailable(format!(
                "model file not found: {}",
                path.display()
            )));
        }

        let plan = build_plan(path).map_err(|e| {
            Error::ModelUnavailable(format!("failed to load {}: {}", path.display(), e))
        })?;

        info!("Loaded waste classifier model from {}", path.display());
        Ok(Self { plan })
    }

    fn infer(&self, input: &ModelInput) -> TractResult<TVec<TValue>> {
        let tensor: Tensor =
            tract_ndarray::Array4::from_shape_vec(ModelInput::shape(), input.pixels().to_vec())?
                .into();
        self.plan.run(tvec!(tensor.into()))
    }
}

impl WasteModel for OnnxWasteModel {
    fn predict(&self, input: &ModelInput) -> Result<f32> {
        let outputs = self.infer(input).map_err(inference_failed)?;
        first_probability(&outputs)
    }
}

/// First value of the first output tensor
fn first_probability(outputs: &[TValue]) -> Result<f32> {
    let first = outputs.first().ok_or_else(no_output)?;
    let view = first.to_array_view::<f32>().map_err(inference_failed)?;
    view.iter().next().copied().ok_or_else(no_output)
}

fn inference_failed(e: TractError) -> Error {
    Error::ModelUnavailable(format!("inference failed: {}", e))
}

fn no_output() -> Error {
    Error::ModelUnavailable("model produced no output".to_string())
}

fn build_plan(path: &Path) -> TractResult<WastePlan> {
    tract_onnx::onnx()
        .model_for_path(path)?
        .with_input_fact(0, f32::fact(ModelInput::shape()).into())?
        .into_optimized()?
        .into_runnable()
}
