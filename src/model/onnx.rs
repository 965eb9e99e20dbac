//! ONNX Runtime inference for the multi-output risk model.
//! Input: [1, 16] f32 in `FEATURE_NAMES` order. Output: five scores in pattern order.

use super::RiskPredictor;
use crate::error::{Error, Result};
use crate::features::{FeatureVector, FEATURE_DIM};
use ndarray::{Array2, CowArray};
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};

static ORT_ENV: OnceLock<Arc<ort::Environment>> = OnceLock::new();

fn init_env() -> Result<Arc<ort::Environment>> {
    if let Some(env) = ORT_ENV.get() {
        return Ok(env.clone());
    }
    let env = ort::Environment::builder()
        .with_name("wager-scan")
        .build()
        .map_err(unavailable)?
        .into_arc();
    Ok(ORT_ENV.get_or_init(|| env).clone())
}

fn unavailable(e: ort::OrtError) -> Error {
    Error::ModelUnavailable(e.to_string())
}

pub struct OnnxRiskModel {
    session: Mutex<ort::Session>,
}

impl OnnxRiskModel {
    /// Load model from path. A missing file is an error; there is no no-op mode.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ModelUnavailable(format!(
                "risk model not found at {}",
                path.display()
            )));
        }
        let env = init_env()?;
        let session = ort::SessionBuilder::new(&env)
            .map_err(unavailable)?
            .with_model_from_file(path)
            .map_err(unavailable)?;
        tracing::debug!(path = %path.display(), inputs = session.inputs.len(), "risk model session ready");
        Ok(Self {
            session: Mutex::new(session),
        })
    }
}

impl RiskPredictor for OnnxRiskModel {
    fn predict(&self, features: &FeatureVector) -> Result<[f64; 5]> {
        let session = self
            .session
            .lock()
            .map_err(|_| Error::ModelUnavailable("risk model session poisoned".to_string()))?;

        let arr = Array2::from_shape_vec((1, FEATURE_DIM), features.to_f32())
            .map_err(|e| Error::ModelOutput(e.to_string()))?;
        let input = CowArray::from(arr.into_dyn());
        let value = ort::Value::from_array(session.allocator(), &input).map_err(unavailable)?;
        let outputs = session.run(vec![value]).map_err(unavailable)?;

        let out = outputs
            .first()
            .ok_or_else(|| Error::ModelOutput("model produced no outputs".to_string()))?;
        let tensor = out
            .try_extract::<f32>()
            .map_err(|e| Error::ModelOutput(e.to_string()))?;
        let view = tensor.view();
        let flat: Vec<f32> = view.iter().copied().collect();
        if flat.len() != 5 {
            return Err(Error::ModelOutput(format!(
                "expected 5 scores, got {}",
                flat.len()
            )));
        }

        let mut scores = [0.0f64; 5];
        for (dst, src) in scores.iter_mut().zip(&flat) {
            *dst = (*src as f64).clamp(0.0, 1.0);
        }
        Ok(scores)
    }
}
