//! ONNX policy
//!
//! Runs an exported policy network through ONNX Runtime.
//! Input: `[1, 3]` f32 observation. Output: either 3 action logits
//! (argmax) or a single discrete action.

use std::path::{Path, PathBuf};

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;

use crate::logic::environment::{argmax, Action, Observation, OBSERVATION_WIDTH};
use super::{Policy, PolicyError};

pub struct OnnxPolicy {
    // Session::run needs &mut; act() is &self
    session: Mutex<Session>,
    output_name: String,
    path: PathBuf,
}

impl OnnxPolicy {
    pub fn load(path: &Path) -> Result<Self, PolicyError> {
        log::info!("Loading ONNX policy from: {}", path.display());

        let session = Session::builder()
            .map_err(|e| PolicyError::Onnx(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| PolicyError::Onnx(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(path)
            .map_err(|e| PolicyError::Onnx(format!("Failed to load model: {}", e)))?;

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| PolicyError::Invalid("model defines no outputs".to_string()))?;

        Ok(Self {
            session: Mutex::new(session),
            output_name,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Turn raw model output into an action
fn decode_logits(values: &[f32]) -> Result<Action, PolicyError> {
    match values.len() {
        0 => Err(PolicyError::Invalid("empty model output".to_string())),
        1 => {
            let raw = values[0].round() as i64;
            usize::try_from(raw)
                .ok()
                .and_then(Action::from_index)
                .ok_or(PolicyError::InvalidAction(raw))
        }
        _ => {
            let width = values.len().min(Action::ALL.len());
            let best = argmax(&values[..width])
                .ok_or_else(|| PolicyError::Invalid("empty model output".to_string()))?;
            Action::from_index(best).ok_or(PolicyError::InvalidAction(best as i64))
        }
    }
}

impl Policy for OnnxPolicy {
    fn act(&self, observation: &Observation) -> Result<Action, PolicyError> {
        let input = Array2::<f32>::from_shape_vec((1, OBSERVATION_WIDTH), observation.as_slice().to_vec())
            .map_err(|e| PolicyError::Onnx(format!("Array error: {}", e)))?;

        let input_tensor = Value::from_array(input)
            .map_err(|e| PolicyError::Onnx(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| PolicyError::Onnx(format!("Inference failed: {}", e)))?;

        let output = outputs
            .get(&self.output_name)
            .ok_or_else(|| PolicyError::Onnx("No output".to_string()))?;

        if let Ok((_, logits)) = output.try_extract_tensor::<f32>() {
            return decode_logits(logits);
        }

        let (_, actions) = output
            .try_extract_tensor::<i64>()
            .map_err(|e| PolicyError::Onnx(format!("Extract error: {}", e)))?;
        let raw = actions
            .first()
            .copied()
            .ok_or_else(|| PolicyError::Invalid("empty model output".to_string()))?;

        usize::try_from(raw)
            .ok()
            .and_then(Action::from_index)
            .ok_or(PolicyError::InvalidAction(raw))
    }

    fn name(&self) -> &str {
        "onnx"
    }
}
