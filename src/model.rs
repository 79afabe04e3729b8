// src/model.rs - The external pose model boundary
use std::path::Path;

use anyhow::{Context, Result};
use image::{imageops::FilterType, RgbImage};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use tracing::debug;

use crate::landmarks::RawLandmark;

/// Number of landmarks the model emits per detection.
pub const LANDMARK_COUNT: usize = 33;

const INPUT_SIZE: u32 = 256;
// x, y, z, visibility, presence
const VALUES_PER_LANDMARK: usize = 5;
const DETECTION_THRESHOLD: f32 = 0.5;

/// The pose model as the pipeline sees it: one synchronous capability.
/// Given a single RGB frame, return 33 ordered landmarks with x/y
/// normalized to [0,1], or `None` when no body is present. `None` is a
/// normal outcome, not an error.
pub trait PoseModel {
    fn detect(&mut self, frame: &RgbImage) -> Result<Option<Vec<RawLandmark>>>;
}

/// MediaPipe pose landmarker (heavy variant) behind ONNX Runtime, run in
/// static-image configuration: no temporal smoothing, so every frame
/// (including video frames) is evaluated independently.
pub struct OnnxPoseModel {
    session: Session,
}

impl OnnxPoseModel {
    pub const DEFAULT_MODEL_PATH: &'static str = "models/pose_landmark_heavy.onnx";

    pub fn new(model_path: &Path) -> Result<Self> {
        debug!("loading pose model from {}", model_path.display());
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?
            .with_execution_providers([
                ort::execution_providers::CPUExecutionProvider::default().build(),
            ])?
            .commit_from_file(model_path)
            .with_context(|| format!("Failed to load pose model: {}", model_path.display()))?;

        Ok(Self { session })
    }
}

impl PoseModel for OnnxPoseModel {
    fn detect(&mut self, frame: &RgbImage) -> Result<Option<Vec<RawLandmark>>> {
        let resized = image::imageops::resize(frame, INPUT_SIZE, INPUT_SIZE, FilterType::Triangle);

        // HWC u8 -> NCHW f32 in [0,1]
        let plane = (INPUT_SIZE * INPUT_SIZE) as usize;
        let mut input_data = vec![0.0f32; 3 * plane];
        for (i, pixel) in resized.pixels().enumerate() {
            input_data[i] = pixel[0] as f32 / 255.0;
            input_data[plane + i] = pixel[1] as f32 / 255.0;
            input_data[2 * plane + i] = pixel[2] as f32 / 255.0;
        }

        let input_tensor = Tensor::from_array((vec![1, 3, 256, 256], input_data))?;
        let outputs = self.session.run(ort::inputs![input_tensor])?;

        let (_flag_shape, flag_data) = outputs["poseflag"].try_extract_tensor::<f32>()?;
        let score = flag_data.first().copied().unwrap_or(0.0);
        if score < DETECTION_THRESHOLD {
            debug!("pose flag {score:.3} below threshold, no detection");
            return Ok(None);
        }

        let (_lm_shape, lm_data) = outputs["landmarks"].try_extract_tensor::<f32>()?;
        if lm_data.len() < LANDMARK_COUNT * VALUES_PER_LANDMARK {
            anyhow::bail!(
                "unexpected landmark tensor length: {} (want {})",
                lm_data.len(),
                LANDMARK_COUNT * VALUES_PER_LANDMARK
            );
        }

        // Coordinates come back in input-pixel units; visibility and
        // presence are raw logits.
        let mut landmarks = Vec::with_capacity(LANDMARK_COUNT);
        for chunk in lm_data.chunks_exact(VALUES_PER_LANDMARK).take(LANDMARK_COUNT) {
            landmarks.push(RawLandmark {
                x: (chunk[0] / INPUT_SIZE as f32) as f64,
                y: (chunk[1] / INPUT_SIZE as f32) as f64,
                z: (chunk[2] / INPUT_SIZE as f32) as f64,
                visibility: sigmoid(chunk[3]) as f64,
            });
        }

        Ok(Some(landmarks))
    }
}

fn sigmoid(v: f32) -> f32 {
    1.0 / (1.0 + (-v).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sigmoid_bounds() {
        assert!((sigmoid(0.0) - 0.5).abs() < f32::EPSILON);
        assert!(sigmoid(10.0) > 0.99);
        assert!(sigmoid(-10.0) < 0.01);
    }
}
