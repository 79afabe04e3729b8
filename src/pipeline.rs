// src/pipeline.rs - Pose extraction pipeline over an opaque pose model
use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use tracing::{info, warn};

use crate::angles;
use crate::error::ExtractError;
use crate::landmarks::{FrameLandmark, NamedLandmark};
use crate::model::{OnnxPoseModel, PoseModel};
use crate::result::{frame_timestamp, FrameEntry, PoseResult, VideoInfo, VideoPoseResult};
use crate::video;

/// Process every nth video frame unless the caller overrides it.
pub const DEFAULT_SAMPLE_RATE: u32 = 5;

/// One extraction pipeline instance owning one model session. The public
/// extraction operations never return an error: once dispatched, every
/// failure is folded into a `success: false` result value.
pub struct PoseExtractionPipeline<M: PoseModel> {
    model: M,
}

impl PoseExtractionPipeline<OnnxPoseModel> {
    pub fn new(model_path: &Path) -> Result<Self> {
        Ok(Self::with_model(OnnxPoseModel::new(model_path)?))
    }
}

impl<M: PoseModel> PoseExtractionPipeline<M> {
    /// Build a pipeline around any model implementation. Tests inject a
    /// scripted model through this.
    pub fn with_model(model: M) -> Self {
        Self { model }
    }

    pub fn extract_from_image(&mut self, path: &Path) -> PoseResult {
        match self.run_image(path) {
            Ok(result) => result,
            Err(err) => {
                warn!("image extraction failed: {err:#}");
                PoseResult::failed(&err)
            }
        }
    }

    fn run_image(&mut self, path: &Path) -> Result<PoseResult> {
        let image = match image::open(path) {
            Ok(image) => image,
            Err(_) => {
                return Err(ExtractError::ImageUnreadable(path.display().to_string()).into())
            }
        };
        let frame = image.to_rgb8();
        let (width, height) = frame.dimensions();

        let raw = match self.model.detect(&frame)? {
            Some(raw) => raw,
            None => {
                info!("no pose detected in {}", path.display());
                return Ok(PoseResult::no_detection());
            }
        };

        let landmarks: Vec<NamedLandmark> = raw
            .into_iter()
            .enumerate()
            .map(|(i, lm)| NamedLandmark::from_raw(i, lm))
            .collect();

        info!("detected {} landmarks in {}", landmarks.len(), path.display());
        Ok(PoseResult::detected(path, landmarks, width, height))
    }

    pub fn extract_from_video(&mut self, path: &Path, sample_rate: u32) -> VideoPoseResult {
        match self.run_video(path, sample_rate) {
            Ok(result) => result,
            Err(err) => {
                warn!("video extraction failed: {err:#}");
                VideoPoseResult::failed(&err)
            }
        }
    }

    fn run_video(&mut self, path: &Path, sample_rate: u32) -> Result<VideoPoseResult> {
        let sample_rate = sample_rate.max(1);
        let meta = video::probe(path)?;
        let sampled = video::extract_sampled_frames(path, sample_rate)?;

        let mut entries = Vec::new();
        for (frame_number, frame_path) in sampled.frames() {
            let frame = match image::open(frame_path) {
                Ok(img) => img.to_rgb8(),
                Err(err) => {
                    warn!("skipping undecodable frame {frame_number}: {err}");
                    continue;
                }
            };

            // Sampled frames with no detection are simply absent from the
            // output, not failures.
            if let Some(raw) = self.model.detect(&frame)? {
                entries.push(FrameEntry {
                    frame_number: *frame_number,
                    timestamp: frame_timestamp(*frame_number, meta.fps),
                    landmarks: raw.into_iter().map(FrameLandmark::from).collect(),
                });
            }
        }

        info!(
            "processed {} of {} sampled frames from {}",
            entries.len(),
            sampled.frames().len(),
            path.display()
        );
        // sampled drops on return, removing the temp frame dir; an early
        // `?` above unwinds through the same Drop.
        Ok(VideoPoseResult::processed(
            path,
            VideoInfo::new(meta.fps, meta.total_frames),
            entries,
        ))
    }

    /// Joint angles derived from named landmarks. Not part of the CLI
    /// output; exposed for downstream biomechanics use.
    pub fn calculate_angles(&self, landmarks: &[NamedLandmark]) -> BTreeMap<String, f64> {
        angles::calculate_angles(landmarks)
    }

    /// Releases the model session. Dropping the pipeline has the same
    /// effect; this exists for callers that want the release explicit.
    pub fn close(self) {}
}
