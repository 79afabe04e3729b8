// src/result.rs - Serializable result schema for image and video extraction
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::landmarks::{FrameLandmark, NamedLandmark};

/// Pixel dimensions of the source image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

/// Outcome of a single-image extraction. Exactly one of these shapes is
/// printed per invocation; "no pose detected" is a normal outcome, not an
/// error, and callers are expected to treat it like success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PoseResult {
    Detected {
        success: bool,
        #[serde(rename = "type")]
        kind: String,
        file: String,
        landmarks: Vec<NamedLandmark>,
        num_landmarks: usize,
        image_dimensions: ImageDimensions,
    },
    // Failed must precede NoDetection: its field set is a superset, and
    // untagged deserialization takes the first variant that fits.
    Failed {
        success: bool,
        error: String,
        message: String,
        landmarks: Vec<NamedLandmark>,
    },
    NoDetection {
        success: bool,
        message: String,
        landmarks: Vec<NamedLandmark>,
    },
}

impl PoseResult {
    pub fn detected(
        file: &Path,
        landmarks: Vec<NamedLandmark>,
        width: u32,
        height: u32,
    ) -> Self {
        let num_landmarks = landmarks.len();
        Self::Detected {
            success: true,
            kind: "image".to_string(),
            file: file.display().to_string(),
            landmarks,
            num_landmarks,
            image_dimensions: ImageDimensions { width, height },
        }
    }

    pub fn no_detection() -> Self {
        Self::NoDetection {
            success: false,
            message: "No pose detected in image".to_string(),
            landmarks: Vec::new(),
        }
    }

    pub fn failed(err: &anyhow::Error) -> Self {
        Self::Failed {
            success: false,
            error: format!("{err:#}"),
            message: format!("Failed to process image: {err:#}"),
            landmarks: Vec::new(),
        }
    }

    pub fn success(&self) -> bool {
        matches!(self, Self::Detected { .. })
    }
}

/// Container-level metadata reported alongside video results. `duration`
/// is 0.0 when the container reports a non-positive frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub fps: f64,
    pub total_frames: u64,
    pub duration: f64,
}

impl VideoInfo {
    pub fn new(fps: f64, total_frames: u64) -> Self {
        let duration = if fps > 0.0 {
            total_frames as f64 / fps
        } else {
            0.0
        };
        Self {
            fps,
            total_frames,
            duration,
        }
    }
}

/// One sampled video frame in which a body was detected. Sampled frames
/// with no detection produce no entry at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameEntry {
    pub frame_number: u64,
    pub timestamp: f64,
    pub landmarks: Vec<FrameLandmark>,
}

/// Timestamp of a frame in seconds. Defined as 0.0 for a non-positive
/// frame rate so unreliable containers never cause a division blowup.
pub fn frame_timestamp(frame_number: u64, fps: f64) -> f64 {
    if fps > 0.0 {
        frame_number as f64 / fps
    } else {
        0.0
    }
}

/// Outcome of a video extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VideoPoseResult {
    Processed {
        success: bool,
        #[serde(rename = "type")]
        kind: String,
        file: String,
        video_info: VideoInfo,
        processed_frames: usize,
        frames: Vec<FrameEntry>,
    },
    Failed {
        success: bool,
        error: String,
        message: String,
    },
}

impl VideoPoseResult {
    pub fn processed(file: &Path, video_info: VideoInfo, frames: Vec<FrameEntry>) -> Self {
        let processed_frames = frames.len();
        Self::Processed {
            success: true,
            kind: "video".to_string(),
            file: file.display().to_string(),
            video_info,
            processed_frames,
            frames,
        }
    }

    pub fn failed(err: &anyhow::Error) -> Self {
        Self::Failed {
            success: false,
            error: format!("{err:#}"),
            message: format!("Failed to process video: {err:#}"),
        }
    }

    pub fn success(&self) -> bool {
        matches!(self, Self::Processed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::RawLandmark;

    fn sample_landmarks() -> Vec<NamedLandmark> {
        (0..33)
            .map(|i| {
                NamedLandmark::from_raw(
                    i,
                    RawLandmark {
                        x: 0.1 * i as f64 / 33.0,
                        y: 0.5,
                        z: -0.2,
                        visibility: 0.95,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_detected_counts_landmarks() {
        let result = PoseResult::detected(Path::new("person.jpg"), sample_landmarks(), 640, 480);
        match &result {
            PoseResult::Detected {
                num_landmarks,
                landmarks,
                ..
            } => {
                assert_eq!(*num_landmarks, landmarks.len());
                assert_eq!(*num_landmarks, 33);
                assert_eq!(landmarks[0].name, "nose");
            }
            other => panic!("expected Detected, got {:?}", other),
        }
    }

    #[test]
    fn test_pose_result_round_trip() {
        let result = PoseResult::detected(Path::new("person.jpg"), sample_landmarks(), 640, 480);
        let json = serde_json::to_string_pretty(&result).unwrap();
        let parsed: PoseResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, result);
    }

    #[test]
    fn test_no_detection_round_trip() {
        let result = PoseResult::no_detection();
        let json = serde_json::to_string(&result).unwrap();
        let parsed: PoseResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, result);
        assert!(!parsed.success());
    }

    #[test]
    fn test_failed_round_trip_keeps_error_field() {
        let err = anyhow::anyhow!("Could not read image: broken.png");
        let result = PoseResult::failed(&err);
        let json = serde_json::to_string(&result).unwrap();
        let parsed: PoseResult = serde_json::from_str(&json).unwrap();
        match &parsed {
            PoseResult::Failed { error, message, .. } => {
                assert_eq!(error, "Could not read image: broken.png");
                assert!(message.starts_with("Failed to process image:"));
            }
            other => panic!("expected Failed, got {:?}", other),
        }
        assert_eq!(parsed, result);
    }

    #[test]
    fn test_serialized_shape_uses_type_key() {
        let result = PoseResult::detected(Path::new("p.png"), sample_landmarks(), 10, 20);
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["type"], "image");
        assert_eq!(value["image_dimensions"]["width"], 10);
        assert_eq!(value["image_dimensions"]["height"], 20);
    }

    #[test]
    fn test_video_info_duration_guard() {
        assert_eq!(VideoInfo::new(30.0, 60).duration, 2.0);
        assert_eq!(VideoInfo::new(0.0, 60).duration, 0.0);
        assert_eq!(VideoInfo::new(-1.0, 60).duration, 0.0);
    }

    #[test]
    fn test_frame_timestamp_guard() {
        assert_eq!(frame_timestamp(150, 30.0), 5.0);
        assert_eq!(frame_timestamp(150, 0.0), 0.0);
    }

    #[test]
    fn test_video_result_round_trip() {
        let frames = vec![FrameEntry {
            frame_number: 5,
            timestamp: frame_timestamp(5, 25.0),
            landmarks: vec![FrameLandmark {
                x: 0.4,
                y: 0.6,
                z: 0.0,
                visibility: 0.8,
            }],
        }];
        let result = VideoPoseResult::processed(Path::new("clip.mp4"), VideoInfo::new(25.0, 50), frames);
        let json = serde_json::to_string_pretty(&result).unwrap();
        let parsed: VideoPoseResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, result);
        match &parsed {
            VideoPoseResult::Processed {
                processed_frames,
                frames,
                ..
            } => assert_eq!(*processed_frames, frames.len()),
            other => panic!("expected Processed, got {:?}", other),
        }
    }
}
