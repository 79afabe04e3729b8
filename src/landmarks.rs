// src/landmarks.rs - Canonical joint name table and landmark value types
use serde::{Deserialize, Serialize};

/// The 33 pose landmark names, in model output order. Index `i` of the
/// model's raw output always maps to entry `i` of this table.
pub const LANDMARK_NAMES: [&str; 33] = [
    "nose",
    "left_eye_inner",
    "left_eye",
    "left_eye_outer",
    "right_eye_inner",
    "right_eye",
    "right_eye_outer",
    "left_ear",
    "right_ear",
    "mouth_left",
    "mouth_right",
    "left_shoulder",
    "right_shoulder",
    "left_elbow",
    "right_elbow",
    "left_wrist",
    "right_wrist",
    "left_pinky",
    "right_pinky",
    "left_index",
    "right_index",
    "left_thumb",
    "right_thumb",
    "left_hip",
    "right_hip",
    "left_knee",
    "right_knee",
    "left_ankle",
    "right_ankle",
    "left_heel",
    "right_heel",
    "left_foot_index",
    "right_foot_index",
];

/// Name for landmark index `index`, with a synthetic fallback for indices
/// past the canonical table. The model emits exactly 33 points, so the
/// fallback should never fire in practice.
pub fn landmark_name(index: usize) -> String {
    match LANDMARK_NAMES.get(index) {
        Some(name) => (*name).to_string(),
        None => format!("landmark_{}", index),
    }
}

/// One point as the model returns it: x/y normalized to [0,1] relative to
/// frame width/height, z a relative depth estimate, visibility in [0,1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawLandmark {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub visibility: f64,
}

/// Image-mode landmark, labeled with its canonical joint name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedLandmark {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub visibility: f64,
}

impl NamedLandmark {
    pub fn from_raw(index: usize, raw: RawLandmark) -> Self {
        Self {
            name: landmark_name(index),
            x: raw.x,
            y: raw.y,
            z: raw.z,
            visibility: raw.visibility,
        }
    }
}

/// Video-mode landmark. Positional (ordered 0..32) and unnamed; the
/// image/video schema asymmetry is part of the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameLandmark {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub visibility: f64,
}

impl From<RawLandmark> for FrameLandmark {
    fn from(raw: RawLandmark) -> Self {
        Self {
            x: raw.x,
            y: raw.y,
            z: raw.z,
            visibility: raw.visibility,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_has_33_entries() {
        assert_eq!(LANDMARK_NAMES.len(), 33);
        assert_eq!(LANDMARK_NAMES[0], "nose");
        assert_eq!(LANDMARK_NAMES[32], "right_foot_index");
    }

    #[test]
    fn test_canonical_names() {
        assert_eq!(landmark_name(0), "nose");
        assert_eq!(landmark_name(11), "left_shoulder");
        assert_eq!(landmark_name(16), "right_wrist");
        assert_eq!(landmark_name(32), "right_foot_index");
    }

    #[test]
    fn test_synthetic_fallback_past_table() {
        assert_eq!(landmark_name(33), "landmark_33");
        assert_eq!(landmark_name(40), "landmark_40");
    }

    #[test]
    fn test_from_raw_labels_by_index() {
        let raw = RawLandmark {
            x: 0.5,
            y: 0.25,
            z: -0.1,
            visibility: 0.9,
        };
        let named = NamedLandmark::from_raw(13, raw);
        assert_eq!(named.name, "left_elbow");
        assert_eq!(named.x, 0.5);
        assert_eq!(named.visibility, 0.9);
    }
}
