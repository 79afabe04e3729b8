// src/angles.rs - Joint angles from named landmarks
use std::collections::BTreeMap;

use nalgebra::Vector3;

use crate::landmarks::NamedLandmark;

const VISIBILITY_THRESHOLD: f64 = 0.5;

// (angle key, first joint, vertex joint, second joint)
const JOINT_TRIPLES: [(&str, &str, &str, &str); 8] = [
    ("left_elbow_angle", "left_shoulder", "left_elbow", "left_wrist"),
    ("right_elbow_angle", "right_shoulder", "right_elbow", "right_wrist"),
    ("left_knee_angle", "left_hip", "left_knee", "left_ankle"),
    ("right_knee_angle", "right_hip", "right_knee", "right_ankle"),
    ("left_shoulder_angle", "left_elbow", "left_shoulder", "left_hip"),
    ("right_shoulder_angle", "right_elbow", "right_shoulder", "right_hip"),
    ("left_hip_angle", "left_shoulder", "left_hip", "left_knee"),
    ("right_hip_angle", "right_shoulder", "right_hip", "right_knee"),
];

/// Angle in degrees at each major joint, formed by the two bone vectors
/// meeting there. An angle is only reported when all three of its joints
/// are present with visibility at or above 0.5.
pub fn calculate_angles(landmarks: &[NamedLandmark]) -> BTreeMap<String, f64> {
    let mut result = BTreeMap::new();
    for (key, first, vertex, second) in JOINT_TRIPLES {
        let (Some(a), Some(b), Some(c)) = (
            find(landmarks, first),
            find(landmarks, vertex),
            find(landmarks, second),
        ) else {
            continue;
        };
        if a.visibility < VISIBILITY_THRESHOLD
            || b.visibility < VISIBILITY_THRESHOLD
            || c.visibility < VISIBILITY_THRESHOLD
        {
            continue;
        }
        result.insert(key.to_string(), joint_angle(a, b, c));
    }
    result
}

fn find<'a>(landmarks: &'a [NamedLandmark], name: &str) -> Option<&'a NamedLandmark> {
    landmarks.iter().find(|lm| lm.name == name)
}

/// Angle at `vertex` between the vectors toward `a` and `c`. A degenerate
/// zero-length bone yields 0.0.
fn joint_angle(a: &NamedLandmark, vertex: &NamedLandmark, c: &NamedLandmark) -> f64 {
    let u = Vector3::new(a.x - vertex.x, a.y - vertex.y, a.z - vertex.z);
    let v = Vector3::new(c.x - vertex.x, c.y - vertex.y, c.z - vertex.z);
    let denom = u.norm() * v.norm();
    if denom == 0.0 {
        return 0.0;
    }
    (u.dot(&v) / denom).clamp(-1.0, 1.0).acos().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn landmark(name: &str, x: f64, y: f64, visibility: f64) -> NamedLandmark {
        NamedLandmark {
            name: name.to_string(),
            x,
            y,
            z: 0.0,
            visibility,
        }
    }

    #[test]
    fn test_straight_arm_is_180_degrees() {
        let landmarks = vec![
            landmark("left_shoulder", 0.0, 0.0, 0.9),
            landmark("left_elbow", 0.5, 0.0, 0.9),
            landmark("left_wrist", 1.0, 0.0, 0.9),
        ];
        let angles = calculate_angles(&landmarks);
        let angle = angles["left_elbow_angle"];
        assert!((angle - 180.0).abs() < 1e-9, "got {angle}");
    }

    #[test]
    fn test_bent_arm_is_90_degrees() {
        let landmarks = vec![
            landmark("left_shoulder", 0.0, 0.0, 0.9),
            landmark("left_elbow", 0.5, 0.0, 0.9),
            landmark("left_wrist", 0.5, 0.5, 0.9),
        ];
        let angles = calculate_angles(&landmarks);
        let angle = angles["left_elbow_angle"];
        assert!((angle - 90.0).abs() < 1e-9, "got {angle}");
    }

    #[test]
    fn test_low_visibility_joint_excluded() {
        let landmarks = vec![
            landmark("left_shoulder", 0.0, 0.0, 0.9),
            landmark("left_elbow", 0.5, 0.0, 0.2),
            landmark("left_wrist", 1.0, 0.0, 0.9),
        ];
        let angles = calculate_angles(&landmarks);
        assert!(!angles.contains_key("left_elbow_angle"));
    }

    #[test]
    fn test_missing_joints_yield_empty_map() {
        let landmarks = vec![landmark("nose", 0.5, 0.5, 0.99)];
        assert!(calculate_angles(&landmarks).is_empty());
    }

    #[test]
    fn test_degenerate_bone_is_zero() {
        let landmarks = vec![
            landmark("left_hip", 0.5, 0.5, 0.9),
            landmark("left_knee", 0.5, 0.5, 0.9),
            landmark("left_ankle", 0.5, 0.8, 0.9),
        ];
        let angles = calculate_angles(&landmarks);
        assert_eq!(angles["left_knee_angle"], 0.0);
    }
}
