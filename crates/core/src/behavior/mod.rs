//! Emotion cues read from a single frame of body-pose keypoints.
//!
//! Keypoints follow the 17-point COCO layout. The scorer looks at posture
//! height, stance width, head placement, detection confidence and leg spread,
//! and returns a normalized [`EmotionScores`] that can be blended with the
//! audio estimate.

use crate::emotion::{EmotionLabel, EmotionScores};
use serde::{Deserialize, Serialize};

/// Fewer keypoints than this yields the fallback distribution.
pub const MIN_KEYPOINTS: usize = 10;

/// Confidence assumed for a keypoint without a usable score.
const DEFAULT_CONFIDENCE: f64 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyPart {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Keypoint {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            score: None,
            name: None,
        }
    }

    fn confidence(&self) -> f64 {
        match self.score {
            Some(score) if score != 0.0 && score.is_finite() => score,
            _ => DEFAULT_CONFIDENCE,
        }
    }
}

/// One detected pose. Undetected keypoints are `None`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseFrame {
    pub keypoints: Vec<Option<Keypoint>>,
}

impl PoseFrame {
    pub fn new(keypoints: Vec<Option<Keypoint>>) -> Self {
        Self { keypoints }
    }

    pub fn part(&self, part: BodyPart) -> Option<&Keypoint> {
        self.keypoints.get(part as usize).and_then(Option::as_ref)
    }

    fn mean_confidence(&self) -> f64 {
        if self.keypoints.is_empty() {
            return DEFAULT_CONFIDENCE;
        }
        let sum: f64 = self
            .keypoints
            .iter()
            .map(|k| k.as_ref().map_or(DEFAULT_CONFIDENCE, Keypoint::confidence))
            .sum();
        sum / self.keypoints.len() as f64
    }
}

pub fn score_pose(pose: &PoseFrame) -> EmotionScores {
    use BodyPart::*;
    use EmotionLabel::*;

    if pose.keypoints.len() < MIN_KEYPOINTS {
        return EmotionScores::from_pairs([(Alertness, 0.5), (Contentment, 0.3)]);
    }

    let (Some(nose), Some(left_shoulder), Some(right_shoulder), Some(left_hip)) = (
        pose.part(Nose),
        pose.part(LeftShoulder),
        pose.part(RightShoulder),
        pose.part(LeftHip),
    ) else {
        return EmotionScores::from_pairs([(Alertness, 0.4)]);
    };
    let right_hip = pose.part(RightHip).unwrap_or(left_hip);

    let mut cues: Vec<(EmotionLabel, f64)> = Vec::new();

    // Posture height.
    let shoulder_y = (left_shoulder.y + right_shoulder.y) / 2.0;
    let hip_y = (left_hip.y + right_hip.y) / 2.0;
    let body_height = (hip_y - shoulder_y).abs();
    if body_height > 80.0 {
        cues.extend([(Happiness, 0.7), (Alertness, 0.6), (Contentment, 0.4)]);
    } else if body_height < 40.0 {
        cues.extend([(Fear, 0.7), (Anxiety, 0.6), (Stress, 0.5), (Sadness, 0.3)]);
    } else {
        cues.extend([(Contentment, 0.5), (Alertness, 0.3)]);
    }

    // Stance width.
    let shoulder_width = (right_shoulder.x - left_shoulder.x).abs();
    if shoulder_width > 120.0 {
        cues.extend([(Happiness, 0.6), (Contentment, 0.5), (Comfort, 0.4)]);
    } else if shoulder_width < 60.0 {
        cues.extend([(Anxiety, 0.5), (Stress, 0.4), (Fear, 0.3)]);
    }

    // Head placement.
    if nose.y < shoulder_y - 30.0 {
        cues.extend([(Happiness, 0.5), (Alertness, 0.4), (Contentment, 0.3)]);
    }
    let shoulder_center_x = (left_shoulder.x + right_shoulder.x) / 2.0;
    let head_offset = (nose.x - shoulder_center_x).abs();
    if head_offset > 100.0 {
        cues.extend([(Fear, 0.4), (Anxiety, 0.3)]);
    } else if head_offset < 20.0 {
        cues.extend([(Alertness, 0.5), (Aggression, 0.3)]);
    }

    // Detection confidence as a proxy for movement clarity.
    let confidence = pose.mean_confidence();
    if confidence > 0.75 {
        cues.extend([(Alertness, 0.6), (Aggression, 0.3)]);
    } else if confidence < 0.5 {
        cues.extend([(Anxiety, 0.6), (Stress, 0.4), (Fear, 0.3)]);
    }

    if let (Some(left_knee), Some(right_knee)) = (pose.part(LeftKnee), pose.part(RightKnee)) {
        if (right_knee.x - left_knee.x).abs() > 100.0 {
            cues.extend([(Happiness, 0.4), (Comfort, 0.3)]);
        } else {
            cues.extend([(Stress, 0.3), (Anxiety, 0.2)]);
        }
    }

    let scores = EmotionScores::from_pairs(cues);
    tracing::debug!(
        body_height,
        shoulder_width,
        head_offset,
        confidence,
        dominant = %scores.dominant(),
        "scored pose"
    );
    scores
}
