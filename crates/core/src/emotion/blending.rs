use crate::emotion::{EmotionLabel, EmotionScores};

/// Convex combination `audio * (1 - w) + behavior * w`, with `w` clamped to `[0, 1]`.
///
/// Both inputs are simplices, so the result is one as well and is not renormalized.
pub fn blend(audio: &EmotionScores, behavior: &EmotionScores, behavior_weight: f64) -> EmotionScores {
    let w = if behavior_weight.is_nan() {
        0.0
    } else {
        behavior_weight.clamp(0.0, 1.0)
    };
    let mut values = [0.0; EmotionLabel::COUNT];
    for (slot, label) in values.iter_mut().zip(EmotionLabel::ALL) {
        *slot = audio.get(label) * (1.0 - w) + behavior.get(label) * w;
    }
    EmotionScores::from_normalized(values)
}
