mod blending;
mod classifier;

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, str::FromStr};

pub use blending::blend;
pub use classifier::{EmotionClassifier, HeuristicEmotionClassifier, NormalizedFeatures};

/// The closed emotion label set, declared in its fixed enumeration order.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
    Fear,
    Stress,
    Aggression,
    Comfort,
    Happiness,
    Sadness,
    Anxiety,
    Contentment,
    Alertness,
}

impl EmotionLabel {
    pub const COUNT: usize = 9;

    pub const ALL: [EmotionLabel; EmotionLabel::COUNT] = [
        EmotionLabel::Fear,
        EmotionLabel::Stress,
        EmotionLabel::Aggression,
        EmotionLabel::Comfort,
        EmotionLabel::Happiness,
        EmotionLabel::Sadness,
        EmotionLabel::Anxiety,
        EmotionLabel::Contentment,
        EmotionLabel::Alertness,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EmotionLabel::Fear => "fear",
            EmotionLabel::Stress => "stress",
            EmotionLabel::Aggression => "aggression",
            EmotionLabel::Comfort => "comfort",
            EmotionLabel::Happiness => "happiness",
            EmotionLabel::Sadness => "sadness",
            EmotionLabel::Anxiety => "anxiety",
            EmotionLabel::Contentment => "contentment",
            EmotionLabel::Alertness => "alertness",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown emotion {0:?}")]
pub struct UnknownEmotion(pub String);

impl FromStr for EmotionLabel {
    type Err = UnknownEmotion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        EmotionLabel::ALL
            .into_iter()
            .find(|label| label.as_str() == wanted)
            .ok_or_else(|| UnknownEmotion(s.to_owned()))
    }
}

/// Divisor used when raw weights sum to zero.
const ZERO_TOTAL_DIVISOR: f64 = 0.9;

/// A score for every [`EmotionLabel`], stored in enumeration order.
///
/// Constructors taking raw weights normalize them onto the probability simplex.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<EmotionLabel, f64>",
    into = "BTreeMap<EmotionLabel, f64>"
)]
pub struct EmotionScores([f64; EmotionLabel::COUNT]);

impl EmotionScores {
    /// Normalizes raw non-negative weights (indexed in enumeration order) to sum to 1.
    pub fn from_weights(weights: [f64; EmotionLabel::COUNT]) -> Self {
        let total: f64 = weights.iter().sum();
        let divisor = if total == 0.0 { ZERO_TOTAL_DIVISOR } else { total };
        Self(weights.map(|w| (w / divisor).max(0.0)))
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (EmotionLabel, f64)>) -> Self {
        let mut weights = [0.0; EmotionLabel::COUNT];
        for (label, weight) in pairs {
            weights[label.index()] += weight;
        }
        Self::from_weights(weights)
    }

    /// Every label at the same share.
    pub fn uniform() -> Self {
        Self::from_weights([1.0; EmotionLabel::COUNT])
    }

    /// `primary` at `primary_weight`, every other label at `floor`, then normalized.
    pub fn peaked(primary: EmotionLabel, primary_weight: f64, floor: f64) -> Self {
        let mut weights = [floor; EmotionLabel::COUNT];
        weights[primary.index()] = primary_weight;
        Self::from_weights(weights)
    }

    pub(crate) fn from_normalized(values: [f64; EmotionLabel::COUNT]) -> Self {
        Self(values)
    }

    pub fn get(&self, label: EmotionLabel) -> f64 {
        self.0[label.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (EmotionLabel, f64)> + '_ {
        EmotionLabel::ALL.into_iter().zip(self.0.iter().copied())
    }

    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Label with the highest score; the first in enumeration order wins ties.
    /// Falls back to contentment when every score is zero.
    pub fn dominant(&self) -> EmotionLabel {
        let mut best = EmotionLabel::Contentment;
        let mut best_score = 0.0;
        for (label, score) in self.iter() {
            if score > best_score {
                best_score = score;
                best = label;
            }
        }
        best
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ScoresError {
    #[error("emotion scores missing label {0}")]
    MissingLabel(EmotionLabel),
    #[error("emotion score for {label} must be finite and >= 0, got {value}")]
    InvalidScore { label: EmotionLabel, value: f64 },
}

impl TryFrom<BTreeMap<EmotionLabel, f64>> for EmotionScores {
    type Error = ScoresError;

    fn try_from(map: BTreeMap<EmotionLabel, f64>) -> Result<Self, Self::Error> {
        let mut values = [0.0; EmotionLabel::COUNT];
        for label in EmotionLabel::ALL {
            let value = *map.get(&label).ok_or(ScoresError::MissingLabel(label))?;
            if !value.is_finite() || value < 0.0 {
                return Err(ScoresError::InvalidScore { label, value });
            }
            values[label.index()] = value;
        }
        Ok(Self(values))
    }
}

impl From<EmotionScores> for BTreeMap<EmotionLabel, f64> {
    fn from(scores: EmotionScores) -> Self {
        scores.iter().collect()
    }
}

#[cfg(test)]
mod tests;
