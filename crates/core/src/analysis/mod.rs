use crate::animal::{AnimalClassifier, AnimalType, HeuristicAnimalClassifier};
use crate::decode::SampleRate;
use crate::emotion::{blend, EmotionClassifier, EmotionLabel, EmotionScores, HeuristicEmotionClassifier};
use crate::features::{FeatureExtractor, FeatureVector};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("invalid sample rate {0} Hz")]
    InvalidSampleRate(u32),
}

/// One finished analysis, as persisted and returned to callers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub id: Uuid,
    pub animal: AnimalType,
    pub timestamp: DateTime<Utc>,
    pub dominant_emotion: EmotionLabel,
    pub emotion_scores: EmotionScores,
    pub audio_features: FeatureVector,
}

impl AnalysisResult {
    /// A fresh record with a new id and the current time.
    pub fn new(animal: AnimalType, emotion_scores: EmotionScores, audio_features: FeatureVector) -> Self {
        Self {
            id: Uuid::new_v4(),
            animal,
            timestamp: Utc::now(),
            dominant_emotion: emotion_scores.dominant(),
            emotion_scores,
            audio_features,
        }
    }

    /// Copy with `behavior` blended in at `behavior_weight` and the dominant label recomputed.
    pub fn blended(&self, behavior: &EmotionScores, behavior_weight: f64) -> Self {
        let emotion_scores = blend(&self.emotion_scores, behavior, behavior_weight);
        Self {
            dominant_emotion: emotion_scores.dominant(),
            emotion_scores,
            ..self.clone()
        }
    }
}

/// Feature extraction followed by species and emotion classification.
///
/// Holds no mutable state; share one behind an `Arc` or build one per task.
pub struct Analyzer {
    extractor: FeatureExtractor,
    animal: Box<dyn AnimalClassifier>,
    emotion: Box<dyn EmotionClassifier>,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::with_classifiers(
            Box::new(HeuristicAnimalClassifier::new()),
            Box::new(HeuristicEmotionClassifier::new()),
        )
    }

    pub fn with_classifiers(
        animal: Box<dyn AnimalClassifier>,
        emotion: Box<dyn EmotionClassifier>,
    ) -> Self {
        Self {
            extractor: FeatureExtractor::new(),
            animal,
            emotion,
        }
    }

    /// Analyzes `buffer` as mono i16 LE PCM. The species classifier only runs
    /// when `species` is `None`; it never affects the emotion scores.
    pub fn analyze(
        &self,
        species: Option<AnimalType>,
        buffer: &[u8],
        sample_rate: u32,
    ) -> Result<AnalysisResult, AnalysisError> {
        let rate = SampleRate::new(sample_rate)
            .map_err(|_| AnalysisError::InvalidSampleRate(sample_rate))?;
        let features = self.extractor.extract(buffer, rate);
        let animal = match species {
            Some(animal) => animal,
            None => self.animal.classify(&features),
        };
        let scores = self.emotion.classify(&features);
        let result = AnalysisResult::new(animal, scores, features);
        tracing::debug!(
            id = %result.id,
            %animal,
            dominant = %result.dominant_emotion,
            bytes = buffer.len(),
            sample_rate,
            "analyzed audio"
        );
        Ok(result)
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}
