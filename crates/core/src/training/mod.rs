//! Labeled reference recordings that short-circuit heuristic classification.
//!
//! Samples are matched exactly, first by the MD5 fingerprint of the audio and
//! then by file name. There is no approximate matching.

use crate::analysis::AnalysisResult;
use crate::animal::AnimalType;
use crate::emotion::{EmotionLabel, EmotionScores};
use crate::features::FeatureVector;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt};
use uuid::Uuid;

/// Weight of the stored label in an override distribution.
pub const OVERRIDE_PRIMARY_WEIGHT: f64 = 0.55;
/// Weight of every other label in an override distribution.
pub const OVERRIDE_FLOOR_WEIGHT: f64 = 0.05;

#[derive(thiserror::Error, Debug)]
pub enum TrainingError {
    #[error("invalid training set json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Lowercase hex MD5 digest of raw audio bytes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of_audio(bytes: &[u8]) -> Self {
        Self(format!("{:x}", md5::compute(bytes)))
    }

    /// Wraps an already computed digest, normalizing it to lowercase.
    pub fn from_hex(hex: &str) -> Self {
        Self(hex.trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingSample {
    pub id: Uuid,
    pub animal: AnimalType,
    pub emotion: EmotionLabel,
    pub audio_hash: Fingerprint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TrainingSample {
    pub fn new(
        animal: AnimalType,
        emotion: EmotionLabel,
        audio: &[u8],
        file_name: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            animal,
            emotion,
            audio_hash: Fingerprint::of_audio(audio),
            file_name,
            created_at: Utc::now(),
        }
    }

    /// The result reported when audio matches this sample: the stored animal,
    /// a distribution peaked on the stored emotion and zeroed features.
    pub fn override_result(&self) -> AnalysisResult {
        let scores =
            EmotionScores::peaked(self.emotion, OVERRIDE_PRIMARY_WEIGHT, OVERRIDE_FLOOR_WEIGHT);
        AnalysisResult::new(self.animal, scores, FeatureVector::zeroed())
    }
}

/// Exact-match index over training samples.
#[derive(Clone, Debug, Default)]
pub struct TrainingLibrary {
    samples: Vec<TrainingSample>,
    by_hash: HashMap<Fingerprint, usize>,
    by_file_name: HashMap<String, usize>,
}

impl TrainingLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_samples(samples: impl IntoIterator<Item = TrainingSample>) -> Self {
        let mut library = Self::new();
        for sample in samples {
            library.insert(sample);
        }
        library
    }

    /// Adds a sample. A later sample with the same hash or file name shadows the earlier one.
    pub fn insert(&mut self, sample: TrainingSample) {
        let slot = self.samples.len();
        self.by_hash.insert(sample.audio_hash.clone(), slot);
        if let Some(name) = &sample.file_name {
            self.by_file_name.insert(name.clone(), slot);
        }
        self.samples.push(sample);
    }

    pub fn remove(&mut self, id: Uuid) -> Option<TrainingSample> {
        let slot = self.samples.iter().position(|s| s.id == id)?;
        let removed = self.samples.remove(slot);
        self.reindex();
        Some(removed)
    }

    fn reindex(&mut self) {
        self.by_hash.clear();
        self.by_file_name.clear();
        for (slot, sample) in self.samples.iter().enumerate() {
            self.by_hash.insert(sample.audio_hash.clone(), slot);
            if let Some(name) = &sample.file_name {
                self.by_file_name.insert(name.clone(), slot);
            }
        }
    }

    /// Hash match first, then file name.
    pub fn lookup(
        &self,
        fingerprint: Option<&Fingerprint>,
        file_name: Option<&str>,
    ) -> Option<&TrainingSample> {
        fingerprint
            .and_then(|hash| self.by_hash.get(hash))
            .or_else(|| file_name.and_then(|name| self.by_file_name.get(name)))
            .and_then(|&slot| self.samples.get(slot))
    }

    pub fn samples(&self) -> &[TrainingSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Parses a JSON array of samples.
    pub fn from_json(json: &str) -> Result<Self, TrainingError> {
        let samples: Vec<TrainingSample> = serde_json::from_str(json)?;
        Ok(Self::from_samples(samples))
    }

    pub fn to_json(&self) -> Result<String, TrainingError> {
        Ok(serde_json::to_string_pretty(&self.samples)?)
    }
}
