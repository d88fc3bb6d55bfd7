//! Request validation and orchestration around the [`Analyzer`].
//!
//! The service checks upload sizes, consults the training library before any
//! heuristic runs, blends pose cues into video analyses and persists every
//! result through an [`AnalysisStore`].

use crate::analysis::{AnalysisError, AnalysisResult, Analyzer};
use crate::animal::AnimalType;
use crate::behavior::{score_pose, PoseFrame};
use crate::config::{AppConfig, BehaviorWeight, InputLimits, DEFAULT_SAMPLE_RATE};
use crate::decode::AudioClip;
use crate::emotion::EmotionLabel;
use crate::storage::{AnalysisStore, StorageError};
use crate::training::{Fingerprint, TrainingLibrary, TrainingSample};
use bytes::Bytes;
use tokio::sync::RwLock;
use uuid::Uuid;

const LOG_TARGET: &str = "animal_mood::service";

/// Audio analysis request. `audio` is mono i16 LE PCM.
#[derive(Clone, Debug)]
pub struct AnalyzeRequest {
    pub audio: Bytes,
    pub sample_rate: u32,
    pub species: Option<AnimalType>,
    /// Precomputed digest of `audio`; computed on demand when absent.
    pub fingerprint: Option<Fingerprint>,
    pub file_name: Option<String>,
}

impl AnalyzeRequest {
    pub fn new(audio: impl Into<Bytes>, sample_rate: u32) -> Self {
        Self {
            audio: audio.into(),
            sample_rate,
            species: None,
            fingerprint: None,
            file_name: None,
        }
    }

    pub fn with_species(mut self, species: Option<AnimalType>) -> Self {
        self.species = species;
        self
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct VideoAnalyzeRequest {
    pub species: Option<AnimalType>,
    pub audio: Option<AudioClip>,
    pub pose: Option<PoseFrame>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("audio too short: {len} bytes, need at least {min}")]
    TooShort { len: usize, min: usize },
    #[error("audio too large: {len} bytes, limit is {max}")]
    TooLarge { len: usize, max: usize },
}

#[derive(thiserror::Error, Debug)]
pub enum ServiceError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),
    #[error("analysis failed: {0}")]
    Analysis(#[from] AnalysisError),
    #[error("storage failed: {0}")]
    Storage(#[from] StorageError),
}

pub struct AnalysisService<S> {
    analyzer: Analyzer,
    store: S,
    training: RwLock<TrainingLibrary>,
    limits: InputLimits,
    behavior_weight: BehaviorWeight,
}

impl<S> AnalysisService<S>
where
    S: AnalysisStore,
{
    pub fn new(store: S, config: &AppConfig) -> Self {
        Self {
            analyzer: Analyzer::new(),
            store,
            training: RwLock::new(TrainingLibrary::new()),
            limits: config.limits,
            behavior_weight: config.behavior_weight,
        }
    }

    pub fn with_analyzer(mut self, analyzer: Analyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    pub fn with_training_library(mut self, library: TrainingLibrary) -> Self {
        self.training = RwLock::new(library);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn check_length(&self, len: usize) -> Result<(), InputError> {
        if len < self.limits.min_bytes {
            return Err(InputError::TooShort {
                len,
                min: self.limits.min_bytes,
            });
        }
        if len > self.limits.max_bytes {
            return Err(InputError::TooLarge {
                len,
                max: self.limits.max_bytes,
            });
        }
        Ok(())
    }

    async fn training_override(
        &self,
        fingerprint: Option<Fingerprint>,
        audio: &[u8],
        file_name: Option<&str>,
    ) -> Option<AnalysisResult> {
        let training = self.training.read().await;
        if training.is_empty() {
            return None;
        }
        let fingerprint = fingerprint.unwrap_or_else(|| Fingerprint::of_audio(audio));
        let sample = training.lookup(Some(&fingerprint), file_name)?;
        tracing::info!(
            target: LOG_TARGET,
            sample_id = %sample.id,
            animal = %sample.animal,
            emotion = %sample.emotion,
            "matched training sample"
        );
        Some(sample.override_result())
    }

    /// Validates, analyzes and persists one audio clip.
    pub async fn analyze_audio(
        &self,
        request: AnalyzeRequest,
    ) -> Result<AnalysisResult, ServiceError> {
        if let Err(e) = self.check_length(request.audio.len()) {
            tracing::warn!(target: LOG_TARGET, error = %e, "rejected audio");
            return Err(e.into());
        }

        let result = match self
            .training_override(request.fingerprint, &request.audio, request.file_name.as_deref())
            .await
        {
            Some(result) => result,
            None => self
                .analyzer
                .analyze(request.species, &request.audio, request.sample_rate)?,
        };

        let saved = self.store.save(result).await?;
        tracing::info!(
            target: LOG_TARGET,
            id = %saved.id,
            animal = %saved.animal,
            dominant = %saved.dominant_emotion,
            "analysis saved"
        );
        Ok(saved)
    }

    /// Analyzes the clip's audio (or silence when none was captured) and
    /// blends in pose cues at the configured behavior weight.
    pub async fn analyze_video(
        &self,
        request: VideoAnalyzeRequest,
    ) -> Result<AnalysisResult, ServiceError> {
        let base = match &request.audio {
            Some(clip) => {
                if let Err(e) = self.check_length(clip.pcm_le.len()) {
                    tracing::warn!(target: LOG_TARGET, error = %e, "rejected video audio");
                    return Err(e.into());
                }
                self.analyzer
                    .analyze(request.species, &clip.pcm_le, clip.sample_rate().hz())?
            }
            None => self.analyzer.analyze(
                Some(request.species.unwrap_or(AnimalType::Dog)),
                &[],
                DEFAULT_SAMPLE_RATE,
            )?,
        };

        let result = match &request.pose {
            Some(pose) => base.blended(&score_pose(pose), self.behavior_weight.get()),
            None => base,
        };

        let saved = self.store.save(result).await?;
        tracing::info!(
            target: LOG_TARGET,
            id = %saved.id,
            animal = %saved.animal,
            dominant = %saved.dominant_emotion,
            with_pose = request.pose.is_some(),
            "video analysis saved"
        );
        Ok(saved)
    }

    pub async fn history(&self) -> Result<Vec<AnalysisResult>, ServiceError> {
        Ok(self.store.list().await?)
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<AnalysisResult>, ServiceError> {
        Ok(self.store.get_by_id(id).await?)
    }

    pub async fn register_training_sample(
        &self,
        animal: AnimalType,
        emotion: EmotionLabel,
        audio: &[u8],
        file_name: Option<String>,
    ) -> TrainingSample {
        let sample = TrainingSample::new(animal, emotion, audio, file_name);
        tracing::info!(
            target: LOG_TARGET,
            id = %sample.id,
            hash = %sample.audio_hash,
            %animal,
            %emotion,
            "training sample registered"
        );
        self.training.write().await.insert(sample.clone());
        sample
    }

    pub async fn remove_training_sample(&self, id: Uuid) -> Option<TrainingSample> {
        self.training.write().await.remove(id)
    }

    pub async fn training_samples(&self) -> Vec<TrainingSample> {
        self.training.read().await.samples().to_vec()
    }
}

#[cfg(test)]
mod tests;
