use super::*;
use crate::behavior::{BodyPart, Keypoint};
use crate::decode::SampleRate;
use crate::features::FeatureVector;
use crate::storage::MemoryStore;
use crate::test_signals::{sine_pcm, silence_pcm};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::Arc;

fn service() -> AnalysisService<MemoryStore> {
    AnalysisService::new(MemoryStore::new(), &AppConfig::default())
}

struct BrokenStore;

impl AnalysisStore for BrokenStore {
    fn save(&self, _result: AnalysisResult) -> BoxFuture<'_, Result<AnalysisResult, StorageError>> {
        async { Err(StorageError::Unavailable("disk full".into())) }.boxed()
    }

    fn list(&self) -> BoxFuture<'_, Result<Vec<AnalysisResult>, StorageError>> {
        async { Err(StorageError::Unavailable("disk full".into())) }.boxed()
    }

    fn get_by_id(&self, _id: Uuid) -> BoxFuture<'_, Result<Option<AnalysisResult>, StorageError>> {
        async { Ok(None) }.boxed()
    }
}

fn upright_pose() -> PoseFrame {
    let mut keypoints: Vec<Option<Keypoint>> = vec![None; 17];
    for (part, x, y) in [
        (BodyPart::Nose, 200.0, 50.0),
        (BodyPart::LeftShoulder, 120.0, 100.0),
        (BodyPart::RightShoulder, 280.0, 100.0),
        (BodyPart::LeftHip, 130.0, 220.0),
        (BodyPart::RightHip, 270.0, 220.0),
        (BodyPart::LeftKnee, 100.0, 300.0),
        (BodyPart::RightKnee, 300.0, 300.0),
    ] {
        keypoints[part as usize] = Some(Keypoint {
            score: Some(0.9),
            ..Keypoint::at(x, y)
        });
    }
    PoseFrame::new(keypoints)
}

#[tokio::test]
async fn rejects_audio_outside_limits() {
    let service = service();
    let err = service
        .analyze_audio(AnalyzeRequest::new(vec![0u8; 99], 44_100))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::InvalidInput(InputError::TooShort { len: 99, min: 100 })
    ));

    let config = AppConfig {
        limits: InputLimits::new(100, 1_000).unwrap(),
        ..AppConfig::default()
    };
    let service = AnalysisService::new(MemoryStore::new(), &config);
    let err = service
        .analyze_audio(AnalyzeRequest::new(vec![0u8; 1_001], 44_100))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(InputError::TooLarge { .. })));
    assert!(service.history().await.unwrap().is_empty());
}

#[tokio::test]
async fn boundary_lengths_are_accepted() {
    let service = service();
    service
        .analyze_audio(AnalyzeRequest::new(vec![0u8; 100], 44_100))
        .await
        .unwrap();
    assert_eq!(service.history().await.unwrap().len(), 1);
}

#[tokio::test]
async fn analysis_is_persisted_and_found() {
    let service = service();
    let request = AnalyzeRequest::new(sine_pcm(800.0, 44_100, 0.5, 0.9), 44_100);
    let result = service.analyze_audio(request).await.unwrap();

    assert_eq!(service.find(result.id).await.unwrap(), Some(result.clone()));
    assert_eq!(service.history().await.unwrap(), vec![result]);
    assert_eq!(service.find(Uuid::new_v4()).await.unwrap(), None);
}

#[tokio::test]
async fn zero_sample_rate_surfaces_analysis_error() {
    let err = service()
        .analyze_audio(AnalyzeRequest::new(silence_pcm(400), 0))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Analysis(AnalysisError::InvalidSampleRate(0))
    ));
}

#[tokio::test]
async fn storage_failure_is_reported() {
    let service = AnalysisService::new(BrokenStore, &AppConfig::default());
    let err = service
        .analyze_audio(AnalyzeRequest::new(silence_pcm(400), 44_100))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Storage(StorageError::Unavailable(_))));
    assert!(service.history().await.is_err());
}

#[tokio::test]
async fn training_sample_overrides_matching_audio() {
    let service = service();
    let audio = sine_pcm(1_000.0, 16_000, 0.5, 0.5);
    service
        .register_training_sample(AnimalType::Chicken, EmotionLabel::Sadness, &audio, None)
        .await;

    let result = service
        .analyze_audio(AnalyzeRequest::new(audio.clone(), 16_000).with_species(Some(AnimalType::Dog)))
        .await
        .unwrap();
    assert_eq!(result.animal, AnimalType::Chicken);
    assert_eq!(result.dominant_emotion, EmotionLabel::Sadness);
    assert!((result.emotion_scores.get(EmotionLabel::Sadness) - 0.55 / 0.95).abs() < 1e-9);
    assert_eq!(result.audio_features, FeatureVector::zeroed());

    let other = service
        .analyze_audio(AnalyzeRequest::new(sine_pcm(1_100.0, 16_000, 0.5, 0.5), 16_000))
        .await
        .unwrap();
    assert_ne!(other.audio_features, FeatureVector::zeroed());
}

#[tokio::test]
async fn training_sample_matches_by_file_name() {
    let service = service();
    service
        .register_training_sample(
            AnimalType::Lovebirds,
            EmotionLabel::Happiness,
            b"reference recording",
            Some("chirp.wav".into()),
        )
        .await;

    let request =
        AnalyzeRequest::new(sine_pcm(4_000.0, 16_000, 0.25, 0.4), 16_000).with_file_name("chirp.wav");
    let result = service.analyze_audio(request).await.unwrap();
    assert_eq!(result.animal, AnimalType::Lovebirds);
    assert_eq!(result.dominant_emotion, EmotionLabel::Happiness);
}

#[tokio::test]
async fn supplied_fingerprint_is_trusted() {
    let service = service();
    let sample = service
        .register_training_sample(AnimalType::Cat, EmotionLabel::Fear, b"hiss", None)
        .await;
    let mut request = AnalyzeRequest::new(silence_pcm(400), 44_100);
    request.fingerprint = Some(sample.audio_hash.clone());
    let result = service.analyze_audio(request).await.unwrap();
    assert_eq!(result.dominant_emotion, EmotionLabel::Fear);
}

#[tokio::test]
async fn removed_training_samples_stop_matching() {
    let service = service();
    let audio = silence_pcm(400);
    let sample = service
        .register_training_sample(AnimalType::Pigeon, EmotionLabel::Stress, &audio, None)
        .await;
    assert_eq!(service.training_samples().await, vec![sample.clone()]);
    assert!(service.remove_training_sample(sample.id).await.is_some());
    assert!(service.training_samples().await.is_empty());

    let result = service
        .analyze_audio(AnalyzeRequest::new(audio, 44_100))
        .await
        .unwrap();
    assert_eq!(result.dominant_emotion, EmotionLabel::Contentment);
}

#[tokio::test]
async fn video_without_audio_or_pose_defaults_to_content_dog() {
    let service = service();
    let result = service
        .analyze_video(VideoAnalyzeRequest::default())
        .await
        .unwrap();
    assert_eq!(result.animal, AnimalType::Dog);
    assert_eq!(result.dominant_emotion, EmotionLabel::Contentment);
    assert_eq!(result.audio_features, FeatureVector::zeroed());
    assert_eq!(service.history().await.unwrap().len(), 1);
}

#[tokio::test]
async fn video_pose_is_blended_at_behavior_weight() {
    let service = service();
    let pose = upright_pose();
    let request = VideoAnalyzeRequest {
        species: Some(AnimalType::Cat),
        audio: None,
        pose: Some(pose.clone()),
    };
    let result = service.analyze_video(request).await.unwrap();

    let audio_only = Analyzer::new().analyze(Some(AnimalType::Cat), &[], 44_100).unwrap();
    let expected = crate::emotion::blend(&audio_only.emotion_scores, &score_pose(&pose), 0.6);
    for (label, score) in expected.iter() {
        assert!((result.emotion_scores.get(label) - score).abs() < 1e-12, "{label}");
    }
    assert_eq!(result.animal, AnimalType::Cat);
    assert_eq!(result.dominant_emotion, expected.dominant());
}

#[tokio::test]
async fn video_with_audio_uses_the_clip() {
    let service = service();
    let clip = AudioClip::new(
        Bytes::from(sine_pcm(800.0, 22_050, 0.5, 0.9)),
        SampleRate::new(22_050).unwrap(),
    );
    let request = VideoAnalyzeRequest {
        species: None,
        audio: Some(clip),
        pose: None,
    };
    let result = service.analyze_video(request).await.unwrap();
    assert!(result.audio_features.frequency > 0.0);
    assert!((result.emotion_scores.total() - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn video_behavior_weight_comes_from_config() {
    let config = AppConfig {
        behavior_weight: BehaviorWeight::new(1.0).unwrap(),
        ..AppConfig::default()
    };
    let service = AnalysisService::new(MemoryStore::new(), &config);
    let pose = upright_pose();
    let result = service
        .analyze_video(VideoAnalyzeRequest {
            pose: Some(pose.clone()),
            ..VideoAnalyzeRequest::default()
        })
        .await
        .unwrap();
    assert_eq!(result.emotion_scores, score_pose(&pose));
}

#[tokio::test]
async fn concurrent_requests_share_one_service() {
    let service = Arc::new(service());
    let mut tasks = Vec::new();
    for i in 0..8u32 {
        let service = Arc::clone(&service);
        tasks.push(tokio::spawn(async move {
            let audio = sine_pcm(300.0 + 200.0 * f64::from(i), 16_000, 0.25, 0.6);
            service.analyze_audio(AnalyzeRequest::new(audio, 16_000)).await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }
    assert_eq!(service.history().await.unwrap().len(), 8);
}

