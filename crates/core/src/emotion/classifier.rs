use crate::emotion::{EmotionLabel, EmotionScores};
use crate::features::FeatureVector;

/// Maps a feature vector to a distribution over [`EmotionLabel`].
pub trait EmotionClassifier: Send + Sync {
    fn classify(&self, features: &FeatureVector) -> EmotionScores;
}

/// Feature values rescaled to roughly `[0, 1]` before scoring.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NormalizedFeatures {
    pub frequency: f64,
    pub amplitude: f64,
    pub energy: f64,
    pub centroid: f64,
    pub rolloff: f64,
    pub zcr: f64,
    pub flux: f64,
    pub tempo: f64,
}

impl NormalizedFeatures {
    pub fn from_features(features: &FeatureVector) -> Self {
        Self {
            frequency: (features.frequency / 2000.0).min(1.0),
            amplitude: features.amplitude.min(1.0),
            energy: (features.rms_energy * 3.0).min(1.0),
            centroid: (features.spectral_centroid / 10.0).min(1.0),
            rolloff: (features.spectral_rolloff / 10.0).min(1.0),
            zcr: (features.zcr_rate / 10.0).min(1.0),
            flux: (features.spectral_flux * 10.0).min(1.0),
            tempo: (features.tempo_dynamics * 5.0).min(1.0),
        }
    }
}

fn pick(condition: bool, yes: f64, no: f64) -> f64 {
    if condition {
        yes
    } else {
        no
    }
}

/// Weighted feature rules, one per label, normalized to sum to 1.
///
/// Species is not an input: the same audio yields the same distribution
/// whichever animal produced it.
#[derive(Clone, Copy, Debug)]
pub struct HeuristicEmotionClassifier;

impl HeuristicEmotionClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Raw per-label weights, indexed in [`EmotionLabel::ALL`] order.
    pub fn raw_weights(n: &NormalizedFeatures) -> [f64; EmotionLabel::COUNT] {
        let base = 0.1;

        let fear = base
            + n.frequency * 0.25
            + n.zcr * 0.25
            + n.flux * 0.2
            + n.tempo * 0.15
            + pick(n.rolloff > 0.7, 0.1, 0.0);

        let stress = base
            + (n.frequency - 0.5).abs() * 0.2
            + n.energy * 0.2
            + n.flux * 0.25
            + (n.amplitude - 0.5).abs() * 0.15
            + n.tempo * 0.2;

        let aggression = base
            + n.amplitude * 0.25
            + n.energy * 0.25
            + n.flux * 0.2
            + n.centroid * 0.15
            + pick(n.tempo > 0.6, 0.15, 0.0);

        let comfort = base
            + (1.0 - n.frequency) * 0.25
            + (1.0 - n.amplitude) * 0.25
            + (1.0 - n.energy) * 0.15
            + pick(n.flux < 0.2, 0.2, 0.05)
            + pick(n.tempo < 0.25, 0.1, 0.0);

        let happiness = base
            + n.frequency * 0.2
            + (1.0 - (n.zcr - 0.5).abs()) * 0.15
            + pick(n.flux < 0.5, 0.2, 0.1)
            + pick(n.tempo < 0.5, 0.2, 0.1)
            + n.amplitude * 0.15;

        let sadness = base
            + (1.0 - n.frequency) * 0.25
            + (1.0 - n.amplitude) * 0.25
            + (1.0 - n.energy) * 0.2
            + pick(n.flux < 0.4, 0.15, 0.05)
            + pick(n.tempo < 0.4, 0.1, 0.0);

        let anxiety = base
            + n.zcr * 0.25
            + (n.amplitude - 0.5).abs() * 0.2
            + n.flux * 0.2
            + n.tempo * 0.2
            + pick(n.frequency > 0.4 && n.frequency < 0.8, 0.15, 0.0);

        let contentment = base
            + (1.0 - n.frequency) * 0.2
            + (1.0 - n.amplitude) * 0.2
            + pick(n.flux < 0.3, 0.25, 0.1)
            + (1.0 - n.zcr) * 0.15
            + pick(n.tempo < 0.3, 0.2, 0.05);

        let alertness = base
            + n.frequency * 0.2
            + n.amplitude * 0.2
            + n.zcr * 0.2
            + n.flux * 0.2
            + pick(n.energy > 0.5, 0.2, 0.0);

        [
            fear,
            stress,
            aggression,
            comfort,
            happiness,
            sadness,
            anxiety,
            contentment,
            alertness,
        ]
    }
}

impl Default for HeuristicEmotionClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl EmotionClassifier for HeuristicEmotionClassifier {
    fn classify(&self, features: &FeatureVector) -> EmotionScores {
        let normalized = NormalizedFeatures::from_features(features);
        let scores = EmotionScores::from_weights(Self::raw_weights(&normalized));
        tracing::debug!(
            dominant = %scores.dominant(),
            frequency = normalized.frequency,
            energy = normalized.energy,
            flux = normalized.flux,
            "scored emotions"
        );
        scores
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureExtractor;
    use crate::test_signals::{rate, silence_pcm, sine_pcm};
    use rand::{Rng, SeedableRng};

    fn classify(features: &FeatureVector) -> EmotionScores {
        HeuristicEmotionClassifier::new().classify(features)
    }

    fn random_features(rng: &mut rand::rngs::StdRng) -> FeatureVector {
        FeatureVector {
            frequency: rng.random_range(0.0..20_000.0),
            amplitude: rng.random_range(0.0..=1.0),
            rms_energy: rng.random_range(0.0..=1.0),
            spectral_centroid: rng.random_range(0.0..=10.0),
            spectral_rolloff: rng.random_range(0.0..=10.0),
            zcr_rate: rng.random_range(0.0..=10.0),
            spectral_flux: rng.random_range(0.0..=1.0),
            tempo_dynamics: rng.random_range(0.0..=1.0),
            duration: rng.random_range(0.0..=30.0),
            ..FeatureVector::default()
        }
    }

    #[test]
    fn scores_form_a_complete_simplex() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let scores = classify(&random_features(&mut rng));
            assert!((scores.total() - 1.0).abs() < 1e-9, "total {}", scores.total());
            assert_eq!(scores.iter().count(), EmotionLabel::COUNT);
            assert!(scores.iter().all(|(_, s)| s.is_finite() && (0.0..=1.0).contains(&s)));
        }
    }

    #[test]
    fn extracted_audio_scores_form_a_simplex() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(0xa11ce);
        let extractor = FeatureExtractor::new();
        for _ in 0..12 {
            let mut buffer = vec![0u8; rng.random_range(0..16_000)];
            rng.fill(&mut buffer[..]);
            let features = extractor.extract(&buffer, rate(rng.random_range(8_000..=48_000)));
            let scores = classify(&features);
            assert!((scores.total() - 1.0).abs() < 1e-9);
            assert_eq!(scores, classify(&features));
        }
    }

    #[test]
    fn silence_is_content() {
        let features = FeatureExtractor::new().extract(&silence_pcm(44_100), rate(44_100));
        let scores = classify(&features);
        assert_eq!(scores.dominant(), EmotionLabel::Contentment);
        assert!(scores.get(EmotionLabel::Contentment) > scores.get(EmotionLabel::Aggression));
        assert!(scores.get(EmotionLabel::Contentment) > scores.get(EmotionLabel::Fear));
    }

    #[test]
    fn zeroed_features_are_content() {
        let scores = classify(&FeatureVector::zeroed());
        assert_eq!(scores.dominant(), EmotionLabel::Contentment);
    }

    #[test]
    fn loud_tone_raises_aggression_over_silence() {
        let extractor = FeatureExtractor::new();
        let quiet = classify(&extractor.extract(&silence_pcm(22_050), rate(22_050)));
        let loud = classify(&extractor.extract(&sine_pcm(1_500.0, 22_050, 1.0, 1.0), rate(22_050)));
        assert!(loud.get(EmotionLabel::Aggression) > quiet.get(EmotionLabel::Aggression));
        assert!(loud.get(EmotionLabel::Sadness) < quiet.get(EmotionLabel::Sadness));
    }

    #[test]
    fn normalization_clamps_each_feature() {
        let features = FeatureVector {
            frequency: 9_000.0,
            rms_energy: 0.9,
            spectral_flux: 0.5,
            tempo_dynamics: 0.8,
            ..FeatureVector::default()
        };
        let n = NormalizedFeatures::from_features(&features);
        assert_eq!(n.frequency, 1.0);
        assert_eq!(n.energy, 1.0);
        assert_eq!(n.flux, 1.0);
        assert_eq!(n.tempo, 1.0);
        assert_eq!(n.amplitude, 0.0);
    }
}
