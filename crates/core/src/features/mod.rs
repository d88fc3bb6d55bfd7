//! Acoustic feature extraction from 16-bit PCM.
//!
//! [`FeatureExtractor`] turns a little-endian PCM buffer into a fixed-shape
//! [`FeatureVector`]. The measurements are coarse: pitch comes
//! from the zero-crossing count and the spectral features are computed over a
//! magnitude-vs-sample-index array rather than a Fourier transform (see
//! [`spectral`]). Every bounded feature is clamped here, before any classifier
//! sees it.

pub mod spectral;
pub mod temporal;

use crate::decode::{i16_to_f64_pcm, pcm_i16_le, SampleRate};
use serde::{Deserialize, Serialize};
use spectral::PseudoSpectrum;

pub const MFCC_COEFFICIENTS: usize = 13;
/// Upper bound for `zcrRate`, `spectralCentroid` and `spectralRolloff`.
pub const COMPRESSED_FEATURE_MAX: f64 = 10.0;
pub const MAX_SPECTRAL_FLUX: f64 = 1.0;
pub const MAX_DURATION_SECONDS: f64 = 30.0;
/// Divisor compressing the crossings-per-second rate into `zcrRate`.
const ZCR_SCALE: f64 = 5000.0;
const KHZ: f64 = 1000.0;
/// Fewer samples than this cannot hold a single crossing and yield a zeroed vector.
pub const MIN_ANALYZABLE_SAMPLES: usize = 2;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeatureVector {
    /// Twice the zero-crossing frequency estimate.
    pub pitch: f64,
    /// Zero-crossing frequency estimate in Hz. Only meaningful for near-monotone input.
    pub frequency: f64,
    /// Peak absolute normalized sample, in [0, 1].
    pub amplitude: f64,
    /// Seconds, capped at 30.
    pub duration: f64,
    /// In [0, 1].
    pub rms_energy: f64,
    /// kHz, in [0, 10].
    pub spectral_centroid: f64,
    /// Crossings per second divided by 5000, in [0, 10].
    pub zcr_rate: f64,
    pub mfcc: [f64; MFCC_COEFFICIENTS],
    /// In [0, 1].
    pub spectral_flux: f64,
    /// kHz, in [0, 10].
    pub spectral_rolloff: f64,
    /// Standard deviation of 20 ms frame RMS.
    pub tempo_dynamics: f64,
}

impl FeatureVector {
    /// The vector reported for degenerate audio (fewer than two samples).
    pub fn zeroed() -> Self {
        Self::default()
    }
}

/// Stateless PCM-to-features converter.
#[derive(Clone, Copy, Debug, Default)]
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extracts features from little-endian i16 PCM. A trailing odd byte is ignored.
    pub fn extract(&self, buffer: &[u8], sample_rate: SampleRate) -> FeatureVector {
        let samples = i16_to_f64_pcm(&pcm_i16_le(buffer));
        self.extract_samples(&samples, sample_rate)
    }

    /// Extracts features from samples already normalized to [-1, 1].
    pub fn extract_samples(&self, samples: &[f64], sample_rate: SampleRate) -> FeatureVector {
        if samples.len() < MIN_ANALYZABLE_SAMPLES {
            tracing::debug!(samples = samples.len(), "degenerate audio, returning zeroed features");
            return FeatureVector::zeroed();
        }

        let n = samples.len() as f64;
        let sr = sample_rate.as_f64();

        let envelope = temporal::envelope_stats(samples);
        let crossings = temporal::zero_crossings(samples) as f64;
        let crossings_per_second = (crossings / n) * sr;
        let frequency = (crossings / 2.0) * (sr / n);

        let spectrum = PseudoSpectrum::from_samples(samples, sr);
        let features = FeatureVector {
            pitch: frequency * 2.0,
            frequency,
            amplitude: envelope.peak,
            duration: (n / sr).min(MAX_DURATION_SECONDS),
            rms_energy: envelope.rms,
            spectral_centroid: (spectrum.centroid_hz() / KHZ).min(COMPRESSED_FEATURE_MAX),
            zcr_rate: (crossings_per_second / ZCR_SCALE).min(COMPRESSED_FEATURE_MAX),
            mfcc: spectrum.log_band_coefficients(),
            spectral_flux: spectral::spectral_flux(samples).min(MAX_SPECTRAL_FLUX),
            spectral_rolloff: (spectrum.rolloff_hz() / KHZ).min(COMPRESSED_FEATURE_MAX),
            tempo_dynamics: temporal::frame_rms_deviation(samples, sr),
        };

        tracing::debug!(
            samples = samples.len(),
            sample_rate = sample_rate.hz(),
            mean_amplitude = envelope.mean_amplitude,
            frequency = features.frequency,
            rms = features.rms_energy,
            "extracted features"
        );

        features
    }
}
