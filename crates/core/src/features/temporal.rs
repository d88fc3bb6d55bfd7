// Time-domain features: envelope statistics, zero crossings and the
// frame-energy variability used as a rhythm proxy.

/// Length of one tempo-dynamics frame, in seconds.
const TEMPO_FRAME_SECONDS: f64 = 0.02;

/// Single-pass amplitude statistics over normalized samples.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EnvelopeStats {
    pub mean_amplitude: f64,
    pub peak: f64,
    pub rms: f64,
}

pub fn envelope_stats(samples: &[f64]) -> EnvelopeStats {
    if samples.is_empty() {
        return EnvelopeStats::default();
    }

    let mut sum = 0.0;
    let mut peak: f64 = 0.0;
    let mut sum_squares = 0.0;
    for &x in samples {
        let magnitude = x.abs();
        sum += magnitude;
        peak = peak.max(magnitude);
        sum_squares += x * x;
    }

    let n = samples.len() as f64;
    EnvelopeStats {
        mean_amplitude: sum / n,
        peak: peak.min(1.0),
        rms: (sum_squares / n).sqrt().min(1.0),
    }
}

/// Counts sign changes between consecutive samples. Zero counts as non-negative.
pub fn zero_crossings(samples: &[f64]) -> usize {
    samples
        .windows(2)
        .filter(|pair| (pair[1] >= 0.0) != (pair[0] >= 0.0))
        .count()
}

/// Population standard deviation of per-frame RMS over 20 ms frames.
///
/// Frames start at every multiple of the frame length strictly below
/// `len - frame_len`, so a trailing partial (or exactly fitting final) frame
/// is not measured.
pub fn frame_rms_deviation(samples: &[f64], sample_rate_hz: f64) -> f64 {
    let frame_len = (sample_rate_hz * TEMPO_FRAME_SECONDS).floor() as usize;
    if frame_len == 0 || samples.len() <= frame_len {
        return 0.0;
    }

    let last_start = samples.len() - frame_len;
    let frames: Vec<f64> = (0..last_start)
        .step_by(frame_len)
        .map(|start| {
            let frame = &samples[start..start + frame_len];
            let energy: f64 = frame.iter().map(|x| x * x).sum();
            (energy / frame_len as f64).sqrt()
        })
        .collect();

    if frames.is_empty() {
        return 0.0;
    }

    let count = frames.len() as f64;
    let mean = frames.iter().sum::<f64>() / count;
    let variance = frames.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count;
    variance.sqrt()
}
