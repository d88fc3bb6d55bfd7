// Spectral-style features computed over a magnitude-vs-index array.
//
// The "spectrum" here is not a Fourier transform: it is the absolute value of
// the first few thousand normalized samples, read as if each index were a
// frequency bin. Every downstream threshold was tuned against this proxy, so
// it must not be swapped for a real FFT without re-tuning the classifiers.

/// Largest pseudo-spectrum size.
pub const MAX_SPECTRUM_SIZE: usize = 2048;
/// Samples considered when sizing the pseudo-spectrum.
const SIZING_WINDOW: usize = 4096;
/// Cumulative magnitude share that defines the rolloff bin.
const ROLLOFF_THRESHOLD: f64 = 0.95;
const FLUX_WINDOW: usize = 2048;
const FLUX_HOP: usize = 512;
const MEL_BANDS: usize = 40;
const LOG_FLOOR: f64 = 1e-10;

/// Power-of-two spectrum size for `sample_count` samples, capped at 2048.
pub fn spectrum_size(sample_count: usize) -> usize {
    if sample_count == 0 {
        return 0;
    }
    sample_count
        .min(SIZING_WINDOW)
        .next_power_of_two()
        .min(MAX_SPECTRUM_SIZE)
}

#[derive(Clone, Debug, PartialEq)]
pub struct PseudoSpectrum {
    bins: Vec<f64>,
    sample_rate_hz: f64,
}

impl PseudoSpectrum {
    /// Builds the proxy spectrum: bin `i` holds `|samples[i]|`, zero-padded to the spectrum size.
    pub fn from_samples(samples: &[f64], sample_rate_hz: f64) -> Self {
        let size = spectrum_size(samples.len());
        let mut bins = vec![0.0; size];
        for (bin, sample) in bins.iter_mut().zip(samples) {
            *bin = sample.abs();
        }
        Self {
            bins,
            sample_rate_hz,
        }
    }

    pub fn bins(&self) -> &[f64] {
        &self.bins
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    fn bin_frequency(&self, index: usize) -> f64 {
        (index as f64 / self.bins.len() as f64) * self.sample_rate_hz
    }

    /// Magnitude-weighted mean bin frequency, in Hz.
    pub fn centroid_hz(&self) -> f64 {
        let mut magnitude_sum = 0.0;
        let mut weighted_sum = 0.0;
        for (i, &mag) in self.bins.iter().enumerate() {
            magnitude_sum += mag;
            weighted_sum += mag * self.bin_frequency(i);
        }
        if magnitude_sum > 0.0 {
            weighted_sum / magnitude_sum
        } else {
            0.0
        }
    }

    /// Frequency of the first bin at which cumulative magnitude reaches 95% of the total.
    pub fn rolloff_hz(&self) -> f64 {
        let total: f64 = self.bins.iter().sum();
        let target = total * ROLLOFF_THRESHOLD;
        let mut cumulative = 0.0;
        for (i, &mag) in self.bins.iter().enumerate() {
            cumulative += mag;
            if cumulative >= target {
                return self.bin_frequency(i);
            }
        }
        0.0
    }

    /// Averages of `MEL_BANDS` equal-width index bands. Empty bands average to zero.
    pub fn band_means(&self) -> [f64; MEL_BANDS] {
        let mut bands = [0.0; MEL_BANDS];
        let width = self.bins.len() as f64 / MEL_BANDS as f64;
        for (i, band) in bands.iter_mut().enumerate() {
            let start = (i as f64 * width).floor() as usize;
            let end = (((i + 1) as f64) * width).floor() as usize;
            if end > start {
                let sum: f64 = self.bins[start..end.min(self.bins.len())].iter().sum();
                *band = sum / (end - start) as f64;
            }
        }
        bands
    }

    /// Natural log of the first `N` band means.
    pub fn log_band_coefficients<const N: usize>(&self) -> [f64; N] {
        let bands = self.band_means();
        let mut coefficients = [0.0; N];
        for (coefficient, band) in coefficients.iter_mut().zip(bands.iter()) {
            *coefficient = (band + LOG_FLOOR).ln();
        }
        coefficients
    }
}

/// Mean Euclidean distance between magnitude arrays of consecutive 2048-sample
/// windows taken every 512 samples. Zero when fewer than two windows fit.
pub fn spectral_flux(samples: &[f64]) -> f64 {
    if samples.len() <= FLUX_WINDOW {
        return 0.0;
    }

    let last_start = samples.len() - FLUX_WINDOW;
    let mut previous: Option<&[f64]> = None;
    let mut flux = 0.0;
    let mut hops = 0usize;

    for start in (0..last_start).step_by(FLUX_HOP) {
        let window = &samples[start..start + FLUX_WINDOW];
        if let Some(prev) = previous {
            let distance: f64 = window
                .iter()
                .zip(prev)
                .map(|(a, b)| (a.abs() - b.abs()).powi(2))
                .sum();
            flux += distance.sqrt();
            hops += 1;
        }
        previous = Some(window);
    }

    if hops > 0 {
        flux / hops as f64
    } else {
        0.0
    }
}
