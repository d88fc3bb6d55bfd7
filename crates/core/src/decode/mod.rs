use crate::config::{ConfigError, DEFAULT_SAMPLE_RATE};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use std::time::Duration;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Full-scale divisor for signed 16-bit PCM.
pub const I16_FULL_SCALE: f64 = 32768.0;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "u32", into = "u32")]
pub struct SampleRate(u32);

impl SampleRate {
    pub fn new(hz: u32) -> std::result::Result<Self, ConfigError> {
        if hz == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        Ok(Self(hz))
    }

    pub fn hz(self) -> u32 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.0)
    }
}

impl Default for SampleRate {
    fn default() -> Self {
        Self(DEFAULT_SAMPLE_RATE)
    }
}

impl TryFrom<u32> for SampleRate {
    type Error = ConfigError;

    fn try_from(hz: u32) -> std::result::Result<Self, Self::Error> {
        Self::new(hz)
    }
}

impl From<SampleRate> for u32 {
    fn from(rate: SampleRate) -> Self {
        rate.0
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PcmFormat {
    pub sample_rate: SampleRate,
    pub channels: u16,
}

impl PcmFormat {
    pub const fn mono(sample_rate: SampleRate) -> Self {
        Self {
            sample_rate,
            channels: 1,
        }
    }
}

/// Mono signed 16-bit little-endian PCM plus its sample rate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioClip {
    pub format: PcmFormat,
    pub pcm_le: Bytes,
}

impl AudioClip {
    pub fn new(pcm_le: Bytes, sample_rate: SampleRate) -> Self {
        Self {
            format: PcmFormat::mono(sample_rate),
            pcm_le,
        }
    }

    pub fn sample_rate(&self) -> SampleRate {
        self.format.sample_rate
    }

    pub fn sample_count(&self) -> usize {
        self.pcm_le.len() / 2
    }

    pub fn duration(&self) -> Duration {
        duration_from_sample_count(self.format.sample_rate.hz(), 1, self.sample_count())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    #[error("cannot open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported or corrupt audio: {0}")]
    Unsupported(String),

    #[error("no default audio track")]
    NoTrack,

    #[error("audio track does not declare a sample rate")]
    UnknownSampleRate,
}

pub type Result<T> = std::result::Result<T, DecodeError>;

/// Reads `bytes` as signed 16-bit little-endian samples. A trailing odd byte is ignored.
pub fn pcm_i16_le(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

pub fn i16_to_f64_pcm(samples: &[i16]) -> Vec<f64> {
    if samples.is_empty() {
        return Vec::new();
    }
    let scale = 1.0 / I16_FULL_SCALE;
    samples.iter().map(|&s| f64::from(s) * scale).collect()
}

pub fn i16_to_le_bytes(samples: &[i16]) -> Bytes {
    let mut out = Vec::with_capacity(samples.len() * 2);
    for s in samples {
        out.extend_from_slice(&s.to_le_bytes());
    }
    Bytes::from(out)
}

pub fn duration_from_sample_count(
    sample_rate_hz: u32,
    channels: u16,
    sample_count: usize,
) -> Duration {
    if sample_rate_hz == 0 || channels == 0 {
        return Duration::from_secs(0);
    }
    let frames = (sample_count / usize::from(channels)) as u128;
    let micros = frames * 1_000_000u128 / u128::from(sample_rate_hz);
    Duration::from_micros(micros.min(u128::from(u64::MAX)) as u64)
}

/// Averages one interleaved frame and scales it back to 16-bit PCM.
fn downmix_frame(frame: &[f32]) -> i16 {
    let avg = frame.iter().map(|&s| f64::from(s)).sum::<f64>() / frame.len() as f64;
    (avg * I16_FULL_SCALE)
        .round()
        .clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16
}

/// Decodes an audio file with symphonia and downmixes it to mono 16-bit PCM.
pub fn decode_file(path: impl AsRef<Path>) -> Result<AudioClip> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| DecodeError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mss = MediaSourceStream::new(Box::new(file), MediaSourceStreamOptions::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| DecodeError::Unsupported(e.to_string()))?;

    let mut format = probed.format;
    let track = format.default_track().ok_or(DecodeError::NoTrack)?;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or(DecodeError::UnknownSampleRate)?;
    let sample_rate = SampleRate::new(sample_rate).map_err(|_| DecodeError::UnknownSampleRate)?;
    let track_id = track.id;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| DecodeError::Unsupported(e.to_string()))?;

    let mut mono: Vec<i16> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;
    let mut max_sample_frames: usize = 0;
    let mut channels: usize = 1;

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "packet read failed, stopping");
                break;
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!(error = %e, "frame decode failed, skipping");
                continue;
            }
        };

        let spec = *decoded.spec();
        let num_frames = decoded.capacity();
        if sample_buf.is_none() || num_frames > max_sample_frames {
            sample_buf = Some(SampleBuffer::<f32>::new(num_frames as u64, spec));
            max_sample_frames = num_frames;
        }
        let Some(buf) = sample_buf.as_mut() else {
            continue;
        };
        buf.copy_interleaved_ref(decoded);

        channels = spec.channels.count().max(1);
        mono.extend(buf.samples().chunks(channels).map(downmix_frame));
    }

    tracing::debug!(
        samples = mono.len(),
        sample_rate = sample_rate.hz(),
        channels,
        path = %path.display(),
        "decoded audio file"
    );

    Ok(AudioClip::new(i16_to_le_bytes(&mono), sample_rate))
}
