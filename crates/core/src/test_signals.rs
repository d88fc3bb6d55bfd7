//! Synthetic PCM generators shared by unit tests.

use crate::decode::{i16_to_le_bytes, SampleRate};
use std::f64::consts::PI;

pub fn rate(hz: u32) -> SampleRate {
    SampleRate::new(hz).expect("nonzero sample rate")
}

pub fn sine_samples(freq_hz: f64, sample_rate_hz: u32, seconds: f64, amplitude: f64) -> Vec<i16> {
    let count = (f64::from(sample_rate_hz) * seconds).round() as usize;
    (0..count)
        .map(|i| {
            let t = i as f64 / f64::from(sample_rate_hz);
            (amplitude * 32767.0 * (2.0 * PI * freq_hz * t).sin()).round() as i16
        })
        .collect()
}

pub fn sine_pcm(freq_hz: f64, sample_rate_hz: u32, seconds: f64, amplitude: f64) -> Vec<u8> {
    i16_to_le_bytes(&sine_samples(freq_hz, sample_rate_hz, seconds, amplitude)).to_vec()
}

pub fn constant_pcm(value: i16, count: usize) -> Vec<u8> {
    i16_to_le_bytes(&vec![value; count]).to_vec()
}

pub fn silence_pcm(count: usize) -> Vec<u8> {
    constant_pcm(0, count)
}

/// Linear ramp from 0 to `end` over `count` samples.
pub fn ramp_pcm(end: i16, count: usize) -> Vec<u8> {
    let last = count.saturating_sub(1).max(1) as f64;
    let samples: Vec<i16> = (0..count)
        .map(|i| (f64::from(end) * i as f64 / last).round() as i16)
        .collect();
    i16_to_le_bytes(&samples).to_vec()
}
