use crate::decode::SampleRate;
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, str::FromStr};

pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;
pub const DEFAULT_MIN_AUDIO_BYTES: usize = 100;
pub const DEFAULT_MAX_AUDIO_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_BEHAVIOR_WEIGHT: f64 = 0.6;
pub const ENV_SAMPLE_RATE: &str = "ANIMAL_MOOD_SAMPLE_RATE";
pub const ENV_BEHAVIOR_WEIGHT: &str = "ANIMAL_MOOD_BEHAVIOR_WEIGHT";
pub const ENV_TRAINING_SET: &str = "ANIMAL_MOOD_TRAINING_SET";

/// Share of the pose-derived distribution when blending with audio scores.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "f64", into = "f64")]
pub struct BehaviorWeight(f64);

impl BehaviorWeight {
    pub fn new(weight: f64) -> Result<Self, ConfigError> {
        if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
            return Err(ConfigError::BehaviorWeightOutOfRange(weight));
        }
        Ok(Self(weight))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for BehaviorWeight {
    type Error = ConfigError;

    fn try_from(weight: f64) -> Result<Self, Self::Error> {
        Self::new(weight)
    }
}

impl From<BehaviorWeight> for f64 {
    fn from(weight: BehaviorWeight) -> Self {
        weight.0
    }
}

impl Default for BehaviorWeight {
    fn default() -> Self {
        Self(DEFAULT_BEHAVIOR_WEIGHT)
    }
}

/// Byte-length bounds enforced on uploaded audio before analysis.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct InputLimits {
    pub min_bytes: usize,
    pub max_bytes: usize,
}

impl InputLimits {
    pub fn new(min_bytes: usize, max_bytes: usize) -> Result<Self, ConfigError> {
        if min_bytes > max_bytes {
            return Err(ConfigError::InvalidLimits {
                min: min_bytes,
                max: max_bytes,
            });
        }
        Ok(Self {
            min_bytes,
            max_bytes,
        })
    }
}

impl Default for InputLimits {
    fn default() -> Self {
        Self {
            min_bytes: DEFAULT_MIN_AUDIO_BYTES,
            max_bytes: DEFAULT_MAX_AUDIO_BYTES,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    pub limits: InputLimits,
    pub behavior_weight: BehaviorWeight,
    pub default_sample_rate: SampleRate,
    pub training_set: Option<PathBuf>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("sample rate must be > 0 Hz")]
    ZeroSampleRate,
    #[error("behavior weight must be within [0, 1], got {0}")]
    BehaviorWeightOutOfRange(f64),
    #[error("min audio bytes ({min}) exceeds max audio bytes ({max})")]
    InvalidLimits { min: usize, max: usize },
    #[error("invalid value for {key}: {value:?}")]
    InvalidEnvValue { key: String, value: String },
}

pub trait Env {
    fn var(&self, key: &str) -> Option<String>;
}

#[derive(Clone, Debug, Default)]
pub struct StdEnv;

impl Env for StdEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Clone, Debug, Default)]
pub struct MapEnv {
    vars: std::collections::BTreeMap<String, String>,
}

impl MapEnv {
    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_owned(), value.to_owned());
        self
    }
}

impl Env for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

/// CLI value, then the environment variable parsed as `T`, then `default`.
pub fn resolve_parsed_with_default<T: FromStr>(
    cli_value: Option<T>,
    env_key: &str,
    env: &impl Env,
    default: T,
) -> Result<T, ConfigError> {
    match cli_value {
        Some(v) => Ok(v),
        None => match env.var(env_key) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnvValue {
                    key: env_key.to_owned(),
                    value: raw,
                }),
            None => Ok(default),
        },
    }
}

pub fn resolve_sample_rate(
    cli_value: Option<u32>,
    env_key: &str,
    env: &impl Env,
) -> Result<SampleRate, ConfigError> {
    SampleRate::new(resolve_parsed_with_default(
        cli_value,
        env_key,
        env,
        DEFAULT_SAMPLE_RATE,
    )?)
}

pub fn resolve_behavior_weight(
    cli_value: Option<f64>,
    env_key: &str,
    env: &impl Env,
) -> Result<BehaviorWeight, ConfigError> {
    BehaviorWeight::new(resolve_parsed_with_default(
        cli_value,
        env_key,
        env,
        DEFAULT_BEHAVIOR_WEIGHT,
    )?)
}

pub fn resolve_optional_path(
    cli_value: Option<PathBuf>,
    env_key: &str,
    env: &impl Env,
) -> Option<PathBuf> {
    match cli_value {
        Some(v) => Some(v),
        None => env.var(env_key).map(PathBuf::from),
    }
}
