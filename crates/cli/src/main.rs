#![deny(warnings)]

use animal_mood_core::analysis::AnalysisResult;
use animal_mood_core::animal::AnimalType;
use animal_mood_core::behavior::PoseFrame;
use animal_mood_core::config::{
    resolve_behavior_weight, resolve_optional_path, resolve_sample_rate, AppConfig, Env,
    InputLimits, StdEnv, DEFAULT_MAX_AUDIO_BYTES, DEFAULT_MIN_AUDIO_BYTES, ENV_BEHAVIOR_WEIGHT,
    ENV_SAMPLE_RATE, ENV_TRAINING_SET,
};
use animal_mood_core::decode::{decode_file, AudioClip, SampleRate};
use animal_mood_core::emotion::EmotionLabel;
use animal_mood_core::service::{AnalysisService, AnalyzeRequest, VideoAnalyzeRequest};
use animal_mood_core::storage::MemoryStore;
use animal_mood_core::training::{Fingerprint, TrainingLibrary, TrainingSample};
use anyhow::Context;
use bytes::Bytes;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "animal-mood")]
#[command(about = "Estimate animal species and emotion from recorded vocalizations")]
struct Cli {
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze one or more recordings and print the results as JSON.
    Analyze(AnalyzeArgs),
    /// Print the MD5 fingerprint of each recording's PCM data.
    Fingerprint {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[arg(long)]
        sample_rate: Option<u32>,
    },
    /// Label a recording and append it to a training set.
    Train(TrainArgs),
}

#[derive(clap::Args, Debug)]
struct AnalyzeArgs {
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Skip species detection and report this animal.
    #[arg(long, value_parser = parse_animal)]
    species: Option<AnimalType>,

    /// Sample rate for headerless .pcm/.raw input.
    #[arg(long)]
    sample_rate: Option<u32>,

    /// JSON pose frame blended into every result.
    #[arg(long)]
    pose: Option<PathBuf>,

    #[arg(long)]
    training_set: Option<PathBuf>,

    #[arg(long)]
    behavior_weight: Option<f64>,

    #[arg(long, default_value_t = DEFAULT_MIN_AUDIO_BYTES)]
    min_bytes: usize,

    #[arg(long, default_value_t = DEFAULT_MAX_AUDIO_BYTES)]
    max_bytes: usize,
}

#[derive(clap::Args, Debug)]
struct TrainArgs {
    #[arg(long)]
    file: PathBuf,

    #[arg(long, value_parser = parse_animal)]
    animal: AnimalType,

    #[arg(long, value_parser = parse_emotion)]
    emotion: EmotionLabel,

    #[arg(long)]
    training_set: Option<PathBuf>,

    #[arg(long)]
    sample_rate: Option<u32>,
}

fn parse_animal(raw: &str) -> Result<AnimalType, animal_mood_core::animal::UnknownAnimal> {
    raw.parse()
}

fn parse_emotion(raw: &str) -> Result<EmotionLabel, animal_mood_core::emotion::UnknownEmotion> {
    raw.parse()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    let env = StdEnv;
    match cli.command {
        Command::Analyze(args) => run_analyze(args, &env).await,
        Command::Fingerprint { files, sample_rate } => {
            let rate = resolve_sample_rate(sample_rate, ENV_SAMPLE_RATE, &env)?;
            run_fingerprint(files, rate).await
        }
        Command::Train(args) => run_train(args, &env).await,
    }
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(
            level
                .parse()
                .with_context(|| format!("invalid --log-level: {level}"))?,
        )
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn build_config(args: &AnalyzeArgs, env: &impl Env) -> anyhow::Result<AppConfig> {
    Ok(AppConfig {
        limits: InputLimits::new(args.min_bytes, args.max_bytes)?,
        behavior_weight: resolve_behavior_weight(args.behavior_weight, ENV_BEHAVIOR_WEIGHT, env)?,
        default_sample_rate: resolve_sample_rate(args.sample_rate, ENV_SAMPLE_RATE, env)?,
        training_set: resolve_optional_path(args.training_set.clone(), ENV_TRAINING_SET, env),
    })
}

fn is_headerless(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pcm") || e.eq_ignore_ascii_case("raw"))
        .unwrap_or(false)
}

/// Raw i16 LE files are taken as-is; anything else goes through symphonia.
async fn load_audio(path: PathBuf, sample_rate: SampleRate) -> anyhow::Result<AudioClip> {
    if is_headerless(&path) {
        let pcm = tokio::fs::read(&path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        return Ok(AudioClip::new(Bytes::from(pcm), sample_rate));
    }

    let display = path.display().to_string();
    let clip = tokio::task::spawn_blocking(move || decode_file(&path))
        .await
        .context("decoder task panicked")?
        .with_context(|| format!("failed to decode {display}"))?;
    Ok(clip)
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

async fn load_training_set(path: &Path) -> anyhow::Result<TrainingLibrary> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read training set {}", path.display()))?;
    TrainingLibrary::from_json(&json)
        .with_context(|| format!("failed to parse training set {}", path.display()))
}

async fn load_pose(path: &Path) -> anyhow::Result<PoseFrame> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read pose {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("failed to parse pose {}", path.display()))
}

async fn analyze_file(
    service: &AnalysisService<MemoryStore>,
    path: PathBuf,
    sample_rate: SampleRate,
    species: Option<AnimalType>,
    pose: Option<PoseFrame>,
) -> anyhow::Result<AnalysisResult> {
    let name = file_name(&path);
    let clip = load_audio(path, sample_rate).await?;

    let result = match pose {
        Some(pose) => {
            service
                .analyze_video(VideoAnalyzeRequest {
                    species,
                    audio: Some(clip),
                    pose: Some(pose),
                })
                .await?
        }
        None => {
            let mut request = AnalyzeRequest::new(clip.pcm_le, clip.format.sample_rate.hz())
                .with_species(species);
            request.file_name = name;
            service.analyze_audio(request).await?
        }
    };
    Ok(result)
}

async fn run_analyze(args: AnalyzeArgs, env: &impl Env) -> anyhow::Result<()> {
    let cfg = build_config(&args, env)?;
    tracing::info!(
        files = args.files.len(),
        sample_rate = cfg.default_sample_rate.hz(),
        behavior_weight = cfg.behavior_weight.get(),
        "config loaded"
    );

    let mut service = AnalysisService::new(MemoryStore::new(), &cfg);
    if let Some(path) = &cfg.training_set {
        let library = load_training_set(path).await?;
        tracing::info!(samples = library.len(), path = %path.display(), "training set loaded");
        service = service.with_training_library(library);
    }
    let service = Arc::new(service);

    let pose = match &args.pose {
        Some(path) => Some(load_pose(path).await?),
        None => None,
    };

    let mut tasks = Vec::with_capacity(args.files.len());
    for path in args.files {
        let service = Arc::clone(&service);
        let pose = pose.clone();
        let sample_rate = cfg.default_sample_rate;
        let species = args.species;
        tasks.push(tokio::spawn(async move {
            let display = path.display().to_string();
            let outcome = analyze_file(&service, path, sample_rate, species, pose).await;
            (display, outcome)
        }));
    }

    let total = tasks.len();
    let mut results = Vec::with_capacity(total);
    let mut failed = 0usize;
    for task in tasks {
        let (path, outcome) = task.await.context("analysis task panicked")?;
        match outcome {
            Ok(result) => results.push(result),
            Err(e) => {
                failed += 1;
                tracing::warn!(path = %path, error = %format!("{e:#}"), "analysis failed");
            }
        }
    }

    println!("{}", serde_json::to_string_pretty(&results)?);

    if failed > 0 {
        anyhow::bail!("{failed} of {total} files failed to analyze");
    }
    Ok(())
}

async fn run_fingerprint(files: Vec<PathBuf>, sample_rate: SampleRate) -> anyhow::Result<()> {
    for path in files {
        let display = path.display().to_string();
        let clip = load_audio(path, sample_rate).await?;
        println!("{}  {}", Fingerprint::of_audio(&clip.pcm_le), display);
    }
    Ok(())
}

async fn run_train(args: TrainArgs, env: &impl Env) -> anyhow::Result<()> {
    let training_set = resolve_optional_path(args.training_set, ENV_TRAINING_SET, env)
        .context("--training-set or ANIMAL_MOOD_TRAINING_SET is required")?;
    let sample_rate = resolve_sample_rate(args.sample_rate, ENV_SAMPLE_RATE, env)?;

    let mut library = if tokio::fs::try_exists(&training_set).await.unwrap_or(false) {
        load_training_set(&training_set).await?
    } else {
        TrainingLibrary::new()
    };

    let name = file_name(&args.file);
    let clip = load_audio(args.file, sample_rate).await?;
    let sample = TrainingSample::new(args.animal, args.emotion, &clip.pcm_le, name);
    library.insert(sample.clone());

    let json = library.to_json()?;
    tokio::fs::write(&training_set, json)
        .await
        .with_context(|| format!("failed to write training set {}", training_set.display()))?;

    tracing::info!(
        id = %sample.id,
        hash = %sample.audio_hash,
        animal = %sample.animal,
        emotion = %sample.emotion,
        samples = library.len(),
        "training sample saved"
    );
    println!("{}", serde_json::to_string_pretty(&sample)?);
    Ok(())
}
