//! ReelMask - detection sampling for video masking
//!
//! Samples a video at 30 frames per second, runs object detection on every
//! sampled frame and prints one line per frame. Ctrl-C cancels the run
//! after the frame in flight.

mod config;

use anyhow::{Context, Result};
use clap::Parser;
use config::AppConfig;
use reelmask_ai::{CancelToken, Extraction, FrameResult, FrameSampler, InferenceEngine, SampleStep};
use reelmask_core::MemoryClass;
use reelmask_editor::MaskStore;
use reelmask_media::{FfmpegSource, PatternSource, VideoSource};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "reelmask")]
#[command(about = "Sample a video and detect objects on every frame", long_about = None)]
#[command(version)]
struct Cli {
    /// Video file to sample
    #[arg(required_unless_present = "pattern")]
    video: Option<PathBuf>,

    /// Sample a synthetic color-bar clip instead of a file
    #[arg(long, conflicts_with = "video")]
    pattern: bool,

    /// JSON configuration file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Detection model path
    #[arg(long)]
    model: Option<PathBuf>,

    /// Memory class: small, medium or large
    #[arg(long)]
    memory: Option<MemoryClass>,

    /// Minimum detection confidence
    #[arg(long)]
    threshold: Option<f32>,

    /// Write frame results as JSON lines
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("ReelMask starting...");

    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(model) = &cli.model {
        config.engine.model_path = model.clone();
    }
    if let Some(threshold) = cli.threshold {
        config.engine.confidence_threshold = threshold;
    }
    if let Some(memory) = cli.memory {
        config.sampler.memory_class = Some(memory);
    }
    let memory = config.sampler.memory_class();

    let engine = InferenceEngine::with_default_loader(config.engine);
    let status = engine.warm_up().await;
    info!(model = %engine.config().model_path.display(), status = ?status, "Model state");

    let cancel = CancelToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling after the current frame");
            interrupt.cancel();
        }
    });

    let mut output = cli
        .output
        .as_ref()
        .map(|path| {
            File::create(path)
                .map(BufWriter::new)
                .with_context(|| format!("Failed to create {}", path.display()))
        })
        .transpose()?;

    let sampler = FrameSampler::new(&engine);
    match &cli.video {
        Some(path) => {
            if !reelmask_media::init() {
                anyhow::bail!("FFmpeg is required to decode {}", path.display());
            }
            let source = FfmpegSource::open(path)?;
            run(sampler.extract(source, memory, cancel), output.as_mut()).await?;
        }
        None => {
            let source = PatternSource::new(1280, 720, 2.0);
            run(sampler.extract(source, memory, cancel), output.as_mut()).await?;
        }
    }

    if let Some(mut writer) = output {
        writer.flush()?;
    }
    Ok(())
}

async fn run<S: VideoSource>(
    mut extraction: Extraction<'_, S>,
    mut output: Option<&mut BufWriter<File>>,
) -> Result<()> {
    let total = extraction.total_frames();
    info!(
        frames = total,
        resolution = %extraction.resolution(),
        "Sampling video"
    );

    let mut objects = 0;
    loop {
        match extraction.next().await? {
            SampleStep::Frame(frame) => {
                objects += frame.detections.len();
                print_frame(&frame, extraction.frames_done(), total);
                if let Some(writer) = output.as_deref_mut() {
                    serde_json::to_writer(&mut *writer, frame.as_ref())?;
                    writeln!(writer)?;
                }
            }
            SampleStep::Finished => {
                info!(frames = total, objects, "Done");
                return Ok(());
            }
            SampleStep::Cancelled => {
                warn!(frames = extraction.frames_done(), total, "Cancelled");
                return Ok(());
            }
        }
    }
}

fn print_frame(frame: &FrameResult, done: usize, total: usize) {
    let masks = MaskStore::from_detections(frame);
    let labels: Vec<&str> = frame.detections.iter().map(|d| d.label.as_str()).collect();
    println!(
        "[{done}/{total}] {} objects={} masks={} thumbnail={}B {}",
        frame.id,
        frame.detections.len(),
        masks.masks().len(),
        frame.thumbnail.len(),
        labels.join(",")
    );
}
