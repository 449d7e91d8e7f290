// MoodReel Main Entry Point
// Copyright (c) 2026 Xing_The_Creator | MoodReel

use moodreel::clips::ClipLibrary;
use moodreel::controller::{ControllerHandle, VideoTransitionController};
use moodreel::favorability::FavorabilityUpdater;
use moodreel::media::{FfplaySurface, MemorySurface};
use moodreel::sentiment::{Classifier, ClassifierConfig, ClassifierLoader};
use moodreel::server;
use moodreel::stage::{Stage, ANALYZING};

use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "moodreel")]
#[command(about = "Sentiment-driven video stage", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the web page and its clips
    Serve {
        /// Port to run the server on
        #[arg(short, long, default_value_t = server::DEFAULT_PORT)]
        port: u16,

        /// Directory to serve
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
    },

    /// Type sentences in the terminal and watch the clips react
    Play {
        /// Clip library JSON (neutral, positive, negative)
        #[arg(short, long)]
        clips: Option<PathBuf>,

        /// Directory clip paths are relative to
        #[arg(short, long, default_value = ".")]
        media_root: PathBuf,

        /// Simulate playback instead of opening ffplay windows
        #[arg(long)]
        headless: bool,

        /// Simulated clip length in headless mode (seconds)
        #[arg(long, default_value_t = 8)]
        clip_secs: u64,
    },

    /// Classify one sentence and print the ranked labels
    Analyze {
        #[arg(short, long)]
        text: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let args = Cli::parse();

    match args.command {
        Commands::Serve { port, root } => {
            server::start_server(port, root).await?;
        }
        Commands::Play {
            clips,
            media_root,
            headless,
            clip_secs,
        } => {
            let library = match clips {
                Some(path) => ClipLibrary::from_json_file(&path)
                    .with_context(|| format!("loading clip library {:?}", path))?,
                None => ClipLibrary::default(),
            };
            run_stage(library, &media_root, headless, Duration::from_secs(clip_secs)).await?;
        }
        Commands::Analyze { text } => {
            let config = ClassifierConfig::from_env();
            let classifier = config.loader().load().await.context("loading classifier")?;
            let ranked = classifier.classify(&text).await.context("classifying")?;
            for score in ranked {
                println!("{:<10} {:.4}", score.label, score.score);
            }
        }
    }

    Ok(())
}

async fn start_controller(
    library: &ClipLibrary,
    media_root: &Path,
    headless: bool,
    clip_length: Duration,
) -> ControllerHandle {
    if headless {
        let surfaces = [
            MemorySurface::timed("video1", clip_length),
            MemorySurface::timed("video2", clip_length),
        ];
        let (handle, _task) = VideoTransitionController::new(surfaces, &library.neutral)
            .spawn()
            .await;
        handle
    } else {
        let surfaces = [
            FfplaySurface::new("video1", media_root),
            FfplaySurface::new("video2", media_root),
        ];
        let (handle, _task) = VideoTransitionController::new(surfaces, &library.neutral)
            .spawn()
            .await;
        handle
    }
}

async fn run_stage(
    library: ClipLibrary,
    media_root: &Path,
    headless: bool,
    clip_length: Duration,
) -> anyhow::Result<()> {
    if !headless {
        for missing in library.missing_under(media_root) {
            warn!("[STAGE] Clip not found: {:?}", missing);
        }
    }

    let controller = start_controller(&library, media_root, headless, clip_length).await;

    let mut updates = controller.subscribe();
    tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            info!(
                "[STAGE] {} | slot {} | {}",
                snapshot.phase,
                snapshot.active_slot,
                snapshot.active_source.unwrap_or_default()
            );
        }
    });

    let loader = ClassifierConfig::from_env().loader();
    let updater = FavorabilityUpdater::new(loader, library);
    let mut stage = Stage::new(updater, controller);

    println!("Favorability {}", stage.favorability().render_bar(20));
    println!("Type a sentence and press Enter (Ctrl+C to quit).");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !line.is_empty() {
                    println!("{}", ANALYZING);
                }
                if let Some(report) = stage.submit(&line).await? {
                    println!("{}", report.render());
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    info!("[STAGE] Bye.");
    Ok(())
}
