//! Headless host for the fountain particle emitter.
//!
//! Loads an emitter configuration, drives the particle system at a fixed
//! frame rate onto an in-memory canvas and optionally saves the last frame.

mod clock;
mod error;
mod host;
mod pointer;

use clap::Parser;
use clock::FrameClock;
use env_logger::Env;
use error::RunnerError;
use fountain_config::{load_config, Config};
use host::Host;
use log::info;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the emitter configuration file (.json or .toml)
    #[arg(short, long, default_value = "fountain.json")]
    config: PathBuf,

    /// Stop after this many frames
    #[arg(short, long)]
    frames: Option<u64>,

    /// Seed for spawn positions, for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Save the final frame to this PNG file
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Run as fast as possible instead of at the configured framerate
    #[arg(long)]
    unpaced: bool,
}

impl Args {
    /// Command-line values win over the configuration file.
    fn apply(&self, config: &mut Config) {
        if let Some(frames) = self.frames {
            config.frames = Some(frames);
        }
        if let Some(seed) = self.seed {
            config.emitter.seed = Some(seed);
        }
        if let Some(snapshot) = &self.snapshot {
            config.snapshot = Some(snapshot.clone());
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("fountain=info")).init();

    let args = Args::parse();

    info!("Loading configuration from {}", args.config.display());
    let mut config = load_config(&args.config)?;
    args.apply(&mut config);

    run(&config, args.unpaced)?;
    Ok(())
}

fn run(config: &Config, unpaced: bool) -> Result<(), RunnerError> {
    let (stop_tx, stop_rx) = crossbeam_channel::bounded(1);
    ctrlc::set_handler(move || {
        // A second Ctrl+C while the first is pending has nothing to add.
        let _ = stop_tx.try_send(());
    })?;

    let mut host = Host::from_config(config)?;
    let mut clock = if unpaced {
        FrameClock::unpaced(config.framerate)?
    } else {
        FrameClock::new(config.framerate)?
    };

    info!(
        "Running {} particles at {} FPS ({:?} per frame) on a {}x{} canvas",
        host.system().particle_count(),
        config.framerate,
        clock.frame_duration(),
        config.canvas.width,
        config.canvas.height
    );
    let frames = host.run(&mut clock, config.frames, &stop_rx);

    let stats = clock.stats();
    info!(
        "Ran {} frames: mean {:.1}us, p50 {}us, p99 {}us, max {}us, {} over budget",
        frames, stats.mean_micros, stats.p50_micros, stats.p99_micros, stats.max_micros, stats.overruns
    );

    if let Some(path) = &config.snapshot {
        host.save_snapshot(path)?;
    }
    Ok(())
}
