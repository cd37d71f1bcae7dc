use fountain_config::ConfigError;
use fountain_simulation::SystemError;
use thiserror::Error;

/// Everything that can stop the runner before or after the frame loop.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    System(#[from] SystemError),

    #[error("Failed to save snapshot: {0}")]
    Snapshot(#[from] image::ImageError),

    #[error("Failed to set up frame statistics: {0}")]
    Stats(#[from] hdrhistogram::CreationError),

    #[error("Failed to install Ctrl+C handler: {0}")]
    Signal(#[from] ctrlc::Error),
}
