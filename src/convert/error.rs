use crate::chapters::error::ChapterError;
use crate::cue::error::CueError;
use crate::discovery::error::DiscoveryError;
use crate::probe::error::ProbeError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error(transparent)]
    Chapter(#[from] ChapterError),

    #[error(transparent)]
    Cue(#[from] CueError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    JoinError(#[from] tokio::task::JoinError),

    #[error("Failed to tag output: {0}")]
    Lofty(#[from] lofty::error::LoftyError),

    #[error("ffmpeg executable not found: {0}")]
    FfmpegNotFound(String),

    #[error("ffmpeg exited with {status}: {stderr}")]
    FfmpegFailed { status: String, stderr: String },

    #[error("A cue sheet can only be used with a single input file")]
    CueSheetWithMultipleInputs,

    #[error("No input files given")]
    NoInputFiles,

    #[error("Output file already exists: {0} (use --force to overwrite)")]
    OutputAlreadyExists(PathBuf),

    #[error("Unsupported cover image format: {0}")]
    UnsupportedCoverFormat(PathBuf),
}

pub type ConvertResult<T> = Result<T, ConvertError>;
