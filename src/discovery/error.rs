use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error("No audio files found in {0}")]
    NoAudioFiles(PathBuf),
}

pub type DiscoveryResult<T> = Result<T, DiscoveryError>;
