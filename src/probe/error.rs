use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse ffprobe output: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("ffprobe executable not found: {0}")]
    FfprobeNotFound(String),

    #[error("ffprobe failed on {path}: {stderr}")]
    FfprobeFailed { path: PathBuf, stderr: String },

    #[error("ffprobe reported no duration for {0}")]
    MissingDuration(PathBuf),

    #[error("Chapter {id} of {path} has unreadable timestamps")]
    MalformedChapter { id: i64, path: PathBuf },
}

pub type ProbeResult<T> = Result<T, ProbeError>;
