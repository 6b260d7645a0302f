use crate::cue::error::CueError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChapterError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    Cue(#[from] CueError),

    #[error("Cue sheet references {0} files, chapters can only be derived from exactly one")]
    MultipleFilesInCueSheet(usize),

    #[error("No chapters could be derived")]
    NoChapters,

    #[error("Track {track} starts before the track preceding it")]
    TrackStartsOutOfOrder { track: u32 },
}

pub type ChapterResult<T> = Result<T, ChapterError>;
