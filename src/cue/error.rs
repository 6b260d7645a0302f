use std::fmt;
use thiserror::Error;

/// Block of a cue sheet a validation rule is enforced in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Cuesheet,
    File,
    Track,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Cuesheet => write!(f, "cuesheet"),
            Scope::File => write!(f, "file"),
            Scope::Track => write!(f, "track"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("Multiple {field} entries cannot be given (line {line})")]
    DuplicateField { field: &'static str, line: usize },

    #[error("Multiple indices numbered {number:02} cannot be given (line {line})")]
    DuplicateIndex { number: u32, line: usize },

    #[error("INDEX 01 ... line needed for each track")]
    MissingIndex01,

    #[error("All files should contain tracks")]
    EmptyFile,

    #[error("A cue sheet should reference at least one file")]
    EmptySheet,

    #[error("Track numbers should be in order: expected {expected}, found {found}")]
    TrackOutOfOrder { expected: u32, found: u32 },

    #[error("First file should contain track 1, found track {0}")]
    FirstTrackNotOne(u32),
}

#[derive(Debug, Error)]
pub enum CueError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error("Syntax error on line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("Invalid {scope} {node}: {violation}")]
    Validation {
        scope: Scope,
        node: String,
        violation: Violation,
    },

    #[error("Unknown file type: {0}")]
    InvalidFileType(String),

    #[error("Unknown track type: {0}")]
    InvalidTrackType(String),

    #[error("Invalid MSF format: {0}")]
    InvalidMSFFormat(String),
}

impl CueError {
    pub(crate) fn syntax(line: usize, message: impl Into<String>) -> Self {
        CueError::Syntax {
            line,
            message: message.into(),
        }
    }
}

pub type CueResult<T> = Result<T, CueError>;
