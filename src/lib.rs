pub mod chapters;
pub mod config;
pub mod convert;
pub mod cue;
pub mod discovery;
pub mod probe;
