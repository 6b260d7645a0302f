use crate::commands::chapters::ChaptersCommand;
use crate::commands::convert::{AutoCommand, ConvertCommand};
use clap::{Parser, Subcommand};
use lazy_static::lazy_static;
use log::LevelFilter;
use regex::Regex;

pub mod chapters;
pub mod convert;

lazy_static! {
    static ref BITRATE: Regex = Regex::new(r"^\d+[kKmM]?$").expect("Invalid bitrate pattern");
}

/// Converts audiobooks into single Opus files with chapters.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Only log errors
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log every step, including the ffmpeg commands run
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Number of books converted at once, 0 uses every core
    #[arg(long, short = 't', global = true, value_name = "THREADS", default_value_t = 0)]
    pub threads: usize,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            LevelFilter::Error
        } else if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Convert(ConvertCommand),
    Auto(AutoCommand),
    Chapters(ChaptersCommand),
}

/// Accepts bitrates such as `64k`, `1M` or `96000`.
pub fn parse_bitrate(value: &str) -> Result<String, String> {
    if BITRATE.is_match(value) {
        Ok(value.to_string())
    } else {
        Err(format!("invalid bitrate '{value}', expected e.g. 64k"))
    }
}
