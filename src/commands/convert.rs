use crate::commands::parse_bitrate;
use anyhow::{Result, bail};
use clap::{ArgGroup, Parser};
use cuebook::convert::{Job, MetadataSource, check_output, opus_path_for};
use cuebook::discovery::find_book_folders;
use log::{info, warn};
use std::path::PathBuf;

/// Converts the given files into one Opus file.
#[derive(Parser, Debug, Clone, Eq, PartialEq)]
#[command(group(ArgGroup::new("metadata_file").args(["metadata", "metadata_with_chapters"])))]
pub struct ConvertCommand {
    /// Files to convert, directories are searched recursively for audio
    #[arg(long, short = 'i', value_name = "INPUT", num_args = 1.., required = true)]
    pub input: Vec<PathBuf>,

    /// Output file, defaults to the first input's name with a .opus extension
    #[arg(long, short = 'o', value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// FFMETADATA file holding the final tags
    #[arg(long, short = 'm', value_name = "METADATA")]
    pub metadata: Option<PathBuf>,

    /// FFMETADATA file holding the final tags and chapters
    #[arg(long = "metadata-chapters", short = 'M', value_name = "METADATA")]
    pub metadata_with_chapters: Option<PathBuf>,

    /// Cue sheet to read chapters from, single input only
    #[arg(long, short = 'c', value_name = "CUESHEET")]
    pub cuesheet: Option<PathBuf>,

    /// Cover image, discovered from the inputs when not given
    #[arg(long, short = 'I', value_name = "COVER")]
    pub cover: Option<PathBuf>,

    /// Output bitrate, picked from the inputs when not given
    #[arg(long, short = 'b', value_name = "BITRATE", value_parser = parse_bitrate)]
    pub bitrate: Option<String>,

    /// Delete the inputs after a successful conversion
    #[arg(long, short = 'x', default_value_t = false)]
    pub delete: bool,

    /// Force overwrite of the output file if it already exists
    #[arg(long, short = 'f', default_value_t = false)]
    pub force: bool,
}

impl ConvertCommand {
    pub fn into_job(self) -> Result<Job> {
        let output = match self.output {
            Some(output) => output,
            None => {
                let output = opus_path_for(&self.input[0]);
                warn!(
                    "{} will be written to {}",
                    self.input
                        .iter()
                        .map(|input| input.display().to_string())
                        .collect::<Vec<_>>()
                        .join(", "),
                    output.display()
                );
                output
            }
        };
        check_output(&output, self.force)?;

        if self.cuesheet.is_some() && self.input.len() > 1 {
            bail!("A cue sheet can only be used with a single input file");
        }

        let metadata = match (self.metadata, self.metadata_with_chapters) {
            (Some(path), _) => Some(MetadataSource {
                path,
                includes_chapters: false,
            }),
            (None, Some(path)) => Some(MetadataSource {
                path,
                includes_chapters: true,
            }),
            (None, None) => None,
        };

        Ok(Job {
            inputs: self.input,
            metadata,
            cuesheet: self.cuesheet,
            cover: self.cover,
            output,
            bitrate: self.bitrate,
            delete_originals: self.delete,
        })
    }
}

/// Finds every book below the given folders and converts each in place.
#[derive(Parser, Debug, Clone, Eq, PartialEq)]
pub struct AutoCommand {
    /// Folders to search for books
    #[arg(value_name = "LOCATION", required = true)]
    pub locations: Vec<PathBuf>,

    /// Output bitrate, picked from the inputs when not given
    #[arg(long, short = 'b', value_name = "BITRATE", value_parser = parse_bitrate)]
    pub bitrate: Option<String>,

    /// Delete the inputs after a successful conversion
    #[arg(long, short = 'x', default_value_t = false)]
    pub delete: bool,

    /// Re-convert books whose output already exists
    #[arg(long, short = 'f', default_value_t = false)]
    pub force: bool,
}

impl AutoCommand {
    pub async fn into_jobs(self) -> Result<Vec<Job>> {
        let mut jobs = Vec::new();

        for location in &self.locations {
            info!("Detecting books within {}", location.display());
            for folder in find_book_folders(location).await? {
                let job = Job::for_book_folder(&folder, self.bitrate.clone(), self.delete);
                if check_output(&job.output, self.force).is_err() {
                    warn!("Skipping {}, {} exists", folder.display(), job.output.display());
                    continue;
                }
                jobs.push(job);
            }
        }

        Ok(jobs)
    }
}
