use crate::config::Tools;
use crate::convert::cover::{CoverStatus, attempt_attach_cover};
use crate::convert::error::{ConvertError, ConvertResult};
use crate::convert::ffmpeg::Codec;
use crate::discovery::expand_inputs;
use crate::probe::models::FileInfo;
use crate::probe::probe_all;
use log::{error, info, warn};
use std::path::{Path, PathBuf};

pub mod cover;
pub mod dispatch;
pub mod error;
pub mod ffmpeg;
pub mod multiple;
pub mod single;

/// Inputs at or above this bit rate get the high quality preset.
pub const HIGH_BITRATE_THRESHOLD: u64 = 262_144;
pub const HIGH_BITRATE: &str = "192k";
pub const LOW_BITRATE: &str = "32k";

/// A user supplied `;FFMETADATA1` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataSource {
    pub path: PathBuf,
    /// The file carries `[CHAPTER]` sections that replace derived chapters.
    pub includes_chapters: bool,
}

/// One output file and everything needed to produce it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub inputs: Vec<PathBuf>,
    pub metadata: Option<MetadataSource>,
    pub cuesheet: Option<PathBuf>,
    pub cover: Option<PathBuf>,
    pub output: PathBuf,
    pub bitrate: Option<String>,
    pub delete_originals: bool,
}

impl Job {
    /// A job converting one discovered book folder into `<folder>/<name>.opus`.
    pub fn for_book_folder(folder: &Path, bitrate: Option<String>, delete_originals: bool) -> Self {
        Self {
            inputs: vec![folder.to_path_buf()],
            metadata: None,
            cuesheet: None,
            cover: None,
            output: opus_path_for(folder),
            bitrate,
            delete_originals,
        }
    }

    pub fn auto_chapters(&self) -> bool {
        !self
            .metadata
            .as_ref()
            .is_some_and(|source| source.includes_chapters)
    }

    /// Comma separated input names for log lines.
    pub fn describe(&self) -> String {
        self.inputs
            .iter()
            .map(|input| {
                input
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| input.display().to_string())
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// `<dir>/<name>.opus` for a directory, `<name>.opus` beside a file.
pub fn opus_path_for(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_os_string())
        .unwrap_or_else(|| "output".into());
    let mut name = stem;
    name.push(".opus");

    if input.is_dir() {
        input.join(name)
    } else {
        input.with_file_name(name)
    }
}

/// Refuses to overwrite an existing output unless forced.
pub fn check_output(output: &Path, force: bool) -> ConvertResult<()> {
    if output.exists() && !force {
        return Err(ConvertError::OutputAlreadyExists(output.to_path_buf()));
    }
    Ok(())
}

/// Orders by disc and track when every file is numbered, else by file name.
pub fn sort_files(files: &mut [FileInfo]) {
    if !files.is_empty() && files.iter().all(|file| file.track.is_some()) {
        info!("Sorting inputs by track number");
        files.sort_by_key(|file| (file.disc.unwrap_or(1), file.track));
    } else {
        info!("Sorting inputs by file name");
        files.sort_by_cached_key(FileInfo::stem);
    }
}

pub fn auto_bitrate(files: &[FileInfo]) -> &'static str {
    let highest = files.iter().filter_map(|file| file.bit_rate).max().unwrap_or(0);
    if highest >= HIGH_BITRATE_THRESHOLD {
        HIGH_BITRATE
    } else {
        LOW_BITRATE
    }
}

/// Explicit bitrates always re-encode. Without one, Opus inputs are copied.
pub fn choose_codec(files: &[FileInfo], bitrate: Option<&str>) -> Codec {
    match bitrate {
        Some(bitrate) => Codec::Opus {
            bitrate: bitrate.to_string(),
        },
        None if !files.is_empty() && files.iter().all(FileInfo::is_opus) => {
            info!("Inputs already are Opus, copying the audio stream");
            Codec::Copy
        }
        None => {
            let bitrate = auto_bitrate(files);
            info!("Auto bitrate set to {bitrate}");
            Codec::Opus {
                bitrate: bitrate.to_string(),
            }
        }
    }
}

/// Inputs of a job, resolved and probed before anything is written.
struct Prepared {
    inputs: Vec<PathBuf>,
    files: Vec<FileInfo>,
    codec: Codec,
}

async fn prepare(tools: &Tools, job: &Job) -> ConvertResult<Prepared> {
    let mut inputs = Vec::new();
    for input in expand_inputs(&job.inputs).await? {
        inputs.push(tokio::fs::canonicalize(&input).await?);
    }
    if inputs.is_empty() {
        return Err(ConvertError::NoInputFiles);
    }
    if inputs.len() > 1 && job.cuesheet.is_some() {
        return Err(ConvertError::CueSheetWithMultipleInputs);
    }

    let mut files = probe_all(tools, &inputs).await?;
    sort_files(&mut files);
    let codec = choose_codec(&files, job.bitrate.as_deref());

    Ok(Prepared {
        inputs,
        files,
        codec,
    })
}

async fn encode(tools: &Tools, job: &Job, files: &[FileInfo], codec: &Codec) -> ConvertResult<()> {
    let temp_dir = tempfile::Builder::new().prefix("cuebook").tempdir()?;

    match files {
        [file] => single::convert_single(tools, file, job, codec, temp_dir.path()).await?,
        files => multiple::convert_multiple(tools, files, job, codec, temp_dir.path()).await?,
    }

    let status = attempt_attach_cover(
        tools,
        files,
        &job.output,
        job.cover.as_deref(),
        temp_dir.path(),
    )
    .await;
    match status {
        CoverStatus::Success => info!("Attached cover image to {}", job.output.display()),
        CoverStatus::AttachmentFailed => {
            error!("Failed to attach cover image to {}", job.output.display())
        }
        CoverStatus::NoneFound => warn!("Cover image not found for {}", job.describe()),
    }

    Ok(())
}

/// Encodes the prepared inputs, removing the output if encoding fails.
async fn encode_or_discard(
    tools: &Tools,
    job: &Job,
    files: &[FileInfo],
    codec: &Codec,
) -> ConvertResult<()> {
    let result = encode(tools, job, files, codec).await;
    if result.is_err() && tokio::fs::try_exists(&job.output).await.unwrap_or(false) {
        info!("Deleting failed output {}", job.output.display());
        if let Err(remove_err) = tokio::fs::remove_file(&job.output).await {
            warn!("Could not delete {}: {remove_err}", job.output.display());
        }
    }
    result
}

/// Runs one job to completion.
///
/// Output is only removed when encoding itself fails; an existing output
/// survives a job that fails while resolving or probing its inputs. With
/// `delete_originals` the inputs are removed once the output is complete.
pub async fn convert_job(tools: &Tools, job: &Job) -> ConvertResult<PathBuf> {
    info!("Converting {}", job.describe());

    let prepared = prepare(tools, job).await?;
    encode_or_discard(tools, job, &prepared.files, &prepared.codec).await?;

    if job.delete_originals {
        info!("Deleting input files");
        for input in prepared.inputs {
            tokio::fs::remove_file(&input).await?;
        }
    }
    Ok(job.output.clone())
}
