use crate::chapters::ffmetadata::write_chapters;
use crate::chapters::error::ChapterError;
use crate::chapters::{Chapter, derive_from_cue_text, derive_single};
use crate::config::Tools;
use crate::convert::error::ConvertResult;
use crate::convert::ffmpeg::{Codec, FfmpegArgs, run_ffmpeg};
use crate::convert::{Job, MetadataSource};
use crate::cue::CueParser;
use crate::probe::models::FileInfo;
use crate::probe::probe_file;
use log::{info, warn};
use std::path::{Path, PathBuf};

const CHAPTER_FILE: &str = "cue_chapters.ffmeta";

/// Derives chapters from a cue sheet on disk.
///
/// Without an explicit `duration` the audio file the sheet references is
/// probed for it, resolved relative to the sheet's directory.
pub async fn chapters_from_cue_path(
    tools: &Tools,
    cue: &Path,
    duration: Option<f64>,
) -> ConvertResult<Vec<Chapter>> {
    let sheet = CueParser::new(cue).parse().await?;

    let total = match duration {
        Some(duration) => duration,
        None => {
            let file = match sheet.files.as_slice() {
                [file] => file,
                files => return Err(ChapterError::MultipleFilesInCueSheet(files.len()).into()),
            };
            let audio = cue
                .parent()
                .unwrap_or_else(|| Path::new(""))
                .join(&file.filename);
            probe_file(tools, &audio).await?.duration
        }
    };

    Ok(derive_single(&sheet, total)?)
}

/// Picks the chapter source for a single input, if any needs generating.
async fn cue_chapters(
    file: &FileInfo,
    cuesheet: Option<&Path>,
    auto_chapters: bool,
) -> ConvertResult<Option<Vec<Chapter>>> {
    if let Some(cue) = cuesheet {
        info!("Reading chapters from {}", cue.display());
        let sheet = CueParser::new(cue).parse().await?;
        return Ok(Some(derive_single(&sheet, file.duration)?));
    }

    if auto_chapters && let Some(text) = &file.cuesheet {
        info!("Found embedded cue sheet in {}", file.path.display());
        return Ok(Some(derive_from_cue_text(text, file.duration)?));
    }

    if !file.chapters.is_empty() {
        info!("Found embedded chapter data in {}", file.path.display());
    } else if auto_chapters {
        warn!("Chapters not found for {}", file.path.display());
    }
    Ok(None)
}

/// Builds the ffmpeg invocation for one input.
///
/// A metadata file wins for tags. Chapters come from the metadata file when
/// it carries them, else from a generated chapter file, else from the input.
pub fn plan_single(
    file: &FileInfo,
    metadata: Option<&MetadataSource>,
    chapter_file: Option<&Path>,
    codec: &Codec,
    output: &Path,
) -> FfmpegArgs {
    let mut args = FfmpegArgs::new();
    let audio = args.input(&file.path);

    let args = match metadata {
        Some(source) => {
            let tags = args.metadata_input(&source.path);
            let chapters = match chapter_file {
                _ if source.includes_chapters => tags,
                Some(path) => args.metadata_input(path),
                None => audio,
            };
            args.map_metadata(tags).map_chapters(chapters)
        }
        None => {
            let chapters = chapter_file.map_or(audio, |path| args.metadata_input(path));
            let args = args.map_metadata(audio).map_chapters(chapters);
            match &file.performer {
                Some(performer) => args.arg("-metadata").arg(format!("performer={performer}")),
                None => args,
            }
        }
    };

    args.args(["-map", "0:a"]).codec(codec).output(output)
}

pub async fn convert_single(
    tools: &Tools,
    file: &FileInfo,
    job: &Job,
    codec: &Codec,
    temp_dir: &Path,
) -> ConvertResult<()> {
    info!("Converting single file {}", file.path.display());
    if let Some(performer) = &file.performer {
        info!("Set performer for {} as {performer}", file.path.display());
    }

    let chapter_file: Option<PathBuf> =
        match cue_chapters(file, job.cuesheet.as_deref(), job.auto_chapters()).await? {
            Some(chapters) => {
                let path = temp_dir.join(CHAPTER_FILE);
                write_chapters(&path, &chapters).await?;
                Some(path)
            }
            None => None,
        };

    let args = plan_single(
        file,
        job.metadata.as_ref(),
        chapter_file.as_deref(),
        codec,
        &job.output,
    );
    run_ffmpeg(tools, &args).await
}
