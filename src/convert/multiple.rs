use crate::chapters::ffmetadata::{write_chapters, write_metadata};
use crate::chapters::{AggregateMetadata, derive_from_files};
use crate::config::Tools;
use crate::convert::Job;
use crate::convert::error::ConvertResult;
use crate::convert::ffmpeg::{Codec, FfmpegArgs, run_ffmpeg};
use crate::probe::models::FileInfo;
use log::{debug, info};
use std::path::{Path, PathBuf};

const METADATA_FILE: &str = "metadata.ffmeta";
const CHAPTER_FILE: &str = "chapters.ffmeta";
const CONCAT_LIST: &str = "inputs.txt";

/// Input list for ffmpeg's concat demuxer.
pub fn concat_list(files: &[FileInfo]) -> String {
    files
        .iter()
        .map(|file| {
            let path = file.path.to_string_lossy().replace('\'', "'\\''");
            format!("file '{path}'\n")
        })
        .collect()
}

pub fn same_extension(files: &[FileInfo]) -> bool {
    let mut extensions = files.iter().map(FileInfo::extension);
    match extensions.next() {
        Some(first) => extensions.all(|ext| ext == first),
        None => true,
    }
}

/// Joins inputs that share a container through the concat demuxer.
pub fn plan_concat_demuxer(
    list: &Path,
    metadata: &Path,
    chapters: Option<&Path>,
    codec: &Codec,
    output: &Path,
) -> FfmpegArgs {
    let mut args = FfmpegArgs::new();
    let audio = args.concat_input(list);
    let tags = args.metadata_input(metadata);
    let chapters = chapters.map_or(tags, |path| args.metadata_input(path));

    args.map_metadata(tags)
        .map_chapters(chapters)
        .arg("-map")
        .arg(format!("{audio}:a"))
        .codec(codec)
        .output(output)
}

/// Joins inputs of different containers through the concat filter.
pub fn plan_concat_filter(
    files: &[FileInfo],
    metadata: &Path,
    chapters: Option<&Path>,
    codec: &Codec,
    output: &Path,
) -> FfmpegArgs {
    let mut args = FfmpegArgs::new();
    for file in files {
        args.input(&file.path);
    }
    let tags = args.metadata_input(metadata);
    let chapters = chapters.map_or(tags, |path| args.metadata_input(path));

    let streams: String = (0..files.len()).map(|i| format!("[{i}:a:0]")).collect();
    let graph = format!("{streams}concat={}:v=0:a=1[outa]", files.len());

    args.arg("-filter_complex")
        .arg(graph)
        .args(["-map", "[outa]"])
        .map_metadata(tags)
        .map_chapters(chapters)
        .codec(codec)
        .output(output)
}

pub async fn convert_multiple(
    tools: &Tools,
    files: &[FileInfo],
    job: &Job,
    codec: &Codec,
    temp_dir: &Path,
) -> ConvertResult<()> {
    info!("Merging {} files into {}", files.len(), job.output.display());

    let metadata: PathBuf = match &job.metadata {
        Some(source) => source.path.clone(),
        None => {
            let aggregate = AggregateMetadata::from_files(files);
            debug!("Found metadata {aggregate:?}");
            let path = temp_dir.join(METADATA_FILE);
            write_metadata(&path, &aggregate).await?;
            path
        }
    };

    let chapters: Option<PathBuf> = if job.auto_chapters() {
        let chapters = derive_from_files(files)?;
        info!("Found {} chapters", chapters.len());
        let path = temp_dir.join(CHAPTER_FILE);
        write_chapters(&path, &chapters).await?;
        Some(path)
    } else {
        None
    };

    let args = if same_extension(files) {
        info!("All files have the same extension, using the concat demuxer");
        let list = temp_dir.join(CONCAT_LIST);
        tokio::fs::write(&list, concat_list(files)).await?;
        plan_concat_demuxer(&list, &metadata, chapters.as_deref(), codec, &job.output)
    } else {
        info!("Heterogeneous inputs, using the concat filter");
        plan_concat_filter(files, &metadata, chapters.as_deref(), codec, &job.output)
    };

    run_ffmpeg(tools, &args).await
}
