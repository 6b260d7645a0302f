//! Cover art for the finished output.
//!
//! ffmpeg cannot mux pictures into Ogg Opus, so covers are written into the
//! Vorbis comments with lofty after encoding.

use crate::config::Tools;
use crate::convert::error::{ConvertError, ConvertResult};
use crate::convert::ffmpeg::{FfmpegArgs, run_ffmpeg};
use crate::discovery::is_image_file;
use crate::probe::models::FileInfo;
use lofty::config::WriteOptions;
use lofty::file::TaggedFileExt;
use lofty::picture::{Picture, PictureType};
use lofty::probe::Probe;
use lofty::tag::{Tag, TagExt};
use log::{debug, info};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverStatus {
    NoneFound,
    AttachmentFailed,
    Success,
}

/// File extension for an image stream of the given codec.
pub fn extension_for_codec(codec: &str) -> &str {
    match codec {
        "mjpeg" => "jpeg",
        other => other,
    }
}

async fn extract_embedded(
    tools: &Tools,
    file: &FileInfo,
    codec: &str,
    temp_dir: &Path,
) -> ConvertResult<PathBuf> {
    info!("Extracting cover from {}", file.path.display());
    let image = temp_dir.join(format!("{}.{}", file.stem(), extension_for_codec(codec)));

    let mut args = FfmpegArgs::new();
    args.input(&file.path);
    let args = args
        .args(["-map", "0:v:0", "-vcodec", "copy"])
        .output(&image);
    run_ffmpeg(tools, &args).await?;

    Ok(image)
}

async fn first_image_beside(files: &[FileInfo]) -> ConvertResult<Option<PathBuf>> {
    for file in files {
        let Some(dir) = file.path.parent() else {
            continue;
        };

        let mut entries = tokio::fs::read_dir(dir).await?;
        let mut images = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if is_image_file(&path) && path.is_file() {
                images.push(path);
            }
        }
        images.sort();

        if let Some(image) = images.into_iter().next() {
            return Ok(Some(image));
        }
    }
    Ok(None)
}

/// Finds a cover: an embedded picture first, then an image next to the inputs.
pub async fn discover_cover(
    tools: &Tools,
    files: &[FileInfo],
    temp_dir: &Path,
) -> ConvertResult<Option<PathBuf>> {
    debug!("Discovering cover");
    if let Some((file, codec)) = files
        .iter()
        .find_map(|file| file.cover_codec.as_deref().map(|codec| (file, codec)))
    {
        return extract_embedded(tools, file, codec, temp_dir).await.map(Some);
    }

    debug!("Searching for a cover next to the inputs");
    first_image_beside(files).await
}

/// Embeds `image` as the front cover of `output`.
pub async fn attach_cover(output: &Path, image: &Path) -> ConvertResult<()> {
    if !is_image_file(image) {
        return Err(ConvertError::UnsupportedCoverFormat(image.to_path_buf()));
    }

    let output = output.to_path_buf();
    let image = image.to_path_buf();

    tokio::task::spawn_blocking(move || -> ConvertResult<()> {
        let mut reader = BufReader::new(File::open(&image)?);
        let mut picture = Picture::from_reader(&mut reader)?;
        picture.set_pic_type(PictureType::CoverFront);

        let tagged_file = Probe::open(&output)?.read()?;
        let tag_type = tagged_file.primary_tag_type();
        let mut tag = tagged_file
            .tag(tag_type)
            .cloned()
            .unwrap_or_else(|| Tag::new(tag_type));

        tag.push_picture(picture);
        tag.save_to_path(&output, WriteOptions::default())?;
        Ok(())
    })
    .await?
}

pub async fn attempt_attach_cover(
    tools: &Tools,
    files: &[FileInfo],
    output: &Path,
    explicit: Option<&Path>,
    temp_dir: &Path,
) -> CoverStatus {
    let image = match explicit {
        Some(image) => Some(image.to_path_buf()),
        None => match discover_cover(tools, files, temp_dir).await {
            Ok(image) => image,
            Err(e) => {
                debug!("Cover discovery failed: {e}");
                return CoverStatus::AttachmentFailed;
            }
        },
    };

    let Some(image) = image else {
        return CoverStatus::NoneFound;
    };

    info!("Attaching {} to {}", image.display(), output.display());
    match attach_cover(output, &image).await {
        Ok(()) => CoverStatus::Success,
        Err(e) => {
            debug!("Cover attachment failed: {e}");
            CoverStatus::AttachmentFailed
        }
    }
}
