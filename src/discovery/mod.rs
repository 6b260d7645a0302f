use crate::discovery::error::{DiscoveryError, DiscoveryResult};
use async_recursion::async_recursion;
use std::path::{Path, PathBuf};
use tokio::fs;

pub mod error;

pub const AUDIO_EXTENSIONS: [&str; 8] = ["mp3", "m4a", "m4b", "ogg", "flac", "wav", "aiff", "opus"];
pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "tiff", "gif"];

pub fn is_audio_file(path: &Path) -> bool {
    has_extension_in(path, &AUDIO_EXTENSIONS)
}

pub fn is_image_file(path: &Path) -> bool {
    has_extension_in(path, &IMAGE_EXTENSIONS)
}

fn has_extension_in(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

async fn read_sorted(dir_path: &Path) -> DiscoveryResult<Vec<PathBuf>> {
    let mut dir = fs::read_dir(dir_path).await?;
    let mut entries = Vec::new();
    while let Some(entry) = dir.next_entry().await? {
        entries.push(entry.path());
    }
    entries.sort();
    Ok(entries)
}

#[async_recursion]
async fn collect_audio_files(dir_path: &Path) -> DiscoveryResult<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in read_sorted(dir_path).await? {
        if path.is_dir() {
            files.append(&mut collect_audio_files(&path).await?);
        } else if is_audio_file(&path) {
            files.push(path);
        }
    }

    Ok(files)
}

/// Replaces every directory in `inputs` with the audio files below it.
///
/// Plain files are passed through untouched, whatever their extension.
pub async fn expand_inputs(inputs: &[PathBuf]) -> DiscoveryResult<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let found = collect_audio_files(input).await?;
            if found.is_empty() {
                return Err(DiscoveryError::NoAudioFiles(input.clone()));
            }
            files.extend(found);
        } else {
            files.push(input.clone());
        }
    }

    Ok(files)
}

/// Finds the folders below `root` that hold one book each.
///
/// A folder holding only files is a book when any of them is audio. Folders
/// with subfolders are searched further and never count as books themselves.
#[async_recursion]
pub async fn find_book_folders(root: &Path) -> DiscoveryResult<Vec<PathBuf>> {
    let entries = read_sorted(root).await?;

    let (dirs, files): (Vec<PathBuf>, Vec<PathBuf>) =
        entries.into_iter().partition(|path| path.is_dir());

    if dirs.is_empty() {
        return Ok(if files.iter().any(|file| is_audio_file(file)) {
            vec![root.to_path_buf()]
        } else {
            Vec::new()
        });
    }

    let mut books = Vec::new();
    for dir in dirs {
        books.append(&mut find_book_folders(&dir).await?);
    }
    Ok(books)
}
