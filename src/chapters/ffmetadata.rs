//! Writers for ffmpeg's `;FFMETADATA1` side files.

use crate::chapters::error::ChapterResult;
use crate::chapters::multi::AggregateMetadata;
use crate::chapters::{Chapter, timeline};
use log::debug;
use std::fmt::Write as _;
use std::path::Path;

pub const HEADER: &str = ";FFMETADATA1";

/// Backslash-escapes the characters FFMETADATA treats as syntax.
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '=' | ';' | '#' | '\\' | '\n') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Renders chapters laid end to end, in whole milliseconds.
///
/// ffmpeg reads `START`/`END` as integers, so boundaries are rounded. Shared
/// boundaries round identically and stay contiguous.
pub fn render_chapters(chapters: &[Chapter]) -> String {
    let mut out = format!("{HEADER}\n");
    for mark in timeline(chapters) {
        let _ = write!(
            out,
            "[CHAPTER]\nTIMEBASE=1/1000\nSTART={}\nEND={}\ntitle={}\n",
            mark.start_ms.round() as i64,
            mark.end_ms.round() as i64,
            escape(&mark.title)
        );
    }
    out
}

pub fn render_metadata(metadata: &AggregateMetadata) -> String {
    let mut out = format!("{HEADER}\n");
    for (key, value) in metadata.entries() {
        let _ = writeln!(out, "{key}={}", escape(value));
    }
    out
}

pub async fn write_chapters(path: &Path, chapters: &[Chapter]) -> ChapterResult<()> {
    debug!("Writing {} chapters to {}", chapters.len(), path.display());
    tokio::fs::write(path, render_chapters(chapters)).await?;
    Ok(())
}

pub async fn write_metadata(path: &Path, metadata: &AggregateMetadata) -> ChapterResult<()> {
    debug!("Writing metadata to {}", path.display());
    tokio::fs::write(path, render_metadata(metadata)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_contiguous_chapters() {
        let text = render_chapters(&[
            Chapter::new("A", 210_000.0),
            Chapter::new("B", 190_000.0),
        ]);
        assert_eq!(
            text,
            ";FFMETADATA1\n\
             [CHAPTER]\nTIMEBASE=1/1000\nSTART=0\nEND=210000\ntitle=A\n\
             [CHAPTER]\nTIMEBASE=1/1000\nSTART=210000\nEND=400000\ntitle=B\n"
        );
    }

    #[test]
    fn frame_accurate_boundaries_round_to_milliseconds() {
        let text = render_chapters(&[
            Chapter::new("A", 62.2 * 1000.0),
            Chapter::new("B", 1000.0 / 75.0),
        ]);
        assert!(text.contains("END=62200\n"), "{text}");
        assert!(text.contains("START=62200\nEND=62213\n"), "{text}");
    }

    #[test]
    fn escapes_special_characters() {
        assert_eq!(escape("a=b;c#d\\e"), "a\\=b\\;c\\#d\\\\e");
        assert_eq!(escape("two\nlines"), "two\\\nlines");
        assert_eq!(escape("Plain title"), "Plain title");
    }

    #[test]
    fn empty_chapter_list_is_just_the_header() {
        assert_eq!(render_chapters(&[]), ";FFMETADATA1\n");
    }

    #[test]
    fn metadata_lists_present_fields_only() {
        let metadata = AggregateMetadata {
            title: Some("Book; Vol. 1".to_string()),
            publisher: Some("House".to_string()),
            ..AggregateMetadata::default()
        };
        assert_eq!(
            render_metadata(&metadata),
            ";FFMETADATA1\ntitle=Book\\; Vol. 1\npublisher=House\n"
        );
    }

    #[tokio::test]
    async fn writes_files_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let chapters_path = dir.path().join("chapters.txt");
        let metadata_path = dir.path().join("metadata.txt");

        write_chapters(&chapters_path, &[Chapter::new("Only", 1500.0)])
            .await
            .unwrap();
        write_metadata(&metadata_path, &AggregateMetadata::default())
            .await
            .unwrap();

        let chapters = std::fs::read_to_string(&chapters_path).unwrap();
        assert!(chapters.ends_with("START=0\nEND=1500\ntitle=Only\n"));
        assert_eq!(
            std::fs::read_to_string(&metadata_path).unwrap(),
            ";FFMETADATA1\n"
        );
    }
}
