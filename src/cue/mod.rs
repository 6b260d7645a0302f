use crate::cue::error::CueResult;
use crate::cue::models::{CueFile, Cuesheet, Track};
use std::path::{Path, PathBuf};

pub mod error;
pub mod grammar;
pub mod interpreter;
pub mod lexer;
pub mod models;
pub mod time;

/// Parses and validates a complete cue sheet.
pub fn parse_cue_str(text: &str) -> CueResult<Cuesheet> {
    interpreter::interpret_sheet(&grammar::parse_sheet(text)?)
}

/// Parses a single `FILE` block with its tracks.
pub fn parse_file_block(text: &str) -> CueResult<CueFile> {
    interpreter::interpret_file(&grammar::parse_file(text)?)
}

/// Parses a single `TRACK` block.
pub fn parse_track_block(text: &str) -> CueResult<Track> {
    interpreter::interpret_track(&grammar::parse_track(text)?)
}

pub struct CueParser {
    cue_path: PathBuf,
}

impl CueParser {
    pub fn new(cue_path: impl AsRef<Path>) -> Self {
        Self {
            cue_path: cue_path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.cue_path
    }

    /// Reads the sheet from disk. Bytes that aren't valid UTF-8 are replaced
    /// rather than rejected since rippers disagree on encodings.
    pub async fn parse(&self) -> CueResult<Cuesheet> {
        let data = tokio::fs::read(&self.cue_path).await?;
        let text = String::from_utf8_lossy(&data);
        parse_cue_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cue::error::CueError;
    use std::io::Write;

    const BOOK: &str = r#"REM GENRE Audiobook
REM DATE 2019
PERFORMER "Some Narrator"
TITLE "A Long Book"
FILE "book.wav" WAVE
  TRACK 01 AUDIO
    TITLE "Opening"
    INDEX 01 00:00:00
  TRACK 02 AUDIO
    TITLE "Middle"
    INDEX 00 03:28:00
    INDEX 01 03:30:00
  TRACK 03 AUDIO
    INDEX 01 65:00:00
"#;

    #[test]
    fn parses_a_complete_sheet() {
        let sheet = parse_cue_str(BOOK).unwrap();
        assert_eq!(sheet.title.as_deref(), Some("A Long Book"));
        assert_eq!(sheet.performer.as_deref(), Some("Some Narrator"));
        assert_eq!(sheet.rems.first("GENRE"), Some("Audiobook"));
        assert_eq!(sheet.rems.first("DATE"), Some("2019"));
        assert_eq!(sheet.files.len(), 1);

        let tracks = &sheet.files[0].tracks;
        assert_eq!(tracks.len(), 3);
        assert_eq!(tracks[1].start(), 210.0);
        assert_eq!(tracks[1].indices.get(&0), Some(&208.0));
        assert_eq!(tracks[2].start(), 3900.0);
        assert_eq!(tracks[2].effective_title(), "Chapter 3");
    }

    #[test]
    fn block_entry_points_parse_fragments() {
        let file = parse_file_block("FILE part.mp3 MP3\nTRACK 04 AUDIO\nINDEX 01 00:00:00\n").unwrap();
        assert_eq!(file.filename, "part.mp3");
        assert_eq!(file.tracks[0].number, 4);

        let track = parse_track_block("TRACK 09 AUDIO\nINDEX 01 01:00:00\n").unwrap();
        assert_eq!(track.start(), 60.0);
    }

    #[test]
    fn syntax_errors_surface_before_validation() {
        let err = parse_cue_str("FILE a.wav WAVE\nTRACK 01 AUDIO\nINDEX 01 00:99:00\n").unwrap_err();
        assert!(matches!(err, CueError::Syntax { line: 3, .. }));
    }

    #[tokio::test]
    async fn cue_parser_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(BOOK.as_bytes()).unwrap();

        let parser = CueParser::new(file.path());
        let sheet = parser.parse().await.unwrap();
        assert_eq!(sheet.files[0].filename, "book.wav");
    }

    #[tokio::test]
    async fn cue_parser_tolerates_invalid_utf8() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"TITLE \"Caf\xe9\"\nFILE a.wav WAVE\nTRACK 01 AUDIO\nINDEX 01 00:00:00\n")
            .unwrap();

        let sheet = CueParser::new(file.path()).parse().await.unwrap();
        assert!(sheet.title.unwrap().starts_with("Caf"));
    }

    #[tokio::test]
    async fn cue_parser_reports_missing_files() {
        let err = CueParser::new("/definitely/not/here.cue")
            .parse()
            .await
            .unwrap_err();
        assert!(matches!(err, CueError::IoError(_)));
    }
}
