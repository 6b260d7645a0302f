use crate::probe::error::{ProbeError, ProbeResult};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Subset of `ffprobe -of json` output that the pipeline reads.
#[derive(Debug, Clone, Deserialize)]
pub struct FfprobeOutput {
    pub format: FfprobeFormat,
    #[serde(default)]
    pub streams: Vec<FfprobeStream>,
    #[serde(default)]
    pub chapters: Vec<FfprobeChapter>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FfprobeFormat {
    pub duration: Option<String>,
    pub bit_rate: Option<String>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FfprobeStream {
    pub codec_type: Option<String>,
    pub codec_name: Option<String>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FfprobeChapter {
    pub id: i64,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

/// A chapter already present in an input file.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedChapter {
    pub title: Option<String>,
    pub duration_ms: f64,
}

/// Everything the pipeline needs to know about one input file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileInfo {
    pub path: PathBuf,
    pub title: Option<String>,
    pub album: Option<String>,
    pub artist: Option<String>,
    pub performer: Option<String>,
    pub genre: Option<String>,
    pub date: Option<String>,
    pub publisher: Option<String>,
    /// Seconds.
    pub duration: f64,
    /// Bits per second.
    pub bit_rate: Option<u64>,
    pub track: Option<u32>,
    pub disc: Option<u32>,
    pub cuesheet: Option<String>,
    pub chapters: Vec<EmbeddedChapter>,
    pub cover_codec: Option<String>,
}

impl FileInfo {
    pub fn from_probe(path: &Path, probe: FfprobeOutput) -> ProbeResult<Self> {
        let mut tags = lowercase_keys(probe.format.tags);
        if has_extension(path, "opus")
            && let Some(stream) = probe.streams.first()
        {
            tags.extend(lowercase_keys(stream.tags.clone()));
        }

        let duration = probe
            .format
            .duration
            .as_deref()
            .and_then(|d| d.trim().parse::<f64>().ok())
            .ok_or_else(|| ProbeError::MissingDuration(path.to_path_buf()))?;

        let chapters = probe
            .chapters
            .into_iter()
            .map(|chapter| embedded_chapter(path, chapter))
            .collect::<ProbeResult<Vec<_>>>()?;

        let cover_codec = probe
            .streams
            .iter()
            .find(|stream| stream.codec_type.as_deref() == Some("video"))
            .and_then(|stream| stream.codec_name.clone());

        let tag = |key: &str| tags.get(key).cloned();

        Ok(Self {
            path: path.to_path_buf(),
            title: tag("title"),
            album: tag("album"),
            artist: tag("artist"),
            performer: ["performer", "narratedby", "composer", "album_artist"]
                .into_iter()
                .find_map(tag),
            genre: tag("genre"),
            date: tag("date"),
            publisher: tag("publisher"),
            duration,
            bit_rate: probe
                .format
                .bit_rate
                .as_deref()
                .and_then(|b| b.trim().parse::<u64>().ok()),
            track: tags.get("track").and_then(|v| leading_number(v)),
            disc: tags.get("disc").and_then(|v| leading_number(v)),
            cuesheet: tag("cuesheet"),
            chapters,
            cover_codec,
        })
    }

    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
    }

    pub fn is_opus(&self) -> bool {
        has_extension(&self.path, "opus")
    }
}

/// Lowercases keys and drops blank values.
///
/// When several keys differ only in case, the one that sorts first wins.
fn lowercase_keys(tags: HashMap<String, String>) -> HashMap<String, String> {
    let mut present: Vec<_> = tags
        .into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .collect();
    present.sort_by(|(a, _), (b, _)| a.cmp(b));

    let mut lowered = HashMap::with_capacity(present.len());
    for (key, value) in present {
        lowered.entry(key.to_lowercase()).or_insert(value);
    }
    lowered
}

fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(wanted))
}

/// Reads tags such as `3/12` as `3`.
fn leading_number(value: &str) -> Option<u32> {
    let value = value.trim();
    let end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    value[..end].parse().ok()
}

fn embedded_chapter(path: &Path, chapter: FfprobeChapter) -> ProbeResult<EmbeddedChapter> {
    let malformed = || ProbeError::MalformedChapter {
        id: chapter.id,
        path: path.to_path_buf(),
    };
    let start = chapter.start_time.trim().parse::<f64>().map_err(|_| malformed())?;
    let end = chapter.end_time.trim().parse::<f64>().map_err(|_| malformed())?;

    Ok(EmbeddedChapter {
        title: lowercase_keys(chapter.tags.clone()).remove("title"),
        duration_ms: (end - start) * 1000.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe(json: &str) -> FfprobeOutput {
        serde_json::from_str(json).unwrap()
    }

    const M4B: &str = r#"{
        "streams": [
            { "codec_type": "audio", "codec_name": "aac", "tags": { "language": "eng" } },
            { "codec_type": "video", "codec_name": "mjpeg" }
        ],
        "chapters": [
            { "id": 0, "start_time": "0.000000", "end_time": "12.500000", "tags": { "title": "Intro" } },
            { "id": 1, "start_time": "12.500000", "end_time": "30.000000" }
        ],
        "format": {
            "duration": "30.000000",
            "bit_rate": "64000",
            "tags": {
                "TITLE": "Part One",
                "album": "The Book",
                "Artist": "Author",
                "composer": "Narrator",
                "genre": "",
                "track": "3/12",
                "disc": "2",
                "CUESHEET": "FILE a.wav WAVE"
            }
        }
    }"#;

    #[test]
    fn case_colliding_keys_resolve_the_same_way_every_time() {
        let tags = HashMap::from([
            ("title".to_string(), "lower".to_string()),
            ("TITLE".to_string(), "upper".to_string()),
            ("Title".to_string(), "mixed".to_string()),
            ("ALBUM".to_string(), " ".to_string()),
            ("album".to_string(), "kept".to_string()),
        ]);
        let lowered = lowercase_keys(tags);
        assert_eq!(lowered.get("title").map(String::as_str), Some("upper"));
        assert_eq!(lowered.get("album").map(String::as_str), Some("kept"));
        assert_eq!(lowered.len(), 2);
    }

    #[test]
    fn maps_format_tags_case_insensitively() {
        let info = FileInfo::from_probe(Path::new("/books/part1.m4b"), probe(M4B)).unwrap();

        assert_eq!(info.title.as_deref(), Some("Part One"));
        assert_eq!(info.album.as_deref(), Some("The Book"));
        assert_eq!(info.artist.as_deref(), Some("Author"));
        assert_eq!(info.performer.as_deref(), Some("Narrator"));
        assert_eq!(info.genre, None);
        assert_eq!(info.track, Some(3));
        assert_eq!(info.disc, Some(2));
        assert_eq!(info.duration, 30.0);
        assert_eq!(info.bit_rate, Some(64000));
        assert_eq!(info.cuesheet.as_deref(), Some("FILE a.wav WAVE"));
        assert_eq!(info.cover_codec.as_deref(), Some("mjpeg"));
        assert_eq!(info.stem(), "part1");
        assert_eq!(info.extension().as_deref(), Some("m4b"));
    }

    #[test]
    fn embedded_chapter_durations_use_the_interval_length() {
        let info = FileInfo::from_probe(Path::new("part1.m4b"), probe(M4B)).unwrap();
        assert_eq!(
            info.chapters,
            [
                EmbeddedChapter {
                    title: Some("Intro".to_string()),
                    duration_ms: 12_500.0
                },
                EmbeddedChapter {
                    title: None,
                    duration_ms: 17_500.0
                },
            ]
        );
    }

    #[test]
    fn performer_prefers_explicit_tags() {
        let json = r#"{ "format": { "duration": "1", "tags": {
            "album_artist": "Fallback", "narratedby": "Reader", "performer": "" } } }"#;
        let info = FileInfo::from_probe(Path::new("a.mp3"), probe(json)).unwrap();
        assert_eq!(info.performer.as_deref(), Some("Reader"));
    }

    #[test]
    fn opus_stream_tags_override_format_tags() {
        let json = r#"{
            "streams": [ { "codec_type": "audio", "codec_name": "opus", "tags": { "TITLE": "Stream Title", "ARTIST": "Someone" } } ],
            "format": { "duration": "5.5", "tags": { "title": "Container Title" } }
        }"#;
        let info = FileInfo::from_probe(Path::new("a.OPUS"), probe(json)).unwrap();
        assert!(info.is_opus());
        assert_eq!(info.title.as_deref(), Some("Stream Title"));
        assert_eq!(info.artist.as_deref(), Some("Someone"));
        assert_eq!(info.bit_rate, None);
        assert_eq!(info.cover_codec, None);
    }

    #[test]
    fn stream_tags_are_ignored_for_other_containers() {
        let json = r#"{
            "streams": [ { "codec_type": "audio", "tags": { "title": "Stream Title" } } ],
            "format": { "duration": "1" }
        }"#;
        let info = FileInfo::from_probe(Path::new("a.mp3"), probe(json)).unwrap();
        assert_eq!(info.title, None);
    }

    #[test]
    fn missing_duration_is_an_error() {
        let json = r#"{ "format": { "tags": {} } }"#;
        assert!(matches!(
            FileInfo::from_probe(Path::new("a.mp3"), probe(json)),
            Err(ProbeError::MissingDuration(_))
        ));
    }

    #[test]
    fn unreadable_chapter_times_are_errors() {
        let json = r#"{ "format": { "duration": "1" },
            "chapters": [ { "id": 7, "start_time": "0", "end_time": "N/A" } ] }"#;
        assert!(matches!(
            FileInfo::from_probe(Path::new("a.m4b"), probe(json)),
            Err(ProbeError::MalformedChapter { id: 7, .. })
        ));
    }

    #[test]
    fn leading_number_reads_prefixes() {
        assert_eq!(leading_number("3/12"), Some(3));
        assert_eq!(leading_number(" 07 "), Some(7));
        assert_eq!(leading_number("A1"), None);
        assert_eq!(leading_number(""), None);
    }
}
