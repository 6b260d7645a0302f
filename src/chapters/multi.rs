use crate::chapters::Chapter;
use crate::chapters::error::{ChapterError, ChapterResult};
use crate::probe::models::FileInfo;

/// Book-level tags merged across the inputs of a concatenation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub performer: Option<String>,
    pub genre: Option<String>,
    pub date: Option<String>,
    pub publisher: Option<String>,
}

impl AggregateMetadata {
    /// Keeps, per field, the first non-blank value any file provides.
    pub fn from_files(files: &[FileInfo]) -> Self {
        files
            .iter()
            .fold(Self::default(), |acc, file| acc.or(Self::of_file(file)))
    }

    fn of_file(file: &FileInfo) -> Self {
        let present = |value: &Option<String>| value.clone().filter(|v| !v.trim().is_empty());
        Self {
            title: present(&file.album),
            artist: present(&file.artist),
            performer: present(&file.performer),
            genre: present(&file.genre),
            date: present(&file.date),
            publisher: present(&file.publisher),
        }
    }

    fn or(self, other: Self) -> Self {
        Self {
            title: self.title.or(other.title),
            artist: self.artist.or(other.artist),
            performer: self.performer.or(other.performer),
            genre: self.genre.or(other.genre),
            date: self.date.or(other.date),
            publisher: self.publisher.or(other.publisher),
        }
    }

    /// Present fields as FFMETADATA keys, in a fixed order.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            ("title", &self.title),
            ("artist", &self.artist),
            ("performer", &self.performer),
            ("genre", &self.genre),
            ("date", &self.date),
            ("publisher", &self.publisher),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_deref().map(|value| (key, value)))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

/// Chapters for one input file of a concatenation.
pub fn chapters_of_file(file: &FileInfo) -> Vec<Chapter> {
    if !file.chapters.is_empty() {
        let prefix = file.title.clone().unwrap_or_else(|| file.stem());
        return file
            .chapters
            .iter()
            .enumerate()
            .map(|(idx, chapter)| {
                let name = match &chapter.title {
                    Some(title) => title.clone(),
                    None => format!("Chapter {}", idx + 1),
                };
                Chapter::new(format!("{prefix} - {name}"), chapter.duration_ms)
            })
            .collect();
    }

    let title = file.title.clone().unwrap_or_else(|| file.stem());
    vec![Chapter::new(title, file.duration * 1000.0)]
}

/// Concatenates the chapters of every file in order.
pub fn derive_from_files(files: &[FileInfo]) -> ChapterResult<Vec<Chapter>> {
    let chapters: Vec<Chapter> = files.iter().flat_map(chapters_of_file).collect();
    if chapters.is_empty() {
        return Err(ChapterError::NoChapters);
    }
    Ok(chapters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chapters::timeline;
    use crate::probe::models::EmbeddedChapter;
    use std::path::PathBuf;

    fn file(name: &str, duration: f64) -> FileInfo {
        FileInfo {
            path: PathBuf::from(format!("/book/{name}")),
            duration,
            ..FileInfo::default()
        }
    }

    #[test]
    fn blank_tags_do_not_win_a_field() {
        let first = FileInfo {
            album: Some(String::new()),
            artist: Some("  ".to_string()),
            ..file("01.mp3", 1.0)
        };
        let second = FileInfo {
            album: Some("Collected".to_string()),
            artist: Some("Writer".to_string()),
            ..file("02.mp3", 1.0)
        };

        let metadata = AggregateMetadata::from_files(&[first, second]);
        assert_eq!(metadata.title.as_deref(), Some("Collected"));
        assert_eq!(metadata.artist.as_deref(), Some("Writer"));
        assert_eq!(metadata.genre, None);
    }

    #[test]
    fn three_files_follow_the_expansion_rules() {
        let first = FileInfo {
            title: Some("Intro".to_string()),
            ..file("01.mp3", 100.0)
        };
        let second = FileInfo {
            chapters: vec![
                EmbeddedChapter {
                    title: Some("X".to_string()),
                    duration_ms: 120_000.0,
                },
                EmbeddedChapter {
                    title: None,
                    duration_ms: 80_000.0,
                },
            ],
            ..file("Part2.m4b", 200.0)
        };
        let third = file("03 outro.mp3", 50.0);

        let chapters = derive_from_files(&[first, second, third]).unwrap();
        let titles: Vec<&str> = chapters.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(
            titles,
            ["Intro", "Part2 - X", "Part2 - Chapter 2", "03 outro"]
        );

        let starts: Vec<f64> = timeline(&chapters).iter().map(|m| m.start_ms).collect();
        assert_eq!(starts, [0.0, 100_000.0, 220_000.0, 300_000.0]);
        assert_eq!(timeline(&chapters)[3].end_ms, 350_000.0);
    }

    #[test]
    fn one_chapter_per_plain_file() {
        let files = [
            file("a.mp3", 100.0),
            file("b.mp3", 200.0),
            file("c.mp3", 50.0),
        ];
        let marks = timeline(&derive_from_files(&files).unwrap());
        let bounds: Vec<(f64, f64)> = marks.iter().map(|m| (m.start_ms, m.end_ms)).collect();
        assert_eq!(
            bounds,
            [(0.0, 100_000.0), (100_000.0, 300_000.0), (300_000.0, 350_000.0)]
        );
        assert_eq!(marks[1].title, "b");
    }

    #[test]
    fn embedded_chapters_prefer_the_file_title() {
        let info = FileInfo {
            title: Some("Book".to_string()),
            chapters: vec![EmbeddedChapter {
                title: None,
                duration_ms: 1.0,
            }],
            ..file("a.m4b", 1.0)
        };
        assert_eq!(chapters_of_file(&info)[0].title, "Book - Chapter 1");
    }

    #[test]
    fn no_files_means_no_chapters() {
        assert!(matches!(
            derive_from_files(&[]),
            Err(ChapterError::NoChapters)
        ));
    }

    #[test]
    fn aggregate_keeps_first_value_per_field() {
        let files = [
            FileInfo {
                album: Some("The Book".to_string()),
                title: Some("Part 1".to_string()),
                ..file("1.mp3", 1.0)
            },
            FileInfo {
                album: Some("Other".to_string()),
                artist: Some("Author".to_string()),
                genre: Some("Fantasy".to_string()),
                ..file("2.mp3", 1.0)
            },
            FileInfo {
                artist: Some("Someone Else".to_string()),
                date: Some("2001".to_string()),
                ..file("3.mp3", 1.0)
            },
        ];

        let meta = AggregateMetadata::from_files(&files);
        assert_eq!(
            meta,
            AggregateMetadata {
                title: Some("The Book".to_string()),
                artist: Some("Author".to_string()),
                performer: None,
                genre: Some("Fantasy".to_string()),
                date: Some("2001".to_string()),
                publisher: None,
            }
        );
        assert_eq!(
            meta.entries(),
            [
                ("title", "The Book"),
                ("artist", "Author"),
                ("genre", "Fantasy"),
                ("date", "2001")
            ]
        );
    }

    #[test]
    fn aggregate_of_untagged_files_is_empty() {
        let meta = AggregateMetadata::from_files(&[file("a.mp3", 1.0)]);
        assert!(meta.is_empty());
    }
}
