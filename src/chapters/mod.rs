//! Chapter timelines derived from cue sheets or from a list of probed files.

pub mod error;
pub mod ffmetadata;
pub mod multi;
pub mod single;

pub use multi::{AggregateMetadata, derive_from_files};
pub use single::{derive_from_cue_text, derive_single};

#[derive(Debug, Clone, PartialEq)]
pub struct Chapter {
    pub title: String,
    pub duration_ms: f64,
}

impl Chapter {
    pub fn new(title: impl Into<String>, duration_ms: f64) -> Self {
        Self {
            title: title.into(),
            duration_ms,
        }
    }
}

/// A chapter placed on the output timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterMark {
    pub title: String,
    pub start_ms: f64,
    pub end_ms: f64,
}

/// Lays chapters end to end starting at zero.
pub fn timeline(chapters: &[Chapter]) -> Vec<ChapterMark> {
    chapters
        .iter()
        .scan(0.0, |cursor: &mut f64, chapter| {
            let start_ms = *cursor;
            *cursor += chapter.duration_ms;
            Some(ChapterMark {
                title: chapter.title.clone(),
                start_ms,
                end_ms: *cursor,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn timeline_prefix_sums_durations() {
        let marks = timeline(&[
            Chapter::new("One", 100_000.0),
            Chapter::new("Two", 200_000.0),
            Chapter::new("Three", 50_000.0),
        ]);

        let bounds: Vec<(f64, f64)> = marks.iter().map(|m| (m.start_ms, m.end_ms)).collect();
        assert_eq!(
            bounds,
            [(0.0, 100_000.0), (100_000.0, 300_000.0), (300_000.0, 350_000.0)]
        );
        assert_eq!(marks[2].title, "Three");
    }

    #[test]
    fn empty_timeline() {
        assert!(timeline(&[]).is_empty());
    }

    proptest! {
        #[test]
        fn timeline_is_contiguous_from_zero(durations in prop::collection::vec(0.0f64..1e8, 1..50)) {
            let chapters: Vec<Chapter> = durations
                .iter()
                .enumerate()
                .map(|(i, d)| Chapter::new(format!("Chapter {}", i + 1), *d))
                .collect();
            let marks = timeline(&chapters);

            prop_assert_eq!(marks.len(), chapters.len());
            prop_assert_eq!(marks[0].start_ms, 0.0);
            for pair in marks.windows(2) {
                prop_assert_eq!(pair[0].end_ms, pair[1].start_ms);
            }
            for mark in &marks {
                prop_assert!(mark.end_ms >= mark.start_ms);
            }
        }
    }
}
