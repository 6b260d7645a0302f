use crate::chapters::Chapter;
use crate::chapters::error::{ChapterError, ChapterResult};
use crate::cue::models::Cuesheet;
use crate::cue::parse_cue_str;

/// Splits the single file of a cue sheet into one chapter per track.
///
/// Every chapter runs from its track's `INDEX 01` to the next track's. Audio
/// before the first track's `INDEX 01` belongs to the first chapter. The last
/// track only yields a chapter when `total_seconds` lies past its start.
pub fn derive_single(sheet: &Cuesheet, total_seconds: f64) -> ChapterResult<Vec<Chapter>> {
    let file = match sheet.files.as_slice() {
        [] => return Err(ChapterError::NoChapters),
        [file] => file,
        files => return Err(ChapterError::MultipleFilesInCueSheet(files.len())),
    };
    let tracks = &file.tracks;

    let mut chapters = Vec::with_capacity(tracks.len());
    let mut start = 0.0;

    for pair in tracks.windows(2) {
        let (current, next) = (&pair[0], &pair[1]);
        if next.start() < current.start() {
            return Err(ChapterError::TrackStartsOutOfOrder { track: next.number });
        }

        chapters.push(Chapter::new(
            current.effective_title(),
            to_ms(next.start()) - to_ms(start),
        ));
        start = next.start();
    }

    if let Some(last) = tracks.last()
        && total_seconds > last.start()
    {
        chapters.push(Chapter::new(
            last.effective_title(),
            to_ms(total_seconds) - to_ms(start),
        ));
    }

    if chapters.is_empty() {
        return Err(ChapterError::NoChapters);
    }

    Ok(chapters)
}

/// Parses `text` and derives its chapters in one go.
pub fn derive_from_cue_text(text: &str, total_seconds: f64) -> ChapterResult<Vec<Chapter>> {
    let sheet = parse_cue_str(text)?;
    derive_single(&sheet, total_seconds)
}

fn to_ms(seconds: f64) -> f64 {
    seconds * 1000.0
}
