//! Builds the validated cue sheet model from a syntax tree.

use crate::cue::error::{CueError, CueResult, Scope, Violation};
use crate::cue::grammar::{Directive, FileItem, FileNode, Line, SheetItem, SheetNode, TrackNode};
use crate::cue::models::{CueFile, Cuesheet, FileType, Remarks, Track, TrackFlags, TrackType};
use std::collections::BTreeMap;

pub fn interpret_sheet(node: &SheetNode) -> CueResult<Cuesheet> {
    let scope = ScopeRef {
        scope: Scope::Cuesheet,
        node: "CUESHEET".to_string(),
    };

    let mut catalog = None;
    let mut cdtextfile = None;
    let mut performer = None;
    let mut title = None;
    let mut rems = Remarks::default();
    let mut files: Vec<CueFile> = Vec::new();

    for item in &node.body {
        match item {
            SheetItem::Line(line) => match &line.directive {
                Directive::Catalog(value) => scope.set_once(&mut catalog, value, "CATALOG", line)?,
                Directive::CdTextFile(value) => {
                    scope.set_once(&mut cdtextfile, value, "CDTEXTFILE", line)?
                }
                Directive::Performer(value) => {
                    scope.set_once(&mut performer, value, "PERFORMER", line)?
                }
                Directive::Title(value) => scope.set_once(&mut title, value, "TITLE", line)?,
                Directive::Rem { key, value } => rems.push(key, value),
                other => return Err(misplaced(other, line)),
            },
            SheetItem::File(file_node) => {
                let file = interpret_file(file_node)?;
                let first = file.tracks[0].number;
                let expected = files
                    .last()
                    .and_then(|previous| previous.tracks.last())
                    .map_or(Some(1), |track| track.number.checked_add(1));

                if files.is_empty() && first != 1 {
                    return Err(scope.violation(Violation::FirstTrackNotOne(first)));
                }
                if expected != Some(first) {
                    return Err(scope.violation(Violation::TrackOutOfOrder {
                        expected: expected.unwrap_or(u32::MAX),
                        found: first,
                    }));
                }
                files.push(file);
            }
        }
    }

    if files.is_empty() {
        return Err(scope.violation(Violation::EmptySheet));
    }

    Ok(Cuesheet {
        catalog,
        cdtextfile,
        performer,
        title,
        rems,
        files,
    })
}

pub fn interpret_file(node: &FileNode) -> CueResult<CueFile> {
    let scope = ScopeRef {
        scope: Scope::File,
        node: format!("FILE \"{}\" (line {})", node.name, node.line),
    };
    let file_type = parse_file_type(&node.file_type)?;

    let mut performer = None;
    let mut title = None;
    let mut rems = Remarks::default();
    let mut tracks: Vec<Track> = Vec::new();

    for item in &node.body {
        match item {
            FileItem::Line(line) => match &line.directive {
                Directive::Performer(value) => {
                    scope.set_once(&mut performer, value, "PERFORMER", line)?
                }
                Directive::Title(value) => scope.set_once(&mut title, value, "TITLE", line)?,
                Directive::Rem { key, value } => rems.push(key, value),
                other => return Err(misplaced(other, line)),
            },
            FileItem::Track(track_node) => {
                let track = interpret_track(track_node)?;
                if let Some(previous) = tracks.last()
                    && previous.number.checked_add(1) != Some(track.number)
                {
                    return Err(scope.violation(Violation::TrackOutOfOrder {
                        expected: previous.number.saturating_add(1),
                        found: track.number,
                    }));
                }
                tracks.push(track);
            }
        }
    }

    if tracks.is_empty() {
        return Err(scope.violation(Violation::EmptyFile));
    }

    Ok(CueFile {
        filename: node.name.clone(),
        file_type,
        performer,
        title,
        rems,
        tracks,
    })
}

pub fn interpret_track(node: &TrackNode) -> CueResult<Track> {
    let scope = ScopeRef {
        scope: Scope::Track,
        node: format!("TRACK {:02} (line {})", node.number, node.line),
    };
    let track_type = parse_track_type(&node.track_type)?;

    let mut title = None;
    let mut performer = None;
    let mut isrc = None;
    let mut pregap = None;
    let mut postgap = None;
    let mut flags = TrackFlags::empty();
    let mut rems = Remarks::default();
    let mut indices = BTreeMap::new();

    for line in &node.body {
        match &line.directive {
            Directive::Title(value) => scope.set_once(&mut title, value, "TITLE", line)?,
            Directive::Performer(value) => {
                scope.set_once(&mut performer, value, "PERFORMER", line)?
            }
            Directive::Isrc(value) => scope.set_once(&mut isrc, value, "ISRC", line)?,
            Directive::Rem { key, value } => rems.push(key, value),
            Directive::Flags(values) => {
                flags = values.iter().fold(flags, |acc, value| acc | parse_flag(value));
            }
            Directive::Index { number, time } => {
                if indices.insert(*number, time.to_seconds()).is_some() {
                    return Err(scope.violation(Violation::DuplicateIndex {
                        number: *number,
                        line: line.number,
                    }));
                }
            }
            Directive::Pregap(time) => {
                scope.set_once(&mut pregap, &time.to_seconds(), "PREGAP", line)?
            }
            Directive::Postgap(time) => {
                scope.set_once(&mut postgap, &time.to_seconds(), "POSTGAP", line)?
            }
            other => return Err(misplaced(other, line)),
        }
    }

    if !indices.contains_key(&1) {
        return Err(scope.violation(Violation::MissingIndex01));
    }

    Ok(Track {
        number: node.number,
        track_type,
        title,
        performer,
        isrc,
        rems,
        indices,
        pregap,
        postgap,
        flags,
    })
}

struct ScopeRef {
    scope: Scope,
    node: String,
}

impl ScopeRef {
    fn violation(&self, violation: Violation) -> CueError {
        CueError::Validation {
            scope: self.scope,
            node: self.node.clone(),
            violation,
        }
    }

    fn set_once<T: ToOwned + ?Sized>(
        &self,
        slot: &mut Option<T::Owned>,
        value: &T,
        field: &'static str,
        line: &Line,
    ) -> CueResult<()> {
        if slot.is_some() {
            return Err(self.violation(Violation::DuplicateField {
                field,
                line: line.number,
            }));
        }
        *slot = Some(value.to_owned());
        Ok(())
    }
}

// The grammar only hands each block the directives it accepts.
fn misplaced(directive: &Directive, line: &Line) -> CueError {
    CueError::syntax(
        line.number,
        format!("{} is not allowed here", directive.keyword()),
    )
}

fn parse_file_type(type_str: &str) -> CueResult<FileType> {
    match type_str.to_ascii_uppercase().as_str() {
        "WAVE" => Ok(FileType::Wave),
        "MP3" => Ok(FileType::Mp3),
        "AIFF" => Ok(FileType::Aiff),
        "BINARY" => Ok(FileType::Binary),
        "MOTOROLA" => Ok(FileType::Motorola),
        _ => Err(CueError::InvalidFileType(type_str.to_string())),
    }
}

fn parse_track_type(type_str: &str) -> CueResult<TrackType> {
    match type_str.to_ascii_uppercase().as_str() {
        "AUDIO" => Ok(TrackType::Audio),
        "CDG" => Ok(TrackType::CdG),
        "MODE1/2048" => Ok(TrackType::Mode1_2048),
        "MODE1/2352" => Ok(TrackType::Mode1_2352),
        "MODE2/2336" => Ok(TrackType::Mode2_2336),
        "MODE2/2352" => Ok(TrackType::Mode2_2352),
        "CDI/2336" => Ok(TrackType::CdI2336),
        "CDI/2352" => Ok(TrackType::CdI2352),
        _ => Err(CueError::InvalidTrackType(type_str.to_string())),
    }
}

/// Unknown flags are ignored rather than rejected.
fn parse_flag(flag: &str) -> TrackFlags {
    match flag.to_ascii_uppercase().as_str() {
        "DCP" => TrackFlags::DCP,
        "4CH" => TrackFlags::FOURCH,
        "PRE" => TrackFlags::PRE,
        "SCMS" => TrackFlags::SCMS,
        _ => TrackFlags::empty(),
    }
}
