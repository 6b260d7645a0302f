use bitflags::bitflags;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Cuesheet {
    pub catalog: Option<String>,
    pub cdtextfile: Option<String>,
    pub performer: Option<String>,
    pub title: Option<String>,
    pub rems: Remarks,
    pub files: Vec<CueFile>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CueFile {
    pub filename: String,
    pub file_type: FileType,
    pub performer: Option<String>,
    pub title: Option<String>,
    pub rems: Remarks,
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub number: u32,
    pub track_type: TrackType,
    pub title: Option<String>,
    pub performer: Option<String>,
    pub isrc: Option<String>,
    pub rems: Remarks,
    /// Index number to position in seconds from the start of the file.
    pub indices: BTreeMap<u32, f64>,
    pub pregap: Option<f64>,
    pub postgap: Option<f64>,
    pub flags: TrackFlags,
}

impl Track {
    /// Position of `INDEX 01`, where the track becomes audible.
    ///
    /// Tracks built by the interpreter always carry index 1.
    pub fn start(&self) -> f64 {
        self.indices.get(&1).copied().unwrap_or_default()
    }

    pub fn effective_title(&self) -> String {
        match &self.title {
            Some(title) => title.clone(),
            None => format!("Chapter {}", self.number),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackType {
    Audio,
    CdG,
    Mode1_2048,
    Mode1_2352,
    Mode2_2336,
    Mode2_2352,
    CdI2336,
    CdI2352,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Wave,
    Mp3,
    Aiff,
    Binary,
    Motorola,
}

bitflags! {
    /// Sub-code flags of a track, accumulated over every `FLAGS` line.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TrackFlags: u8 {
        /// Digital copy permitted
        const DCP = 1 << 0;
        /// Four channel audio
        const FOURCH = 1 << 1;
        /// Pre-emphasis enabled
        const PRE = 1 << 2;
        /// Serial copy management system
        const SCMS = 1 << 3;
    }
}

/// Free-form `REM` lines of one block.
///
/// Keys keep the order they were first seen in, and every value given for a
/// key is kept in the order it appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Remarks {
    entries: Vec<(String, Vec<String>)>,
}

impl Remarks {
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value.into()),
            None => self.entries.push((key, vec![value.into()])),
        }
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
    }

    pub fn first(&self, key: &str) -> Option<&str> {
        self.get(key)?.first().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
