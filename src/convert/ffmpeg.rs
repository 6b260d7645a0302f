use crate::config::Tools;
use crate::convert::error::{ConvertError, ConvertResult};
use log::debug;
use std::ffi::{OsStr, OsString};
use std::path::Path;
use tokio::process::Command;

/// How the audio of the output is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Codec {
    /// Stream copy, only possible when the inputs already are Opus.
    Copy,
    Opus { bitrate: String },
}

/// Prefixes a path with `file:` so ffmpeg never reads it as a protocol URL.
pub fn file_url(path: &Path) -> OsString {
    let mut url = OsString::from("file:");
    url.push(path.as_os_str());
    url
}

/// Argument list for one ffmpeg run, inputs numbered in the order added.
#[derive(Debug, Clone)]
pub struct FfmpegArgs {
    args: Vec<OsString>,
    inputs: usize,
}

impl Default for FfmpegArgs {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegArgs {
    pub fn new() -> Self {
        Self {
            args: ["-hide_banner", "-v", "error", "-y"]
                .into_iter()
                .map(OsString::from)
                .collect(),
            inputs: 0,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|arg| arg.as_ref().to_os_string()));
        self
    }

    /// Adds an input and returns its index.
    pub fn input(&mut self, path: &Path) -> usize {
        self.push_input(&[], path)
    }

    /// Adds an `;FFMETADATA1` file as input and returns its index.
    pub fn metadata_input(&mut self, path: &Path) -> usize {
        self.push_input(&["-f", "ffmetadata"], path)
    }

    /// Adds a concat demuxer list as input and returns its index.
    pub fn concat_input(&mut self, list: &Path) -> usize {
        self.push_input(&["-f", "concat", "-safe", "0"], list)
    }

    fn push_input(&mut self, format: &[&str], path: &Path) -> usize {
        self.args.extend(format.iter().map(OsString::from));
        self.args.push("-i".into());
        self.args.push(file_url(path));
        self.inputs += 1;
        self.inputs - 1
    }

    pub fn input_count(&self) -> usize {
        self.inputs
    }

    pub fn map_metadata(self, input: usize) -> Self {
        self.args(["-map_metadata".to_string(), input.to_string()])
    }

    pub fn map_chapters(self, input: usize) -> Self {
        self.args(["-map_chapters".to_string(), input.to_string()])
    }

    pub fn codec(self, codec: &Codec) -> Self {
        match codec {
            Codec::Copy => self.args(["-c:a", "copy"]),
            Codec::Opus { bitrate } => self
                .args(["-c:a", "libopus", "-b:a"])
                .arg(bitrate)
                .args(["-vbr", "on", "-compression_level", "10", "-application", "voip"]),
        }
    }

    pub fn output(self, path: &Path) -> Self {
        self.arg(file_url(path))
    }

    pub fn as_slice(&self) -> &[OsString] {
        &self.args
    }

    /// Lossy rendering for logs and assertions.
    pub fn to_strings(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }
}

pub async fn run_ffmpeg(tools: &Tools, args: &FfmpegArgs) -> ConvertResult<()> {
    debug!("Running {} {}", tools.ffmpeg, args.to_strings().join(" "));

    let output = Command::new(&tools.ffmpeg)
        .args(args.as_slice())
        .output()
        .await
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConvertError::FfmpegNotFound(tools.ffmpeg.clone()),
            _ => ConvertError::IoError(e),
        })?;

    if !output.status.success() {
        return Err(ConvertError::FfmpegFailed {
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(())
}
