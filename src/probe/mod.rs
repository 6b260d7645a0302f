use crate::config::Tools;
use crate::probe::error::{ProbeError, ProbeResult};
use crate::probe::models::{FfprobeOutput, FileInfo};
use log::debug;
use std::ffi::OsString;
use std::path::Path;
use tokio::process::Command;

pub mod error;
pub mod models;

/// Runs ffprobe on `path` and maps its report into a [`FileInfo`].
pub async fn probe_file(tools: &Tools, path: &Path) -> ProbeResult<FileInfo> {
    let mut target = OsString::from("file:");
    target.push(path.as_os_str());

    debug!("Probing {}", path.display());
    let output = Command::new(&tools.ffprobe)
        .args(["-v", "quiet", "-of", "json"])
        .args(["-show_entries", "stream:format", "-show_chapters"])
        .arg(&target)
        .output()
        .await
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ProbeError::FfprobeNotFound(tools.ffprobe.clone()),
            _ => ProbeError::IoError(e),
        })?;

    if !output.status.success() {
        return Err(ProbeError::FfprobeFailed {
            path: path.to_path_buf(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let report: FfprobeOutput = serde_json::from_slice(&output.stdout)?;
    FileInfo::from_probe(path, report)
}

/// Probes every path in order, failing on the first error.
pub async fn probe_all(tools: &Tools, paths: &[impl AsRef<Path>]) -> ProbeResult<Vec<FileInfo>> {
    let mut infos = Vec::with_capacity(paths.len());
    for path in paths {
        infos.push(probe_file(tools, path.as_ref()).await?);
    }
    Ok(infos)
}
