use crate::config::Tools;
use crate::convert::{Job, convert_job};
use futures::StreamExt;
use futures::stream;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{error, info};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::thread::available_parallelism;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DispatchSummary {
    pub converted: Vec<PathBuf>,
    pub failed: Vec<String>,
}

/// Number of jobs to run at once, `0` meaning one per core.
pub fn effective_threads(threads: usize) -> usize {
    match threads {
        0 => available_parallelism().map(NonZeroUsize::get).unwrap_or(1),
        n => n,
    }
}

/// Runs every job, `threads` at a time, and reports each as it finishes.
///
/// A failing job is logged and the remaining jobs still run.
pub async fn run_jobs(
    tools: &Tools,
    jobs: Vec<Job>,
    threads: usize,
    pb: &MultiProgress,
) -> DispatchSummary {
    let total = jobs.len();
    let bar = pb.add(ProgressBar::new(total as u64));
    bar.set_style(
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} books")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut results = stream::iter(jobs)
        .map(|job| async move {
            let result = convert_job(tools, &job).await;
            (job, result)
        })
        .buffer_unordered(effective_threads(threads));

    let mut summary = DispatchSummary::default();
    let mut done = 0;
    while let Some((job, result)) = results.next().await {
        done += 1;
        match result {
            Ok(output) => {
                info!(
                    "Completed conversion and merger into {}: ({done}/{total})",
                    output.display()
                );
                summary.converted.push(output);
            }
            Err(e) => {
                error!("Failed to convert {}: {e} ({done}/{total})", job.describe());
                summary.failed.push(job.describe());
            }
        }
        bar.inc(1);
    }

    bar.finish_and_clear();
    pb.remove(&bar);
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_threads_means_all_cores() {
        assert!(effective_threads(0) >= 1);
        assert_eq!(effective_threads(3), 3);
    }

    #[tokio::test]
    async fn failures_do_not_stop_other_jobs() {
        let dir = tempfile::tempdir().unwrap();
        let jobs: Vec<Job> = ["a", "b"]
            .iter()
            .map(|name| Job {
                inputs: vec![dir.path().join(format!("{name}.mp3"))],
                metadata: None,
                cuesheet: None,
                cover: None,
                output: dir.path().join(format!("{name}.opus")),
                bitrate: None,
                delete_originals: false,
            })
            .collect();

        let summary = run_jobs(&Tools::default(), jobs, 2, &MultiProgress::new()).await;
        assert!(summary.converted.is_empty());
        assert_eq!(summary.failed.len(), 2);
    }
}
