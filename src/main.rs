use crate::commands::chapters::print_chapters;
use crate::commands::{Cli, Commands};
use anyhow::{Result, bail};
use clap::Parser;
use cuebook::config::Tools;
use cuebook::convert::dispatch::run_jobs;
use indicatif::MultiProgress;
use indicatif_log_bridge::LogWrapper;
use log::{debug, warn};

mod commands;

pub mod built_info {
    // The file has been placed there by the build script.
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let logger = env_logger::builder()
        .filter_level(cli.log_level())
        .parse_default_env()
        .build();

    let level = logger.filter();
    let pb = MultiProgress::new();

    LogWrapper::new(pb.clone(), logger).try_init()?;
    log::set_max_level(level);

    debug!(
        "{} {} ({})",
        built_info::PKG_NAME,
        built_info::PKG_VERSION,
        built_info::TARGET
    );

    let tools = Tools::from_env();
    debug!("Using {} and {}", tools.ffmpeg, tools.ffprobe);

    let jobs = match cli.command {
        Commands::Convert(cmd) => vec![cmd.into_job()?],
        Commands::Auto(cmd) => cmd.into_jobs().await?,
        Commands::Chapters(cmd) => return print_chapters(&tools, cmd).await,
    };

    if jobs.is_empty() {
        warn!("Nothing to convert");
        return Ok(());
    }

    let summary = run_jobs(&tools, jobs, cli.threads, &pb).await;
    if !summary.failed.is_empty() {
        bail!(
            "{} of {} conversions failed",
            summary.failed.len(),
            summary.failed.len() + summary.converted.len()
        );
    }

    Ok(())
}
