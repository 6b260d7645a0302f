use anyhow::Result;
use clap::Parser;
use cuebook::chapters::ffmetadata::{render_chapters, write_chapters};
use cuebook::config::Tools;
use cuebook::convert::single::chapters_from_cue_path;
use log::info;
use std::path::PathBuf;

/// Derives chapters from a cue sheet and prints them as an FFMETADATA file.
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ChaptersCommand {
    /// Cue sheet describing a single audio file
    #[arg(value_name = "CUESHEET")]
    pub cuesheet: PathBuf,

    /// Length of the audio in seconds, probed from the referenced file when not given
    #[arg(long, short = 'd', value_name = "SECONDS")]
    pub duration: Option<f64>,

    /// Write the chapters to this file instead of stdout
    #[arg(long, short = 'o', value_name = "OUTPUT")]
    pub output: Option<PathBuf>,
}

pub async fn print_chapters(tools: &Tools, cmd: ChaptersCommand) -> Result<()> {
    let chapters = chapters_from_cue_path(tools, &cmd.cuesheet, cmd.duration).await?;

    match cmd.output {
        Some(output) => {
            write_chapters(&output, &chapters).await?;
            info!("Wrote {} chapters to {}", chapters.len(), output.display());
        }
        None => print!("{}", render_chapters(&chapters)),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{Cli, Commands};

    #[test]
    fn parses_duration_and_output() {
        let cli = Cli::parse_from(["cuebook", "chapters", "book.cue", "-d", "400.5", "-o", "ch.txt"]);
        let Commands::Chapters(cmd) = cli.command else {
            panic!("expected the chapters command");
        };
        assert_eq!(cmd.cuesheet, PathBuf::from("book.cue"));
        assert_eq!(cmd.duration, Some(400.5));
        assert_eq!(cmd.output, Some(PathBuf::from("ch.txt")));
    }

    #[tokio::test]
    async fn writes_chapters_for_a_known_duration() {
        let dir = tempfile::tempdir().unwrap();
        let cue = dir.path().join("book.cue");
        let output = dir.path().join("chapters.txt");
        std::fs::write(
            &cue,
            "FILE book.wav WAVE\nTRACK 01 AUDIO\nTITLE Start\nINDEX 01 00:00:00\n",
        )
        .unwrap();

        let cmd = ChaptersCommand {
            cuesheet: cue,
            duration: Some(12.0),
            output: Some(output.clone()),
        };
        print_chapters(&Tools::default(), cmd).await.unwrap();

        let text = std::fs::read_to_string(output).unwrap();
        assert!(text.ends_with("START=0\nEND=12000\ntitle=Start\n"));
    }
}
