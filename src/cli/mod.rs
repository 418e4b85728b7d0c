use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "reelscript",
    about = "Reelscript - Turn video URLs into short-form social scripts using yt-dlp, ffmpeg, and OpenAI",
    version,
    long_about = "A CLI tool that downloads a video, extracts and transcribes its audio, sorts the transcript into facts and opinions, and asks a chat model to draft a short-form script from them."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Process a list of video URLs into scripts
    Run {
        /// Newline-delimited URL list (defaults to the configured file)
        #[arg(short, long, value_name = "FILE")]
        urls: Option<PathBuf>,

        /// Process a single URL instead of reading the list
        #[arg(long, value_name = "URL", conflicts_with = "urls")]
        url: Option<String>,
    },

    /// Show or locate the configuration file
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}
