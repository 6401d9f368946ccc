//! Vidweave CLI — Command-line interface for rendering compositions.
//!
//! Usage:
//!   vidweave render <REQUEST>     Render a composition request to video
//!   vidweave inspect <REQUEST>    Summarize a composition request
//!   vidweave check                Check engine availability

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "vidweave",
    about = "Composite video rendering driven by declarative requests",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a composition request to a video file
    Render {
        /// Path to the JSON request file
        request: PathBuf,

        /// Output file path (defaults to the rendered artifact in the
        /// working directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Override the working directory for intermediate artifacts
        #[arg(long)]
        work_dir: Option<PathBuf>,
    },

    /// Summarize a composition request without rendering it
    Inspect {
        /// Path to the JSON request file
        request: PathBuf,
    },

    /// Check that the transcoding engine is available
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    vidweave_common::logging::init_at_level(log_level);

    match cli.command {
        Commands::Render {
            request,
            output,
            work_dir,
        } => commands::render::run(request, output, work_dir).await,
        Commands::Inspect { request } => commands::inspect::run(request),
        Commands::Check => commands::check::run(),
    }
}
