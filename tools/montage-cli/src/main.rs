//! Montage CLI: command-line interface for composition management.
//!
//! Usage:
//!   montage init <NAME>        Create a new empty project
//!   montage info <PATH>        Show project information
//!   montage validate <PATH>    Validate a project bundle
//!   montage gaps <PATH>        List unoccupied intervals per track
//!   montage render <PATH>      Render a project with the local renderer

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "montage",
    about = "Timeline composition engine for multi-track video editing",
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
    /// Create a new empty project
    Init {
        /// Project name
        name: String,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Output width
        #[arg(long, default_value = "1920")]
        width: u32,

        /// Output height
        #[arg(long, default_value = "1080")]
        height: u32,

        /// Composition frame rate
        #[arg(long, default_value = "30")]
        fps: u32,
    },

    /// Show project information
    Info {
        /// Path to the project directory
        path: PathBuf,
    },

    /// Validate a project bundle
    Validate {
        /// Path to the project directory
        path: PathBuf,
    },

    /// List unoccupied intervals on each track
    Gaps {
        /// Path to the project directory
        path: PathBuf,

        /// Only report gaps on this track id
        #[arg(long)]
        track: Option<u64>,
    },

    /// Render a project with the local renderer
    Render {
        /// Path to the project directory
        path: PathBuf,

        /// Output name
        #[arg(short, long, default_value = "render")]
        name: String,

        /// Output directory (defaults to <project>/renders)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Poll interval in milliseconds
        #[arg(long, default_value = "200")]
        poll_ms: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    montage_common::logging::init_logging(&montage_common::config::LoggingConfig {
        level: log_level.to_string(),
        json: false,
        file: None,
    })?;

    match cli.command {
        Commands::Init {
            name,
            output,
            width,
            height,
            fps,
        } => commands::init::run(name, output, width, height, fps),
        Commands::Info { path } => commands::info::run(path),
        Commands::Validate { path } => commands::validate::run(path),
        Commands::Gaps { path, track } => commands::gaps::run(path, track),
        Commands::Render {
            path,
            name,
            output,
            poll_ms,
        } => commands::render::run(path, name, output, poll_ms).await,
    }
}
