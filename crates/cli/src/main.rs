//! StoryWeaver CLI: the main entry point.
//!
//! Commands:
//! - `generate` : Turn a plot into a storyboard
//! - `moods`    : Mood breakdown of a saved storyboard
//! - `config`   : Show, locate or validate configuration
//! - `doctor`   : Diagnose setup

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::generate::{GenerateArgs, VisualStyle};

#[derive(Parser)]
#[command(
    name = "storyweaver",
    about = "StoryWeaver: AI film storyboard generator",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a storyboard from a plot
    Generate {
        /// The story to board, e.g. "A detective discovers aliens in 1920s Chicago"
        #[arg(short, long)]
        plot: String,

        /// Number of scenes
        #[arg(short, long, default_value_t = 3)]
        scenes: u32,

        /// Visual style for scene images
        #[arg(long, value_enum)]
        style: Option<VisualStyle>,

        /// Override the output root directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the mood distribution of a saved storyboard
    Moods {
        /// Path to a storyboard JSON file
        file: PathBuf,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Diagnose setup
    Doctor,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Print the config file location
    Path,
    /// Validate the configuration
    Validate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Generate {
            plot,
            scenes,
            style,
            output,
        } => {
            commands::generate::run(GenerateArgs {
                plot,
                scenes,
                style,
                output,
            })
            .await?
        }
        Commands::Moods { file } => commands::moods::run(&file)?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show()?,
            ConfigAction::Path => commands::config_cmd::path(),
            ConfigAction::Validate => commands::config_cmd::validate()?,
        },
        Commands::Doctor => commands::doctor::run(),
    }

    Ok(())
}
