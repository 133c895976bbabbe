//! Slidecast CLI: compose animated slides and record them to video.
//!
//! Usage:
//!   slidecast compose <SLIDE>     Write the animated HTML document for a slide
//!   slidecast render <REQUEST>    Render one slide to a video clip
//!   slidecast batch <BATCH>       Render a list of slides
//!   slidecast check               Check the recorder and work directory

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use slidecast_common::config::AppConfig;
use slidecast_common::error::SlidecastError;

mod commands;

#[derive(Parser)]
#[command(
    name = "slidecast",
    about = "Turn structured slide content into animated video clips",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to the user config location)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose the animated document for a slide without recording it
    Compose {
        /// Slide JSON file
        input: PathBuf,

        /// Intended clip length (seconds)
        #[arg(short, long, default_value = "5.0")]
        duration: f64,

        /// Output HTML file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render one slide to a video clip
    Render {
        /// Render request JSON file
        input: PathBuf,

        /// Directory for the finished clip (overrides capture.work_dir)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render every slide in a batch request
    Batch {
        /// Batch request JSON file
        input: PathBuf,

        /// Directory for the finished clips (overrides capture.work_dir)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum slides recorded at once
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Check the recorder program and work directory
    Check,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load(),
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    slidecast_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Compose {
            input,
            duration,
            output,
        } => commands::compose::run(&config, input, duration, output),
        Commands::Render { input, output } => commands::render::run(config, input, output).await,
        Commands::Batch {
            input,
            output,
            concurrency,
        } => commands::batch::run(config, input, output, concurrency).await,
        Commands::Check => commands::check::run(&config),
    }
}

/// Domain errors go to stdout as an `ErrorReport` so callers can parse
/// them; anything else is printed for humans on stderr.
fn report_error(error: &anyhow::Error) {
    match error.downcast_ref::<SlidecastError>() {
        Some(err) => match serde_json::to_string_pretty(&err.report()) {
            Ok(json) => println!("{json}"),
            Err(_) => eprintln!("error: {err}"),
        },
        None => eprintln!("error: {error:#}"),
    }
}
