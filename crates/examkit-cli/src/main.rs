//! examkit CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "examkit", version, about = "Interactive multiple-choice exam trainer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take an exam interactively
    Take {
        /// Exam id (e.g. "exam5.json"); defaults to the configured exam
        #[arg(long)]
        exam: Option<String>,

        /// Mode: exam (timed) or train (immediate feedback)
        #[arg(long)]
        mode: Option<String>,

        /// Launch query string, e.g. "exam=exam5.json&mode=train"
        #[arg(long, conflicts_with_all = ["exam", "mode"])]
        query: Option<String>,

        /// Print the full review after the session
        #[arg(long)]
        review: bool,

        /// Write the review to this file
        #[arg(long)]
        export: Option<PathBuf>,

        /// Export format: json, markdown
        #[arg(long, default_value = "json")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show recorded progress
    Progress {
        /// Show a single exam
        #[arg(long)]
        exam: Option<String>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Delete recorded progress
    Reset {
        /// Exam to reset
        #[arg(long, required_unless_present = "all", conflicts_with = "all")]
        exam: Option<String>,

        /// Reset every exam
        #[arg(long)]
        all: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate an exam document
    Validate {
        /// Path to the exam JSON file
        #[arg(long)]
        exam: PathBuf,
    },

    /// Create starter config and example exam
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("examkit=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Take {
            exam,
            mode,
            query,
            review,
            export,
            format,
            config,
        } => commands::take::execute(exam, mode, query, review, export, format, config).await,
        Commands::Progress {
            exam,
            format,
            config,
        } => commands::progress::execute(exam, format, config),
        Commands::Reset { exam, all, config } => commands::reset::execute(exam, all, config),
        Commands::Validate { exam } => commands::validate::execute(exam),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
