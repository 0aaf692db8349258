//! quizforge CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "quizforge", version, about = "AI-powered interview quiz trainer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive quiz
    Start {
        /// Topics to practice (comma-separated, e.g. "dsa, javascript")
        #[arg(long)]
        topics: String,

        /// Question types to include: mcq, coding, theory (comma-separated)
        #[arg(long, default_value = "mcq,coding,theory")]
        types: String,

        /// Number of questions (defaults to the config file value)
        #[arg(long)]
        count: Option<u32>,

        /// Time limit in minutes (defaults to the stored preference)
        #[arg(long)]
        time_limit: Option<u32>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Data directory holding history and preferences
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// Show past quizzes and progress statistics
    History {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Data directory holding history and preferences
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// Retake a past quiz with the same topics and types
    Retry {
        /// History entry to retake (1 = most recent, as listed by `history`)
        #[arg(long, default_value = "1")]
        entry: usize,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Data directory holding history and preferences
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// Export history, topic coverage, and preferences to a JSON file
    Export {
        /// Output file (default: quizforge-export-<date>.json)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Data directory holding history and preferences
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// Import a previously exported JSON file, replacing stored data
    Import {
        /// Exported JSON file to read
        #[arg(long)]
        input: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Data directory holding history and preferences
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// Delete all stored history, topic coverage, and preferences
    Reset {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Data directory holding history and preferences
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// Create a starter config file
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quizforge=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Start {
            topics,
            types,
            count,
            time_limit,
            config,
            data_dir,
        } => commands::start::execute(topics, types, count, time_limit, config, data_dir).await,
        Commands::History { config, data_dir } => commands::history::execute(config, data_dir),
        Commands::Retry {
            entry,
            config,
            data_dir,
        } => commands::retry::execute(entry, config, data_dir).await,
        Commands::Export {
            output,
            config,
            data_dir,
        } => commands::export::execute(output, config, data_dir),
        Commands::Import {
            input,
            config,
            data_dir,
        } => commands::import::execute(input, config, data_dir),
        Commands::Reset {
            yes,
            config,
            data_dir,
        } => commands::reset::execute(yes, config, data_dir),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
