//! audiocall CLI: play audio-call quizzes from the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use audiocall_core::model::DifficultyTag;

mod commands;

#[derive(Parser)]
#[command(name = "audiocall", version, about = "Audio-call vocabulary quiz")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a quiz session, reading answers from stdin
    Play {
        /// Path to a .toml deck or a directory of decks
        #[arg(long)]
        deck: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Word store file (overrides config)
        #[arg(long)]
        store: Option<PathBuf>,

        /// Play without recording progress
        #[arg(long)]
        guest: bool,

        /// Play at most this many questions
        #[arg(long)]
        limit: Option<usize>,

        /// Save the session summary as JSON
        #[arg(long)]
        output: Option<PathBuf>,

        /// Print the results as markdown
        #[arg(long)]
        markdown: bool,
    },

    /// Validate deck TOML files
    Validate {
        /// Path to deck file or directory
        #[arg(long)]
        deck: PathBuf,
    },

    /// Show per-word progress
    Stats {
        /// Only show this word
        #[arg(long)]
        word: Option<String>,

        /// Word store file (overrides config)
        #[arg(long)]
        store: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Mark a word as hard or learned
    Mark {
        /// Word identifier
        word: String,

        /// Difficulty: hard, learned or new
        difficulty: DifficultyTag,

        /// Word store file (overrides config)
        #[arg(long)]
        store: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and example deck
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("audiocall=info".parse().expect("static directive")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play {
            deck,
            config,
            store,
            guest,
            limit,
            output,
            markdown,
        } => {
            commands::play::execute(commands::play::PlayArgs {
                deck,
                config,
                store,
                guest,
                limit,
                output,
                markdown,
            })
            .await
        }
        Commands::Validate { deck } => commands::validate::execute(deck),
        Commands::Stats {
            word,
            store,
            config,
        } => commands::stats::execute(word, store, config).await,
        Commands::Mark {
            word,
            difficulty,
            store,
            config,
        } => commands::mark::execute(word, difficulty, store, config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
