//! examkit CLI: validate, convert and grade exam files.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "examkit", version, about = "Exam ingestion and grading toolkit")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest an exam and report parse issues
    Validate {
        /// Exam file (.json or plain text)
        #[arg(long)]
        input: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Normalize an exam into JSON
    Convert {
        /// Exam file (.json or plain text)
        #[arg(long)]
        input: PathBuf,

        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: canonical, editable
        #[arg(long, default_value = "canonical")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Grade a set of answers against an exam
    Grade {
        /// Exam file (.json or plain text)
        #[arg(long)]
        input: PathBuf,

        /// JSON object mapping question id to answer
        #[arg(long)]
        answers: PathBuf,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config and sample exam
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("examkit=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { input, config } => commands::validate::execute(input, config),
        Commands::Convert {
            input,
            output,
            format,
            config,
        } => commands::convert::execute(input, output, format, config),
        Commands::Grade {
            input,
            answers,
            format,
            config,
        } => commands::grade::execute(input, answers, format, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
