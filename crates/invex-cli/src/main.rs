//! CLI application for invoice extraction from OCR text.

mod commands;
mod llm;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{batch, config, normalize, process};

/// Invoice extraction - turn OCR text into structured invoice records
#[derive(Parser)]
#[command(name = "invex")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract an invoice record from a single OCR text or PDF file
    Process(process::ProcessArgs),

    /// Process multiple invoice files
    Batch(batch::BatchArgs),

    /// Normalize a raw generative parser JSON payload
    Normalize(normalize::NormalizeArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // Records go to stdout, so logs go to stderr
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Process(args) => process::run(args, cli.config.as_deref()).await,
        Commands::Batch(args) => batch::run(args, cli.config.as_deref()).await,
        Commands::Normalize(args) => normalize::run(args).await,
        Commands::Config(args) => config::run(args, cli.config.as_deref()).await,
    }
}
