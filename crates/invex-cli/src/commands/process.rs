//! Process command - extract a record from a single invoice file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use invex_core::read_text;

use super::output::{format_record, OutputFormat};
use super::{load_config, Extractor, ParserMode};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (OCR text dump or PDF with a text layer)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Extraction path
    #[arg(short, long, value_enum, default_value = "rules")]
    parser: ParserMode,

    /// Report consistency issues on stderr
    #[arg(long)]
    validate: bool,

    /// Show processing time
    #[arg(long)]
    show_timing: bool,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);

    pb.set_message("Reading text...");
    let text = read_text(&args.input, &config.source)?;

    pb.set_message("Extracting invoice data...");
    let extractor = Extractor::new(args.parser, &config, args.validate)?;
    let result = extractor.extract(&text).await?;

    pb.finish_and_clear();

    if args.validate && !result.warnings.is_empty() {
        eprintln!("{}", style("Validation issues:").yellow());
        for warning in &result.warnings {
            eprintln!("  - {}", warning);
        }
    }

    let output = format_record(&result.record, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_timing {
        eprintln!(
            "{} Extraction time: {}ms",
            style("ℹ").blue(),
            result.processing_time_ms
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
