//! Batch processing command for multiple invoice files.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use invex_core::models::config::InvexConfig;
use invex_core::{read_text, ExtractionResult};

use super::output::{format_record, OutputFormat};
use super::{load_config, Extractor, ParserMode};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input glob pattern (e.g. "scans/*.txt")
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Extraction path
    #[arg(short, long, value_enum, default_value = "rules")]
    parser: ParserMode,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct FileResult {
    path: PathBuf,
    extraction: Result<ExtractionResult, String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| is_supported(p))
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let extractor = Extractor::new(args.parser, &config, false)?;
    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        let extraction = process_single_file(&path, &extractor, &config).await;
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        let extraction = match extraction {
            Ok(result) => Ok(result),
            Err(e) if args.continue_on_error => {
                warn!("Failed to process {}: {:#}", path.display(), e);
                Err(format!("{:#}", e))
            }
            Err(e) => {
                error!("Failed to process {}: {:#}", path.display(), e);
                anyhow::bail!("Processing failed for {}: {:#}", path.display(), e);
            }
        };

        results.push(FileResult {
            path,
            extraction,
            processing_time_ms,
        });
        overall_pb.inc(1);
    }

    overall_pb.finish_and_clear();

    if let Some(output_dir) = &args.output_dir {
        let written: Vec<(&Path, &ExtractionResult)> = results
            .iter()
            .filter_map(|r| r.extraction.as_ref().ok().map(|e| (r.path.as_path(), e)))
            .collect();
        let names = output_stems(written.iter().map(|(path, _)| *path));

        for ((_, extraction), output_name) in written.iter().zip(names) {
            let output_path = output_dir.join(format!("{}.{}", output_name, args.format.extension()));

            fs::write(&output_path, format_record(&extraction.record, args.format)?)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<&FileResult> = results.iter().filter(|r| r.extraction.is_err()).collect();
    let successful = results.len() - failed.len();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            if let Err(e) = &result.extraction {
                println!("  - {}: {}", result.path.display(), e);
            }
        }
    }

    Ok(())
}

/// Output file stem for each input, in order. An input whose stem is already
/// taken (`a.txt` then `a.pdf`) gets its extension appended, and a counter if
/// that is taken too.
fn output_stems<'a>(paths: impl IntoIterator<Item = &'a Path>) -> Vec<String> {
    let mut used = HashSet::new();

    paths
        .into_iter()
        .map(|path| {
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("invoice");
            let mut name = stem.to_string();

            if used.contains(&name) {
                let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("out");
                name = format!("{}_{}", stem, ext);
                let mut n = 2;
                while used.contains(&name) {
                    name = format!("{}_{}_{}", stem, ext, n);
                    n += 1;
                }
                warn!("Output {} already taken, writing {} as {}", stem, path.display(), name);
            }

            used.insert(name.clone());
            name
        })
        .collect()
}

fn is_supported(path: &Path) -> bool {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    matches!(ext.as_str(), "txt" | "text" | "ocr" | "pdf")
}

async fn process_single_file(
    path: &Path,
    extractor: &Extractor,
    config: &InvexConfig,
) -> anyhow::Result<ExtractionResult> {
    let text = read_text(path, &config.source)?;
    extractor.extract(&text).await
}

fn write_summary(path: &Path, results: &[FileResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "vendor",
        "invoice_number",
        "invoice_date",
        "total",
        "line_items",
        "warnings",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        let time = result.processing_time_ms.to_string();

        match &result.extraction {
            Ok(extraction) => {
                let record = &extraction.record;
                let date = record.invoice_date().map(|d| d.to_string()).unwrap_or_default();
                let total = record.total().to_string();
                let items = record.line_items().len().to_string();
                let warnings = extraction.warnings.join("; ");

                wtr.write_record([
                    filename,
                    "success",
                    record.vendor(),
                    record.invoice_number().unwrap_or_default(),
                    date.as_str(),
                    total.as_str(),
                    items.as_str(),
                    warnings.as_str(),
                    time.as_str(),
                    "",
                ])?;
            }
            Err(e) => {
                wtr.write_record([filename, "error", "", "", "", "", "", "", time.as_str(), e.as_str()])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}
