//! Normalize command - turn a raw generative parser payload into a record.

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use clap::Args;
use console::style;
use serde_json::Value;
use tracing::debug;

use invex_core::normalize_from_raw_json;

use super::output::{format_record, OutputFormat};

/// Arguments for the normalize command.
#[derive(Args)]
pub struct NormalizeArgs {
    /// Payload file; reads stdin when omitted or "-"
    input: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Report consistency issues on stderr
    #[arg(long)]
    validate: bool,
}

pub async fn run(args: NormalizeArgs) -> anyhow::Result<()> {
    let content = match &args.input {
        Some(path) if path.as_os_str() != "-" => fs::read_to_string(path)?,
        _ => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let record = normalize_from_raw_json(&payload_value(content))?;

    if args.validate {
        let issues = record.validate();
        if !issues.is_empty() {
            eprintln!("{}", style("Validation issues:").yellow());
            for issue in &issues {
                eprintln!("  - {}", issue);
            }
        }
    }

    println!("{}", format_record(&record, args.format)?);
    Ok(())
}

/// A JSON document is passed as-is; anything else is treated as the model's
/// raw reply text and left to the classifier.
fn payload_value(content: String) -> Value {
    match serde_json::from_str::<Value>(&content) {
        Ok(value) => value,
        Err(e) => {
            debug!("Input is not a JSON document ({}), treating it as reply text", e);
            Value::String(content)
        }
    }
}
