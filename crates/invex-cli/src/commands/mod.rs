//! CLI subcommands and the extraction flow they share.

pub mod batch;
pub mod config;
pub mod normalize;
pub mod output;
pub mod process;

use std::path::PathBuf;
use std::time::Instant;

use tracing::{debug, info, warn};

use invex_core::models::config::InvexConfig;
use invex_core::{normalize_from_raw_json, ExtractionResult, InvoiceParser, RuleBasedParser};

use crate::llm::GenerativeClient;

/// Which extraction path to use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ParserMode {
    /// Deterministic rule-based parser
    Rules,
    /// Generative parser; fails when the backend is unavailable
    Llm,
    /// Generative parser when configured, rule-based otherwise
    Auto,
}

/// Load configuration from `path`. Without one, the user file managed by
/// `invex config` is read if it exists; otherwise defaults apply.
pub fn load_config(path: Option<&str>) -> anyhow::Result<InvexConfig> {
    let path = match path {
        Some(path) => PathBuf::from(path),
        None => {
            let path = config::default_config_path();
            if !path.exists() {
                debug!("No config file at {}, using defaults", path.display());
                return Ok(InvexConfig::default());
            }
            path
        }
    };

    debug!("Loading configuration from {}", path.display());
    Ok(InvexConfig::from_file(&path)?)
}

/// Extraction backends resolved once per command.
pub struct Extractor {
    rules: RuleBasedParser,
    client: Option<GenerativeClient>,
    fallback: bool,
    validate: bool,
}

impl Extractor {
    pub fn new(mode: ParserMode, config: &InvexConfig, validate: bool) -> anyhow::Result<Self> {
        let validate = validate || config.extraction.validate_totals;
        let client = match mode {
            ParserMode::Rules => None,
            ParserMode::Llm => Some(GenerativeClient::new(config.generative.validate()?)?),
            ParserMode::Auto => match config.generative.validate() {
                Ok(settings) => Some(GenerativeClient::new(settings)?),
                Err(e) => {
                    info!("Using rule-based parser: {}", e);
                    None
                }
            },
        };

        Ok(Self {
            rules: RuleBasedParser::new().with_totals_validation(validate),
            client,
            fallback: mode == ParserMode::Auto,
            validate,
        })
    }

    /// Extract a record from OCR text.
    ///
    /// In `auto` mode a failing generative call falls back to the rules.
    pub async fn extract(&self, text: &str) -> anyhow::Result<ExtractionResult> {
        let Some(client) = &self.client else {
            return Ok(self.rules.parse(text)?);
        };

        match self.extract_generative(client, text).await {
            Ok(result) => Ok(result),
            Err(e) if self.fallback => {
                warn!("Generative parser failed, falling back to rules: {:#}", e);
                Ok(self.rules.parse(text)?)
            }
            Err(e) => Err(e),
        }
    }

    async fn extract_generative(
        &self,
        client: &GenerativeClient,
        text: &str,
    ) -> anyhow::Result<ExtractionResult> {
        let start = Instant::now();
        let raw = client.parse(text).await?;
        let record = normalize_from_raw_json(&raw)?;

        let mut warnings = Vec::new();
        if self.validate {
            warnings.extend(record.validate());
        }

        Ok(ExtractionResult {
            record,
            warnings,
            missing_fields: Vec::new(),
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}
