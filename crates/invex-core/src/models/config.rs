//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{InvexError, Result};

/// Main configuration for invex.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvexConfig {
    /// Rule-based extraction configuration.
    pub extraction: ExtractionConfig,

    /// Text source (OCR boundary) configuration.
    pub source: SourceConfig,

    /// Generative backend configuration.
    pub generative: GenerativeConfig,
}

/// Rule-based extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Report record consistency issues as extraction warnings.
    pub validate_totals: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            validate_totals: true,
        }
    }
}

/// Text source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Minimum text length to accept a PDF text layer.
    pub min_text_length: usize,

    /// Largest input accepted, in bytes.
    pub max_bytes: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            min_text_length: 20,
            max_bytes: 20 * 1024 * 1024,
        }
    }
}

/// Generative backend configuration (OpenAI-compatible chat completions).
///
/// Validated once with [`GenerativeConfig::validate`]; the resulting
/// [`GenerativeSettings`] is what a client is built from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerativeConfig {
    /// Whether the generative path may be used at all.
    pub enabled: bool,

    /// Chat completions endpoint URL.
    pub endpoint: String,

    /// Model identifier sent with each request.
    pub model: String,

    /// Name of the environment variable holding the API key.
    pub api_key_env: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Retries after the first attempt on transient failures.
    pub max_retries: u32,

    /// Completion token limit.
    pub max_tokens: u32,
}

impl Default for GenerativeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "INVEX_LLM_API_KEY".to_string(),
            timeout_secs: 30,
            max_retries: 2,
            max_tokens: 2048,
        }
    }
}

/// Validated generative backend settings.
#[derive(Clone)]
pub struct GenerativeSettings {
    pub endpoint: String,
    pub model: String,
    pub api_key: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub max_tokens: u32,
}

impl std::fmt::Debug for GenerativeSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerativeSettings")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl GenerativeConfig {
    /// Validate against the process environment.
    pub fn validate(&self) -> Result<GenerativeSettings> {
        self.validate_with(|name| std::env::var(name).ok())
    }

    /// Validate, resolving the API key through `lookup`.
    pub fn validate_with<F>(&self, lookup: F) -> Result<GenerativeSettings>
    where
        F: Fn(&str) -> Option<String>,
    {
        if !self.enabled {
            return Err(InvexError::BackendUnavailable(
                "generative backend is disabled in configuration".to_string(),
            ));
        }

        let endpoint = self.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(InvexError::BackendUnavailable(format!(
                "endpoint must be an http(s) URL, got {:?}",
                self.endpoint
            )));
        }

        if self.model.trim().is_empty() {
            return Err(InvexError::BackendUnavailable("model is not set".to_string()));
        }

        if self.timeout_secs == 0 {
            return Err(InvexError::BackendUnavailable(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }

        let api_key = lookup(&self.api_key_env)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                InvexError::BackendUnavailable(format!("{} is not set", self.api_key_env))
            })?;

        Ok(GenerativeSettings {
            endpoint: endpoint.to_string(),
            model: self.model.trim().to_string(),
            api_key,
            timeout: Duration::from_secs(self.timeout_secs),
            max_retries: self.max_retries,
            max_tokens: self.max_tokens,
        })
    }
}

impl InvexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| InvexError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| InvexError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
