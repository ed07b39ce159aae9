//! Generative parser client for OpenAI-compatible chat completion APIs.
//!
//! The client only transports text. Its reply is handed back untouched as a
//! JSON string, so the core classifier decides whether it is usable.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use invex_core::GenerativeSettings;

const SYSTEM_PROMPT: &str = "You extract structured data from invoice OCR text. \
Reply with a single JSON object and nothing else, using exactly these keys: \
\"vendor\" (string), \"invoiceNumber\" (string or null), \
\"invoiceDate\" (string in YYYY-MM-DD format or null), \
\"subtotal\" (number), \"tax\" (number), \"total\" (number), \
\"lineItems\" (array of objects with \"description\" (string), \
\"quantity\" (number), \"unitPrice\" (number), \"lineTotal\" (number)). \
Use plain numbers without currency symbols or thousands separators. \
Use null for values that are not present in the text.";

const BASE_BACKOFF: Duration = Duration::from_millis(500);
const MAX_BACKOFF: Duration = Duration::from_secs(8);

/// Client for the generative invoice parser.
#[derive(Clone)]
pub struct GenerativeClient {
    client: Client,
    settings: GenerativeSettings,
}

/// Outcome of a failed attempt.
enum AttemptError {
    Transient(anyhow::Error),
    Fatal(anyhow::Error),
}

impl GenerativeClient {
    /// Build a client from validated settings.
    pub fn new(settings: GenerativeSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, settings })
    }

    /// Send OCR text to the model and return its reply as a JSON string.
    pub async fn parse(&self, text: &str) -> Result<Value> {
        let request = ChatCompletionRequest {
            model: self.settings.model.clone(),
            messages: vec![Message::system(SYSTEM_PROMPT), Message::user(text)],
            max_tokens: Some(self.settings.max_tokens),
            temperature: 0.0,
        };

        let mut attempt = 0;
        loop {
            match self.send_request(&request).await {
                Ok(content) => return Ok(Value::String(content)),
                Err(AttemptError::Transient(e)) if attempt < self.settings.max_retries => {
                    let delay = backoff(attempt);
                    warn!(
                        "Generative request failed (attempt {}), retrying in {:?}: {:#}",
                        attempt + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(AttemptError::Transient(e)) | Err(AttemptError::Fatal(e)) => return Err(e),
            }
        }
    }

    async fn send_request(&self, request: &ChatCompletionRequest) -> Result<String, AttemptError> {
        debug!(
            "Sending request to {}: model={}",
            self.settings.endpoint, request.model
        );

        let response = self
            .client
            .post(&self.settings.endpoint)
            .bearer_auth(&self.settings.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                let retry = e.is_timeout() || e.is_connect() || e.is_request();
                let e = anyhow::Error::new(e).context("Failed to send request to generative backend");
                if retry {
                    AttemptError::Transient(e)
                } else {
                    AttemptError::Fatal(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let e = anyhow::anyhow!("Generative backend error ({}): {}", status, error_text);
            return Err(if is_retryable_status(status) {
                AttemptError::Transient(e)
            } else {
                AttemptError::Fatal(e)
            });
        }

        let response: ChatCompletionResponse = response
            .json()
            .await
            .context("Failed to parse generative backend response")
            .map_err(AttemptError::Fatal)?;

        if let Some(usage) = &response.usage {
            info!(
                "Generative response: {} tokens (prompt: {}, completion: {})",
                usage.total_tokens, usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Exponential backoff, capped.
fn backoff(attempt: u32) -> Duration {
    BASE_BACKOFF
        .checked_mul(1u32 << attempt.min(16))
        .map_or(MAX_BACKOFF, |d| d.min(MAX_BACKOFF))
}

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

impl Message {
    fn system(content: &str) -> Self {
        Self {
            role: "system",
            content: content.to_string(),
        }
    }

    fn user(content: &str) -> Self {
        Self {
            role: "user",
            content: content.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}
