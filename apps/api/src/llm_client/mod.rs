/// LLM Client: the single point of entry for all text-generation calls.
///
/// No other module talks to the generation provider directly. Every call goes through
/// [`LlmClient::generate`], which trims oversized prompts, retries transient-busy
/// responses on a fixed backoff, and always comes back with exactly one of
/// generated text or a failure.
use std::borrow::Cow;
use std::fmt;

use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::config::GenerationConfig;

pub mod provider;
pub mod retry;

pub use provider::Provider;
pub use retry::{error_message, is_transient_busy, RetryPolicy};

/// Word ceiling that fits the reference model's context budget.
pub const DEFAULT_MAX_PROMPT_WORDS: usize = 2250;
/// Appended to a prompt that was cut down to the word ceiling.
pub const TRIM_MARKER: &str = "[trimmed]";

const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Sampling parameters sent with every prompt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Model still busy after {attempts} attempts")]
    Busy { attempts: u32 },

    #[error("Response did not contain generated text")]
    MalformedResponse,
}

impl LlmError {
    /// Apology shown in place of the missing section.
    pub fn user_message(&self) -> &'static str {
        match self {
            LlmError::Busy { .. } => {
                "Sorry, the roast chef's on a break! The model is too busy, try again later."
            }
            LlmError::MalformedResponse => {
                "The roast machine mumbled something unreadable. Please try again."
            }
            LlmError::Http(_) | LlmError::Api { .. } => "Oops, the roast machine broke!",
        }
    }
}

/// Non-fatal progress reported alongside a generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    Trimmed {
        original_words: usize,
        kept_words: usize,
    },
    Busy {
        attempt: u32,
        max_attempts: u32,
        /// `None` on the final attempt.
        retry_in_ms: Option<u64>,
    },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Trimmed {
                original_words,
                kept_words,
            } => write!(
                f,
                "Resume was too long ({original_words} words), trimmed to {kept_words} words"
            ),
            Notice::Busy {
                attempt,
                max_attempts,
                retry_in_ms: Some(ms),
            } => write!(
                f,
                "Model is busy, retrying in {} seconds... (Attempt {attempt}/{max_attempts})",
                *ms as f64 / 1000.0
            ),
            Notice::Busy {
                attempt,
                max_attempts,
                retry_in_ms: None,
            } => write!(
                f,
                "Model is busy, giving up (Attempt {attempt}/{max_attempts})"
            ),
        }
    }
}

/// Outcome of one `generate` call: the result plus everything worth telling the user.
#[derive(Debug)]
pub struct Generation {
    pub result: Result<String, LlmError>,
    pub notices: Vec<Notice>,
}

/// The single generation client used by the roast pipeline.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    provider: Provider,
    api_key: String,
    model: String,
    endpoint: String,
    params: GenerationParams,
    retry: RetryPolicy,
    max_prompt_words: usize,
}

impl LlmClient {
    pub fn new(config: &GenerationConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            provider: config.provider,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            endpoint: config.endpoint.clone(),
            params: config.params,
            retry: config.retry.clone(),
            max_prompt_words: config.max_prompt_words,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends `prompt` to the provider.
    ///
    /// Transient-busy responses are retried up to `max_attempts` calls with a fixed wait
    /// between them. Any other non-success response, transport failure or malformed body
    /// ends the call immediately.
    pub async fn generate(&self, prompt: &str) -> Generation {
        let mut notices = Vec::new();

        let (prompt, trimmed) = trim_prompt(prompt, self.max_prompt_words);
        if let Some(notice) = trimmed {
            warn!("{notice}");
            notices.push(notice);
        }

        let body = self
            .provider
            .request_body(&self.model, &prompt, &self.params);
        let max_attempts = self.retry.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            let (status, text) = match self.send(&body).await {
                Ok(reply) => reply,
                Err(e) => {
                    error!("Generation request failed: {e}");
                    return Generation {
                        result: Err(LlmError::Http(e)),
                        notices,
                    };
                }
            };

            if status.is_success() {
                let result = self
                    .provider
                    .parse_generated_text(&text)
                    .ok_or(LlmError::MalformedResponse);
                match &result {
                    Ok(generated) => debug!(
                        "Generation succeeded on attempt {attempt}: {} chars",
                        generated.len()
                    ),
                    Err(e) => error!("Generation service returned {status}: {e}"),
                }
                return Generation { result, notices };
            }

            if is_transient_busy(status, &text) {
                let retry_in = (attempt < max_attempts).then_some(self.retry.backoff);
                let notice = Notice::Busy {
                    attempt,
                    max_attempts,
                    retry_in_ms: retry_in.map(|d| d.as_millis() as u64),
                };
                warn!("{notice}");
                notices.push(notice);
                if let Some(delay) = retry_in {
                    tokio::time::sleep(delay).await;
                }
                continue;
            }

            let message = error_message(&text);
            error!("Generation service returned {status}: {message}");
            return Generation {
                result: Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                }),
                notices,
            };
        }

        Generation {
            result: Err(LlmError::Busy {
                attempts: max_attempts,
            }),
            notices,
        }
    }

    async fn send(&self, body: &Value) -> Result<(StatusCode, String), reqwest::Error> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        Ok((status, text))
    }
}

/// Cuts `prompt` down to `max_words` whitespace-separated words and marks it.
/// Prompts at or under the ceiling come back untouched.
pub fn trim_prompt(prompt: &str, max_words: usize) -> (Cow<'_, str>, Option<Notice>) {
    let original_words = prompt.split_whitespace().count();
    if original_words <= max_words {
        return (Cow::Borrowed(prompt), None);
    }

    let mut trimmed = prompt
        .split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ");
    trimmed.push(' ');
    trimmed.push_str(TRIM_MARKER);

    (
        Cow::Owned(trimmed),
        Some(Notice::Trimmed {
            original_words,
            kept_words: max_words,
        }),
    )
}
