//! Wire shapes for the supported text-generation providers.
//!
//! Both providers share one pipeline; only the request body and the location of the
//! generated text in the success body differ.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::GenerationParams;

const HF_INFERENCE_BASE: &str = "https://api-inference.huggingface.co/models";
const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Hugging Face Inference API, text-generation task.
    HuggingFace,
    /// OpenAI-compatible chat completions.
    ChatCompletions,
}

impl Provider {
    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::HuggingFace => "deepseek-ai/DeepSeek-R1-Distill-Qwen-32B",
            Provider::ChatCompletions => "gpt-4o-mini",
        }
    }

    pub fn default_endpoint(&self, model: &str) -> String {
        match self {
            Provider::HuggingFace => format!("{HF_INFERENCE_BASE}/{model}"),
            Provider::ChatCompletions => CHAT_COMPLETIONS_URL.to_string(),
        }
    }

    /// Builds the JSON request body for one prompt.
    pub fn request_body(&self, model: &str, prompt: &str, params: &GenerationParams) -> Value {
        match self {
            Provider::HuggingFace => serde_json::to_value(HfRequest {
                inputs: prompt,
                parameters: HfParameters {
                    max_new_tokens: params.max_tokens,
                    temperature: params.temperature,
                    return_full_text: false,
                },
            }),
            Provider::ChatCompletions => serde_json::to_value(ChatRequest {
                model,
                messages: vec![ChatMessage {
                    role: "user",
                    content: prompt,
                }],
                max_tokens: params.max_tokens,
                temperature: params.temperature,
            }),
        }
        .unwrap_or(Value::Null)
    }

    /// Pulls the single generated-text field out of a success body.
    /// Returns `None` when the body does not have the expected shape.
    pub fn parse_generated_text(&self, body: &str) -> Option<String> {
        match self {
            Provider::HuggingFace => {
                let generations: Vec<HfGeneration> = serde_json::from_str(body).ok()?;
                generations.into_iter().next()?.generated_text
            }
            Provider::ChatCompletions => {
                let response: ChatResponse = serde_json::from_str(body).ok()?;
                response.choices.into_iter().next()?.message?.content
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct HfRequest<'a> {
    inputs: &'a str,
    parameters: HfParameters,
}

#[derive(Debug, Serialize)]
struct HfParameters {
    max_new_tokens: u32,
    temperature: f32,
    return_full_text: bool,
}

#[derive(Debug, Deserialize)]
struct HfGeneration {
    generated_text: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}
