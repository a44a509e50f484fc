use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::llm_client::{GenerationParams, Provider, RetryPolicy, DEFAULT_MAX_PROMPT_WORDS};

/// Which backend holds shared roast records.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreBackend {
    Postgres {
        database_url: String,
    },
    DataApi {
        endpoint: String,
        token: String,
        keyspace: String,
        collection: String,
    },
    Memory,
}

/// Settings for the remote text-generation service.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub provider: Provider,
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    pub params: GenerationParams,
    pub retry: RetryPolicy,
    pub max_prompt_words: usize,
}

/// Application configuration loaded from environment variables.
/// Start-up fails if required secrets are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub generation: GenerationConfig,
    pub store: StoreBackend,
    pub public_base_url: String,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let provider = match env.get("GENERATION_PROVIDER").as_deref() {
            None | Some("huggingface") => Provider::HuggingFace,
            Some("chat") => Provider::ChatCompletions,
            Some(other) => bail!("GENERATION_PROVIDER must be 'huggingface' or 'chat', got '{other}'"),
        };
        let model = env
            .get("GENERATION_MODEL")
            .unwrap_or_else(|| provider.default_model().to_string());
        let endpoint = env
            .get("GENERATION_ENDPOINT")
            .unwrap_or_else(|| provider.default_endpoint(&model));

        let generation = GenerationConfig {
            provider,
            api_key: env.require("GENERATION_API_KEY")?,
            model,
            endpoint,
            params: GenerationParams {
                temperature: env.parse_or("GENERATION_TEMPERATURE", 0.6)?,
                max_tokens: env.parse_or("GENERATION_MAX_TOKENS", 200)?,
            },
            retry: RetryPolicy {
                max_attempts: env.parse_or("GENERATION_MAX_ATTEMPTS", 5)?,
                backoff: Duration::from_secs(env.parse_or("GENERATION_BACKOFF_SECS", 10)?),
            },
            max_prompt_words: env.parse_or("PROMPT_MAX_WORDS", DEFAULT_MAX_PROMPT_WORDS)?,
        };

        if generation.retry.max_attempts == 0 {
            bail!("GENERATION_MAX_ATTEMPTS must be at least 1");
        }

        let store = match env.get("STORE_BACKEND").as_deref() {
            None | Some("postgres") => StoreBackend::Postgres {
                database_url: env.require("DATABASE_URL")?,
            },
            Some("data_api") => StoreBackend::DataApi {
                endpoint: env.require("DATA_API_ENDPOINT")?,
                token: env.require("DATA_API_TOKEN")?,
                keyspace: env
                    .get("DATA_API_KEYSPACE")
                    .unwrap_or_else(|| "default_keyspace".to_string()),
                collection: env
                    .get("DATA_API_COLLECTION")
                    .unwrap_or_else(|| "roasts".to_string()),
            },
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                bail!("STORE_BACKEND must be 'postgres', 'data_api' or 'memory', got '{other}'")
            }
        };

        let public_base_url = env
            .get("PUBLIC_BASE_URL")
            .unwrap_or_else(|| "http://localhost:8080".to_string());
        reqwest::Url::parse(&public_base_url)
            .with_context(|| format!("PUBLIC_BASE_URL '{public_base_url}' is not a valid URL"))?;

        Ok(Config {
            generation,
            store,
            public_base_url,
            max_upload_bytes: env.parse_or("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            port: env.parse_or("PORT", 8080)?,
            rust_log: env.get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn require(&self, key: &str) -> Result<String> {
        self.get(key)
            .with_context(|| format!("Required environment variable '{key}' is not set"))
    }

    fn parse_or<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match self.get(key) {
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .with_context(|| format!("{key} has an invalid value '{raw}'")),
            None => Ok(default),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_with_required_secrets() {
        let config = config_from(&[
            ("GENERATION_API_KEY", "hf_secret"),
            ("DATABASE_URL", "postgres://localhost/roasts"),
        ])
        .unwrap();

        assert_eq!(config.generation.provider, Provider::HuggingFace);
        assert_eq!(
            config.generation.endpoint,
            "https://api-inference.huggingface.co/models/deepseek-ai/DeepSeek-R1-Distill-Qwen-32B"
        );
        assert_eq!(config.generation.retry.max_attempts, 5);
        assert_eq!(config.generation.retry.backoff, Duration::from_secs(10));
        assert_eq!(config.generation.max_prompt_words, 2250);
        assert_eq!(config.generation.params.max_tokens, 200);
        assert_eq!(config.port, 8080);
        assert_eq!(
            config.store,
            StoreBackend::Postgres {
                database_url: "postgres://localhost/roasts".to_string()
            }
        );
    }

    #[test]
    fn test_missing_api_key_fails_fast() {
        let err = config_from(&[("DATABASE_URL", "postgres://localhost/roasts")]).unwrap_err();
        assert!(err.to_string().contains("GENERATION_API_KEY"));
    }

    #[test]
    fn test_data_api_backend_requires_token() {
        let err = config_from(&[
            ("GENERATION_API_KEY", "k"),
            ("STORE_BACKEND", "data_api"),
            ("DATA_API_ENDPOINT", "https://db.example.com"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("DATA_API_TOKEN"));
    }

    #[test]
    fn test_chat_provider_and_overrides() {
        let config = config_from(&[
            ("GENERATION_API_KEY", "sk-test"),
            ("GENERATION_PROVIDER", "chat"),
            ("GENERATION_MAX_ATTEMPTS", "3"),
            ("GENERATION_BACKOFF_SECS", "1"),
            ("STORE_BACKEND", "memory"),
            ("PORT", "9000"),
        ])
        .unwrap();

        assert_eq!(config.generation.provider, Provider::ChatCompletions);
        assert_eq!(config.generation.model, "gpt-4o-mini");
        assert_eq!(
            config.generation.endpoint,
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(config.generation.retry.max_attempts, 3);
        assert_eq!(config.store, StoreBackend::Memory);
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        let err = config_from(&[
            ("GENERATION_API_KEY", "k"),
            ("STORE_BACKEND", "memory"),
            ("PORT", "eighty"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("PORT"));

        let err = config_from(&[
            ("GENERATION_API_KEY", "k"),
            ("STORE_BACKEND", "memory"),
            ("GENERATION_MAX_ATTEMPTS", "0"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("at least 1"));
    }

    #[test]
    fn test_public_base_url_must_parse() {
        let err = config_from(&[
            ("GENERATION_API_KEY", "k"),
            ("STORE_BACKEND", "memory"),
            ("PUBLIC_BASE_URL", "roaster dot com"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("PUBLIC_BASE_URL"));
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let err = config_from(&[("GENERATION_API_KEY", "k"), ("STORE_BACKEND", "redis")])
            .unwrap_err();
        assert!(err.to_string().contains("STORE_BACKEND"));
    }
}
