use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ChatError, Result};

/// Default cap on the characters of a loaded document kept in the prompt.
pub const DEFAULT_MAX_DOCUMENT_CHARS: usize = 48_000;

/// Default bound on the length of a generated answer, in tokens.
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Language-model backends the assistant can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Gemini,
}

impl Provider {
    pub fn api_key_var(&self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-3.5-turbo",
            Self::Gemini => "gemini-2.0-flash",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1",
            Self::Gemini => "https://generativelanguage.googleapis.com/v1beta",
        }
    }
}

impl FromStr for Provider {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "gemini" => Ok(Self::Gemini),
            other => Err(ChatError::Config(format!(
                "DOCUMIND_PROVIDER must be 'openai' or 'gemini', got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAi => f.write_str("openai"),
            Self::Gemini => f.write_str("gemini"),
        }
    }
}

/// Runtime configuration, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub provider: Provider,
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub max_tokens: u32,
    pub request_timeout: Option<Duration>,
    /// 0 disables truncation
    pub max_document_chars: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let provider = match get("DOCUMIND_PROVIDER") {
            Some(value) => value.parse()?,
            None => Provider::OpenAi,
        };

        let api_key = get(provider.api_key_var()).ok_or_else(|| {
            ChatError::Config(format!(
                "{} environment variable not set",
                provider.api_key_var()
            ))
        })?;

        let model = get("DOCUMIND_MODEL").unwrap_or_else(|| provider.default_model().to_string());
        let base_url = get("DOCUMIND_BASE_URL")
            .unwrap_or_else(|| provider.default_base_url().to_string())
            .trim_end_matches('/')
            .to_string();

        let max_tokens = parse_var(&get, "DOCUMIND_MAX_TOKENS")?.unwrap_or(DEFAULT_MAX_TOKENS);
        if max_tokens == 0 {
            return Err(ChatError::Config(
                "DOCUMIND_MAX_TOKENS must be greater than zero".to_string(),
            ));
        }

        let request_timeout = parse_var::<u64, _>(&get, "DOCUMIND_TIMEOUT_SECS")?
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        let max_document_chars = parse_var(&get, "DOCUMIND_MAX_DOCUMENT_CHARS")?
            .unwrap_or(DEFAULT_MAX_DOCUMENT_CHARS);

        Ok(Self {
            provider,
            api_key,
            model,
            base_url,
            max_tokens,
            request_timeout,
            max_document_chars,
        })
    }
}

fn parse_var<T, F>(get: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    get(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|e| ChatError::Config(format!("invalid {key} '{value}': {e}")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_to_openai() {
        let config = Config::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-test")])).unwrap();

        assert_eq!(config.provider, Provider::OpenAi);
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(config.request_timeout, None);
        assert_eq!(config.max_document_chars, DEFAULT_MAX_DOCUMENT_CHARS);
    }

    #[test]
    fn gemini_reads_its_own_key() {
        let config = Config::from_lookup(lookup(&[
            ("DOCUMIND_PROVIDER", "Gemini"),
            ("GEMINI_API_KEY", "g-key"),
            ("DOCUMIND_BASE_URL", "http://localhost:8080/"),
            ("DOCUMIND_TIMEOUT_SECS", "30"),
        ]))
        .unwrap();

        assert_eq!(config.provider, Provider::Gemini);
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn missing_key_names_the_variable() {
        let err = Config::from_lookup(lookup(&[("DOCUMIND_PROVIDER", "gemini")])).unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn blank_key_counts_as_missing() {
        assert!(Config::from_lookup(lookup(&[("OPENAI_API_KEY", "  ")])).is_err());
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("DOCUMIND_MAX_DOCUMENT_CHARS", "lots"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("DOCUMIND_MAX_DOCUMENT_CHARS"));

        assert!(Config::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("DOCUMIND_MAX_TOKENS", "0"),
        ]))
        .is_err());
    }

    #[test]
    fn unknown_provider_is_rejected() {
        assert!(Config::from_lookup(lookup(&[("DOCUMIND_PROVIDER", "llama")])).is_err());
    }
}
