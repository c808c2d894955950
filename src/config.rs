//! Process configuration from environment variables (and an optional `.env`)

use crate::anthropic::AnthropicClient;
use crate::classifier::{KeywordLexicon, LexiconError};
use crate::generator::TextGenerator;
use crate::openai::OpenAIClient;
use crate::profile::{DEFAULT_MEMORY_FILE, DEFAULT_USER_ID};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAI,
    Anthropic,
    Offline,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAI => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Offline => "offline",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown COMPANION_PROVIDER '{0}' (expected openai, anthropic, offline or auto)")]
    UnknownProvider(String),

    #[error("{provider} provider selected but {var} is not set")]
    MissingKey { provider: &'static str, var: &'static str },

    #[error("Invalid value for {var}: '{value}'")]
    InvalidNumber { var: &'static str, value: String },

    #[error("Failed to load keyword lexicon: {0}")]
    Lexicon(#[from] LexiconError),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub provider: Provider,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub memory_file: PathBuf,
    pub user_id: String,
    pub log_dir: PathBuf,
    pub lexicon_file: Option<PathBuf>,
    pub request_timeout: Duration,
}

impl Config {
    /// Load `.env` if present, then read the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(&vars)
    }

    /// Build a config from an explicit variable map
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            vars.get(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let openai_key = get("OPENAI_API_KEY");
        let anthropic_key = get("ANTHROPIC_API_KEY");

        let requested = get("COMPANION_PROVIDER")
            .unwrap_or_else(|| "auto".to_string())
            .to_lowercase();

        let (provider, api_key) = match requested.as_str() {
            "auto" => match (openai_key, anthropic_key) {
                (Some(key), _) => (Provider::OpenAI, Some(key)),
                (None, Some(key)) => (Provider::Anthropic, Some(key)),
                (None, None) => (Provider::Offline, None),
            },
            "openai" => {
                let key = openai_key.ok_or(ConfigError::MissingKey {
                    provider: "openai",
                    var: "OPENAI_API_KEY",
                })?;
                (Provider::OpenAI, Some(key))
            }
            "anthropic" => {
                let key = anthropic_key.ok_or(ConfigError::MissingKey {
                    provider: "anthropic",
                    var: "ANTHROPIC_API_KEY",
                })?;
                (Provider::Anthropic, Some(key))
            }
            "offline" => (Provider::Offline, None),
            other => return Err(ConfigError::UnknownProvider(other.to_string())),
        };

        let timeout_secs = match get("COMPANION_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|_| ConfigError::InvalidNumber {
                var: "COMPANION_TIMEOUT_SECS",
                value: raw.clone(),
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            provider,
            api_key,
            model: get("COMPANION_MODEL"),
            memory_file: get("COMPANION_MEMORY_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MEMORY_FILE)),
            user_id: get("COMPANION_USER_ID").unwrap_or_else(|| DEFAULT_USER_ID.to_string()),
            log_dir: get("COMPANION_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR)),
            lexicon_file: get("COMPANION_LEXICON").map(PathBuf::from),
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Built-in lexicon unless a lexicon file is configured
    pub fn lexicon(&self) -> Result<KeywordLexicon, ConfigError> {
        match &self.lexicon_file {
            Some(path) => Ok(KeywordLexicon::from_json_file(path)?),
            None => Ok(KeywordLexicon::default()),
        }
    }

    /// Generative backend for the configured provider, if any
    pub fn backend(&self) -> Option<Box<dyn TextGenerator>> {
        let key = self.api_key.as_deref()?;
        let model = self.model.as_deref();
        match self.provider {
            Provider::OpenAI => Some(Box::new(OpenAIClient::new(key, model, self.request_timeout))),
            Provider::Anthropic => Some(Box::new(AnthropicClient::new(key, model, self.request_timeout))),
            Provider::Offline => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_are_offline() {
        let config = Config::from_vars(&HashMap::new()).unwrap();
        assert_eq!(config.provider, Provider::Offline);
        assert_eq!(config.memory_file, PathBuf::from("memory/user_memory.json"));
        assert_eq!(config.user_id, "default_user");
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert!(config.backend().is_none());
    }

    #[test]
    fn test_auto_prefers_openai() {
        let config = Config::from_vars(&vars(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("ANTHROPIC_API_KEY", "ak-test"),
        ]))
        .unwrap();
        assert_eq!(config.provider, Provider::OpenAI);
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));

        let anthropic_only = Config::from_vars(&vars(&[("ANTHROPIC_API_KEY", "ak-test")])).unwrap();
        assert_eq!(anthropic_only.provider, Provider::Anthropic);
        assert_eq!(anthropic_only.backend().map(|b| b.name().to_string()), Some("anthropic".to_string()));
    }

    #[test]
    fn test_explicit_provider_requires_key() {
        let result = Config::from_vars(&vars(&[("COMPANION_PROVIDER", "anthropic")]));
        assert!(matches!(result, Err(ConfigError::MissingKey { .. })));
    }

    #[test]
    fn test_offline_ignores_keys() {
        let config = Config::from_vars(&vars(&[
            ("COMPANION_PROVIDER", "Offline"),
            ("OPENAI_API_KEY", "sk-test"),
        ]))
        .unwrap();
        assert_eq!(config.provider, Provider::Offline);
        assert!(config.backend().is_none());
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            Config::from_vars(&vars(&[("COMPANION_PROVIDER", "gemini")])),
            Err(ConfigError::UnknownProvider(_))
        ));
        assert!(matches!(
            Config::from_vars(&vars(&[("COMPANION_TIMEOUT_SECS", "soon")])),
            Err(ConfigError::InvalidNumber { .. })
        ));
    }
}
