//! Configuration management
//!
//! Lynn is configured entirely from the process environment (plus an
//! optional `.env` file loaded by the binary). The credential for the
//! completion service is the only required value; everything else has
//! a default.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::Result;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API key for the completion service (required)
    pub api_key: String,

    /// Model to use
    pub model: String,

    /// Base URL of the OpenAI-compatible completion API
    pub base_url: String,

    /// Path to the chemistry knowledge base JSON file
    pub knowledge_path: String,

    /// Telegram configuration
    pub telegram: TelegramConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token; the gateway refuses to start without one
    pub token: String,

    /// Usernames or numeric IDs allowed to talk to the bot.
    /// Empty list means open access.
    pub allow_from: Vec<String>,
}

impl TelegramConfig {
    pub fn enabled(&self) -> bool {
        !self.token.is_empty()
    }
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_knowledge_path() -> String {
    "chem_knowledge.json".to_string()
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// Fails with [`Error::Config`] when `OPENAI_API_KEY` is absent, so a
    /// misconfigured process dies before any adapter becomes reachable.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("OPENAI_API_KEY")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                Error::Config(
                    "OPENAI_API_KEY not set. Add it to the environment or a .env file."
                        .to_string(),
                )
            })?;

        let allow_from = lookup("LYNN_TELEGRAM_ALLOW")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            api_key,
            model: lookup("LYNN_MODEL").unwrap_or_else(default_model),
            base_url: lookup("LYNN_BASE_URL").unwrap_or_else(default_base_url),
            knowledge_path: lookup("LYNN_KNOWLEDGE_PATH").unwrap_or_else(default_knowledge_path),
            telegram: TelegramConfig {
                token: lookup("TELEGRAM_BOT_TOKEN").unwrap_or_default(),
                allow_from,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        let env = vars(&[]);
        let result = Config::from_lookup(|k| env.get(k).cloned());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_blank_api_key_is_fatal() {
        let env = vars(&[("OPENAI_API_KEY", "   ")]);
        let result = Config::from_lookup(|k| env.get(k).cloned());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_defaults() {
        let env = vars(&[("OPENAI_API_KEY", "sk-test")]);
        let config = Config::from_lookup(|k| env.get(k).cloned()).unwrap();
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.knowledge_path, "chem_knowledge.json");
        assert!(!config.telegram.enabled());
    }

    #[test]
    fn test_telegram_allow_list() {
        let env = vars(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("LYNN_TELEGRAM_ALLOW", "alice, 4242 ,"),
        ]);
        let config = Config::from_lookup(|k| env.get(k).cloned()).unwrap();
        assert!(config.telegram.enabled());
        assert_eq!(config.telegram.allow_from, vec!["alice", "4242"]);
    }
}
