//! Configuration read from the process environment.

use std::env;
use std::fmt::{self, Debug, Display};

use flash_briefing_anthropic_model::{AnthropicConfig, AnthropicConfigBuilder};

use crate::catalog::DEFAULT_TOOL_SERVER_URL;

const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";
const MODEL_VAR: &str = "ANTHROPIC_MODEL";
const MAX_TOKENS_VAR: &str = "ANTHROPIC_MAX_TOKENS";
const BASE_URL_VAR: &str = "ANTHROPIC_BASE_URL";
const TOOL_SERVER_URL_VAR: &str = "TOOL_SERVER_URL";

/// An environment variable is missing or unusable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set.
    Missing(&'static str),
    /// A variable is set to something that cannot be parsed.
    Invalid {
        /// The variable name.
        name: &'static str,
        /// The value it holds.
        value: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(name) => {
                write!(f, "{name} environment variable is not set")
            }
            ConfigError::Invalid { name, value } => {
                write!(f, "{name} environment variable has invalid value {value:?}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Settings of a briefing session.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    api_key: String,
    model: Option<String>,
    max_tokens: Option<u32>,
    anthropic_base_url: Option<String>,
    tool_server_url: String,
}

impl Config {
    /// Reads the configuration from the process environment.
    #[inline]
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let api_key = get(API_KEY_VAR).ok_or(ConfigError::Missing(API_KEY_VAR))?;
        let max_tokens = match get(MAX_TOKENS_VAR) {
            Some(value) => match value.trim().parse() {
                Ok(0) | Err(_) => {
                    return Err(ConfigError::Invalid {
                        name: MAX_TOKENS_VAR,
                        value,
                    });
                }
                Ok(parsed) => Some(parsed),
            },
            None => None,
        };

        Ok(Self {
            api_key,
            model: get(MODEL_VAR),
            max_tokens,
            anthropic_base_url: get(BASE_URL_VAR),
            tool_server_url: get(TOOL_SERVER_URL_VAR)
                .unwrap_or_else(|| DEFAULT_TOOL_SERVER_URL.to_owned()),
        })
    }

    /// Returns the base URL of the tool server.
    #[inline]
    pub fn tool_server_url(&self) -> &str {
        &self.tool_server_url
    }

    /// Builds the model provider configuration.
    pub fn anthropic_config(&self) -> AnthropicConfig {
        let mut builder = AnthropicConfigBuilder::with_api_key(&self.api_key);
        if let Some(model) = &self.model {
            builder = builder.with_model(model);
        }
        if let Some(max_tokens) = self.max_tokens {
            builder = builder.with_max_tokens(max_tokens);
        }
        if let Some(base_url) = &self.anthropic_base_url {
            builder = builder.with_base_url(base_url);
        }
        builder.build()
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<deducted>")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("anthropic_base_url", &self.anthropic_base_url)
            .field("tool_server_url", &self.tool_server_url)
            .finish()
    }
}
