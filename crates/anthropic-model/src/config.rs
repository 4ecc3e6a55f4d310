use std::fmt::Debug;

pub(crate) const DEFAULT_MODEL: &str = "claude-3-opus-20240229";
pub(crate) const DEFAULT_MAX_TOKENS: u32 = 1000;
pub(crate) const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub(crate) const DEFAULT_API_VERSION: &str = "2023-06-01";

/// Builder for [`AnthropicConfig`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AnthropicConfigBuilder {
    api_key: String,
    model: Option<String>,
    max_tokens: Option<u32>,
    base_url: Option<String>,
    api_version: Option<String>,
}

impl AnthropicConfigBuilder {
    /// Creates a builder with the given API key.
    #[inline]
    pub fn with_api_key<S: Into<String>>(api_key: S) -> Self {
        Self {
            api_key: api_key.into(),
            model: None,
            max_tokens: None,
            base_url: None,
            api_version: None,
        }
    }

    /// Sets the model to use.
    #[inline]
    pub fn with_model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the maximum number of output tokens per model call.
    #[inline]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Sets a custom base URL.
    #[inline]
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the `anthropic-version` header value.
    #[inline]
    pub fn with_api_version<S: Into<String>>(mut self, api_version: S) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    /// Builds the configuration.
    #[inline]
    pub fn build(self) -> AnthropicConfig {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        AnthropicConfig {
            api_key: self.api_key,
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_version: self
                .api_version
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
        }
    }
}

impl Debug for AnthropicConfigBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicConfigBuilder")
            .field("api_key", &"<deducted>")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .finish()
    }
}

/// Configuration for the Anthropic Messages API provider.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AnthropicConfig {
    pub(crate) api_key: String,
    pub(crate) model: String,
    pub(crate) max_tokens: u32,
    pub(crate) base_url: String,
    pub(crate) api_version: String,
}

impl AnthropicConfig {
    /// Returns the model identifier sent with every request.
    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the output token budget sent with every request.
    #[inline]
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// Returns the full URL of the messages endpoint.
    #[inline]
    pub fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }
}

impl Debug for AnthropicConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicConfig")
            .field("api_key", &"<deducted>")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnthropicConfigBuilder::with_api_key("sk-test").build();
        assert_eq!(config.model(), DEFAULT_MODEL);
        assert_eq!(config.max_tokens(), 1000);
        assert_eq!(
            config.messages_url(),
            "https://api.anthropic.com/v1/messages"
        );
        assert_eq!(config.api_version, "2023-06-01");
    }

    #[test]
    fn test_debug_hides_api_key() {
        let builder = AnthropicConfigBuilder::with_api_key("sk-secret")
            .with_base_url("http://localhost:8080/");
        assert!(!format!("{builder:?}").contains("sk-secret"));

        let config = builder.build();
        assert!(!format!("{config:?}").contains("sk-secret"));
        assert_eq!(config.messages_url(), "http://localhost:8080/v1/messages");
    }

    #[test]
    fn test_api_version_override() {
        let config = AnthropicConfigBuilder::with_api_key("sk-test")
            .with_api_version("2024-01-01")
            .with_model("claude-3-haiku-20240307")
            .with_max_tokens(256)
            .build();
        assert_eq!(config.api_version, "2024-01-01");
        assert_eq!(config.model(), "claude-3-haiku-20240307");
        assert_eq!(config.max_tokens(), 256);
    }
}
