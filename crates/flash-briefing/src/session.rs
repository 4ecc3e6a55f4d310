use std::sync::Arc;

use flash_briefing_anthropic_model::AnthropicProvider;
use flash_briefing_core::tool::{RegistryError, ToolRegistry};
use flash_briefing_core::{Conversation, Driver, DriverBuilder, DriverError};
use flash_briefing_model::{ModelProvider, ToolRequest, Turn};
use serde_json::Value;

use crate::catalog::{self, DEFAULT_TOOL_SERVER_URL};
use crate::config::Config;

/// A session builder.
///
/// See [`Session`].
pub struct SessionBuilder {
    driver_builder: DriverBuilder,
    tool_server_url: String,
}

impl SessionBuilder {
    /// Creates a session builder with a specified model provider.
    pub fn with_model_provider<M: ModelProvider + 'static>(provider: M) -> Self {
        Self {
            driver_builder: DriverBuilder::with_model_provider(provider),
            tool_server_url: DEFAULT_TOOL_SERVER_URL.to_owned(),
        }
    }

    /// Creates a session builder talking to Anthropic and the tool server
    /// named in `config`.
    pub fn from_config(config: &Config) -> Self {
        let provider = AnthropicProvider::new(config.anthropic_config());
        Self::with_model_provider(provider).with_tool_server_url(config.tool_server_url())
    }

    /// Sets the base URL of the tool server.
    #[inline]
    pub fn with_tool_server_url<S: Into<String>>(mut self, url: S) -> Self {
        self.tool_server_url = url.into();
        self
    }

    /// Attaches a callback to be invoked when a turn is appended.
    #[inline]
    pub fn on_transcript(
        mut self,
        on_transcript: impl Fn(&Turn) + Send + Sync + 'static,
    ) -> Self {
        self.driver_builder = self.driver_builder.on_transcript(on_transcript);
        self
    }

    /// Attaches a callback to be invoked before a tool is called.
    #[inline]
    pub fn on_tool_call(
        mut self,
        on_tool_call: impl Fn(&ToolRequest) + Send + Sync + 'static,
    ) -> Self {
        self.driver_builder = self.driver_builder.on_tool_call(on_tool_call);
        self
    }

    /// Attaches a callback to be invoked with the value a tool produced.
    #[inline]
    pub fn on_tool_result(
        mut self,
        on_tool_result: impl Fn(&ToolRequest, &Value) + Send + Sync + 'static,
    ) -> Self {
        self.driver_builder = self.driver_builder.on_tool_result(on_tool_result);
        self
    }

    /// Builds a new session.
    pub fn build(self) -> Result<Session, RegistryError> {
        let registry = Arc::new(catalog::build_registry(&self.tool_server_url)?);
        let driver = self
            .driver_builder
            .with_registry(Arc::clone(&registry))
            .build();
        Ok(Session { driver, registry })
    }
}

/// A briefing session: a driver wired to the briefing tools.
///
/// Each message starts a fresh conversation.
pub struct Session {
    driver: Driver,
    registry: Arc<ToolRegistry>,
}

impl Session {
    /// Returns the tools available to the model.
    #[inline]
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Drives a conversation until it is done or has failed.
    #[inline]
    pub async fn run(&self, conversation: &mut Conversation) -> Result<(), DriverError> {
        self.driver.run(conversation).await
    }

    /// Starts a conversation with `message` and drives it to the end.
    pub async fn send_message(&self, message: &str) -> Result<Conversation, DriverError> {
        let mut conversation = Conversation::with_user_message(message);
        info!("starting a briefing");
        self.run(&mut conversation).await?;
        info!(
            "briefing finished after {} turn(s)",
            conversation.transcript().len()
        );
        Ok(conversation)
    }
}
