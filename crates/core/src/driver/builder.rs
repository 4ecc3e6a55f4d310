use std::sync::Arc;

use flash_briefing_model::{ModelProvider, ToolRequest, Turn};
use serde_json::Value;

use super::{Driver, ToolCallObserver, ToolResultObserver, TurnObserver};
use crate::model_client::ModelClient;
use crate::tool::{ToolDispatcher, ToolRegistry, ToolRouter};

/// [`Driver`] builder.
pub struct DriverBuilder {
    model_client: ModelClient,
    dispatcher: Option<Arc<dyn ToolDispatcher>>,
    on_transcript: Option<TurnObserver>,
    on_tool_call: Option<ToolCallObserver>,
    on_tool_result: Option<ToolResultObserver>,
}

impl DriverBuilder {
    /// Creates a new builder with the specified model provider.
    #[inline]
    pub fn with_model_provider<P: ModelProvider + 'static>(
        provider: P,
    ) -> Self {
        Self {
            model_client: ModelClient::new(provider),
            dispatcher: None,
            on_transcript: None,
            on_tool_call: None,
            on_tool_result: None,
        }
    }

    /// Sets what answers the model's tool requests.
    ///
    /// Without one, the driver advertises no tools.
    #[inline]
    pub fn with_dispatcher<D: ToolDispatcher + 'static>(
        mut self,
        dispatcher: D,
    ) -> Self {
        let dispatcher: Arc<dyn ToolDispatcher> = Arc::new(dispatcher);
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Routes tool requests over HTTP using the given registry.
    #[inline]
    pub fn with_registry(self, registry: Arc<ToolRegistry>) -> Self {
        self.with_dispatcher(ToolRouter::new(registry))
    }

    /// Attaches a callback invoked for every turn appended to a transcript.
    #[inline]
    pub fn on_transcript(
        mut self,
        on_transcript: impl Fn(&Turn) + Send + Sync + 'static,
    ) -> Self {
        self.on_transcript = Some(Box::new(on_transcript));
        self
    }

    /// Attaches a callback invoked before a tool is dispatched.
    #[inline]
    pub fn on_tool_call(
        mut self,
        on_tool_call: impl Fn(&ToolRequest) + Send + Sync + 'static,
    ) -> Self {
        self.on_tool_call = Some(Box::new(on_tool_call));
        self
    }

    /// Attaches a callback invoked with the value a tool call produced.
    #[inline]
    pub fn on_tool_result(
        mut self,
        on_tool_result: impl Fn(&ToolRequest, &Value) + Send + Sync + 'static,
    ) -> Self {
        self.on_tool_result = Some(Box::new(on_tool_result));
        self
    }

    /// Builds the driver.
    pub fn build(self) -> Driver {
        let dispatcher: Arc<dyn ToolDispatcher> = match self.dispatcher {
            Some(dispatcher) => dispatcher,
            None => Arc::new(ToolRouter::new(Arc::new(ToolRegistry::empty()))),
        };
        Driver {
            model_client: self.model_client,
            dispatcher,
            on_transcript: self.on_transcript,
            on_tool_call: self.on_tool_call,
            on_tool_result: self.on_tool_result,
        }
    }
}
