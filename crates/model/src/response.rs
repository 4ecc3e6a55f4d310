use serde::{Deserialize, Serialize};

use crate::request::ToolRequest;

/// A complete response from the model provider.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    /// The blocks emitted by the model, in the order they were emitted.
    pub blocks: Vec<ModelResponseBlock>,
    /// The reason the model stopped generating, if the provider reports it.
    pub finish_reason: Option<ModelFinishReason>,
}

impl ModelResponse {
    /// Creates a response with the specified blocks.
    #[inline]
    pub fn with_blocks(blocks: impl Into<Vec<ModelResponseBlock>>) -> Self {
        Self {
            blocks: blocks.into(),
            finish_reason: None,
        }
    }

    /// Returns `true` if any block of this response is a tool request.
    pub fn has_tool_request(&self) -> bool {
        self.blocks
            .iter()
            .any(|block| matches!(block, ModelResponseBlock::ToolRequest(_)))
    }
}

/// A block in a model response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ModelResponseBlock {
    /// Free text.
    Text(String),
    /// A request to call a tool.
    ToolRequest(ToolRequest),
}

/// The reason why a model response has finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelFinishReason {
    /// The model needs to call a tool.
    ToolUse,
    /// The model has finished its turn.
    EndTurn,
    /// The output token budget ran out.
    MaxTokens,
    /// Any reason this crate doesn't model.
    Other,
}
