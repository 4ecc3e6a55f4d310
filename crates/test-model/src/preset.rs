use flash_briefing_model::{
    ModelFinishReason, ModelResponse, ModelResponseBlock, ToolRequest,
};
use serde::{Deserialize, Serialize};

/// The blocks in a preset response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PresetBlock {
    #[serde(rename = "text")]
    Text(String),
    #[serde(rename = "tool_request")]
    ToolRequest(ToolRequest),
}

/// A failure the fake model reports instead of a response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetFailure {
    /// The HTTP status to report.
    pub status: u16,
    /// The response body to report.
    pub body: String,
}

/// The preset response for one model call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PresetResponse {
    /// Blocks in this response.
    pub blocks: Vec<PresetBlock>,
    /// If set, the call fails with this status and body instead.
    pub failure: Option<PresetFailure>,
}

impl PresetResponse {
    /// Creates a `PresetResponse` with the specified blocks.
    #[inline]
    pub fn with_blocks(blocks: impl Into<Vec<PresetBlock>>) -> Self {
        Self {
            blocks: blocks.into(),
            failure: None,
        }
    }

    /// Creates a `PresetResponse` holding a single text block.
    #[inline]
    pub fn text<S: Into<String>>(text: S) -> Self {
        Self::with_blocks([PresetBlock::Text(text.into())])
    }

    /// Creates a `PresetResponse` that fails with the given status.
    #[inline]
    pub fn failing<S: Into<String>>(status: u16, body: S) -> Self {
        Self {
            blocks: vec![],
            failure: Some(PresetFailure {
                status,
                body: body.into(),
            }),
        }
    }

    pub(crate) fn to_model_response(&self) -> ModelResponse {
        let blocks: Vec<_> = self
            .blocks
            .iter()
            .map(|block| match block {
                PresetBlock::Text(text) => ModelResponseBlock::Text(text.clone()),
                PresetBlock::ToolRequest(req) => {
                    ModelResponseBlock::ToolRequest(req.clone())
                }
            })
            .collect();
        let has_tool_request = blocks
            .iter()
            .any(|block| matches!(block, ModelResponseBlock::ToolRequest(_)));
        ModelResponse {
            blocks,
            finish_reason: Some(if has_tool_request {
                ModelFinishReason::ToolUse
            } else {
                ModelFinishReason::EndTurn
            }),
        }
    }
}
