use flash_briefing_model::{
    ContentBlock, ModelFinishReason, ModelRequest, ModelResponse,
    ModelResponseBlock, Role, ToolDescriptor, ToolRequest, Turn,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::AnthropicConfig;

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct MessagesResponse {
    pub id: String,
    pub content: Vec<ResponseBlock>,
    pub stop_reason: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ErrorDetail {
    pub r#type: String,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Serialize)]
struct Tool {
    name: String,
    description: String,
    input_schema: Value,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RequestBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: Vec<RequestBlock>,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
struct Message {
    role: Role,
    content: Vec<RequestBlock>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MessagesRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

// -----------
// Conversions
// -----------

#[inline]
pub fn create_request(
    req: &ModelRequest,
    config: &AnthropicConfig,
) -> MessagesRequest {
    MessagesRequest {
        model: config.model.clone(),
        max_tokens: config.max_tokens,
        messages: req.messages.iter().map(create_message).collect(),
        tools: req.tools.iter().map(create_tool).collect(),
    }
}

#[inline]
fn create_message(turn: &Turn) -> Message {
    Message {
        role: turn.role(),
        content: turn.blocks().iter().map(create_block).collect(),
    }
}

fn create_block(block: &ContentBlock) -> RequestBlock {
    match block {
        ContentBlock::Text(text) => RequestBlock::Text { text: text.clone() },
        ContentBlock::ToolRequest(req) => RequestBlock::ToolUse {
            id: req.id.clone(),
            name: req.tool_name.clone(),
            input: req.input.clone(),
        },
        // Tool results always travel as a single text part.
        ContentBlock::ToolResult(result) => RequestBlock::ToolResult {
            tool_use_id: result.tool_request_id.clone(),
            content: vec![RequestBlock::Text {
                text: result.payload.clone(),
            }],
        },
    }
}

#[inline]
fn create_tool(tool: &ToolDescriptor) -> Tool {
    Tool {
        name: tool.name.clone(),
        description: tool.description.clone(),
        input_schema: tool.input_schema.clone(),
    }
}

pub fn into_model_response(resp: MessagesResponse) -> ModelResponse {
    let blocks = resp
        .content
        .into_iter()
        .filter_map(|block| match block {
            ResponseBlock::Text { text } => Some(ModelResponseBlock::Text(text)),
            ResponseBlock::ToolUse { id, name, input } => {
                Some(ModelResponseBlock::ToolRequest(ToolRequest {
                    id,
                    tool_name: name,
                    input,
                }))
            }
            ResponseBlock::Unsupported => {
                debug!("skipping an unsupported content block");
                None
            }
        })
        .collect();
    let finish_reason =
        resp.stop_reason.as_deref().map(|reason| match reason {
            "tool_use" => ModelFinishReason::ToolUse,
            "end_turn" | "stop_sequence" => ModelFinishReason::EndTurn,
            "max_tokens" => ModelFinishReason::MaxTokens,
            _ => ModelFinishReason::Other,
        });
    ModelResponse {
        blocks,
        finish_reason,
    }
}
