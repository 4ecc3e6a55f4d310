use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A request to be sent to the model provider.
///
/// Every request carries the full transcript and the full tool set, the model
/// is never given a diff.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelRequest {
    /// The transcript so far, oldest turn first.
    pub messages: Vec<Turn>,
    /// Tools that are available to the model.
    pub tools: Vec<ToolDescriptor>,
}

/// Who produced a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The user, including tool results reported back to the model.
    User,
    /// The model.
    Assistant,
}

/// One role-tagged entry of the transcript.
///
/// A turn is immutable once created. Its blocks are never empty.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    role: Role,
    blocks: Vec<ContentBlock>,
}

impl Turn {
    /// Creates a user turn holding a single text block.
    #[inline]
    pub fn user_text<S: Into<String>>(text: S) -> Self {
        Self {
            role: Role::User,
            blocks: vec![ContentBlock::Text(text.into())],
        }
    }

    /// Creates an assistant turn holding a single text block.
    #[inline]
    pub fn assistant_text<S: Into<String>>(text: S) -> Self {
        Self {
            role: Role::Assistant,
            blocks: vec![ContentBlock::Text(text.into())],
        }
    }

    /// Creates an assistant turn holding exactly one tool request.
    #[inline]
    pub fn tool_request(request: ToolRequest) -> Self {
        Self {
            role: Role::Assistant,
            blocks: vec![ContentBlock::ToolRequest(request)],
        }
    }

    /// Creates a user turn holding exactly one tool result.
    #[inline]
    pub fn tool_result(result: ToolResult) -> Self {
        Self {
            role: Role::User,
            blocks: vec![ContentBlock::ToolResult(result)],
        }
    }

    /// Returns the role of this turn.
    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the content blocks of this turn, in order.
    #[inline]
    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }

    /// Returns the tool request carried by this turn, if any.
    pub fn as_tool_request(&self) -> Option<&ToolRequest> {
        self.blocks.iter().find_map(|block| match block {
            ContentBlock::ToolRequest(req) => Some(req),
            _ => None,
        })
    }

    /// Returns the tool result carried by this turn, if any.
    pub fn as_tool_result(&self) -> Option<&ToolResult> {
        self.blocks.iter().find_map(|block| match block {
            ContentBlock::ToolResult(result) => Some(result),
            _ => None,
        })
    }
}

/// The atomic unit within a turn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text.
    Text(String),
    /// A tool invocation requested by the model. Assistant turns only.
    ToolRequest(ToolRequest),
    /// The answer to a tool request. User turns only.
    ToolResult(ToolResult),
}

/// Describes a tool call request from the model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolRequest {
    /// The opaque identifier the model assigned to this request.
    pub id: String,
    /// The name of the tool to call.
    pub tool_name: String,
    /// The structured input to pass to the tool.
    pub input: Value,
}

/// The result of calling a tool.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolResult {
    /// The identifier of the tool request this result answers.
    pub tool_request_id: String,
    /// The serialized result of the tool call.
    pub payload: String,
}

/// Describes a tool that can be used by the model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Name of the tool, unique within a registry.
    pub name: String,
    /// Description of the tool.
    pub description: String,
    /// Input definition of the tool.
    ///
    /// The input should be described by a
    /// [JSON schema](https://json-schema.org/).
    pub input_schema: Value,
}
