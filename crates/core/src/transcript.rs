//! The append-only transcript of a conversation.

use std::fmt::{self, Display};

use flash_briefing_model::{ToolRequest, ToolResult, Turn};

/// An append that would leave the transcript out of order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TranscriptError {
    /// A tool request is still waiting for its result.
    DanglingToolRequest {
        /// Identifier of the unanswered request.
        id: String,
    },
    /// A tool result was appended without a preceding tool request.
    NoPendingToolRequest,
    /// A tool result answers a different request than the pending one.
    ToolResultMismatch {
        /// Identifier of the pending request.
        expected: String,
        /// Identifier carried by the result.
        found: String,
    },
}

impl Display for TranscriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscriptError::DanglingToolRequest { id } => {
                write!(f, "tool request `{id}` has not been answered")
            }
            TranscriptError::NoPendingToolRequest => {
                write!(f, "no tool request is waiting for a result")
            }
            TranscriptError::ToolResultMismatch { expected, found } => {
                write!(f, "tool result `{found}` does not answer `{expected}`")
            }
        }
    }
}

impl std::error::Error for TranscriptError {}

/// Ordered sequence of turns exchanged with the model.
///
/// Turns can only be appended, never edited or removed. A tool request turn
/// must be followed directly by the user turn carrying its result; every
/// other append is rejected while a request is pending.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Transcript {
    turns: Vec<Turn>,
    pending: Option<String>,
}

impl Transcript {
    /// Creates an empty transcript.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transcript whose first turn is a user turn holding `text`.
    #[inline]
    pub fn with_user_text<S: Into<String>>(text: S) -> Self {
        Self {
            turns: vec![Turn::user_text(text)],
            pending: None,
        }
    }

    /// Appends a user turn holding `text`.
    #[inline]
    pub fn append_user_text<S: Into<String>>(
        &mut self,
        text: S,
    ) -> Result<&Turn, TranscriptError> {
        self.ensure_settled()?;
        Ok(self.push(Turn::user_text(text)))
    }

    /// Appends an assistant turn holding `text`.
    #[inline]
    pub fn append_assistant_text<S: Into<String>>(
        &mut self,
        text: S,
    ) -> Result<&Turn, TranscriptError> {
        self.ensure_settled()?;
        Ok(self.push(Turn::assistant_text(text)))
    }

    /// Appends an assistant turn holding exactly one tool request.
    pub fn append_tool_request(
        &mut self,
        request: ToolRequest,
    ) -> Result<&Turn, TranscriptError> {
        self.ensure_settled()?;
        self.pending = Some(request.id.clone());
        Ok(self.push(Turn::tool_request(request)))
    }

    /// Appends the user turn answering the pending tool request.
    pub fn append_tool_result(
        &mut self,
        result: ToolResult,
    ) -> Result<&Turn, TranscriptError> {
        let Some(expected) = self.pending.take() else {
            return Err(TranscriptError::NoPendingToolRequest);
        };
        if expected != result.tool_request_id {
            let found = result.tool_request_id;
            self.pending = Some(expected.clone());
            return Err(TranscriptError::ToolResultMismatch { expected, found });
        }
        Ok(self.push(Turn::tool_result(result)))
    }

    /// Fails if a tool request is still waiting for its result.
    #[inline]
    pub fn ensure_settled(&self) -> Result<(), TranscriptError> {
        match &self.pending {
            Some(id) => Err(TranscriptError::DanglingToolRequest { id: id.clone() }),
            None => Ok(()),
        }
    }

    /// Returns the tool request waiting for its result, if any.
    pub fn pending_tool_request(&self) -> Option<&ToolRequest> {
        self.pending.as_ref()?;
        self.turns.last().and_then(Turn::as_tool_request)
    }

    /// Returns all turns, oldest first.
    #[inline]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Returns the number of turns.
    #[inline]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Returns `true` if no turn has been appended yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    fn push(&mut self, turn: Turn) -> &Turn {
        self.turns.push(turn);
        &self.turns[self.turns.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use flash_briefing_model::{ContentBlock, Role};
    use serde_json::json;

    use super::*;

    fn request(id: &str) -> ToolRequest {
        ToolRequest {
            id: id.to_owned(),
            tool_name: "fetchNews".to_owned(),
            input: json!({ "query": "AI" }),
        }
    }

    fn result(id: &str) -> ToolResult {
        ToolResult {
            tool_request_id: id.to_owned(),
            payload: "[]".to_owned(),
        }
    }

    #[test]
    fn test_request_then_result() {
        let mut transcript = Transcript::new();
        transcript.append_user_text("fetch AI news").unwrap();
        transcript.append_tool_request(request("toolu_1")).unwrap();
        assert_eq!(
            transcript.pending_tool_request().map(|r| r.id.as_str()),
            Some("toolu_1")
        );

        let turn = transcript.append_tool_result(result("toolu_1")).unwrap();
        assert_eq!(turn.role(), Role::User);
        assert!(matches!(turn.blocks(), [ContentBlock::ToolResult(_)]));
        assert!(transcript.pending_tool_request().is_none());
        assert!(transcript.ensure_settled().is_ok());
        assert_eq!(transcript.len(), 3);
    }

    #[test]
    fn test_rejects_append_while_pending() {
        let mut transcript = Transcript::new();
        transcript.append_tool_request(request("toolu_1")).unwrap();

        let err = transcript.append_assistant_text("hmm").unwrap_err();
        assert_eq!(
            err,
            TranscriptError::DanglingToolRequest {
                id: "toolu_1".to_owned()
            }
        );
        assert!(transcript.append_user_text("hello").is_err());
        assert!(transcript.append_tool_request(request("toolu_2")).is_err());
        assert_eq!(transcript.len(), 1);
    }

    #[test]
    fn test_rejects_unexpected_result() {
        let mut transcript = Transcript::new();
        assert_eq!(
            transcript.append_tool_result(result("toolu_1")).unwrap_err(),
            TranscriptError::NoPendingToolRequest
        );

        transcript.append_tool_request(request("toolu_1")).unwrap();
        let err = transcript.append_tool_result(result("toolu_9")).unwrap_err();
        assert_eq!(
            err,
            TranscriptError::ToolResultMismatch {
                expected: "toolu_1".to_owned(),
                found: "toolu_9".to_owned(),
            }
        );
        // The request is still waiting for the right answer.
        assert!(transcript.append_tool_result(result("toolu_1")).is_ok());
    }
}
