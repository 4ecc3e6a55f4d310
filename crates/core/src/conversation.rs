//! Conversation-related types.

use flash_briefing_model::ToolRequest;

use crate::transcript::Transcript;

/// The stage a conversation is in.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DriverState {
    /// The next step calls the model with the full transcript.
    #[default]
    AwaitingModel,
    /// The next step dispatches this tool request.
    HandlingTool(ToolRequest),
    /// The model answered without requesting a tool.
    Done,
    /// The model could not be reached, or the transcript was corrupted.
    Failed,
}

impl DriverState {
    /// Returns `true` for `Done` and `Failed`.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, DriverState::Done | DriverState::Failed)
    }
}

/// Represents a conversation: the transcript plus where the driver is in it.
///
/// The conversation exclusively owns its transcript. It is only advanced by
/// a [`Driver`](crate::Driver).
#[derive(Clone, Debug)]
pub struct Conversation {
    pub(crate) transcript: Transcript,
    pub(crate) state: DriverState,
}

impl Conversation {
    /// Starts a conversation seeded with a user message.
    pub fn with_user_message<S: Into<String>>(text: S) -> Self {
        Self {
            transcript: Transcript::with_user_text(text),
            state: DriverState::AwaitingModel,
        }
    }

    /// Returns the transcript so far.
    #[inline]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Returns the current state.
    #[inline]
    pub fn state(&self) -> &DriverState {
        &self.state
    }

    /// Returns `true` once the conversation reached a terminal state.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }
}
