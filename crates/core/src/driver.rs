mod builder;

use std::fmt::{self, Debug, Display};
use std::mem;
use std::sync::Arc;

use flash_briefing_model::{
    ModelRequest, ModelResponseBlock, ToolRequest, ToolResult, Turn,
};
use serde_json::Value;

use crate::conversation::{Conversation, DriverState};
use crate::model_client::{ModelClient, UpstreamError};
use crate::tool::ToolDispatcher;
use crate::transcript::TranscriptError;
pub use builder::DriverBuilder;

pub(crate) type TurnObserver = Box<dyn Fn(&Turn) + Send + Sync>;
pub(crate) type ToolCallObserver = Box<dyn Fn(&ToolRequest) + Send + Sync>;
pub(crate) type ToolResultObserver =
    Box<dyn Fn(&ToolRequest, &Value) + Send + Sync>;

/// The reason a conversation ended in [`DriverState::Failed`].
#[derive(Debug)]
pub enum DriverError {
    /// The model service failed.
    Upstream(UpstreamError),
    /// An append would have broken the transcript ordering.
    Transcript(TranscriptError),
}

impl Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::Upstream(err) => write!(f, "model request failed: {err}"),
            DriverError::Transcript(err) => write!(f, "invalid transcript: {err}"),
        }
    }
}

impl std::error::Error for DriverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DriverError::Upstream(err) => Some(err),
            DriverError::Transcript(err) => Some(err),
        }
    }
}

impl From<UpstreamError> for DriverError {
    #[inline]
    fn from(err: UpstreamError) -> Self {
        DriverError::Upstream(err)
    }
}

impl From<TranscriptError> for DriverError {
    #[inline]
    fn from(err: TranscriptError) -> Self {
        DriverError::Transcript(err)
    }
}

/// Drives a [`Conversation`] between the model and the tools.
///
/// Each step either calls the model once or dispatches one tool request.
/// Text the model produces is appended to the transcript as it is seen; the
/// first tool request of a response ends the step, and anything after it in
/// the same response is dropped.
///
/// The driver holds no conversation state of its own, so one driver can
/// serve any number of conversations, one step at a time each.
pub struct Driver {
    model_client: ModelClient,
    dispatcher: Arc<dyn ToolDispatcher>,
    on_transcript: Option<TurnObserver>,
    on_tool_call: Option<ToolCallObserver>,
    on_tool_result: Option<ToolResultObserver>,
}

impl Driver {
    /// Advances the conversation by one transition.
    ///
    /// Stepping a finished conversation does nothing. An error leaves the
    /// conversation in [`DriverState::Failed`].
    pub async fn step(
        &self,
        conversation: &mut Conversation,
    ) -> Result<(), DriverError> {
        let state = mem::replace(&mut conversation.state, DriverState::Failed);
        let result = match state {
            DriverState::AwaitingModel => self.call_model(conversation).await,
            DriverState::HandlingTool(request) => {
                self.call_tool(conversation, request).await
            }
            terminal => {
                conversation.state = terminal;
                return Ok(());
            }
        };
        if let Err(err) = &result {
            error!("conversation failed: {err}");
        }
        result
    }

    /// Steps the conversation until it is done or has failed.
    pub async fn run(
        &self,
        conversation: &mut Conversation,
    ) -> Result<(), DriverError> {
        while !conversation.is_finished() {
            self.step(conversation).await?;
        }
        Ok(())
    }

    async fn call_model(
        &self,
        conversation: &mut Conversation,
    ) -> Result<(), DriverError> {
        let transcript = &mut conversation.transcript;
        transcript.ensure_settled()?;

        let req = ModelRequest {
            messages: transcript.turns().to_vec(),
            tools: self.dispatcher.descriptors(),
        };
        let resp = self.model_client.send(req).await?;
        debug!("model finished with {:?}", resp.finish_reason);

        let mut next_state = DriverState::Done;
        let mut blocks = resp.blocks.into_iter();
        for block in blocks.by_ref() {
            match block {
                ModelResponseBlock::Text(text) => {
                    let turn = transcript.append_assistant_text(text)?;
                    self.notify_transcript(turn);
                }
                ModelResponseBlock::ToolRequest(request) => {
                    next_state = DriverState::HandlingTool(request);
                    break;
                }
            }
        }
        let dropped = blocks.len();
        if dropped > 0 {
            debug!("dropped {dropped} block(s) after the first tool request");
        }

        conversation.state = next_state;
        Ok(())
    }

    async fn call_tool(
        &self,
        conversation: &mut Conversation,
        request: ToolRequest,
    ) -> Result<(), DriverError> {
        let transcript = &mut conversation.transcript;
        let turn = transcript.append_tool_request(request.clone())?;
        self.notify_transcript(turn);
        if let Some(on_tool_call) = &self.on_tool_call {
            on_tool_call(&request);
        }

        debug!("dispatching tool `{}` ({})", request.tool_name, request.id);
        let value = self
            .dispatcher
            .invoke(&request.tool_name, request.input.clone())
            .await;
        if let Some(on_tool_result) = &self.on_tool_result {
            on_tool_result(&request, &value);
        }

        let turn = transcript.append_tool_result(ToolResult {
            tool_request_id: request.id,
            payload: value.to_string(),
        })?;
        self.notify_transcript(turn);

        conversation.state = DriverState::AwaitingModel;
        Ok(())
    }

    #[inline]
    fn notify_transcript(&self, turn: &Turn) {
        if let Some(on_transcript) = &self.on_transcript {
            on_transcript(turn);
        }
    }
}

impl Debug for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("model_client", &self.model_client)
            .finish_non_exhaustive()
    }
}
