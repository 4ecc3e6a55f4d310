use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use flash_briefing_model::{
    ContentBlock, ErrorKind, ModelFinishReason, ModelProvider,
    ModelProviderError, ModelRequest, ModelResponse, ModelResponseBlock,
    Role, ToolRequest, Turn,
};
use serde_json::json;
use tokio::time::sleep;

#[derive(Debug)]
struct FakeModelProviderError(ErrorKind);

impl Display for FakeModelProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Error for FakeModelProviderError {}

impl ModelProviderError for FakeModelProviderError {
    fn kind(&self) -> ErrorKind {
        self.0
    }

    fn status(&self) -> Option<u16> {
        Some(400)
    }
}

/// Echoes the last user text back, or asks for the `echo` tool when the
/// text starts with `!`.
struct FakeModelProvider;

impl ModelProvider for FakeModelProvider {
    type Error = FakeModelProviderError;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<ModelResponse, Self::Error>> + Send + 'static
    {
        let last_text = req.messages.last().and_then(|turn| {
            turn.blocks().iter().find_map(|block| match block {
                ContentBlock::Text(text) if turn.role() == Role::User => {
                    Some(text.clone())
                }
                _ => None,
            })
        });
        async move {
            sleep(Duration::from_millis(1)).await;
            let Some(text) = last_text else {
                return Err(FakeModelProviderError(ErrorKind::Status));
            };
            if let Some(rest) = text.strip_prefix('!') {
                return Ok(ModelResponse {
                    blocks: vec![ModelResponseBlock::ToolRequest(ToolRequest {
                        id: "toolu_1".to_owned(),
                        tool_name: "echo".to_owned(),
                        input: json!({ "text": rest }),
                    })],
                    finish_reason: Some(ModelFinishReason::ToolUse),
                });
            }
            Ok(ModelResponse {
                blocks: vec![ModelResponseBlock::Text(format!(
                    "You said {text}"
                ))],
                finish_reason: Some(ModelFinishReason::EndTurn),
            })
        }
    }
}

#[tokio::test]
async fn test_completion() {
    let provider = FakeModelProvider;
    let req = ModelRequest {
        messages: vec![Turn::user_text("Good morning")],
        tools: vec![],
    };
    let resp = provider.send_request(&req).await.unwrap();
    assert!(!resp.has_tool_request());
    assert_eq!(
        resp.blocks,
        vec![ModelResponseBlock::Text("You said Good morning".to_owned())]
    );
}

#[tokio::test]
async fn test_tool_request() {
    let provider = FakeModelProvider;
    let req = ModelRequest {
        messages: vec![Turn::user_text("!ping")],
        tools: vec![],
    };
    let resp = provider.send_request(&req).await.unwrap();
    assert!(resp.has_tool_request());
    assert_eq!(resp.finish_reason, Some(ModelFinishReason::ToolUse));
}

#[tokio::test]
async fn test_error() {
    let provider = FakeModelProvider;
    let req = ModelRequest {
        messages: vec![],
        tools: vec![],
    };
    let err = provider.send_request(&req).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Status);
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.body(), None);
}

#[test]
fn test_turn_accessors() {
    let request = ToolRequest {
        id: "toolu_1".to_owned(),
        tool_name: "fetchNews".to_owned(),
        input: json!({ "query": "AI" }),
    };
    let turn = Turn::tool_request(request.clone());
    assert_eq!(turn.role(), Role::Assistant);
    assert_eq!(turn.blocks().len(), 1);
    assert_eq!(turn.as_tool_request(), Some(&request));
    assert_eq!(turn.as_tool_result(), None);
    assert_eq!(Turn::user_text("hi").as_tool_request(), None);
}
