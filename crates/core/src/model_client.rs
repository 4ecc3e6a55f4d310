use std::error::Error as StdError;
use std::fmt::{self, Debug, Display};
use std::pin::Pin;
use std::sync::Arc;

use flash_briefing_model::{
    ErrorKind, ModelProvider, ModelProviderError, ModelRequest, ModelResponse,
};
use tracing::Instrument;

type SendResult = Result<ModelResponse, UpstreamError>;
type BoxedSendFuture = Pin<Box<dyn Future<Output = SendResult> + Send>>;
type HandlerFn = Arc<dyn Fn(ModelRequest) -> BoxedSendFuture + Send + Sync>;

/// A failure of the model service: transport, non-2xx status, or a response
/// that could not be understood.
///
/// Upstream errors are fatal to a conversation and never retried.
pub struct UpstreamError(Box<dyn ModelProviderError>);

impl UpstreamError {
    /// Returns the kind of the underlying provider error.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.0.kind()
    }

    /// Returns the HTTP status the model service answered with, if any.
    #[inline]
    pub fn status(&self) -> Option<u16> {
        self.0.status()
    }

    /// Returns the raw body the model service answered with, if any.
    #[inline]
    pub fn body(&self) -> Option<&str> {
        self.0.body()
    }
}

impl Debug for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status() {
            Some(status) => write!(f, "{} ({status}): {}", self.kind(), self.0),
            None => write!(f, "{}: {}", self.kind(), self.0),
        }
    }
}

impl StdError for UpstreamError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&*self.0)
    }
}

/// A wrapper around a model provider that provides a type-erased interface
/// for the other modules.
#[derive(Clone)]
pub struct ModelClient {
    handler_fn: HandlerFn,
}

impl ModelClient {
    /// Wraps a model provider.
    #[inline]
    pub fn new<P: ModelProvider + 'static>(provider: P) -> Self {
        // We have to erase the type `P`, since `ModelClient` doesn't have a
        // generic parameter and we don't want it either.
        let handler_fn: HandlerFn = Arc::new(move |req| {
            trace!("got a request: {req:?}");
            let fut = provider.send_request(&req);
            Box::pin(
                async move {
                    match fut.await {
                        Ok(resp) => {
                            trace!("got a response: {resp:?}");
                            Ok(resp)
                        }
                        Err(err) => {
                            error!("got an error: {err:?}");
                            Err(UpstreamError(Box::new(err)))
                        }
                    }
                }
                .instrument(trace_span!("model client req")),
            )
        });
        Self { handler_fn }
    }

    /// Sends the full transcript and tool set, and returns the complete
    /// response.
    #[inline]
    pub async fn send(&self, req: ModelRequest) -> SendResult {
        (self.handler_fn)(req).await
    }
}

impl Debug for ModelClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelClient").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use flash_briefing_model::{ModelResponseBlock, Turn};
    use flash_briefing_test_model::{PresetResponse, TestModelProvider};

    use super::*;

    fn hello_request() -> ModelRequest {
        ModelRequest {
            messages: vec![Turn::user_text("Hi")],
            tools: vec![],
        }
    }

    #[tokio::test]
    async fn test_send_request() {
        let model_provider = TestModelProvider::default();
        for _ in 0..3 {
            model_provider.add_response(PresetResponse::text("How are you?"));
        }

        let model_client = ModelClient::new(model_provider.clone());
        for _ in 0..3 {
            let resp = model_client.send(hello_request()).await.unwrap();
            assert_eq!(
                resp.blocks,
                vec![ModelResponseBlock::Text("How are you?".to_owned())]
            );
        }
        assert_eq!(model_provider.request_count(), 3);
    }

    #[tokio::test]
    async fn test_error_handling() {
        let model_provider = TestModelProvider::default();
        model_provider.add_response(PresetResponse::failing(401, "unauthorized"));
        let model_client = ModelClient::new(model_provider);

        let err = model_client.send(hello_request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Status);
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.body(), Some("unauthorized"));

        // The script is exhausted now.
        let err = model_client.send(hello_request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
    }
}
