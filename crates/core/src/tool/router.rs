use std::sync::Arc;

use async_trait::async_trait;
use flash_briefing_model::ToolDescriptor;
use reqwest::Client;
use serde_json::Value;
use tracing::Instrument;

use super::{Error, InvokeResult, ToolDispatcher, ToolRegistry, failure_sentinel};

/// Dispatches tool requests to their HTTP endpoints.
///
/// The router is stateless apart from the shared registry and a pooled HTTP
/// client, so cloning it is cheap.
#[derive(Clone, Debug)]
pub struct ToolRouter {
    registry: Arc<ToolRegistry>,
    client: Client,
}

impl ToolRouter {
    /// Creates a router over the given registry.
    #[inline]
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            client: Client::new(),
        }
    }

    /// Returns the registry this router resolves names against.
    #[inline]
    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Calls a tool and reports failures in detail.
    ///
    /// The input is checked against the tool's schema first; a tool that is
    /// unknown or given bad input never reaches the network.
    pub async fn try_invoke(&self, name: &str, input: Value) -> InvokeResult {
        self.registry.validate(name, &input)?;
        let endpoint = self.registry.route_for(name)?;

        let fut = async move {
            debug!("calling {endpoint} with {input}");
            let resp = self
                .client
                .post(endpoint)
                .json(&input)
                .send()
                .await
                .map_err(|err| Error::transport().with_reason(err.to_string()))?;

            let status = resp.status();
            let body = resp
                .text()
                .await
                .map_err(|err| Error::transport().with_reason(err.to_string()))?;
            trace!("got response ({status}): {body}");
            let parsed = serde_json::from_str::<Value>(&body).ok();

            if !status.is_success() {
                let reason = match parsed.as_ref().and_then(|v| v.get("error")) {
                    Some(Value::String(msg)) => msg.clone(),
                    Some(other) => other.to_string(),
                    None => format!("unexpected status {status}"),
                };
                return Err(Error::bad_status(status.as_u16()).with_reason(reason));
            }

            match parsed {
                Some(Value::Object(mut obj)) => obj.remove("result").ok_or_else(|| {
                    Error::malformed_response().with_reason("missing `result` field")
                }),
                Some(_) => Err(Error::malformed_response()
                    .with_reason("response body is not an object")),
                None => Err(Error::malformed_response()
                    .with_reason("response body is not JSON")),
            }
        };
        fut.instrument(debug_span!("tool router", tool = name)).await
    }

    /// Calls a tool, substituting the failure sentinel for any error.
    pub async fn invoke(&self, name: &str, input: Value) -> Value {
        match self.try_invoke(name, input).await {
            Ok(value) => value,
            Err(err) => {
                warn!("tool `{name}` failed: {err}");
                failure_sentinel()
            }
        }
    }
}

#[async_trait]
impl ToolDispatcher for ToolRouter {
    #[inline]
    fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.registry.describe().cloned().collect()
    }

    #[inline]
    async fn invoke(&self, name: &str, input: Value) -> Value {
        ToolRouter::invoke(self, name, input).await
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use serde_json::json;

    use super::*;
    use crate::tool::{ErrorKind, TOOL_FAILURE_SENTINEL};

    fn fetch_news() -> ToolDescriptor {
        ToolDescriptor {
            name: "fetchNews".to_owned(),
            description: "Fetch news articles".to_owned(),
            input_schema: json!({
                "type": "object",
                "properties": { "query": { "type": "string" } },
                "required": ["query"]
            }),
        }
    }

    fn router_for(base_url: &str) -> ToolRouter {
        let registry = ToolRegistry::builder(base_url)
            .with_tool(fetch_news(), "/fetch-news")
            .build()
            .unwrap();
        ToolRouter::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn test_result_passthrough() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/fetch-news")
            .match_body(Matcher::Json(json!({ "query": "AI" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "result": [{ "title": "X" }] }).to_string())
            .expect(1)
            .create_async()
            .await;

        let router = router_for(&server.url());
        let result = router.invoke("fetchNews", json!({ "query": "AI" })).await;
        assert_eq!(result, json!([{ "title": "X" }]));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_null_result() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/fetch-news")
            .with_status(200)
            .with_body("{\"result\": null}")
            .create_async()
            .await;

        let router = router_for(&server.url());
        let result = router.try_invoke("fetchNews", json!({ "query": "AI" })).await;
        assert_eq!(result.unwrap(), Value::Null);
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let router = ToolRouter::new(Arc::new(ToolRegistry::empty()));
        let err = router
            .try_invoke("launchRocket", json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownTool);

        let result = router.invoke("launchRocket", json!({})).await;
        assert_eq!(result, json!(TOOL_FAILURE_SENTINEL));
    }

    #[tokio::test]
    async fn test_invalid_input_is_not_sent() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/fetch-news")
            .expect(0)
            .create_async()
            .await;

        let router = router_for(&server.url());
        let err = router
            .try_invoke("fetchNews", json!({ "query": 42 }))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_bad_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/fetch-news")
            .with_status(500)
            .with_header("content-type", "application/json")
            .with_body("{\"error\": \"Failed to fetch news\"}")
            .create_async()
            .await;

        let router = router_for(&server.url());
        let err = router
            .try_invoke("fetchNews", json!({ "query": "AI" }))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadStatus);
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.reason(), "Failed to fetch news");

        let result = router.invoke("fetchNews", json!({ "query": "AI" })).await;
        assert_eq!(result, json!(TOOL_FAILURE_SENTINEL));
    }

    #[tokio::test]
    async fn test_missing_result() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/fetch-news")
            .with_status(200)
            .with_body("{\"articles\": []}")
            .create_async()
            .await;

        let router = router_for(&server.url());
        let err = router
            .try_invoke("fetchNews", json!({ "query": "AI" }))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[tokio::test]
    async fn test_unreachable() {
        let router = router_for("http://127.0.0.1:1");
        let err = router
            .try_invoke("fetchNews", json!({ "query": "AI" }))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);

        let result = router.invoke("fetchNews", json!({ "query": "AI" })).await;
        assert_eq!(result, json!(TOOL_FAILURE_SENTINEL));
    }

    #[tokio::test]
    async fn test_repeated_calls_have_same_shape() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/fetch-news")
            .with_status(200)
            .with_body(json!({ "result": [{ "title": "X" }] }).to_string())
            .expect(2)
            .create_async()
            .await;

        let router = router_for(&server.url());
        let first = router.invoke("fetchNews", json!({ "query": "AI" })).await;
        let second = router.invoke("fetchNews", json!({ "query": "AI" })).await;
        assert_eq!(first, second);
    }

    #[test]
    fn test_descriptors() {
        let router = router_for("http://localhost:4000");
        let descriptors = ToolDispatcher::descriptors(&router);
        assert_eq!(descriptors, vec![fetch_news()]);
        assert!(router.registry().contains("fetchNews"));
        assert_eq!(
            router.registry().route_for("fetchNews").unwrap(),
            "http://localhost:4000/fetch-news"
        );
    }
}
