//! The tools served by the briefing tool server.
//!
//! Each tool has a parameter struct whose JSON schema is what the model is
//! told to produce, and a route on the tool server. The structs can also be
//! used by hosts to build tool inputs by hand.

use flash_briefing_core::tool::{RegistryError, ToolRegistry, ToolRoute};
use flash_briefing_model::ToolDescriptor;
use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where the tool server listens unless configured otherwise.
pub const DEFAULT_TOOL_SERVER_URL: &str = "http://localhost:4000";

/// Input of `fetchNews`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FetchNewsParameters {
    /// Keywords or a phrase to search for.
    pub query: String,
    /// Two-letter country code to restrict headlines to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Category such as `technology` or `sports`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Comma-separated news source identifiers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<String>,
    /// Number of articles per page, 10 if omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    /// Page to fetch, starting at 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

/// A news article as returned by `fetchNews`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Headline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Short description or lead paragraph.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Publication timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
}

/// Input of `summarizeNews`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SummarizeNewsParameters {
    /// Articles to summarize.
    pub articles: Vec<Article>,
    /// Tone of the digest, `neutral` if omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    /// Length of the digest such as `short` or `long`, `medium` if omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<String>,
}

/// Input of `fetchUsersByInterest`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FetchUsersByInterestParameters {
    /// One of `sports`, `technology` or `artificial_intelligence`.
    pub interest: String,
}

/// Input of `sendEmail`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SendEmailParameters {
    /// List of recipient email addresses.
    #[schemars(inner(email))]
    pub to: Vec<String>,
    /// Email subject.
    pub subject: String,
    /// Plain text email content.
    pub text: String,
}

// The tool description already tells the model what the input is for, so
// the struct's own title and rustdoc stay out of the schema.
fn input_schema<T: JsonSchema>() -> Value {
    let mut schema = schema_for!(T).to_value();
    if let Value::Object(obj) = &mut schema {
        for key in ["$schema", "title", "description"] {
            obj.remove(key);
        }
    }
    schema
}

fn descriptor(name: &str, description: &str, input_schema: Value) -> ToolDescriptor {
    ToolDescriptor {
        name: name.to_owned(),
        description: description.to_owned(),
        input_schema,
    }
}

/// Returns the descriptors of every briefing tool.
pub fn descriptors() -> Vec<ToolDescriptor> {
    vec![
        descriptor(
            "fetchNews",
            "Fetches news articles matching a specific topic.",
            input_schema::<FetchNewsParameters>(),
        ),
        descriptor(
            "summarizeNews",
            "Summarizes a list of news articles into a short digest. \
             Supports optional control over tone and length.",
            input_schema::<SummarizeNewsParameters>(),
        ),
        descriptor(
            "fetchUsersByInterest",
            "Fetches users based on interest category. Valid interest \
             categories include: sports, technology, artificial_intelligence.",
            input_schema::<FetchUsersByInterestParameters>(),
        ),
        descriptor(
            "sendEmail",
            "Sends an email with the specified subject and message to one or \
             more recipients.",
            input_schema::<SendEmailParameters>(),
        ),
    ]
}

/// Tool name to path on the tool server.
pub const ROUTES: [(&str, &str); 4] = [
    ("fetchNews", "/fetch-news"),
    ("summarizeNews", "/summarize-news"),
    ("fetchUsersByInterest", "/fetch-users"),
    ("sendEmail", "/send-email"),
];

/// Builds the registry of briefing tools served at `base_url`.
pub fn build_registry(base_url: &str) -> Result<ToolRegistry, RegistryError> {
    let builder = descriptors()
        .into_iter()
        .fold(ToolRegistry::builder(base_url), |builder, descriptor| {
            builder.with_descriptor(descriptor)
        });
    ROUTES
        .iter()
        .fold(builder, |builder, (name, path)| {
            builder.with_route(ToolRoute::new(*name, *path))
        })
        .build()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_registry() {
        let registry = build_registry(DEFAULT_TOOL_SERVER_URL).unwrap();
        let names: Vec<_> = registry.describe().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            ["fetchNews", "summarizeNews", "fetchUsersByInterest", "sendEmail"]
        );
        assert_eq!(
            registry.route_for("fetchUsersByInterest").unwrap(),
            "http://localhost:4000/fetch-users"
        );
    }

    #[test]
    fn test_schemas() {
        let registry = build_registry(DEFAULT_TOOL_SERVER_URL).unwrap();

        assert!(registry.validate("fetchNews", &json!({ "query": "AI" })).is_ok());
        assert!(registry.validate("fetchNews", &json!({})).is_err());
        assert!(
            registry
                .validate(
                    "summarizeNews",
                    &json!({
                        "articles": [{ "title": "X", "publishedAt": "2024-05-01" }],
                        "style": "casual"
                    })
                )
                .is_ok()
        );
        assert!(
            registry
                .validate("fetchUsersByInterest", &json!({ "interest": 7 }))
                .is_err()
        );
        assert!(
            registry
                .validate(
                    "sendEmail",
                    &json!({ "to": ["a@example.com"], "subject": "Digest" })
                )
                .is_err()
        );
    }

    #[test]
    fn test_schema_has_no_meta_keyword() {
        for descriptor in descriptors() {
            let schema = &descriptor.input_schema;
            assert!(schema.get("$schema").is_none());
            assert!(schema.get("title").is_none());
            assert!(schema.get("description").is_none());
            assert_eq!(schema["type"], "object");
        }
    }

    #[test]
    fn test_recipients_must_be_addresses() {
        let send_email = descriptors()
            .into_iter()
            .find(|d| d.name == "sendEmail")
            .unwrap();
        assert_eq!(
            send_email.input_schema["properties"]["to"]["items"]["format"],
            "email"
        );

        let registry = build_registry(DEFAULT_TOOL_SERVER_URL).unwrap();
        let err = registry
            .validate(
                "sendEmail",
                &json!({ "to": ["not-an-email"], "subject": "s", "text": "t" }),
            )
            .unwrap_err();
        assert_eq!(err.kind(), flash_briefing_core::tool::ErrorKind::InvalidInput);
        assert!(
            registry
                .validate(
                    "sendEmail",
                    &json!({ "to": ["ada@example.com"], "subject": "s", "text": "t" }),
                )
                .is_ok()
        );
    }

    #[test]
    fn test_parameters_match_schema() {
        let input = serde_json::to_value(FetchNewsParameters {
            query: "artificial intelligence".to_owned(),
            country: None,
            category: Some("technology".to_owned()),
            sources: None,
            page_size: Some(5),
            page: None,
        })
        .unwrap();
        assert_eq!(
            input,
            json!({
                "query": "artificial intelligence",
                "category": "technology",
                "pageSize": 5
            })
        );
        let registry = build_registry(DEFAULT_TOOL_SERVER_URL).unwrap();
        assert!(registry.validate("fetchNews", &input).is_ok());
    }
}
