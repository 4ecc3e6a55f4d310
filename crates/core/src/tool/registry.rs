use std::collections::{HashMap, HashSet};
use std::fmt::{self, Debug};

use flash_briefing_model::ToolDescriptor;
use jsonschema::JSONSchema;
use serde_json::Value;

use super::{Error, RegistryError};

/// The network location backing a tool descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ToolRoute {
    /// The tool this route serves.
    pub tool_name: String,
    /// Path relative to the tool server base URL, or an absolute URL.
    pub path: String,
}

impl ToolRoute {
    /// Creates a new route.
    #[inline]
    pub fn new<S1: Into<String>, S2: Into<String>>(tool_name: S1, path: S2) -> Self {
        Self {
            tool_name: tool_name.into(),
            path: path.into(),
        }
    }
}

struct Entry {
    descriptor: ToolDescriptor,
    endpoint: String,
    validator: JSONSchema,
}

/// The single source of truth about which tools exist, what they accept,
/// and where they live.
///
/// Descriptors and routes are in 1:1 correspondence, which is checked when
/// the registry is built. A registry is immutable afterwards and can be
/// shared freely behind an `Arc`.
#[derive(Default)]
pub struct ToolRegistry {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Creates a builder whose routes resolve against `base_url`.
    #[inline]
    pub fn builder<S: Into<String>>(base_url: S) -> ToolRegistryBuilder {
        ToolRegistryBuilder {
            base_url: base_url.into(),
            descriptors: vec![],
            routes: vec![],
        }
    }

    /// Creates a registry without any tools.
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the descriptors in registration order.
    pub fn describe(&self) -> impl ExactSizeIterator<Item = &ToolDescriptor> {
        self.entries.iter().map(|entry| &entry.descriptor)
    }

    /// Resolves the endpoint of a tool.
    pub fn route_for(&self, name: &str) -> Result<&str, Error> {
        self.entry(name).map(|entry| entry.endpoint.as_str())
    }

    /// Checks `input` against the input schema of a tool.
    pub fn validate(&self, name: &str, input: &Value) -> Result<(), Error> {
        let entry = self.entry(name)?;
        if let Err(errors) = entry.validator.validate(input) {
            let reason = errors
                .map(|err| err.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(Error::invalid_input().with_reason(reason));
        }
        Ok(())
    }

    /// Returns `true` if a tool with this name is registered.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Returns the number of registered tools.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no tool is registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, name: &str) -> Result<&Entry, Error> {
        self.index
            .get(name)
            .map(|&idx| &self.entries[idx])
            .ok_or_else(|| Error::unknown_tool().with_reason(name))
    }
}

impl Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.entries
                    .iter()
                    .map(|entry| (&entry.descriptor.name, &entry.endpoint)),
            )
            .finish()
    }
}

/// [`ToolRegistry`] builder.
///
/// Descriptors and routes are collected independently and matched up by
/// name in [`build`](Self::build).
#[derive(Clone, Debug)]
pub struct ToolRegistryBuilder {
    base_url: String,
    descriptors: Vec<ToolDescriptor>,
    routes: Vec<ToolRoute>,
}

impl ToolRegistryBuilder {
    /// Adds a tool descriptor.
    #[inline]
    pub fn with_descriptor(mut self, descriptor: ToolDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Adds a route.
    #[inline]
    pub fn with_route(mut self, route: ToolRoute) -> Self {
        self.routes.push(route);
        self
    }

    /// Adds a descriptor together with its route.
    #[inline]
    pub fn with_tool<S: Into<String>>(
        self,
        descriptor: ToolDescriptor,
        path: S,
    ) -> Self {
        let route = ToolRoute::new(descriptor.name.clone(), path);
        self.with_descriptor(descriptor).with_route(route)
    }

    /// Builds the registry, checking that descriptors and routes match.
    pub fn build(self) -> Result<ToolRegistry, RegistryError> {
        let Self {
            base_url,
            descriptors,
            routes,
        } = self;

        let mut route_paths = HashMap::with_capacity(routes.len());
        for route in routes {
            if route_paths.contains_key(&route.tool_name) {
                return Err(RegistryError::DuplicateName(route.tool_name));
            }
            route_paths.insert(route.tool_name, route.path);
        }

        let mut seen = HashSet::with_capacity(descriptors.len());
        for descriptor in &descriptors {
            if !seen.insert(descriptor.name.as_str()) {
                return Err(RegistryError::DuplicateName(descriptor.name.clone()));
            }
            if !route_paths.contains_key(&descriptor.name) {
                return Err(RegistryError::MissingRoute(descriptor.name.clone()));
            }
        }
        if let Some(orphan) = route_paths.keys().find(|name| !seen.contains(name.as_str())) {
            return Err(RegistryError::MissingDescriptor(orphan.clone()));
        }

        let mut entries = Vec::with_capacity(descriptors.len());
        let mut index = HashMap::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let validator = JSONSchema::options()
                .should_validate_formats(true)
                .compile(&descriptor.input_schema)
                .map_err(|err| RegistryError::InvalidSchema {
                    name: descriptor.name.clone(),
                    reason: err.to_string(),
                })?;
            let path = route_paths.remove(&descriptor.name).unwrap_or_default();
            let endpoint = join_endpoint(&base_url, &path);
            debug!("registered tool {} at {endpoint}", descriptor.name);
            index.insert(descriptor.name.clone(), entries.len());
            entries.push(Entry {
                descriptor,
                endpoint,
                validator,
            });
        }

        Ok(ToolRegistry { entries, index })
    }
}

fn join_endpoint(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_owned();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::tool::ErrorKind;

    fn descriptor(name: &str) -> ToolDescriptor {
        ToolDescriptor {
            name: name.to_owned(),
            description: format!("The {name} tool"),
            input_schema: json!({
                "type": "object",
                "properties": { "query": { "type": "string" } },
                "required": ["query"]
            }),
        }
    }

    #[test]
    fn test_describe_keeps_order() {
        let registry = ToolRegistry::builder("http://localhost:4000/")
            .with_tool(descriptor("fetchNews"), "/fetch-news")
            .with_tool(descriptor("sendEmail"), "send-email")
            .build()
            .unwrap();

        let names: Vec<_> = registry.describe().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["fetchNews", "sendEmail"]);
        assert_eq!(
            registry.route_for("fetchNews").unwrap(),
            "http://localhost:4000/fetch-news"
        );
        assert_eq!(
            registry.route_for("sendEmail").unwrap(),
            "http://localhost:4000/send-email"
        );
    }

    #[test]
    fn test_unknown_tool() {
        let registry = ToolRegistry::empty();
        let err = registry.route_for("fetchNews").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownTool);
        assert_eq!(err.reason(), "fetchNews");
        assert!(registry.is_empty());
    }

    #[test]
    fn test_routes_and_descriptors_must_match() {
        let err = ToolRegistry::builder("http://localhost:4000")
            .with_descriptor(descriptor("fetchNews"))
            .build()
            .unwrap_err();
        assert_eq!(err, RegistryError::MissingRoute("fetchNews".to_owned()));

        let err = ToolRegistry::builder("http://localhost:4000")
            .with_tool(descriptor("fetchNews"), "/fetch-news")
            .with_route(ToolRoute::new("sendEmail", "/send-email"))
            .build()
            .unwrap_err();
        assert_eq!(err, RegistryError::MissingDescriptor("sendEmail".to_owned()));

        let err = ToolRegistry::builder("http://localhost:4000")
            .with_tool(descriptor("fetchNews"), "/fetch-news")
            .with_descriptor(descriptor("fetchNews"))
            .build()
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateName("fetchNews".to_owned()));
    }

    #[test]
    fn test_invalid_schema() {
        let mut bad = descriptor("fetchNews");
        bad.input_schema = json!({ "type": 42 });
        let err = ToolRegistry::builder("http://localhost:4000")
            .with_tool(bad, "/fetch-news")
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidSchema { .. }));
    }

    #[test]
    fn test_validate() {
        let registry = ToolRegistry::builder("http://localhost:4000")
            .with_tool(descriptor("fetchNews"), "/fetch-news")
            .build()
            .unwrap();

        assert!(registry.contains("fetchNews"));
        assert!(!registry.contains("nope"));
        assert!(registry.validate("fetchNews", &json!({ "query": "AI" })).is_ok());
        let err = registry.validate("fetchNews", &json!({ "q": "AI" })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        let err = registry.validate("nope", &json!({})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownTool);
    }

    #[test]
    fn test_validates_formats() {
        let mut email = descriptor("sendEmail");
        email.input_schema = json!({
            "type": "object",
            "properties": {
                "to": { "type": "array", "items": { "type": "string", "format": "email" } }
            },
            "required": ["to"]
        });
        let registry = ToolRegistry::builder("http://localhost:4000")
            .with_tool(email, "/send-email")
            .build()
            .unwrap();

        assert!(registry.validate("sendEmail", &json!({ "to": ["ada@example.com"] })).is_ok());
        let err = registry
            .validate("sendEmail", &json!({ "to": ["not-an-email"] }))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_absolute_route() {
        let registry = ToolRegistry::builder("http://localhost:4000")
            .with_tool(descriptor("fetchNews"), "https://news.example.com/fetch")
            .build()
            .unwrap();
        assert_eq!(
            registry.route_for("fetchNews").unwrap(),
            "https://news.example.com/fetch"
        );
    }
}
