//! Tool registry and dispatch.
//!
//! Tools are not run in-process. Each one is a remote HTTP endpoint on the
//! tool server, described to the model by a [`ToolDescriptor`] and resolved
//! by name through the [`ToolRegistry`]. The [`ToolRouter`] turns a tool
//! request into a POST and always hands a JSON value back, substituting
//! [`TOOL_FAILURE_SENTINEL`] for any failure so the conversation can go on.

mod error;
mod registry;
mod router;

use async_trait::async_trait;
use flash_briefing_model::ToolDescriptor;
use serde_json::Value;

pub use error::{Error, ErrorKind, RegistryError};
pub use registry::{ToolRegistry, ToolRegistryBuilder, ToolRoute};
pub use router::ToolRouter;

/// The result of a tool call that reports failures in detail.
pub type InvokeResult = Result<Value, Error>;

/// The value handed to the model in place of a failed tool call.
pub const TOOL_FAILURE_SENTINEL: &str = "Error executing tool";

/// Returns [`TOOL_FAILURE_SENTINEL`] as a JSON value.
#[inline]
pub fn failure_sentinel() -> Value {
    Value::String(TOOL_FAILURE_SENTINEL.to_owned())
}

/// Something that can answer tool requests on behalf of the driver.
///
/// Implementations must never fail: any error is folded into a value the
/// model can read, usually [`failure_sentinel`].
#[async_trait]
pub trait ToolDispatcher: Send + Sync {
    /// Returns the tools advertised to the model, in a stable order.
    fn descriptors(&self) -> Vec<ToolDescriptor>;

    /// Calls a tool by name.
    async fn invoke(&self, name: &str, input: Value) -> Value;
}
