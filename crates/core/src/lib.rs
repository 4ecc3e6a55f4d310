//! Core logic including the conversation driver, the transcript store, and
//! tool routing.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

pub mod conversation;
mod driver;
mod model_client;
pub mod tool;
pub mod transcript;

pub use conversation::{Conversation, DriverState};
pub use driver::{Driver, DriverBuilder, DriverError};
pub use model_client::{ModelClient, UpstreamError};
