//! An abstraction layer between the conversation driver and the language
//! model service.
//!
//! This crate defines the transcript vocabulary (turns and content blocks),
//! the tool descriptors advertised to the model, and the protocol a model
//! provider must implement. The driver only ever talks to the model through
//! these types, so the provider can be swapped (a real HTTP service, or a
//! scripted fake in tests) without touching the core.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to. Ordering rules of the
//! transcript are enforced by the core crate, not here.

#![deny(missing_docs)]

mod error;
mod provider;
mod request;
mod response;

pub use error::*;
pub use provider::*;
pub use request::*;
pub use response::*;
