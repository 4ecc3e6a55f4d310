//! An assistant that reads the news, writes a digest, and emails it to the
//! people who care about the topic.
//!
//! The crate wires the conversation driver to the Anthropic model and the
//! briefing tool server. It ships a CLI for the terminal, and can be used as
//! a library to run briefings from your own host apps.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

pub mod catalog;
pub mod config;
mod session;

pub use config::{Config, ConfigError};
pub use session::{Session, SessionBuilder};

/// The message a briefing starts with when none is given.
pub const SEED_MESSAGE: &str = "Provide a summary of the latest news about \
    artificial intelligence in the form of a news digest and email it to the \
    users interested in the topic.";

/// Re-exports of [`flash_briefing_core`] crate.
pub mod core {
    pub use flash_briefing_core::*;
}
