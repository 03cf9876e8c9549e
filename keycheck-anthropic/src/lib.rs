//! Anthropic provider for the credential verifier
//!
//! Talks to the Messages API directly over reqwest.

pub mod client;
pub mod types;

pub use client::{AnthropicClient, AnthropicConnector, ANTHROPIC_API_BASE, ANTHROPIC_VERSION};
pub use types::{ContentBlock, Message, MessagesRequest, MessagesResponse};
