//! OpenAI provider for the credential verifier
//!
//! Sends the chat completion probe through async-openai.

pub mod client;

pub use client::{OpenAIClient, OpenAIConnector};
