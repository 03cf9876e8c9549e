//! Provider definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported AI text-generation providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// OpenAI - chat completions API
    OpenAI,
    /// Anthropic - messages API
    Anthropic,
}

impl Provider {
    /// Every provider the verifier knows about, in check order
    pub const ALL: [Provider; 2] = [Provider::OpenAI, Provider::Anthropic];

    /// Environment variable holding the provider's API key
    pub fn credential_var(&self) -> &'static str {
        match self {
            Provider::OpenAI => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    /// Cheapest model that can answer the probe
    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::OpenAI => "gpt-4o-mini",
            Provider::Anthropic => "claude-3-haiku-20240307",
        }
    }

    /// Get the full display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::OpenAI => "OpenAI",
            Provider::Anthropic => "Anthropic",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
