//! Probe request, completion result and the provider capability traits

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::KeycheckResult;
use crate::provider::Provider;

/// Prompt sent by every call-check
pub const PROBE_PROMPT: &str = "Say OK";

/// Output token ceiling for the probe
pub const PROBE_MAX_TOKENS: u32 = 5;

/// Substring the reply must contain
pub const PROBE_EXPECTED: &str = "OK";

/// One minimal generation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeRequest {
    pub model: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub expected: String,
}

impl ProbeRequest {
    /// The standard "Say OK" probe against the provider's default model
    pub fn for_provider(provider: Provider) -> Self {
        Self {
            model: provider.default_model().to_string(),
            prompt: PROBE_PROMPT.to_string(),
            max_tokens: PROBE_MAX_TOKENS,
            expected: PROBE_EXPECTED.to_string(),
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }
}

/// Text returned by a provider for a single probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub provider: Provider,
    /// Model name as echoed by the provider
    pub model: String,
    /// First generated fragment: first choice for OpenAI, first content block for Anthropic
    pub text: Option<String>,
}

/// A client bound to one credential, able to send one probe
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn provider(&self) -> Provider;

    async fn complete(&self, request: &ProbeRequest) -> KeycheckResult<Completion>;
}

/// Builds short-lived [`CompletionProvider`] handles for one provider
pub trait ProviderConnector: Send + Sync {
    fn provider(&self) -> Provider;

    /// Whether the provider's client can be brought up in this process at all
    fn library_status(&self) -> KeycheckResult<()>;

    /// Construct a client bound to `api_key`
    fn connect(&self, api_key: &str) -> KeycheckResult<Box<dyn CompletionProvider>>;
}
