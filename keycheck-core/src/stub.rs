//! Deterministic in-process connector for tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{KeycheckError, KeycheckResult};
use crate::probe::{Completion, CompletionProvider, ProbeRequest, ProviderConnector};
use crate::provider::Provider;

/// What the stub answers with
#[derive(Debug, Clone)]
pub enum StubReply {
    Text(String),
    Empty,
    Fail(KeycheckError),
}

/// Connector that never touches the network
///
/// Counts how many probes were actually sent so tests can assert that a
/// check was skipped rather than attempted.
#[derive(Debug, Clone)]
pub struct StubConnector {
    provider: Provider,
    reply: StubReply,
    library: Option<String>,
    calls: Arc<AtomicUsize>,
}

impl StubConnector {
    /// A healthy provider answering "OK"
    pub fn ok(provider: Provider) -> Self {
        Self::replying(provider, StubReply::Text("OK".to_string()))
    }

    pub fn replying(provider: Provider, reply: StubReply) -> Self {
        Self {
            provider,
            reply,
            library: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make `library_status` fail with `reason`
    pub fn without_library(mut self, reason: &str) -> Self {
        self.library = Some(reason.to_string());
        self
    }

    /// Number of probes sent through clients built by this connector
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ProviderConnector for StubConnector {
    fn provider(&self) -> Provider {
        self.provider
    }

    fn library_status(&self) -> KeycheckResult<()> {
        match &self.library {
            Some(reason) => Err(KeycheckError::library_unavailable(self.provider, reason)),
            None => Ok(()),
        }
    }

    fn connect(&self, api_key: &str) -> KeycheckResult<Box<dyn CompletionProvider>> {
        if api_key.is_empty() {
            return Err(KeycheckError::missing_credential(
                self.provider.credential_var(),
            ));
        }
        self.library_status()?;
        Ok(Box::new(StubClient {
            provider: self.provider,
            reply: self.reply.clone(),
            calls: Arc::clone(&self.calls),
        }))
    }
}

struct StubClient {
    provider: Provider,
    reply: StubReply,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl CompletionProvider for StubClient {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn complete(&self, request: &ProbeRequest) -> KeycheckResult<Completion> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let text = match &self.reply {
            StubReply::Text(text) => Some(text.clone()),
            StubReply::Empty => None,
            StubReply::Fail(err) => return Err(err.clone()),
        };
        Ok(Completion {
            provider: self.provider,
            model: request.model.clone(),
            text,
        })
    }
}
