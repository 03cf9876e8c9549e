//! OpenAI chat completion client

use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
    Client,
};
use async_trait::async_trait;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use keycheck_core::{
    Completion, CompletionProvider, KeycheckError, KeycheckResult, ProbeRequest, Provider,
    ProviderConnector,
};
use tracing::{debug, info, instrument};

/// Builds [`OpenAIClient`]s for the call-check
#[derive(Debug, Clone, Default)]
pub struct OpenAIConnector {
    api_base: Option<String>,
    timeout: Option<Duration>,
}

impl OpenAIConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point clients at a proxy or mock server instead of api.openai.com
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = Some(api_base.trim_end_matches('/').to_string());
        self
    }

    /// Bound each request; by default only async-openai's own behavior applies
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn http_client(&self) -> KeycheckResult<reqwest::Client> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder.build().map_err(|e| {
            KeycheckError::library_unavailable(
                Provider::OpenAI,
                format!("failed to initialize HTTP client: {}", e),
            )
        })
    }
}

impl ProviderConnector for OpenAIConnector {
    fn provider(&self) -> Provider {
        Provider::OpenAI
    }

    fn library_status(&self) -> KeycheckResult<()> {
        self.http_client().map(|_| ())
    }

    fn connect(&self, api_key: &str) -> KeycheckResult<Box<dyn CompletionProvider>> {
        if api_key.is_empty() {
            return Err(KeycheckError::missing_credential(
                Provider::OpenAI.credential_var(),
            ));
        }

        let mut config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(base) = &self.api_base {
            config = config.with_api_base(base);
        }
        let client = Client::with_config(config)
            .with_http_client(self.http_client()?)
            .with_backoff(no_retry());

        Ok(Box::new(OpenAIClient { client }))
    }
}

/// OpenAI client bound to one API key
#[derive(Debug, Clone)]
pub struct OpenAIClient {
    client: Client<OpenAIConfig>,
}

#[async_trait]
impl CompletionProvider for OpenAIClient {
    fn provider(&self) -> Provider {
        Provider::OpenAI
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: &ProbeRequest) -> KeycheckResult<Completion> {
        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&request.model)
            .messages([ChatCompletionRequestUserMessageArgs::default()
                .content(request.prompt.as_str())
                .build()
                .map_err(|e| KeycheckError::config(e.to_string()))?
                .into()])
            .max_completion_tokens(request.max_tokens)
            .build()
            .map_err(|e| KeycheckError::config(e.to_string()))?;

        debug!("Sending chat completion probe");

        let response = self
            .client
            .chat()
            .create(chat_request)
            .await
            .map_err(map_openai_error)?;

        let text = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone());

        info!(model = %response.model, "OpenAI answered probe");

        Ok(Completion {
            provider: Provider::OpenAI,
            model: response.model,
            text,
        })
    }
}

/// Backoff that gives up on the first failure, so a 429 surfaces immediately
fn no_retry() -> ExponentialBackoff {
    ExponentialBackoffBuilder::new()
        .with_max_elapsed_time(Some(Duration::ZERO))
        .build()
}

/// Classify async-openai errors into the verifier taxonomy
fn map_openai_error(err: OpenAIError) -> KeycheckError {
    match err {
        OpenAIError::Reqwest(e) => KeycheckError::network(format!("OpenAI request failed: {}", e)),
        OpenAIError::ApiError(api) => {
            let code = api.code.as_deref().unwrap_or_default();
            let kind = api.r#type.as_deref().unwrap_or_default();
            match (code, kind) {
                ("invalid_api_key", _) | (_, "authentication_error") => {
                    KeycheckError::auth(api.message)
                }
                ("rate_limit_exceeded", _) | (_, "insufficient_quota") | (_, "requests") => {
                    KeycheckError::rate_limited(api.message)
                }
                _ => KeycheckError::Api {
                    // async-openai does not surface the HTTP status
                    status: 0,
                    message: format!("OpenAI API error: {}", api.message),
                },
            }
        }
        e @ OpenAIError::JSONDeserialize(..) => {
            KeycheckError::parse(format!("Malformed OpenAI response: {}", e))
        }
        other => KeycheckError::network(format!("OpenAI API error: {}", other)),
    }
}
