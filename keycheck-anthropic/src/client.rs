//! Anthropic Messages API client
//!
//! Provides the connector and the one-shot client used by the call-check.

use std::time::Duration;

use async_trait::async_trait;
use keycheck_core::{
    Completion, CompletionProvider, KeycheckError, KeycheckResult, ProbeRequest, Provider,
    ProviderConnector,
};
use reqwest::Client;
use tracing::{debug, info, instrument};

use crate::types::{ErrorResponse, Message, MessagesRequest, MessagesResponse};

/// Base URL for the Anthropic API
pub const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com";

/// API version sent with every request
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Builds [`AnthropicClient`]s for the call-check
#[derive(Debug, Clone)]
pub struct AnthropicConnector {
    base_url: String,
    timeout: Option<Duration>,
}

impl Default for AnthropicConnector {
    fn default() -> Self {
        Self {
            base_url: ANTHROPIC_API_BASE.to_string(),
            timeout: None,
        }
    }
}

impl AnthropicConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn http_client(&self) -> KeycheckResult<Client> {
        let mut builder = Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder.build().map_err(|e| {
            KeycheckError::library_unavailable(
                Provider::Anthropic,
                format!("failed to initialize HTTP client: {}", e),
            )
        })
    }
}

impl ProviderConnector for AnthropicConnector {
    fn provider(&self) -> Provider {
        Provider::Anthropic
    }

    fn library_status(&self) -> KeycheckResult<()> {
        self.http_client().map(|_| ())
    }

    fn connect(&self, api_key: &str) -> KeycheckResult<Box<dyn CompletionProvider>> {
        if api_key.is_empty() {
            return Err(KeycheckError::missing_credential(
                Provider::Anthropic.credential_var(),
            ));
        }

        Ok(Box::new(AnthropicClient {
            client: self.http_client()?,
            base_url: self.base_url.clone(),
            api_key: api_key.to_string(),
        }))
    }
}

/// Anthropic client bound to one API key
pub struct AnthropicClient {
    client: Client,
    base_url: String,
    api_key: String,
}

#[async_trait]
impl CompletionProvider for AnthropicClient {
    fn provider(&self) -> Provider {
        Provider::Anthropic
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: &ProbeRequest) -> KeycheckResult<Completion> {
        let url = format!("{}/v1/messages", self.base_url);
        let body = MessagesRequest {
            model: request.model.clone(),
            max_tokens: request.max_tokens,
            messages: vec![Message::user(request.prompt.as_str())],
        };

        debug!("Sending messages probe to: {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| KeycheckError::network(format!("Anthropic request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = match response.text().await {
                Ok(text) => text,
                Err(e) => format!("failed to read response body: {}", e),
            };
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| format!("{}: {}", e.error.kind, e.error.message))
                .unwrap_or(text);
            return Err(KeycheckError::from_status(status, message));
        }

        let messages_response: MessagesResponse = response.json().await.map_err(|e| {
            KeycheckError::parse(format!("Failed to parse Anthropic response: {}", e))
        })?;

        info!(model = %messages_response.model, "Anthropic answered probe");

        let text = messages_response
            .content
            .into_iter()
            .next()
            .and_then(|block| block.text);

        Ok(Completion {
            provider: Provider::Anthropic,
            model: messages_response.model,
            text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keycheck_core::{check_call, Secrets};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn message_response(blocks: serde_json::Value) -> serde_json::Value {
        json!({
            "id": "msg_test",
            "type": "message",
            "role": "assistant",
            "model": "claude-3-haiku-20240307",
            "content": blocks,
            "stop_reason": "max_tokens",
            "usage": { "input_tokens": 10, "output_tokens": 2 }
        })
    }

    fn connector_for(server: &MockServer) -> AnthropicConnector {
        AnthropicConnector::new().with_base_url(&server.uri())
    }

    #[tokio::test]
    async fn test_probe_request_shape_and_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "sk-ant-test"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .and(body_json(json!({
                "model": "claude-3-haiku-20240307",
                "max_tokens": 5,
                "messages": [{ "role": "user", "content": "Say OK" }]
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(message_response(json!([{ "type": "text", "text": "OK" }]))),
            )
            .expect(1)
            .mount(&server)
            .await;

        let secrets = Secrets::from_pairs([("ANTHROPIC_API_KEY", "sk-ant-test")]);
        let completion = check_call(
            &secrets,
            &connector_for(&server),
            &ProbeRequest::for_provider(Provider::Anthropic),
        )
        .await
        .unwrap();

        assert_eq!(completion.text.as_deref(), Some("OK"));
    }

    #[tokio::test]
    async fn test_empty_content_is_no_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(message_response(json!([]))))
            .mount(&server)
            .await;

        let secrets = Secrets::from_pairs([("ANTHROPIC_API_KEY", "sk-ant-test")]);
        let err = check_call(
            &secrets,
            &connector_for(&server),
            &ProbeRequest::for_provider(Provider::Anthropic),
        )
        .await
        .unwrap_err();

        assert_eq!(
            err,
            KeycheckError::NoResponse {
                provider: Provider::Anthropic
            }
        );
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "sk-ant-revoked"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "type": "error",
                "error": { "type": "authentication_error", "message": "invalid x-api-key" }
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "sk-ant-busy"))
            .respond_with(ResponseTemplate::new(529).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let connector = connector_for(&server);
        let request = ProbeRequest::for_provider(Provider::Anthropic);

        let err = connector
            .connect("sk-ant-revoked")
            .unwrap()
            .complete(&request)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            KeycheckError::auth("authentication_error: invalid x-api-key")
        );

        let err = connector
            .connect("sk-ant-busy")
            .unwrap()
            .complete(&request)
            .await
            .unwrap_err();
        assert_eq!(err, KeycheckError::api(529, "overloaded"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = connector_for(&server)
            .connect("sk-ant-test")
            .unwrap()
            .complete(&ProbeRequest::for_provider(Provider::Anthropic))
            .await
            .unwrap_err();
        assert!(matches!(err, KeycheckError::Parse(_)));
    }

    #[tokio::test]
    async fn test_truncated_error_body_keeps_read_error() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        // Answers 500 with a body shorter than its Content-Length, then hangs up
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request);
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text[..end]
                        .lines()
                        .filter_map(|line| line.split_once(':'))
                        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if request.len() >= end + 4 + length {
                        break;
                    }
                }
            }
            socket
                .write_all(b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 64\r\n\r\npartial")
                .await
                .unwrap();
            socket.shutdown().await.unwrap();
        });

        let err = AnthropicConnector::new()
            .with_base_url(&format!("http://{}", addr))
            .connect("sk-ant-test")
            .unwrap()
            .complete(&ProbeRequest::for_provider(Provider::Anthropic))
            .await
            .unwrap_err();
        server.await.unwrap();

        match err {
            KeycheckError::Api { status, message } => {
                assert_eq!(status, 500);
                assert!(message.starts_with("failed to read response body"), "{}", message);
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_library_status_ok() {
        assert!(AnthropicConnector::new().library_status().is_ok());
    }

    #[tokio::test]
    #[ignore] // Requires API key
    async fn test_live_say_ok() {
        let secrets = Secrets::from_env();
        let completion = check_call(
            &secrets,
            &AnthropicConnector::new(),
            &ProbeRequest::for_provider(Provider::Anthropic),
        )
        .await
        .expect("Anthropic probe failed");

        assert!(completion.text.unwrap_or_default().contains("OK"));
    }
}
