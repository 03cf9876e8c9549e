//! Anthropic Messages API wire types
//!
//! Only the fields the probe needs are modelled.

use serde::{Deserialize, Serialize};

/// Body of POST /v1/messages
#[derive(Debug, Clone, Serialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Response from POST /v1/messages
#[derive(Debug, Clone, Deserialize)]
pub struct MessagesResponse {
    pub model: String,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

/// One content block; non-text blocks carry no `text`
#[derive(Debug, Clone, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
}

/// Error envelope returned with non-2xx statuses
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_messages_response() {
        let json = r#"
        {
            "id": "msg_01",
            "type": "message",
            "role": "assistant",
            "model": "claude-3-haiku-20240307",
            "content": [{"type": "text", "text": "OK"}],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 2}
        }
        "#;

        let response: MessagesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.model, "claude-3-haiku-20240307");
        assert_eq!(response.content.len(), 1);
        assert_eq!(response.content[0].kind, "text");
        assert_eq!(response.content[0].text.as_deref(), Some("OK"));
    }

    #[test]
    fn test_parse_error_envelope() {
        let json = r#"
        {
            "type": "error",
            "error": {"type": "authentication_error", "message": "invalid x-api-key"}
        }
        "#;

        let response: ErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.error.kind, "authentication_error");
        assert_eq!(response.error.message, "invalid x-api-key");
    }
}
