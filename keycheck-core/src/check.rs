//! The individual checks
//!
//! Each check is a single linear sequence: read the snapshot, make at most
//! one external call, evaluate one assertion. Nothing is retried.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, instrument};

use crate::error::{KeycheckError, KeycheckResult};
use crate::probe::{Completion, ProbeRequest, ProviderConnector};
use crate::provider::Provider;
use crate::secrets::Secrets;

/// Identifier of one check, in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckId {
    #[serde(rename = "openai-key")]
    OpenAIKey,
    #[serde(rename = "openai-call")]
    OpenAICall,
    AnthropicLib,
    AnthropicKey,
    AnthropicCall,
}

/// What a check does, independent of the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckKind {
    KeyPresent,
    LibraryAvailable,
    CallSucceeds,
}

impl CheckId {
    pub const ALL: [CheckId; 5] = [
        CheckId::OpenAIKey,
        CheckId::OpenAICall,
        CheckId::AnthropicLib,
        CheckId::AnthropicKey,
        CheckId::AnthropicCall,
    ];

    pub fn provider(&self) -> Provider {
        match self {
            CheckId::OpenAIKey | CheckId::OpenAICall => Provider::OpenAI,
            CheckId::AnthropicLib | CheckId::AnthropicKey | CheckId::AnthropicCall => {
                Provider::Anthropic
            }
        }
    }

    pub fn kind(&self) -> CheckKind {
        match self {
            CheckId::OpenAIKey | CheckId::AnthropicKey => CheckKind::KeyPresent,
            CheckId::AnthropicLib => CheckKind::LibraryAvailable,
            CheckId::OpenAICall | CheckId::AnthropicCall => CheckKind::CallSucceeds,
        }
    }

    /// Whether the check makes an outbound network call
    pub fn is_call(&self) -> bool {
        self.kind() == CheckKind::CallSucceeds
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckId::OpenAIKey => "openai-key",
            CheckId::OpenAICall => "openai-call",
            CheckId::AnthropicLib => "anthropic-lib",
            CheckId::AnthropicKey => "anthropic-key",
            CheckId::AnthropicCall => "anthropic-call",
        }
    }

    /// One-line description shown by `--list`
    pub fn description(&self) -> &'static str {
        match self {
            CheckId::OpenAIKey => "OPENAI_API_KEY is set",
            CheckId::OpenAICall => "OpenAI chat completion answers \"Say OK\"",
            CheckId::AnthropicLib => "Anthropic client is available",
            CheckId::AnthropicKey => "ANTHROPIC_API_KEY is set",
            CheckId::AnthropicCall => "Anthropic message answers \"Say OK\"",
        }
    }
}

impl fmt::Display for CheckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CheckId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CheckId::ALL
            .into_iter()
            .find(|id| id.as_str() == s.to_lowercase())
            .ok_or_else(|| format!("Unknown check: {}", s))
    }
}

/// Presence-check: the provider's credential is non-empty
pub fn check_key_present(secrets: &Secrets, provider: Provider) -> KeycheckResult<()> {
    secrets.credential(provider).map(|_| ())
}

/// Library check: the provider's client can be loaded in this process
pub fn check_library(connector: &dyn ProviderConnector) -> KeycheckResult<()> {
    connector.library_status()
}

/// Call-check: one probe round trip whose reply must contain the expected text
#[instrument(skip(secrets, connector, request), fields(provider = %connector.provider(), model = %request.model))]
pub async fn check_call(
    secrets: &Secrets,
    connector: &dyn ProviderConnector,
    request: &ProbeRequest,
) -> KeycheckResult<Completion> {
    let provider = connector.provider();
    let api_key = secrets.credential(provider)?;

    let client = connector.connect(api_key)?;
    let completion = client.complete(request).await?;
    debug!(reply = ?completion.text, "Probe answered");

    assert_reply(&completion, &request.expected)?;
    Ok(completion)
}

/// Distinguishes "no text at all" from "text without the expected substring"
pub fn assert_reply(completion: &Completion, expected: &str) -> KeycheckResult<()> {
    match completion.text.as_deref() {
        None | Some("") => Err(KeycheckError::NoResponse {
            provider: completion.provider,
        }),
        Some(text) if text.contains(expected) => Ok(()),
        Some(text) => Err(KeycheckError::UnexpectedReply {
            provider: completion.provider,
            expected: expected.to_string(),
            actual: text.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completion(text: Option<&str>) -> Completion {
        Completion {
            provider: Provider::Anthropic,
            model: "claude-3-haiku-20240307".to_string(),
            text: text.map(str::to_string),
        }
    }

    #[test]
    fn test_check_id_round_trip_names() {
        for id in CheckId::ALL {
            assert_eq!(id.as_str().parse::<CheckId>(), Ok(id));
        }
        assert!("openai-lib".parse::<CheckId>().is_err());
    }

    #[test]
    fn test_check_id_serializes_kebab_case() {
        for id in CheckId::ALL {
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, format!("\"{}\"", id.as_str()));
        }
    }

    #[test]
    fn test_key_present_fails_when_empty() {
        let secrets = Secrets::from_pairs([("OPENAI_API_KEY", ""), ("ANTHROPIC_API_KEY", "k")]);
        let err = check_key_present(&secrets, Provider::OpenAI).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
        assert!(check_key_present(&secrets, Provider::Anthropic).is_ok());
    }

    #[test]
    fn test_assert_reply() {
        assert!(assert_reply(&completion(Some("OK.")), "OK").is_ok());
        assert!(matches!(
            assert_reply(&completion(None), "OK"),
            Err(KeycheckError::NoResponse { .. })
        ));
        assert!(matches!(
            assert_reply(&completion(Some("")), "OK"),
            Err(KeycheckError::NoResponse { .. })
        ));
        assert!(matches!(
            assert_reply(&completion(Some("ok")), "OK"),
            Err(KeycheckError::UnexpectedReply { .. })
        ));
    }
}
