//! Error types for the verifier

use thiserror::Error;

use crate::provider::Provider;

/// Verifier-wide error type
///
/// Every check either succeeds or fails with exactly one of these. The
/// call-failure variants (`Network`, `Auth`, `RateLimited`, `Api`, `Parse`)
/// come straight from the provider connectors and are never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeycheckError {
    #[error("{var} is not set in this environment")]
    MissingCredential { var: String },

    #[error("{provider} client library is not available in this build: {reason}")]
    LibraryUnavailable { provider: Provider, reason: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("{provider} returned a response without any text")]
    NoResponse { provider: Provider },

    #[error("{provider} responded but the reply {actual:?} does not contain {expected:?}")]
    UnexpectedReply {
        provider: Provider,
        expected: String,
        actual: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl KeycheckError {
    pub fn missing_credential(var: impl Into<String>) -> Self {
        KeycheckError::MissingCredential { var: var.into() }
    }

    pub fn library_unavailable(provider: Provider, reason: impl Into<String>) -> Self {
        KeycheckError::LibraryUnavailable {
            provider,
            reason: reason.into(),
        }
    }

    pub fn network(msg: impl Into<String>) -> Self {
        KeycheckError::Network(msg.into())
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        KeycheckError::Auth(msg.into())
    }

    pub fn rate_limited(msg: impl Into<String>) -> Self {
        KeycheckError::RateLimited(msg.into())
    }

    pub fn api(status: u16, message: impl Into<String>) -> Self {
        KeycheckError::Api {
            status,
            message: message.into(),
        }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        KeycheckError::Parse(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        KeycheckError::Config(msg.into())
    }

    /// Map a non-success HTTP status from a provider onto the error taxonomy
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            401 | 403 => KeycheckError::Auth(body),
            429 => KeycheckError::RateLimited(body),
            _ => KeycheckError::Api {
                status,
                message: body,
            },
        }
    }

    /// Short machine-readable kind, used in JSON reports
    pub fn kind(&self) -> &'static str {
        match self {
            KeycheckError::MissingCredential { .. } => "missing_credential",
            KeycheckError::LibraryUnavailable { .. } => "library_unavailable",
            KeycheckError::Network(_) => "network",
            KeycheckError::Auth(_) => "auth",
            KeycheckError::RateLimited(_) => "rate_limited",
            KeycheckError::Api { .. } => "api",
            KeycheckError::Parse(_) => "parse",
            KeycheckError::NoResponse { .. } => "no_response",
            KeycheckError::UnexpectedReply { .. } => "unexpected_reply",
            KeycheckError::Config(_) => "config",
        }
    }
}

/// Result type alias for verifier operations
pub type KeycheckResult<T> = Result<T, KeycheckError>;
