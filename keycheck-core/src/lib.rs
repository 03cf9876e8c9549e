//! Core types for the provider credential verifier
//!
//! This crate defines the environment snapshot, the provider capability
//! traits, the individual checks and the sequential runner that ties them
//! together. Provider clients live in their own crates.

pub mod check;
pub mod error;
pub mod probe;
pub mod provider;
pub mod secrets;
pub mod verifier;

#[cfg(any(test, feature = "test-util"))]
pub mod stub;

pub use check::{assert_reply, check_call, check_key_present, check_library, CheckId, CheckKind};
pub use error::{KeycheckError, KeycheckResult};
pub use probe::{
    Completion, CompletionProvider, ProbeRequest, ProviderConnector, PROBE_EXPECTED,
    PROBE_MAX_TOKENS, PROBE_PROMPT,
};
pub use provider::Provider;
pub use secrets::Secrets;
pub use verifier::{CheckOutcome, CheckStatus, Report, Verifier, VerifierOptions};
