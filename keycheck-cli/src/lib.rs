//! Command-line runner for the provider credential verifier
//!
//! Wires the provider connectors into a [`Verifier`] according to the
//! parsed [`Args`].

pub mod args;
pub mod env;
pub mod render;

pub use args::{Args, Format};

use keycheck_core::{KeycheckResult, ProbeRequest, Provider, Secrets, Verifier};
use keycheck_openai::OpenAIConnector;
use tracing::debug;

/// Log filter used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str =
    "warn,keycheck_cli=info,keycheck_core=info,keycheck_openai=info,keycheck_anthropic=info";

/// Build the verifier with every connector compiled into this binary
pub fn build_verifier(args: &Args, secrets: Secrets) -> KeycheckResult<Verifier> {
    let mut openai = OpenAIConnector::new();
    if let Some(base) = args.openai_base()? {
        debug!("Using OpenAI API base: {}", base);
        openai = openai.with_api_base(&base);
    }
    if let Some(timeout) = args.timeout() {
        openai = openai.with_timeout(timeout);
    }

    let verifier = Verifier::new(secrets)
        .with_options(args.verifier_options())
        .with_request(
            Provider::OpenAI,
            ProbeRequest::for_provider(Provider::OpenAI).with_model(&args.openai_model),
        )
        .with_request(
            Provider::Anthropic,
            ProbeRequest::for_provider(Provider::Anthropic).with_model(&args.anthropic_model),
        )
        .with_connector(Box::new(openai));

    #[cfg(feature = "anthropic")]
    let verifier = {
        let mut anthropic = keycheck_anthropic::AnthropicConnector::new();
        if let Some(base) = args.anthropic_base()? {
            debug!("Using Anthropic API base: {}", base);
            anthropic = anthropic.with_base_url(&base);
        }
        if let Some(timeout) = args.timeout() {
            anthropic = anthropic.with_timeout(timeout);
        }
        verifier.with_connector(Box::new(anthropic))
    };

    Ok(verifier)
}
