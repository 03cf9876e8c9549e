//! Command-line arguments

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use keycheck_core::{CheckId, KeycheckError, KeycheckResult, Provider, VerifierOptions};
use url::Url;

/// Verify that AI provider credentials are set and usable
#[derive(Parser, Debug, Clone)]
#[command(name = "keycheck", version, about)]
pub struct Args {
    /// Load variables from this file instead of .env.local / .env
    #[arg(long, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Run only these checks (repeatable)
    #[arg(long = "only", value_name = "CHECK")]
    pub only: Vec<CheckId>,

    /// Skip the checks that call provider APIs
    #[arg(long)]
    pub offline: bool,

    /// Skip remaining checks after the first failure
    #[arg(long)]
    pub fail_fast: bool,

    /// Output format for the report
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,

    /// List the available checks and exit
    #[arg(long)]
    pub list: bool,

    #[arg(long, env = "KEYCHECK_OPENAI_MODEL", default_value = Provider::OpenAI.default_model())]
    pub openai_model: String,

    #[arg(long, env = "KEYCHECK_ANTHROPIC_MODEL", default_value = Provider::Anthropic.default_model())]
    pub anthropic_model: String,

    /// OpenAI API base, e.g. https://api.openai.com/v1
    #[arg(long, env = "KEYCHECK_OPENAI_BASE_URL", value_name = "URL")]
    pub openai_base_url: Option<String>,

    /// Anthropic API base, e.g. https://api.anthropic.com
    #[arg(long, env = "KEYCHECK_ANTHROPIC_BASE_URL", value_name = "URL")]
    pub anthropic_base_url: Option<String>,

    /// Per-request timeout; unset means the HTTP client's default
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

impl Args {
    pub fn verifier_options(&self) -> VerifierOptions {
        let only = if self.only.is_empty() {
            None
        } else {
            Some(self.only.iter().copied().collect::<BTreeSet<_>>())
        };

        VerifierOptions {
            only,
            offline: self.offline,
            fail_fast: self.fail_fast,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Validated OpenAI base URL, if overridden
    pub fn openai_base(&self) -> KeycheckResult<Option<String>> {
        self.openai_base_url.as_deref().map(validate_base_url).transpose()
    }

    /// Validated Anthropic base URL, if overridden
    pub fn anthropic_base(&self) -> KeycheckResult<Option<String>> {
        self.anthropic_base_url
            .as_deref()
            .map(validate_base_url)
            .transpose()
    }
}

fn validate_base_url(raw: &str) -> KeycheckResult<String> {
    let url = Url::parse(raw)
        .map_err(|e| KeycheckError::config(format!("Invalid base URL {:?}: {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(raw.trim_end_matches('/').to_string()),
        other => Err(KeycheckError::config(format!(
            "Unsupported scheme {:?} in base URL {:?}",
            other, raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_validation() {
        assert_eq!(
            validate_base_url("http://localhost:8080/v1/").unwrap(),
            "http://localhost:8080/v1"
        );
        assert!(validate_base_url("localhost:8080").is_err());
        assert!(validate_base_url("ftp://example.com").is_err());
    }
}
