//! Sequential check runner
//!
//! Runs the selected checks one after another in declaration order. A
//! failing check never aborts the run unless fail-fast is set; every check
//! gets its own outcome in the [`Report`].

use std::collections::{BTreeSet, HashMap, HashSet};
use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn};

use crate::check::{self, CheckId, CheckKind};
use crate::error::{KeycheckError, KeycheckResult};
use crate::probe::{ProbeRequest, ProviderConnector};
use crate::provider::Provider;
use crate::secrets::Secrets;

/// Which checks to run and how
#[derive(Debug, Clone, Default)]
pub struct VerifierOptions {
    /// Restrict the run to these checks; `None` runs all of them
    pub only: Option<BTreeSet<CheckId>>,
    /// Skip every check that makes a network call
    pub offline: bool,
    /// Skip everything after the first failure
    pub fail_fast: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Passed,
    Failed,
    Skipped,
}

/// Result of a single check
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub id: CheckId,
    pub status: CheckStatus,
    /// Pass summary, failure message or skip reason
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
    pub elapsed_ms: u64,
    #[serde(skip)]
    pub error: Option<KeycheckError>,
}

impl CheckOutcome {
    fn passed(id: CheckId, detail: impl Into<String>, started: Instant) -> Self {
        Self {
            id,
            status: CheckStatus::Passed,
            detail: detail.into(),
            error_kind: None,
            elapsed_ms: started.elapsed().as_millis() as u64,
            error: None,
        }
    }

    fn failed(id: CheckId, error: KeycheckError, started: Instant) -> Self {
        Self {
            id,
            status: CheckStatus::Failed,
            detail: error.to_string(),
            error_kind: Some(error.kind()),
            elapsed_ms: started.elapsed().as_millis() as u64,
            error: Some(error),
        }
    }

    fn skipped(id: CheckId, reason: impl Into<String>) -> Self {
        Self {
            id,
            status: CheckStatus::Skipped,
            detail: reason.into(),
            error_kind: None,
            elapsed_ms: 0,
            error: None,
        }
    }

    pub fn is_passed(&self) -> bool {
        self.status == CheckStatus::Passed
    }

    pub fn is_failed(&self) -> bool {
        self.status == CheckStatus::Failed
    }
}

/// Outcomes of one run, in execution order
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub outcomes: Vec<CheckOutcome>,
}

impl Report {
    pub fn get(&self, id: CheckId) -> Option<&CheckOutcome> {
        self.outcomes.iter().find(|o| o.id == id)
    }

    pub fn count(&self, status: CheckStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    /// True when no selected check failed
    pub fn is_success(&self) -> bool {
        self.count(CheckStatus::Failed) == 0
    }
}

/// Runs checks against a secrets snapshot and a set of provider connectors
pub struct Verifier {
    secrets: Secrets,
    connectors: HashMap<Provider, Box<dyn ProviderConnector>>,
    requests: HashMap<Provider, ProbeRequest>,
    options: VerifierOptions,
}

impl Verifier {
    pub fn new(secrets: Secrets) -> Self {
        let requests = Provider::ALL
            .into_iter()
            .map(|p| (p, ProbeRequest::for_provider(p)))
            .collect();
        Self {
            secrets,
            connectors: HashMap::new(),
            requests,
            options: VerifierOptions::default(),
        }
    }

    /// Register the connector for its provider, replacing any previous one
    pub fn with_connector(mut self, connector: Box<dyn ProviderConnector>) -> Self {
        self.connectors.insert(connector.provider(), connector);
        self
    }

    /// Override the probe sent to `provider`
    pub fn with_request(mut self, provider: Provider, request: ProbeRequest) -> Self {
        self.requests.insert(provider, request);
        self
    }

    pub fn with_options(mut self, options: VerifierOptions) -> Self {
        self.options = options;
        self
    }

    /// Checks selected by the options, in declaration order
    pub fn plan(&self) -> Vec<CheckId> {
        CheckId::ALL
            .into_iter()
            .filter(|id| match &self.options.only {
                Some(only) => only.contains(id),
                None => true,
            })
            .collect()
    }

    /// Run every selected check sequentially
    pub async fn run(&self) -> Report {
        let mut report = Report::default();
        let mut failed_libraries: HashSet<Provider> = HashSet::new();
        let mut halted = false;

        for id in self.plan() {
            let outcome = if halted {
                CheckOutcome::skipped(id, "skipped after an earlier failure (fail-fast)")
            } else if self.options.offline && id.is_call() {
                CheckOutcome::skipped(id, "skipped in offline mode")
            } else if id.is_call() && failed_libraries.contains(&id.provider()) {
                CheckOutcome::skipped(
                    id,
                    format!("skipped because the {} client is unavailable", id.provider()),
                )
            } else {
                self.run_check(id).await
            };

            match outcome.status {
                CheckStatus::Passed => info!(check = %id, "{}", outcome.detail),
                CheckStatus::Failed => {
                    warn!(check = %id, "{}", outcome.detail);
                    if id.kind() == CheckKind::LibraryAvailable {
                        failed_libraries.insert(id.provider());
                    }
                    halted = self.options.fail_fast;
                }
                CheckStatus::Skipped => info!(check = %id, "{}", outcome.detail),
            }
            report.outcomes.push(outcome);
        }

        report
    }

    /// Run one check, ignoring selection and skip rules
    pub async fn run_check(&self, id: CheckId) -> CheckOutcome {
        let started = Instant::now();
        let provider = id.provider();

        let result = match id.kind() {
            CheckKind::KeyPresent => check::check_key_present(&self.secrets, provider)
                .map(|_| format!("{} is set", provider.credential_var())),
            CheckKind::LibraryAvailable => self
                .connector(provider)
                .and_then(|connector| check::check_library(connector))
                .map(|_| format!("{} client is available", provider)),
            CheckKind::CallSucceeds => self.run_call(provider).await,
        };

        match result {
            Ok(detail) => CheckOutcome::passed(id, detail, started),
            Err(e) => CheckOutcome::failed(id, e, started),
        }
    }

    async fn run_call(&self, provider: Provider) -> KeycheckResult<String> {
        let connector = self.connector(provider)?;
        connector.library_status()?;

        let request = self
            .requests
            .get(&provider)
            .cloned()
            .unwrap_or_else(|| ProbeRequest::for_provider(provider));

        let completion = check::check_call(&self.secrets, connector, &request).await?;
        Ok(format!(
            "{} ({}) replied {:?}",
            provider,
            completion.model,
            completion.text.unwrap_or_default()
        ))
    }

    fn connector(&self, provider: Provider) -> KeycheckResult<&dyn ProviderConnector> {
        self.connectors
            .get(&provider)
            .map(|c| &**c)
            .ok_or_else(|| {
                KeycheckError::library_unavailable(provider, "client support was not compiled in")
            })
    }
}
