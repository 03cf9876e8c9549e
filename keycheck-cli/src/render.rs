//! Report output

use keycheck_core::{CheckId, CheckOutcome, CheckStatus, Report};
use serde::Serialize;

#[derive(Serialize)]
struct JsonReport<'a> {
    success: bool,
    passed: usize,
    failed: usize,
    skipped: usize,
    outcomes: &'a [CheckOutcome],
}

fn label(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Passed => "PASS",
        CheckStatus::Failed => "FAIL",
        CheckStatus::Skipped => "SKIP",
    }
}

/// One line per check followed by a summary line
pub fn render_text(report: &Report) -> String {
    let width = report
        .outcomes
        .iter()
        .map(|o| o.id.as_str().len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for outcome in &report.outcomes {
        out.push_str(&format!(
            "{}  {:<width$}  {}\n",
            label(outcome.status),
            outcome.id.as_str(),
            outcome.detail,
            width = width
        ));
    }
    out.push_str(&format!(
        "\n{} passed, {} failed, {} skipped\n",
        report.count(CheckStatus::Passed),
        report.count(CheckStatus::Failed),
        report.count(CheckStatus::Skipped)
    ));
    out
}

pub fn render_json(report: &Report) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonReport {
        success: report.is_success(),
        passed: report.count(CheckStatus::Passed),
        failed: report.count(CheckStatus::Failed),
        skipped: report.count(CheckStatus::Skipped),
        outcomes: &report.outcomes,
    })
}

/// Output of `--list`
pub fn render_check_list() -> String {
    CheckId::ALL
        .iter()
        .map(|id| format!("{:<15} {}\n", id.as_str(), id.description()))
        .collect()
}
