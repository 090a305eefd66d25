//! Script result protocol
//!
//! A scenario script prints exactly one line starting with
//! [`RESULT_MARKER`] followed by a JSON object. Everything else on stdout
//! (the app's own console noise, Playwright chatter) is ignored. The raw
//! report is classified here, Rust-side, into the failure taxonomy: the
//! script only records what happened, not what it means.

use std::collections::BTreeMap;

use notewright_common::Stage;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, HarnessResult};

/// Prefix of the structured result line in script stdout.
pub const RESULT_MARKER: &str = "NOTEWRIGHT_RESULT";

/// Raw outcome as reported by the script.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptReport {
    pub outcome: ReportedOutcome,
    #[serde(default)]
    pub timed_out: bool,
    #[serde(default)]
    pub stage: Option<Stage>,
    #[serde(default)]
    pub step: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub elapsed_ms: Option<u64>,
    #[serde(default)]
    pub matcher: Option<MatcherOutcome>,
    #[serde(default)]
    pub captured: BTreeMap<String, String>,
    #[serde(default)]
    pub fallbacks: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportedOutcome {
    Passed,
    Failed,
}

/// Expected/actual pair from a failed Playwright matcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherOutcome {
    #[serde(default)]
    pub expected: Option<String>,
    #[serde(default)]
    pub actual: Option<String>,
}

/// A classified scenario failure.
#[derive(Debug)]
pub struct Failure {
    /// Stage the failure is attributed to, when known.
    pub stage: Option<Stage>,
    pub error: HarnessError,
}

/// Parsed and classified result of one scenario script run.
#[derive(Debug)]
pub struct RunOutcome {
    /// Values captured into named slots during the run.
    pub captured: BTreeMap<String, String>,
    /// Steps whose network-response wait timed out and deferred to the UI.
    pub fallbacks: Vec<String>,
    pub failure: Option<Failure>,
}

/// Extract the structured report line from script stdout.
pub fn parse_report(stdout: &str) -> HarnessResult<ScriptReport> {
    let pattern = Regex::new(&format!(r"(?m)^{RESULT_MARKER} (\{{.*\}})\s*$"))
        .expect("result-line pattern is valid");

    let line = pattern
        .captures_iter(stdout)
        .last()
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| {
            HarnessError::Script(format!(
                "no result line in script output: {}",
                tail(stdout, 400)
            ))
        })?;

    Ok(serde_json::from_str(line.as_str())?)
}

/// Classify a raw report into a [`RunOutcome`].
///
/// Text assertions with a recorded expected/actual pair are assertion
/// failures even when Playwright surfaced them as a retry deadline;
/// everything else that timed out is a timeout against the step's condition.
pub fn into_outcome(report: ScriptReport) -> RunOutcome {
    let failure = match report.outcome {
        ReportedOutcome::Passed => None,
        ReportedOutcome::Failed => {
            let step = report.step.clone().unwrap_or_default();
            let elapsed_ms = report.elapsed_ms.unwrap_or_default();
            let message = report.message.clone().unwrap_or_default();
            let pair = report.matcher.as_ref().and_then(|m| {
                m.expected
                    .as_ref()
                    .zip(m.actual.as_ref())
                    .map(|(e, a)| (e.clone(), a.clone()))
            });

            let error = if step.starts_with("expect_text") {
                match pair {
                    Some((expected, actual)) => HarnessError::Assertion {
                        context: step.clone(),
                        expected,
                        actual,
                    },
                    // Element never reached a readable state.
                    None => HarnessError::Timeout {
                        condition: step.clone(),
                        elapsed_ms,
                    },
                }
            } else if report.timed_out {
                HarnessError::Timeout {
                    condition: step.clone(),
                    elapsed_ms,
                }
            } else if let Some((expected, actual)) = pair {
                HarnessError::Assertion {
                    context: step.clone(),
                    expected,
                    actual,
                }
            } else {
                HarnessError::Script(message)
            };

            Some(Failure {
                stage: report.stage,
                error,
            })
        }
    };

    RunOutcome {
        captured: report.captured,
        fallbacks: report.fallbacks,
        failure,
    }
}

fn tail(s: &str, max: usize) -> &str {
    if s.len() <= max {
        s
    } else {
        let mut start = s.len() - max;
        while !s.is_char_boundary(start) {
            start += 1;
        }
        &s[start..]
    }
}
