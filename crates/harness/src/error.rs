//! Error types for the notewright harness

use notewright_common::Stage;
use thiserror::Error;

/// Result type alias using [`HarnessError`].
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Failure taxonomy for the harness.
///
/// The first three variants mirror what a failed scenario reports: setup
/// failures are fatal and name the call that failed, timeouts carry the
/// condition description and elapsed time, assertion failures carry the
/// literal expected and actual values. The rest are harness-level faults.
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("setup call '{call}' failed: {detail}")]
    Setup { call: String, detail: String },

    #[error("timeout waiting for {condition} ({elapsed_ms} ms elapsed)")]
    Timeout { condition: String, elapsed_ms: u64 },

    #[error("assertion failed at {context}: expected {expected:?}, actual {actual:?}")]
    Assertion {
        context: String,
        expected: String,
        actual: String,
    },

    #[error("invalid scenario '{name}': {reason}")]
    InvalidScenario { name: String, reason: String },

    #[error("scenario not found: {0}")]
    ScenarioNotFound(String),

    #[error("Playwright not found. Install with: npx playwright install")]
    PlaywrightNotFound,

    #[error("browser script failed: {0}")]
    Script(String),

    #[error("app under test failed to start: {0}")]
    AppStartup(String),

    #[error("scenario spec parse error: {0}")]
    SpecParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl HarnessError {
    /// Stage this error is attributed to on its own.
    ///
    /// Script-reported failures carry their stage out-of-band (the script
    /// knows which step was executing); this is the Rust-side default.
    /// `None` means the fault is in the harness, not in a scenario stage.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            HarnessError::Setup { .. } => Some(Stage::Setup),
            HarnessError::Assertion { .. } => Some(Stage::Assertion),
            // Timeouts are attributed by whoever observed them; a bare
            // timeout (e.g. the whole-scenario deadline) has no stage.
            _ => None,
        }
    }

    /// Expected/actual pair, when this failure carries one.
    pub fn expected_actual(&self) -> Option<(&str, &str)> {
        match self {
            HarnessError::Assertion {
                expected, actual, ..
            } => Some((expected.as_str(), actual.as_str())),
            _ => None,
        }
    }
}
