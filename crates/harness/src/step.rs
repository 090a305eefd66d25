//! Scenario actions and synchronization strategies
//!
//! A scenario is an ordered list of actions. Backend actions mutate the
//! application state over HTTP before the browser starts; page actions
//! compile into a single Playwright script per scenario run. There is
//! deliberately no sleep action: every wait is bound to an observable
//! condition with an explicit timeout.

use notewright_common::{Stage, TestUser};
use serde::{Deserialize, Serialize};

use crate::locator::Locator;

/// Default bounded-wait timeout for page steps.
pub const DEFAULT_STEP_TIMEOUT_MS: u64 = 5000;

/// Synchronization strategy for a mutating page action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum SyncStrategy {
    /// Await a network response whose URL contains the substring, armed
    /// before the triggering action so the response cannot be missed.
    NetworkResponse {
        url_contains: String,
        /// Exact status to match; `None` accepts any success status.
        #[serde(default)]
        status: Option<u16>,
        /// On response-wait timeout, defer the verdict to the UI assertion
        /// that follows instead of failing outright.
        #[serde(default)]
        ui_fallback: bool,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },

    /// Wait for an element to become visible after the action.
    UiVisible {
        locator: Locator,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },

    /// Reload the page to force a re-fetch, then wait for a container to
    /// render again.
    Reload {
        wait_for: Locator,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },
}

/// One action within a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Wipe all backend state through the testing reset endpoint.
    Reset,

    /// Seed a user through the backend API.
    CreateUser { user: TestUser },

    /// Load a frontend path relative to the base URL.
    Goto {
        #[serde(default = "default_path")]
        path: String,
    },

    /// Click an element, optionally synchronizing on an observable effect.
    Click {
        locator: Locator,
        #[serde(default)]
        sync: Option<SyncStrategy>,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },

    /// Fill an input field.
    Fill { locator: Locator, value: String },

    /// Assert an element is visible within the bounded wait.
    ExpectVisible {
        locator: Locator,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },

    /// Assert an element's text equals the given value exactly.
    ExpectText {
        locator: Locator,
        text: String,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },

    /// Read an element's text into a named capture slot.
    CaptureText { locator: Locator, slot: String },

    /// Assert an element's text flipped to the complementary member of the
    /// pair relative to the value captured earlier in `slot`.
    ExpectTextFlipped {
        locator: Locator,
        slot: String,
        pair: [String; 2],
        #[serde(default)]
        timeout_ms: Option<u64>,
    },
}

fn default_path() -> String {
    "/".to_string()
}

impl Action {
    /// Whether this action runs against the backend API rather than the page.
    pub fn is_backend(&self) -> bool {
        matches!(self, Action::Reset | Action::CreateUser { .. })
    }

    /// Scenario stage this action belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            Action::Reset | Action::CreateUser { .. } => Stage::Setup,
            Action::Goto { .. } => Stage::Navigation,
            Action::Click { .. } | Action::Fill { .. } | Action::CaptureText { .. } => {
                Stage::Interaction
            }
            Action::ExpectVisible { .. }
            | Action::ExpectText { .. }
            | Action::ExpectTextFlipped { .. } => Stage::Assertion,
        }
    }

    /// Short name identifying this action in reports and logs.
    pub fn name(&self) -> String {
        match self {
            Action::Reset => "reset".to_string(),
            Action::CreateUser { user } => format!("create_user:{}", user.username),
            Action::Goto { path } => format!("goto:{path}"),
            Action::Click { locator, .. } => format!("click:{locator}"),
            Action::Fill { locator, .. } => format!("fill:{locator}"),
            Action::ExpectVisible { locator, .. } => format!("expect_visible:{locator}"),
            Action::ExpectText { locator, .. } => format!("expect_text:{locator}"),
            Action::CaptureText { locator, slot } => {
                format!("capture_text:{slot}:{locator}")
            }
            Action::ExpectTextFlipped { locator, slot, .. } => {
                format!("expect_text_flipped:{slot}:{locator}")
            }
        }
    }
}
