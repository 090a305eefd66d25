//! Notewright E2E Scenario Harness
//!
//! A Rust-controlled end-to-end harness for the notes application that:
//! - Resets and reseeds backend state over HTTP before every scenario
//! - Compiles typed page steps into Playwright scripts run under `node`
//! - Synchronizes every mutation on an observable signal, never a sleep
//! - Classifies failures as setup, timeout, or assertion, per stage
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Scenario Runner (Rust)                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  SuiteRunner                                                │
//! │    ├── BackendClient  -> reset / create_user fixtures       │
//! │    ├── PageDriver     -> steps -> Playwright script -> node │
//! │    └── ScenarioReport -> stage, expected/actual, captures   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Suite (code-built via flows::*, or YAML)                   │
//! │    ├── before_each: [Action]   (applies to nested tests)    │
//! │    ├── tests: [Scenario]                                    │
//! │    └── suites: [Suite]                                      │
//! │                                                             │
//! │  Action                                                     │
//! │    ├── reset / create_user { user }                         │
//! │    ├── goto { path }                                        │
//! │    ├── click { locator, sync? }                             │
//! │    ├── fill { locator, value }                              │
//! │    ├── expect_visible / expect_text { locator, ... }        │
//! │    └── capture_text / expect_text_flipped { slot, ... }     │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod fixture;
pub mod flows;
pub mod launch;
pub mod locator;
pub mod outcome;
pub mod runner;
pub mod scenario;
pub mod script;
pub mod step;
pub mod sync;

pub use error::{HarnessError, HarnessResult};
pub use fixture::{BackendClient, BackendConfig};
pub use locator::Locator;
pub use runner::{RunnerConfig, ScenarioReport, SuiteReport, SuiteRunner};
pub use scenario::{PlannedScenario, Scenario, Suite};
pub use script::{Browser, BrowserConfig, PageDriver};
pub use step::{Action, SyncStrategy};
