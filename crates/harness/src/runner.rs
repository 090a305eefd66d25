//! Scenario runner and result reporting
//!
//! Scenarios run strictly one at a time: every scenario begins with a
//! destructive backend reset, so interleaving two of them against one
//! backend instance would corrupt both.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use notewright_common::Stage;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::error::{HarnessError, HarnessResult};
use crate::fixture::{BackendClient, BackendConfig};
use crate::scenario::{PlannedScenario, Suite};
use crate::script::{BrowserConfig, PageDriver};

/// Result of one scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub name: String,
    pub tags: Vec<String>,
    pub success: bool,
    pub duration_ms: u64,

    /// Stage the failure is attributed to; `None` on success or when the
    /// fault was in the harness rather than a scenario stage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,

    /// Values captured during the run (e.g. a toggle label before a click).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub captured: BTreeMap<String, String>,

    /// Steps whose network-response wait fell back to UI verification.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sync_fallbacks: Vec<String>,
}

/// Result of a whole run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    pub started_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub scenarios: Vec<ScenarioReport>,
}

/// Configuration for the runner.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Base URL of the frontend under test.
    pub frontend_url: String,

    /// Backend connection for fixture calls.
    pub backend: BackendConfig,

    /// Browser configuration for script runs.
    pub browser: BrowserConfig,

    /// Deadline for one whole scenario, backend setup excluded.
    pub scenario_timeout: Duration,

    /// Directory the results file is written to.
    pub output_dir: PathBuf,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            frontend_url: notewright_common::default_frontend_url(),
            backend: BackendConfig::default(),
            browser: BrowserConfig::default(),
            scenario_timeout: Duration::from_secs(60),
            output_dir: PathBuf::from("test-results"),
        }
    }
}

/// Runs planned scenarios and aggregates reports.
pub struct SuiteRunner {
    config: RunnerConfig,
    backend: BackendClient,
    driver: PageDriver,
}

impl SuiteRunner {
    pub fn new(config: RunnerConfig) -> HarnessResult<Self> {
        let backend = BackendClient::new(config.backend.clone())?;
        let driver = PageDriver::new(
            config.frontend_url.clone(),
            config.browser.clone(),
            config.scenario_timeout,
        );
        Ok(Self {
            config,
            backend,
            driver,
        })
    }

    /// Plan and run a suite tree.
    pub async fn run_suite(&self, suite: &Suite) -> HarnessResult<SuiteReport> {
        let plans = suite.plan()?;
        Ok(self.run_plans(&plans).await)
    }

    /// Run a suite, keeping only scenarios with the given tag.
    pub async fn run_tagged(&self, suite: &Suite, tag: &str) -> HarnessResult<SuiteReport> {
        let plans: Vec<_> = suite
            .plan()?
            .into_iter()
            .filter(|p| p.has_tag(tag))
            .collect();
        Ok(self.run_plans(&plans).await)
    }

    /// Run a single scenario, matched by full name or bare test name.
    pub async fn run_named(&self, suite: &Suite, name: &str) -> HarnessResult<SuiteReport> {
        let suffix = format!(":: {name}");
        let plan = suite
            .plan()?
            .into_iter()
            .find(|p| p.full_name == name || p.full_name.ends_with(&suffix))
            .ok_or_else(|| HarnessError::ScenarioNotFound(name.to_string()))?;
        Ok(self.run_plans(std::slice::from_ref(&plan)).await)
    }

    /// Run planned scenarios sequentially.
    pub async fn run_plans(&self, plans: &[PlannedScenario]) -> SuiteReport {
        let started_at = Utc::now();
        let start = Instant::now();
        let mut scenarios = Vec::with_capacity(plans.len());
        let mut passed = 0;
        let mut failed = 0;

        info!("Running {} scenario(s)...", plans.len());

        for plan in plans {
            let report = self.run_plan(plan).await;
            if report.success {
                passed += 1;
                info!("✓ {} ({} ms)", report.name, report.duration_ms);
            } else {
                failed += 1;
                error!(
                    "✗ {} [{}] - {}",
                    report.name,
                    report
                        .stage
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "harness".to_string()),
                    report.error.as_deref().unwrap_or("unknown error")
                );
            }
            scenarios.push(report);
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "Results: {} passed, {} failed ({} ms)",
            passed, failed, duration_ms
        );

        SuiteReport {
            started_at,
            total: plans.len(),
            passed,
            failed,
            duration_ms,
            scenarios,
        }
    }

    /// Run one planned scenario: backend setup, then one script run.
    async fn run_plan(&self, plan: &PlannedScenario) -> ScenarioReport {
        let start = Instant::now();
        debug!(scenario = %plan.full_name, "running scenario");

        for op in &plan.backend_ops {
            if let Err(e) = self.backend.run(op).await {
                return Self::failure_report(plan, start, e);
            }
        }

        // A scenario with only backend actions has nothing to drive.
        if plan.page_steps.is_empty() {
            return Self::passed_report(plan, start, BTreeMap::new(), Vec::new());
        }

        match self.driver.run(&plan.page_steps).await {
            Ok(outcome) => match outcome.failure {
                None => Self::passed_report(plan, start, outcome.captured, outcome.fallbacks),
                Some(failure) => {
                    let stage = failure.stage.or_else(|| failure.error.stage());
                    let (expected, actual) = match failure.error.expected_actual() {
                        Some((e, a)) => (Some(e.to_string()), Some(a.to_string())),
                        None => (None, None),
                    };
                    ScenarioReport {
                        name: plan.full_name.clone(),
                        tags: plan.tags.clone(),
                        success: false,
                        duration_ms: start.elapsed().as_millis() as u64,
                        stage,
                        error: Some(failure.error.to_string()),
                        expected,
                        actual,
                        captured: outcome.captured,
                        sync_fallbacks: outcome.fallbacks,
                    }
                }
            },
            Err(e) => Self::failure_report(plan, start, e),
        }
    }

    fn passed_report(
        plan: &PlannedScenario,
        start: Instant,
        captured: BTreeMap<String, String>,
        sync_fallbacks: Vec<String>,
    ) -> ScenarioReport {
        ScenarioReport {
            name: plan.full_name.clone(),
            tags: plan.tags.clone(),
            success: true,
            duration_ms: start.elapsed().as_millis() as u64,
            stage: None,
            error: None,
            expected: None,
            actual: None,
            captured,
            sync_fallbacks,
        }
    }

    fn failure_report(plan: &PlannedScenario, start: Instant, error: HarnessError) -> ScenarioReport {
        let (expected, actual) = match error.expected_actual() {
            Some((e, a)) => (Some(e.to_string()), Some(a.to_string())),
            None => (None, None),
        };
        ScenarioReport {
            name: plan.full_name.clone(),
            tags: plan.tags.clone(),
            success: false,
            duration_ms: start.elapsed().as_millis() as u64,
            stage: error.stage(),
            error: Some(error.to_string()),
            expected,
            actual,
            captured: BTreeMap::new(),
            sync_fallbacks: Vec::new(),
        }
    }

    /// Write the report to `<output_dir>/results.json`.
    pub fn write_results(&self, report: &SuiteReport) -> HarnessResult<PathBuf> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let path = self.config.output_dir.join("results.json");
        let json = serde_json::to_string_pretty(report)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}
