//! Playwright script generation and execution
//!
//! One scenario run compiles to one Playwright script executed by a single
//! `node` process: login state and captured values must persist across the
//! steps of a scenario, and the browser context must die with it. The script
//! reports its outcome as a single machine-parseable line (see
//! [`crate::outcome`]); stage and step bookkeeping happen inside the script
//! so a thrown error can be attributed precisely.

use std::process::{Command, Stdio};
use std::time::Duration;
use tokio::process::Command as TokioCommand;
use tracing::debug;

use crate::error::{HarnessError, HarnessResult};
use crate::locator::js_string;
use crate::outcome::{self, RunOutcome, RESULT_MARKER};
use crate::step::{Action, SyncStrategy, DEFAULT_STEP_TIMEOUT_MS};

/// Browser engine to drive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }

    /// Parse a browser name, defaulting to chromium.
    pub fn parse(name: &str) -> Self {
        match name {
            "firefox" => Browser::Firefox,
            "webkit" => Browser::Webkit,
            _ => Browser::Chromium,
        }
    }
}

/// Browser configuration for script runs.
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    pub browser: Browser,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            browser: Browser::Chromium,
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
        }
    }
}

/// Compiles page steps into Playwright scripts and runs them under `node`.
pub struct PageDriver {
    frontend_url: String,
    config: BrowserConfig,
    scenario_timeout: Duration,
}

impl PageDriver {
    pub fn new(frontend_url: String, config: BrowserConfig, scenario_timeout: Duration) -> Self {
        Self {
            frontend_url,
            config,
            scenario_timeout,
        }
    }

    /// Check that the Playwright toolchain is installed.
    pub fn check_playwright_installed() -> HarnessResult<()> {
        let output = Command::new("npx")
            .args(["playwright", "--version"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match output {
            Ok(status) if status.success() => Ok(()),
            _ => Err(HarnessError::PlaywrightNotFound),
        }
    }

    /// Build the Playwright script for one scenario's page steps.
    pub fn build_script(&self, steps: &[Action]) -> HarnessResult<String> {
        let mut script = String::new();

        script.push_str(&format!(
            r#"const {{ chromium, firefox, webkit }} = require('playwright');
const {{ expect }} = require('@playwright/test');

(async () => {{
  const browser = await {browser}.launch({{ headless: {headless} }});
  const context = await browser.newContext({{
    viewport: {{ width: {width}, height: {height} }}
  }});
  const page = await context.newPage();
  const baseUrl = '{base_url}';
  const captured = {{}};
  const fallbacks = [];
  let stage = 'navigation';
  let step = '';
  let stepStartedAt = Date.now();

  try {{
"#,
            browser = self.config.browser.as_str(),
            headless = self.config.headless,
            width = self.config.viewport_width,
            height = self.config.viewport_height,
            base_url = js_string(&self.frontend_url),
        ));

        for (i, action) in steps.iter().enumerate() {
            if action.is_backend() {
                return Err(HarnessError::InvalidScenario {
                    name: action.name(),
                    reason: "backend action reached the script builder".to_string(),
                });
            }
            script.push_str(&format!("\n    // step {}: {}\n", i + 1, action.name()));
            script.push_str(&format!(
                "    stage = '{}'; step = '{}'; stepStartedAt = Date.now();\n",
                action.stage(),
                js_string(&action.name()),
            ));
            script.push_str(&self.action_to_js(action, i));
        }

        script.push_str(&format!(
            r#"
    console.log('{marker} ' + JSON.stringify({{ outcome: 'passed', captured, fallbacks }}));
  }} catch (error) {{
    const timedOut = error.name === 'TimeoutError' || /[Tt]imed out/.test(String(error.message || ''));
    const matcher = error.matcherResult
      ? {{ expected: String(error.matcherResult.expected), actual: String(error.matcherResult.actual) }}
      : null;
    console.log('{marker} ' + JSON.stringify({{
      outcome: 'failed',
      timed_out: timedOut,
      stage,
      step,
      message: String(error.message || error),
      elapsed_ms: Date.now() - stepStartedAt,
      matcher,
      captured,
      fallbacks,
    }}));
    process.exitCode = 1;
  }} finally {{
    await browser.close();
  }}
}})();
"#,
            marker = RESULT_MARKER,
        ));

        Ok(script)
    }

    /// Convert one page action to script statements.
    fn action_to_js(&self, action: &Action, index: usize) -> String {
        match action {
            Action::Goto { path } => {
                format!("    await page.goto(baseUrl + '{}');\n", js_string(path))
            }

            Action::Fill { locator, value } => format!(
                "    await {}.fill('{}');\n",
                locator.to_js(),
                js_string(value)
            ),

            Action::Click {
                locator,
                sync,
                timeout_ms,
            } => {
                let timeout = timeout_ms.unwrap_or(DEFAULT_STEP_TIMEOUT_MS);
                let click = format!(
                    "    await {}.click({{ timeout: {} }});\n",
                    locator.to_js(),
                    timeout
                );

                match sync {
                    None => click,

                    Some(SyncStrategy::NetworkResponse {
                        url_contains,
                        status,
                        ui_fallback,
                        timeout_ms,
                    }) => {
                        let sync_timeout = timeout_ms.unwrap_or(DEFAULT_STEP_TIMEOUT_MS);
                        let status_check = match status {
                            Some(code) => format!("r.status() === {code}"),
                            None => "r.ok()".to_string(),
                        };
                        // The response wait is armed before the click so a
                        // fast response cannot slip past unobserved.
                        let arm = format!(
                            "    const response{index} = page.waitForResponse(r => r.url().includes('{}') && {status_check}, {{ timeout: {sync_timeout} }});\n",
                            js_string(url_contains),
                        );
                        let settle = if *ui_fallback {
                            format!(
                                "    try {{\n      await response{index};\n    }} catch (error) {{\n      if (error.name !== 'TimeoutError') {{ throw error; }}\n      fallbacks.push(step);\n    }}\n"
                            )
                        } else {
                            format!("    await response{index};\n")
                        };
                        format!("{arm}{click}{settle}")
                    }

                    Some(SyncStrategy::UiVisible {
                        locator: wait_for,
                        timeout_ms,
                    }) => {
                        let sync_timeout = timeout_ms.unwrap_or(DEFAULT_STEP_TIMEOUT_MS);
                        format!(
                            "{click}    await {}.waitFor({{ state: 'visible', timeout: {sync_timeout} }});\n",
                            wait_for.to_js()
                        )
                    }

                    Some(SyncStrategy::Reload {
                        wait_for,
                        timeout_ms,
                    }) => {
                        let sync_timeout = timeout_ms.unwrap_or(DEFAULT_STEP_TIMEOUT_MS);
                        format!(
                            "{click}    await page.reload();\n    await {}.waitFor({{ state: 'visible', timeout: {sync_timeout} }});\n",
                            wait_for.to_js()
                        )
                    }
                }
            }

            Action::ExpectVisible {
                locator,
                timeout_ms,
            } => {
                let timeout = timeout_ms.unwrap_or(DEFAULT_STEP_TIMEOUT_MS);
                format!(
                    "    await expect({}).toBeVisible({{ timeout: {} }});\n",
                    locator.to_js(),
                    timeout
                )
            }

            Action::ExpectText {
                locator,
                text,
                timeout_ms,
            } => {
                let timeout = timeout_ms.unwrap_or(DEFAULT_STEP_TIMEOUT_MS);
                format!(
                    "    await expect({}).toHaveText('{}', {{ timeout: {} }});\n",
                    locator.to_js(),
                    js_string(text),
                    timeout
                )
            }

            Action::CaptureText { locator, slot } => format!(
                "    captured['{}'] = await {}.innerText();\n",
                js_string(slot),
                locator.to_js()
            ),

            Action::ExpectTextFlipped {
                locator,
                slot,
                pair,
                timeout_ms,
            } => {
                let timeout = timeout_ms.unwrap_or(DEFAULT_STEP_TIMEOUT_MS);
                format!(
                    "    await expect({}).toHaveText(captured['{}'] === '{}' ? '{}' : '{}', {{ timeout: {} }});\n",
                    locator.to_js(),
                    js_string(slot),
                    js_string(&pair[0]),
                    js_string(&pair[1]),
                    js_string(&pair[0]),
                    timeout
                )
            }

            Action::Reset | Action::CreateUser { .. } => {
                unreachable!("backend actions are rejected by build_script")
            }
        }
    }

    /// Run a scenario's page steps under `node`, bounded by the scenario
    /// deadline, and parse the structured outcome.
    pub async fn run(&self, steps: &[Action]) -> HarnessResult<RunOutcome> {
        let script = self.build_script(steps)?;

        let dir = tempfile::tempdir()?;
        let script_path = dir.path().join("scenario.js");
        std::fs::write(&script_path, &script)?;

        debug!(script = %script_path.display(), "running scenario script");

        let mut cmd = TokioCommand::new("node");
        cmd.arg(&script_path)
            .current_dir(dir.path())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.scenario_timeout, cmd.output()).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(HarnessError::Timeout {
                    condition: "scenario deadline".to_string(),
                    elapsed_ms: self.scenario_timeout.as_millis() as u64,
                })
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        match outcome::parse_report(&stdout) {
            Ok(report) => Ok(outcome::into_outcome(report)),
            Err(_) if !output.status.success() => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(HarnessError::Script(format!(
                    "script crashed without reporting:\nstdout: {stdout}\nstderr: {stderr}"
                )))
            }
            Err(e) => Err(e),
        }
    }
}
