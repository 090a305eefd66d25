//! notewright - E2E scenario runner entry point
//!
//! Runs the built-in note-app suite (or YAML suites from a directory)
//! against a running frontend and backend, optionally launching both first.
//! Exit codes: 0 all scenarios passed, 1 some failed, 2 harness error.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod output;

use notewright_common::TestUser;
use notewright_harness::launch::{AppHandle, AppProcessConfig};
use notewright_harness::{
    flows, BackendConfig, Browser, BrowserConfig, PageDriver, RunnerConfig, Suite, SuiteRunner,
};

#[derive(Parser, Debug)]
#[command(name = "notewright")]
#[command(about = "End-to-end scenario runner for the notes application")]
struct Args {
    /// Frontend base URL
    #[arg(long, default_value = "http://localhost:5173")]
    frontend_url: String,

    /// Backend base URL
    #[arg(long, default_value = "http://localhost:3001")]
    backend_url: String,

    /// Directory of YAML suites to run instead of the built-in suite
    #[arg(short, long)]
    specs: Option<PathBuf>,

    /// Run only the scenario with this name
    #[arg(short, long)]
    name: Option<String>,

    /// Run only scenarios carrying this tag
    #[arg(short, long)]
    tag: Option<String>,

    /// Browser to drive (chromium, firefox, webkit)
    #[arg(long, default_value = "chromium")]
    browser: String,

    /// Run with a visible browser window
    #[arg(long)]
    headed: bool,

    /// Whole-scenario deadline in seconds
    #[arg(long, default_value = "60")]
    scenario_timeout: u64,

    /// Display name of the seeded user
    #[arg(long, default_value = "Matti Luukkainen")]
    user_name: String,

    /// Username of the seeded user
    #[arg(long, default_value = "mluukkai")]
    username: String,

    /// Password of the seeded user
    #[arg(long, default_value = "salainen")]
    password: String,

    /// Command to launch the backend before running, e.g. "npm run start:test"
    #[arg(long)]
    launch_backend: Option<String>,

    /// Command to launch the frontend before running, e.g. "npm run dev"
    #[arg(long)]
    launch_frontend: Option<String>,

    /// Seconds to wait for launched apps to become healthy
    #[arg(long, default_value = "30")]
    app_startup_timeout: u64,

    /// Output directory for the results file
    #[arg(short, long, default_value = "test-results")]
    output: PathBuf,

    /// Report format
    #[arg(long, default_value = "table")]
    format: output::OutputFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    match rt.block_on(async_main(args)) {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(2);
        }
    }
}

async fn async_main(args: Args) -> anyhow::Result<bool> {
    PageDriver::check_playwright_installed()?;

    // Launched apps stop on drop at the end of this function.
    let mut apps = Vec::new();
    let startup_timeout = Duration::from_secs(args.app_startup_timeout);
    if let Some(command) = &args.launch_backend {
        let health_url = format!("{}/api/notes", args.backend_url);
        apps.push(AppHandle::spawn(app_config("backend", command, health_url, startup_timeout)?).await?);
    }
    if let Some(command) = &args.launch_frontend {
        let health_url = args.frontend_url.clone();
        apps.push(AppHandle::spawn(app_config("frontend", command, health_url, startup_timeout)?).await?);
    }

    let user = TestUser::new(
        args.user_name.as_str(),
        args.username.as_str(),
        args.password.as_str(),
    );

    let suites = match &args.specs {
        Some(dir) => {
            let suites = Suite::load_all(dir)
                .with_context(|| format!("loading suites from {}", dir.display()))?;
            anyhow::ensure!(!suites.is_empty(), "no suite files under {}", dir.display());
            suites
        }
        None => vec![flows::note_app_suite_for(&user)],
    };

    let mut plans = Vec::new();
    for suite in &suites {
        plans.extend(suite.plan()?);
    }
    if let Some(tag) = &args.tag {
        plans.retain(|p| p.has_tag(tag));
    }
    if let Some(name) = &args.name {
        let suffix = format!(":: {name}");
        plans.retain(|p| &p.full_name == name || p.full_name.ends_with(&suffix));
        anyhow::ensure!(!plans.is_empty(), "scenario not found: {name}");
    }

    let runner = SuiteRunner::new(RunnerConfig {
        frontend_url: args.frontend_url.clone(),
        backend: BackendConfig {
            base_url: args.backend_url.clone(),
            ..Default::default()
        },
        browser: BrowserConfig {
            browser: Browser::parse(&args.browser),
            headless: !args.headed,
            ..Default::default()
        },
        scenario_timeout: Duration::from_secs(args.scenario_timeout),
        output_dir: args.output.clone(),
    })?;

    let report = runner.run_plans(&plans).await;
    runner.write_results(&report)?;
    output::print_report(&report, args.format);

    Ok(report.failed == 0)
}

fn app_config(
    name: &str,
    command: &str,
    health_url: String,
    startup_timeout: Duration,
) -> anyhow::Result<AppProcessConfig> {
    let mut parts = command.split_whitespace();
    let program = parts
        .next()
        .with_context(|| format!("empty launch command for {name}"))?;

    Ok(AppProcessConfig {
        name: name.to_string(),
        command: program.to_string(),
        args: parts.map(String::from).collect(),
        env: Vec::new(),
        cwd: None,
        health_url,
        startup_timeout,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_the_local_dev_setup() {
        let args = Args::parse_from(["notewright"]);
        assert_eq!(args.frontend_url, "http://localhost:5173");
        assert_eq!(args.backend_url, "http://localhost:3001");
        assert_eq!(args.username, "mluukkai");
        assert!(!args.headed);
    }

    #[test]
    fn launch_command_splits_into_program_and_args() {
        let config = app_config(
            "backend",
            "npm run start:test",
            "http://localhost:3001/api/notes".to_string(),
            Duration::from_secs(30),
        )
        .unwrap();
        assert_eq!(config.command, "npm");
        assert_eq!(config.args, vec!["run", "start:test"]);
    }

    #[test]
    fn empty_launch_command_is_rejected() {
        assert!(app_config("backend", "  ", "url".to_string(), Duration::from_secs(1)).is_err());
    }
}
