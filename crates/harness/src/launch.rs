//! App-under-test lifecycle
//!
//! The harness does not implement the note application; it can, however,
//! spawn the real frontend and backend from configured commands, wait for
//! them to answer health probes, and shut them down when the run ends.
//! Startup waiting is a bounded poll against the health URL, never a fixed
//! delay.

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use tracing::info;

use crate::error::{HarnessError, HarnessResult};
use crate::sync::wait_until;

/// How to start and probe one app process.
#[derive(Debug, Clone)]
pub struct AppProcessConfig {
    /// Label used in logs and errors ("backend", "frontend").
    pub name: String,

    pub command: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub cwd: Option<PathBuf>,

    /// URL polled until it answers with a success status.
    pub health_url: String,

    /// Deadline for the process to become healthy.
    pub startup_timeout: Duration,
}

/// Handle to a running app process.
pub struct AppHandle {
    child: Child,
    name: String,
}

impl AppHandle {
    /// Spawn the process and wait for it to become healthy.
    pub async fn spawn(config: AppProcessConfig) -> HarnessResult<Self> {
        info!(app = %config.name, command = %config.command, "spawning app under test");

        let mut cmd = Command::new(&config.command);
        cmd.args(&config.args).stdout(Stdio::piped()).stderr(Stdio::piped());
        for (key, value) in &config.env {
            cmd.env(key, value);
        }
        if let Some(cwd) = &config.cwd {
            cmd.current_dir(cwd);
        }

        let child = cmd.spawn().map_err(|e| {
            HarnessError::AppStartup(format!(
                "failed to spawn {} ({}): {e}",
                config.name, config.command
            ))
        })?;

        let handle = Self {
            child,
            name: config.name.clone(),
        };

        handle.wait_for_healthy(&config).await?;
        info!(app = %config.name, url = %config.health_url, "app is healthy");
        Ok(handle)
    }

    async fn wait_for_healthy(&self, config: &AppProcessConfig) -> HarnessResult<()> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;

        let condition = format!("{} healthy at {}", config.name, config.health_url);
        let url = config.health_url.clone();

        wait_until(
            &condition,
            config.startup_timeout,
            Duration::from_millis(100),
            move || {
                let client = client.clone();
                let url = url.clone();
                async move {
                    matches!(client.get(&url).send().await, Ok(resp) if resp.status().is_success())
                }
            },
        )
        .await
    }

    /// Stop the process, SIGTERM first, then kill.
    pub fn stop(&mut self) -> HarnessResult<()> {
        info!(app = %self.name, pid = self.child.id(), "stopping app under test");

        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            let pid = Pid::from_raw(self.child.id() as i32);
            if kill(pid, Signal::SIGTERM).is_ok() {
                // Grace period before the hard kill
                std::thread::sleep(Duration::from_millis(500));
            }
        }

        let _ = self.child.kill();
        let _ = self.child.wait();

        Ok(())
    }
}

impl Drop for AppHandle {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_binary_is_a_startup_error() {
        let config = AppProcessConfig {
            name: "backend".to_string(),
            command: "definitely-not-an-installed-binary".to_string(),
            args: vec![],
            env: vec![],
            cwd: None,
            health_url: "http://127.0.0.1:1/health".to_string(),
            startup_timeout: Duration::from_millis(100),
        };

        match AppHandle::spawn(config).await {
            Err(HarnessError::AppStartup(msg)) => assert!(msg.contains("backend")),
            Err(other) => panic!("unexpected error: {other:?}"),
            Ok(_) => panic!("spawn unexpectedly succeeded"),
        }
    }

    #[tokio::test]
    async fn unhealthy_process_times_out_and_is_stopped() {
        let config = AppProcessConfig {
            name: "frontend".to_string(),
            command: "sleep".to_string(),
            args: vec!["5".to_string()],
            env: vec![],
            cwd: None,
            // Nothing listens here
            health_url: "http://127.0.0.1:1/health".to_string(),
            startup_timeout: Duration::from_millis(200),
        };

        match AppHandle::spawn(config).await {
            Err(HarnessError::Timeout { condition, .. }) => {
                assert!(condition.contains("frontend"));
            }
            Err(other) => panic!("unexpected error: {other:?}"),
            Ok(_) => panic!("spawn unexpectedly succeeded"),
        }
    }
}
