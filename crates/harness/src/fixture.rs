//! Backend fixture client
//!
//! Before every scenario the backend is reset and reseeded over HTTP. Both
//! calls must succeed before navigation proceeds; either failing aborts the
//! scenario with a setup error naming the call. The reset wipes shared
//! persistent state, so running scenarios in parallel against one backend
//! instance is unsafe and the runner never does it.

use std::time::Duration;

use notewright_common::TestUser;
use tracing::debug;

use crate::error::{HarnessError, HarnessResult};
use crate::step::Action;

/// Backend connection configuration.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the backend under test.
    pub base_url: String,

    /// Per-request timeout for fixture calls.
    pub request_timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: notewright_common::default_backend_url(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// HTTP client for the backend's testing endpoints.
pub struct BackendClient {
    http: reqwest::Client,
    config: BackendConfig,
}

impl BackendClient {
    pub fn new(config: BackendConfig) -> HarnessResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { http, config })
    }

    /// Wipe all note and user state. Idempotent on the backend side.
    pub async fn reset(&self) -> HarnessResult<()> {
        self.post_expecting_success("/api/testing/reset", None).await
    }

    /// Seed a user with the given credentials.
    pub async fn create_user(&self, user: &TestUser) -> HarnessResult<()> {
        let body = serde_json::to_value(user)?;
        self.post_expecting_success("/api/users", Some(body)).await
    }

    /// Execute one backend action.
    pub async fn run(&self, action: &Action) -> HarnessResult<()> {
        match action {
            Action::Reset => self.reset().await,
            Action::CreateUser { user } => self.create_user(user).await,
            other => Err(HarnessError::InvalidScenario {
                name: other.name(),
                reason: "page action routed to the backend client".to_string(),
            }),
        }
    }

    async fn post_expecting_success(
        &self,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> HarnessResult<()> {
        let call = format!("POST {path}");
        let url = format!("{}{path}", self.config.base_url);

        let mut request = self.http.post(&url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| HarnessError::Setup {
            call: call.clone(),
            detail: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(HarnessError::Setup {
                call,
                detail: format!("status {status}"),
            });
        }

        debug!(%call, %status, "fixture call succeeded");
        Ok(())
    }
}
