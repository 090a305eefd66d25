//! Bounded waiting
//!
//! Rust-side waits follow the same rule as the in-script ones: poll an
//! observable condition under an explicit deadline, never sleep for a fixed
//! duration and hope. On expiry the caller gets a timeout error carrying the
//! condition description and the elapsed time.

use std::future::Future;
use std::time::{Duration, Instant};

use tokio::time::sleep;

use crate::error::{HarnessError, HarnessResult};

/// Poll `probe` every `interval` until it returns true or `deadline` passes.
pub async fn wait_until<F, Fut>(
    condition: &str,
    deadline: Duration,
    interval: Duration,
    mut probe: F,
) -> HarnessResult<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let start = Instant::now();
    loop {
        if probe().await {
            return Ok(());
        }
        if start.elapsed() >= deadline {
            return Err(HarnessError::Timeout {
                condition: condition.to_string(),
                elapsed_ms: start.elapsed().as_millis() as u64,
            });
        }
        sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn resolves_once_the_condition_holds() {
        let polls = AtomicU32::new(0);
        let result = wait_until(
            "counter reaches three",
            Duration::from_secs(2),
            Duration::from_millis(5),
            || {
                let n = polls.fetch_add(1, Ordering::SeqCst);
                async move { n >= 2 }
            },
        )
        .await;
        assert!(result.is_ok());
        assert!(polls.load(Ordering::SeqCst) >= 3);
    }

    #[tokio::test]
    async fn expiry_reports_condition_and_elapsed() {
        let result = wait_until(
            "backend healthy",
            Duration::from_millis(30),
            Duration::from_millis(5),
            || async { false },
        )
        .await;
        match result.unwrap_err() {
            HarnessError::Timeout {
                condition,
                elapsed_ms,
            } => {
                assert_eq!(condition, "backend healthy");
                assert!(elapsed_ms >= 30);
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }
}
