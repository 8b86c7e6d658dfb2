// ── Runtime service configuration ──
//
// These values tune how the core talks to its collaborators. They never
// touch disk: the CLI (or any other front end) builds a `ServiceConfig`
// from its own configuration layer and hands it in.

use std::time::Duration;

/// Default upper bound on any single external call.
pub const DEFAULT_ACTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Tuning for calls against the Client Records and Identity services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Upper bound on a single external call. `Duration::ZERO` disables it.
    pub action_timeout: Duration,
    /// Simulated latency of the in-memory `list` call.
    pub list_latency: Duration,
    /// Simulated latency of every other in-memory call.
    pub action_latency: Duration,
}

impl ServiceConfig {
    /// No simulated latency; useful for scripted front ends and tests.
    pub fn instant() -> Self {
        Self {
            action_timeout: DEFAULT_ACTION_TIMEOUT,
            list_latency: Duration::ZERO,
            action_latency: Duration::ZERO,
        }
    }

    /// Override both simulated latencies with a single value.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.list_latency = latency;
        self.action_latency = latency;
        self
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            action_timeout: DEFAULT_ACTION_TIMEOUT,
            list_latency: Duration::from_millis(500),
            action_latency: Duration::from_millis(300),
        }
    }
}

/// Await `fut`, failing with [`CoreError::Timeout`](crate::CoreError::Timeout)
/// once `limit` elapses. A zero limit waits indefinitely.
pub(crate) async fn bounded<T, F>(
    operation: &str,
    limit: Duration,
    fut: F,
) -> Result<T, crate::CoreError>
where
    F: std::future::Future<Output = Result<T, crate::CoreError>>,
{
    if limit.is_zero() {
        return fut.await;
    }
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(crate::CoreError::Timeout {
            operation: operation.into(),
            timeout_secs: whole_secs(limit),
        }),
    }
}

/// Seconds rounded up, so a sub-second limit never reads as zero.
fn whole_secs(limit: Duration) -> u64 {
    limit.as_secs() + u64::from(limit.subsec_nanos() > 0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn sub_second_timeout_reports_a_whole_second() {
        let stalled = std::future::pending::<Result<(), crate::CoreError>>();
        let err = bounded("Loading clients", Duration::from_millis(250), stalled)
            .await
            .unwrap_err();
        match err {
            crate::CoreError::Timeout { timeout_secs, .. } => assert_eq!(timeout_secs, 1),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[test]
    fn whole_seconds_are_unchanged() {
        assert_eq!(whole_secs(Duration::from_secs(10)), 10);
        assert_eq!(whole_secs(Duration::ZERO), 0);
    }
}
