// ── User-facing notifications ──
//
// Fire-and-forget messages raised by the roster controller and access
// guard. A sink never reports failure back to the caller.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::time::Instant;

/// How long a toast stays up unless dismissed.
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
}

impl Notification {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Severity::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }
}

pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

// ── ToastQueue ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub notification: Notification,
    pub raised_at: Instant,
    pub duration: Duration,
}

impl Toast {
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.raised_at) >= self.duration
    }
}

/// Observable queue of on-screen toasts.
///
/// Toasts stay queued until [`dismiss`](Self::dismiss)ed or pruned by
/// [`expire`](Self::expire); the queue never ages them out on its own.
pub struct ToastQueue {
    duration: Duration,
    next_id: AtomicU64,
    toasts: watch::Sender<Vec<Toast>>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::with_duration(DEFAULT_TOAST_DURATION)
    }

    pub fn with_duration(duration: Duration) -> Self {
        let (toasts, _) = watch::channel(Vec::new());
        Self {
            duration,
            next_id: AtomicU64::new(1),
            toasts,
        }
    }

    /// Current toasts, oldest first.
    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.borrow().clone()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.toasts
            .borrow()
            .iter()
            .map(|t| t.notification.clone())
            .collect()
    }

    /// Number of queued toasts at `severity`.
    pub fn count(&self, severity: Severity) -> usize {
        self.toasts
            .borrow()
            .iter()
            .filter(|t| t.notification.severity == severity)
            .count()
    }

    /// Remove a toast by id. Returns whether it was present.
    pub fn dismiss(&self, id: u64) -> bool {
        let mut removed = false;
        self.toasts.send_if_modified(|toasts| {
            let before = toasts.len();
            toasts.retain(|t| t.id != id);
            removed = toasts.len() != before;
            removed
        });
        removed
    }

    /// Drop every toast whose display time has run out. Returns how many
    /// were removed.
    pub fn expire(&self) -> usize {
        let now = Instant::now();
        let mut pruned = 0;
        self.toasts.send_if_modified(|toasts| {
            let before = toasts.len();
            toasts.retain(|t| !t.is_expired(now));
            pruned = before - toasts.len();
            pruned > 0
        });
        pruned
    }

    pub fn clear(&self) {
        self.toasts.send_modify(Vec::clear);
    }

    /// Change notifications fire on every push, dismiss and expiry.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Toast>> {
        self.toasts.subscribe()
    }
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSink for ToastQueue {
    fn notify(&self, notification: Notification) {
        let toast = Toast {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            notification,
            raised_at: Instant::now(),
            duration: self.duration,
        };
        self.toasts.send_modify(|toasts| toasts.push(toast));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test(start_paused = true)]
    async fn toasts_expire_after_their_duration() {
        let queue = ToastQueue::new();
        queue.notify(Notification::success("Client disconnected successfully"));
        tokio::time::advance(Duration::from_secs(2)).await;
        queue.notify(Notification::error("Failed to send reminder"));

        tokio::time::advance(Duration::from_secs(3)).await;
        assert_eq!(queue.expire(), 1);
        assert_eq!(
            queue.notifications(),
            vec![Notification::error("Failed to send reminder")]
        );

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(queue.expire(), 1);
        assert!(queue.toasts().is_empty());
    }

    #[test]
    fn dismiss_removes_by_id() {
        let queue = ToastQueue::new();
        queue.notify(Notification::info("one"));
        queue.notify(Notification::warning("two"));
        let first = queue.toasts()[0].id;

        assert!(queue.dismiss(first));
        assert!(!queue.dismiss(first));
        assert_eq!(queue.count(Severity::Warning), 1);
        assert_eq!(queue.count(Severity::Info), 0);
    }

    #[test]
    fn ids_are_unique_and_increasing() {
        let queue = ToastQueue::new();
        for _ in 0..3 {
            queue.notify(Notification::info("tick"));
        }
        let ids: Vec<u64> = queue.toasts().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn severity_names() {
        assert_eq!(Severity::Warning.to_string(), "warning");
    }
}
