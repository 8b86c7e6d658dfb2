//! Shared helpers for command handlers.

use std::future::Future;
use std::io::IsTerminal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

use connectrix_core::{
    ActionOutcome, ClientId, ConfirmationPrompt, Notification, NotificationSink, Severity,
};

use crate::error::CliError;

// ── Confirmation ────────────────────────────────────────────────────

/// Asks on the terminal, auto-approving when `--yes` was passed.
///
/// Without a terminal and without `--yes` the answer is "no"; the handler
/// turns that into [`CliError::NonInteractiveRequiresYes`].
#[derive(Debug)]
pub struct DialoguerPrompt {
    yes: bool,
    refused: AtomicBool,
}

impl DialoguerPrompt {
    pub fn new(yes: bool) -> Self {
        Self {
            yes,
            refused: AtomicBool::new(false),
        }
    }

    /// A question was dropped because no one could answer it.
    pub fn refused_noninteractive(&self) -> bool {
        self.refused.load(Ordering::Relaxed)
    }
}

impl ConfirmationPrompt for DialoguerPrompt {
    fn confirm(&self, message: &str) -> bool {
        if self.yes {
            return true;
        }
        if !std::io::stdin().is_terminal() {
            self.refused.store(true, Ordering::Relaxed);
            return false;
        }
        dialoguer::Confirm::new()
            .with_prompt(message)
            .default(false)
            .interact()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "confirmation prompt failed");
                false
            })
    }
}

// ── Notifications ───────────────────────────────────────────────────

/// Prints notifications to stderr as they are raised. Quiet mode hides
/// success and info messages but never warnings or errors.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleSink {
    color: bool,
    quiet: bool,
}

impl ConsoleSink {
    pub fn new(color: bool, quiet: bool) -> Self {
        Self { color, quiet }
    }

    fn render(&self, notification: &Notification) -> String {
        let (mark, message) = (marker(notification.severity), &notification.message);
        if !self.color {
            return format!("{mark} {message}");
        }
        match notification.severity {
            Severity::Success => format!("{} {message}", mark.green()),
            Severity::Error => format!("{} {}", mark.red(), message.red()),
            Severity::Warning => format!("{} {message}", mark.yellow()),
            Severity::Info => format!("{} {message}", mark.blue()),
        }
    }
}

fn marker(severity: Severity) -> &'static str {
    match severity {
        Severity::Success => "✓",
        Severity::Error => "✗",
        Severity::Warning => "!",
        Severity::Info => "i",
    }
}

impl NotificationSink for ConsoleSink {
    fn notify(&self, notification: Notification) {
        let audible = matches!(notification.severity, Severity::Error | Severity::Warning);
        if self.quiet && !audible {
            return;
        }
        eprintln!("{}", self.render(&notification));
    }
}

// ── Outcomes ────────────────────────────────────────────────────────

/// Turn an action outcome into the handler's result. Failures were
/// already announced by a notification, so they come back as
/// [`CliError::ActionFailed`].
pub fn settle<T>(
    outcome: ActionOutcome<T>,
    prompt: &DialoguerPrompt,
    action: &str,
) -> Result<Option<T>, CliError> {
    match outcome {
        ActionOutcome::Completed(value) => Ok(Some(value)),
        ActionOutcome::Skipped => Ok(None),
        ActionOutcome::Declined if prompt.refused_noninteractive() => {
            Err(CliError::NonInteractiveRequiresYes {
                action: action.into(),
            })
        }
        ActionOutcome::Declined => {
            tracing::info!(action, "cancelled at confirmation");
            Ok(None)
        }
        ActionOutcome::NothingSelected => Err(CliError::reported(
            connectrix_core::CoreError::NothingSelected,
        )),
        ActionOutcome::Failed(e) => Err(CliError::reported(e)),
    }
}

// ── Progress ────────────────────────────────────────────────────────

/// Run `fut` under a stderr spinner when stderr is a terminal.
pub async fn with_spinner<F: Future>(message: &str, quiet: bool, fut: F) -> F::Output {
    if quiet || !std::io::stderr().is_terminal() {
        return fut.await;
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message.to_owned());
    bar.enable_steady_tick(Duration::from_millis(80));
    let out = fut.await;
    bar.finish_and_clear();
    out
}

// ── Parsing ─────────────────────────────────────────────────────────

pub fn client_ids(raw: &[String]) -> Vec<ClientId> {
    raw.iter()
        .map(|s| ClientId::new(s.trim()))
        .filter(|id| !id.as_str().is_empty())
        .collect()
}

pub fn parse_date(field: &str, raw: &str) -> Result<chrono::NaiveDate, CliError> {
    chrono::NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| CliError::Validation {
        field: field.into(),
        reason: format!("expected YYYY-MM-DD: {e}"),
    })
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}
