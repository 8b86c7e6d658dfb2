//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use connectrix_config::ConfigError;
use connectrix_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Session ──────────────────────────────────────────────────────
    #[error("Not signed in")]
    #[diagnostic(
        code(connectrix::not_signed_in),
        help("Sign in with: connectrix login --email <EMAIL> --role <ROLE>")
    )]
    NotSignedIn,

    #[error("This command requires the {required} role")]
    #[diagnostic(
        code(connectrix::unauthorized),
        help("You are signed in as {current}. Sign in with an {required} account to continue.")
    )]
    WrongRole { required: String, current: String },

    #[error("Authentication failed: {message}")]
    #[diagnostic(code(connectrix::auth_failed), help("Check the email, password, and role."))]
    AuthFailed { message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("client '{identifier}' not found")]
    #[diagnostic(
        code(connectrix::not_found),
        help("Run: connectrix clients list to see available clients")
    )]
    NotFound { identifier: String },

    #[error("No clients selected")]
    #[diagnostic(
        code(connectrix::nothing_selected),
        help("Pass client IDs, or --all-visible with a filter that matches something.")
    )]
    NothingSelected,

    // ── Service ──────────────────────────────────────────────────────
    #[error("{service} unavailable: {reason}")]
    #[diagnostic(code(connectrix::service))]
    ServiceUnavailable { service: String, reason: String },

    #[error("{operation} timed out after {seconds}s")]
    #[diagnostic(
        code(connectrix::timeout),
        help("Increase timeout with --timeout or `defaults.timeout` in the config file.")
    )]
    Timeout { operation: String, seconds: u64 },

    /// An action already reported its failure through a notification.
    #[error("{message}")]
    #[diagnostic(code(connectrix::action_failed))]
    ActionFailed { message: String, exit: i32 },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(connectrix::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(connectrix::config),
        help("Inspect the file with: connectrix config show")
    )]
    Config(#[from] ConfigError),

    #[error("Session could not be persisted: {message}")]
    #[diagnostic(code(connectrix::session_store))]
    Persistence { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(connectrix::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(connectrix::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotSignedIn | Self::AuthFailed { .. } => exit_code::AUTH,
            Self::WrongRole { .. } => exit_code::PERMISSION,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::NothingSelected => exit_code::CONFLICT,
            Self::ServiceUnavailable { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            Self::ActionFailed { exit, .. } => *exit,
            Self::Config(_) | Self::Persistence { .. } | Self::Io(_) | Self::Internal(_) => {
                exit_code::GENERAL
            }
        }
    }

    /// Whether the user has already seen this failure as a notification.
    pub fn is_reported(&self) -> bool {
        matches!(self, Self::ActionFailed { .. })
    }

    /// Wrap a failure that a notification already announced, keeping the
    /// exit code its underlying error would have produced.
    pub fn reported(err: CoreError) -> Self {
        let message = err.to_string();
        let exit = Self::from(err).exit_code();
        Self::ActionFailed { message, exit }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ValidationFailed { message } => Self::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::ServiceUnavailable { service, reason } => {
                Self::ServiceUnavailable { service, reason }
            }
            CoreError::Timeout {
                operation,
                timeout_secs,
            } => Self::Timeout {
                operation,
                seconds: timeout_secs,
            },
            CoreError::ClientNotFound { identifier } => Self::NotFound { identifier },
            CoreError::AuthenticationFailed { message } => Self::AuthFailed { message },
            CoreError::Persistence { message } => Self::Persistence { message },
            CoreError::Unauthorized { message } => Self::WrongRole {
                required: message,
                current: "unknown".into(),
            },
            CoreError::NothingSelected => Self::NothingSelected,
            CoreError::Internal(message) => Self::Internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_keep_their_exit_codes() {
        let timeout = CoreError::Timeout {
            operation: "Disconnect".into(),
            timeout_secs: 10,
        };
        assert_eq!(CliError::from(timeout).exit_code(), exit_code::TIMEOUT);
        assert_eq!(
            CliError::from(CoreError::NothingSelected).exit_code(),
            exit_code::CONFLICT
        );
    }

    #[test]
    fn reported_errors_are_not_printed_twice() {
        let err = CliError::reported(CoreError::ClientNotFound {
            identifier: "42".into(),
        });
        assert!(err.is_reported());
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
    }
}
