// ── Core error types ──
//
// User-facing errors from connectrix-core. Collaborator failures arrive
// here already translated -- consumers never see how a mock or a real
// backend reported the problem, only which of the four failure classes
// it belongs to.

use thiserror::Error;

/// How a failure is presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Input rejected before any external call.
    Validation,
    /// An external collaborator failed or timed out.
    ServiceFailure,
    /// Role mismatch or missing session -- handled as a redirect.
    AuthorizationDenied,
    /// The request conflicts with current local state (e.g. empty selection).
    StateConflict,
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Validation ───────────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Service failures ─────────────────────────────────────────────
    #[error("{service} unavailable: {reason}")]
    ServiceUnavailable { service: String, reason: String },

    #[error("{operation} timed out after {timeout_secs}s")]
    Timeout { operation: String, timeout_secs: u64 },

    #[error("Client not found: {identifier}")]
    ClientNotFound { identifier: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Session could not be persisted: {message}")]
    Persistence { message: String },

    // ── Access ───────────────────────────────────────────────────────
    #[error("Access denied: {message}")]
    Unauthorized { message: String },

    // ── State conflicts ──────────────────────────────────────────────
    #[error("No clients selected")]
    NothingSelected,

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Classify this error for notification and exit-code purposes.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ValidationFailed { .. } => ErrorKind::Validation,
            Self::Unauthorized { .. } => ErrorKind::AuthorizationDenied,
            Self::NothingSelected => ErrorKind::StateConflict,
            Self::ServiceUnavailable { .. }
            | Self::Timeout { .. }
            | Self::ClientNotFound { .. }
            | Self::AuthenticationFailed { .. }
            | Self::Persistence { .. }
            | Self::Internal(_) => ErrorKind::ServiceFailure,
        }
    }

    pub(crate) fn service(service: &str, reason: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            service: service.into(),
            reason: reason.into(),
        }
    }
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    e.message
                        .as_ref()
                        .map_or_else(|| format!("{field} is invalid"), ToString::to_string)
                })
            })
            .collect();
        messages.sort();
        Self::ValidationFailed {
            message: messages.join("; "),
        }
    }
}
