// ── Collaborator seams ──
//
// Everything the core needs from the outside world is reached through
// these traits. Front ends inject real or in-memory implementations;
// the roster controller and access guard never know which.

pub mod memory;

use async_trait::async_trait;

use crate::error::CoreError;
use crate::model::{ClientId, ClientRecord, Session};
use crate::requests::LoginRequest;

/// Remote store of subscriber records.
#[async_trait]
pub trait ClientRecordsService: Send + Sync {
    /// Fetch the full collection, in backend order.
    async fn list(&self) -> Result<Vec<ClientRecord>, CoreError>;

    async fn disconnect(&self, id: &ClientId) -> Result<(), CoreError>;

    async fn limit_speed(&self, id: &ClientId, mbps: u32) -> Result<(), CoreError>;

    async fn send_reminder(&self, id: &ClientId) -> Result<(), CoreError>;

    /// Persist a new record. The incoming id is ignored; the returned
    /// record carries the id the service assigned.
    async fn create(&self, record: ClientRecord) -> Result<ClientRecord, CoreError>;
}

/// Credential check and session lifecycle.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Check credentials for the requested role. A role mismatch fails
    /// the same way a wrong password does.
    async fn authenticate(&self, request: &LoginRequest) -> Result<Session, CoreError>;

    /// Rebuild a session from a previously issued token.
    async fn resume(&self, token: &str) -> Result<Session, CoreError>;

    /// Invalidate a token server-side.
    async fn revoke(&self, token: &str) -> Result<(), CoreError>;
}

/// Blocking yes/no question put to the operator before a destructive
/// action. `false` aborts the action with no side effects.
pub trait ConfirmationPrompt: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
}

/// Fixed answer, for scripted runs (`--yes`) and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoConfirm(pub bool);

impl ConfirmationPrompt for AutoConfirm {
    fn confirm(&self, message: &str) -> bool {
        tracing::debug!(answer = self.0, %message, "auto-answered confirmation");
        self.0
    }
}

/// Where the current session's credential lives between runs.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<Session>, CoreError>;

    fn save(&self, session: &Session) -> Result<(), CoreError>;

    /// Remove any stored credential. Clearing an empty store succeeds.
    fn clear(&self) -> Result<(), CoreError>;
}
