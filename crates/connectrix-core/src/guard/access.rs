// ── Session lifecycle ──
//
// Restore, login and logout against the Identity Service, with the
// credential persisted through a `SessionStore`. The current session is
// held here and handed out by value; there is no process-wide singleton.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::route::{AccessDecision, Route, authorize, landing_for, resolve_route};
use crate::config::{ServiceConfig, bounded};
use crate::error::CoreError;
use crate::model::{Role, Session};
use crate::notify::{Notification, NotificationSink};
use crate::requests::LoginRequest;
use crate::service::{IdentityService, SessionStore};

/// Observable authentication state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// Nothing attempted yet.
    Unknown,
    /// A persisted credential is being checked.
    Checking,
    Unauthenticated,
    Authenticated(Role),
}

impl GuardState {
    pub fn is_authenticated(self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

/// Successful login: the new session and where its role lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSuccess {
    pub session: Session,
    pub landing: Route,
}

pub struct AccessGuard {
    identity: Arc<dyn IdentityService>,
    store: Arc<dyn SessionStore>,
    notifier: Arc<dyn NotificationSink>,
    config: ServiceConfig,
    state: watch::Sender<GuardState>,
    session: watch::Sender<Option<Session>>,
}

impl AccessGuard {
    pub fn new(
        identity: Arc<dyn IdentityService>,
        store: Arc<dyn SessionStore>,
        notifier: Arc<dyn NotificationSink>,
        config: ServiceConfig,
    ) -> Self {
        let (state, _) = watch::channel(GuardState::Unknown);
        let (session, _) = watch::channel(None);
        Self {
            identity,
            store,
            notifier,
            config,
            state,
            session,
        }
    }

    pub fn state(&self) -> GuardState {
        *self.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<GuardState> {
        self.state.subscribe()
    }

    pub fn session(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    /// Check the current session against a view's allowed roles.
    pub fn authorize(&self, allowed: &[Role]) -> AccessDecision {
        authorize(self.session.borrow().as_ref(), allowed)
    }

    pub fn resolve(&self, requested: Route) -> Route {
        resolve_route(self.session.borrow().as_ref(), requested)
    }

    /// Rebuild the session from the persisted credential. Never fails: a
    /// missing, unreadable or rejected credential is cleared and yields
    /// `None`.
    pub async fn restore_session(&self) -> Option<Session> {
        self.transition(GuardState::Checking);

        let stored = match self.store.load() {
            Ok(Some(stored)) => stored,
            Ok(None) => {
                debug!("no persisted session");
                self.set_session(None);
                return None;
            }
            Err(e) => {
                warn!(error = %e, "persisted session unreadable");
                self.discard_credential();
                self.set_session(None);
                return None;
            }
        };

        match bounded(
            "Session restore",
            self.config.action_timeout,
            self.identity.resume(&stored.token),
        )
        .await
        {
            Ok(session) => {
                info!(user = %session.user.email, role = %session.role, "session restored");
                self.set_session(Some(session.clone()));
                Some(session)
            }
            Err(e) => {
                warn!(error = %e, "persisted session rejected");
                self.discard_credential();
                self.set_session(None);
                None
            }
        }
    }

    /// Validate, authenticate, then store the session. On failure no
    /// state changes and exactly one error notification is raised.
    pub async fn login(&self, request: LoginRequest) -> Result<LoginSuccess, CoreError> {
        if let Err(e) = request.check() {
            return Err(self.reject(e));
        }

        debug!(email = %request.email, role = %request.role, "authenticating");
        let session = match bounded(
            "Login",
            self.config.action_timeout,
            self.identity.authenticate(&request),
        )
        .await
        {
            Ok(session) => session,
            Err(e) => return Err(self.reject(e)),
        };

        if let Err(e) = self.store.save(&session) {
            warn!(error = %e, "session not persisted; it will not survive a restart");
        }
        info!(user = %session.user.email, role = %session.role, "logged in");
        self.set_session(Some(session.clone()));
        self.notifier.notify(Notification::success("Login successful!"));

        Ok(LoginSuccess {
            landing: landing_for(session.role),
            session,
        })
    }

    /// Drop the session and its persisted credential. Always succeeds;
    /// the server-side revoke is best-effort.
    pub async fn logout(&self) {
        let current = self.session.send_replace(None);
        let token = match current {
            Some(session) => Some(session.token),
            // A previous process may have left a credential behind.
            None => self.store.load().ok().flatten().map(|s| s.token),
        };

        if let Some(token) = token {
            if let Err(e) =
                bounded("Logout", self.config.action_timeout, self.identity.revoke(&token)).await
            {
                warn!(error = %e, "token revoke failed (non-fatal)");
            }
            self.notifier.notify(Notification::info("Logged out"));
        }
        self.discard_credential();
        self.transition(GuardState::Unauthenticated);
        info!("logged out");
    }

    // ── Private helpers ──────────────────────────────────────────

    fn reject(&self, error: CoreError) -> CoreError {
        let reason = match &error {
            CoreError::AuthenticationFailed { message }
            | CoreError::ValidationFailed { message } => message.clone(),
            other => other.to_string(),
        };
        warn!(kind = %error.kind(), %reason, "login rejected");
        self.notifier.notify(Notification::error(reason));
        error
    }

    fn set_session(&self, session: Option<Session>) {
        let next = session
            .as_ref()
            .map_or(GuardState::Unauthenticated, |s| GuardState::Authenticated(s.role));
        self.session.send_replace(session);
        self.transition(next);
    }

    fn transition(&self, next: GuardState) {
        let prev = self.state.send_replace(next);
        if prev != next {
            debug!(?prev, ?next, "guard state");
        }
    }

    fn discard_credential(&self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "could not clear persisted session");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::UserIdentity;
    use crate::notify::{Severity, ToastQueue};
    use crate::service::memory::{Fault, InMemoryIdentity, MemorySessionStore};
    use pretty_assertions::assert_eq;

    struct Harness {
        guard: AccessGuard,
        identity: Arc<InMemoryIdentity>,
        store: Arc<MemorySessionStore>,
        toasts: Arc<ToastQueue>,
    }

    fn harness_with_store(store: MemorySessionStore) -> Harness {
        let identity = Arc::new(InMemoryIdentity::new(&ServiceConfig::instant()));
        let store = Arc::new(store);
        let toasts = Arc::new(ToastQueue::new());
        let guard = AccessGuard::new(
            identity.clone(),
            store.clone(),
            toasts.clone(),
            ServiceConfig::instant(),
        );
        Harness {
            guard,
            identity,
            store,
            toasts,
        }
    }

    fn harness() -> Harness {
        harness_with_store(MemorySessionStore::new())
    }

    fn admin_login() -> LoginRequest {
        LoginRequest::new("admin@connectrix.io", "Admin@123", Role::Admin)
    }

    fn client_login() -> LoginRequest {
        LoginRequest::new("john@example.com", "Client@123", Role::Client)
    }

    #[tokio::test]
    async fn admin_lands_on_admin_dashboard() {
        let h = harness();
        let ok = h.guard.login(admin_login()).await.unwrap();

        assert_eq!(ok.landing, Route::AdminDashboard);
        assert_eq!(h.guard.state(), GuardState::Authenticated(Role::Admin));
        assert_eq!(h.store.load().unwrap(), Some(ok.session));
        assert_eq!(
            h.toasts.notifications(),
            vec![Notification::success("Login successful!")]
        );
        assert_eq!(h.guard.resolve(Route::AdminNewClient), Route::AdminNewClient);
    }

    #[tokio::test]
    async fn client_lands_on_client_dashboard() {
        let h = harness();
        let ok = h.guard.login(client_login()).await.unwrap();
        assert_eq!(ok.landing, Route::ClientDashboard);
        assert_eq!(h.guard.authorize(&[Role::Admin]), AccessDecision::RedirectToUnauthorized);
    }

    #[tokio::test]
    async fn bad_credentials_leave_session_unset() {
        let h = harness();
        let err = h
            .guard
            .login(LoginRequest::new("admin@connectrix.io", "wrong", Role::Admin))
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
        assert!(h.guard.session().is_none());
        assert!(!h.guard.state().is_authenticated());
        assert!(h.store.load().unwrap().is_none());
        assert_eq!(
            h.toasts.notifications(),
            vec![Notification::error("Invalid email, password, or role")]
        );
    }

    #[tokio::test]
    async fn wrong_role_is_rejected_like_a_bad_password() {
        let h = harness();
        let request = LoginRequest::new("john@example.com", "Client@123", Role::Admin);
        assert!(h.guard.login(request).await.is_err());
        assert_eq!(h.toasts.count(Severity::Error), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_fields_never_reach_the_identity_service() {
        let h = harness();
        // A call would hang until the timeout and surface as Timeout.
        h.identity.fail_with(Fault::Stall).await;

        let err = h
            .guard
            .login(LoginRequest::new("admin@connectrix.io", "", Role::Admin))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed { .. }));
        assert_eq!(h.toasts.count(Severity::Error), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_identity_times_out() {
        let h = harness();
        h.identity.fail_with(Fault::Stall).await;
        let err = h.guard.login(admin_login()).await.unwrap_err();
        assert!(matches!(err, CoreError::Timeout { .. }));
        assert_eq!(h.toasts.toasts().len(), 1);
    }

    #[tokio::test]
    async fn restore_rehydrates_a_stored_session() {
        let issuer = harness();
        let session = issuer.guard.login(client_login()).await.unwrap().session;

        let h = harness_with_store(MemorySessionStore::with_session(session.clone()));
        assert_eq!(h.guard.state(), GuardState::Unknown);
        assert_eq!(h.guard.restore_session().await, Some(session));
        assert_eq!(h.guard.state(), GuardState::Authenticated(Role::Client));
        assert!(h.toasts.toasts().is_empty());
    }

    #[tokio::test]
    async fn rejected_credential_is_cleared() {
        let stale = Session {
            user: UserIdentity {
                id: "admin-1".into(),
                name: "Admin User".into(),
                email: "admin@connectrix.io".into(),
            },
            role: Role::Admin,
            token: "garbage".into(),
        };
        let h = harness_with_store(MemorySessionStore::with_session(stale));

        assert!(h.guard.restore_session().await.is_none());
        assert_eq!(h.guard.state(), GuardState::Unauthenticated);
        assert!(h.store.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn restore_with_nothing_stored() {
        let h = harness();
        let mut states = h.guard.subscribe_state();
        assert!(h.guard.restore_session().await.is_none());
        assert!(states.has_changed().unwrap());
        assert_eq!(*states.borrow_and_update(), GuardState::Unauthenticated);
    }

    #[tokio::test]
    async fn logout_clears_everything() {
        let h = harness();
        let session = h.guard.login(admin_login()).await.unwrap().session;

        h.guard.logout().await;

        assert!(h.guard.session().is_none());
        assert_eq!(h.guard.state(), GuardState::Unauthenticated);
        assert!(h.store.load().unwrap().is_none());
        assert!(h.identity.resume(&session.token).await.is_err());
        assert_eq!(h.guard.resolve(Route::AdminDashboard), Route::Login);
    }

    #[tokio::test]
    async fn logout_succeeds_even_when_revoke_fails() {
        let h = harness();
        h.guard.login(admin_login()).await.unwrap();
        h.identity.fail_with(Fault::Fail("offline".into())).await;

        h.guard.logout().await;
        assert!(h.guard.session().is_none());
        assert!(h.store.load().unwrap().is_none());
    }
}
