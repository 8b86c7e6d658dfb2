// ── Routes and the pure access check ──

use std::fmt;

use serde::Serialize;

use crate::model::{Role, Session};

/// Result of checking a session against a view's allowed roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
pub enum AccessDecision {
    Permit,
    RedirectToLogin,
    RedirectToUnauthorized,
}

/// Permit when a session exists and its role is allowed. An empty
/// `allowed` list admits any signed-in role.
pub fn authorize(session: Option<&Session>, allowed: &[Role]) -> AccessDecision {
    match session {
        None => AccessDecision::RedirectToLogin,
        Some(s) if allowed.is_empty() || allowed.contains(&s.role) => AccessDecision::Permit,
        Some(_) => AccessDecision::RedirectToUnauthorized,
    }
}

const ADMIN_ONLY: &[Role] = &[Role::Admin];
const CLIENT_ONLY: &[Role] = &[Role::Client];

/// Every view the dashboard can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Home,
    Login,
    AdminDashboard,
    AdminNewClient,
    ClientDashboard,
    Unauthorized,
}

impl Route {
    pub const ALL: [Self; 6] = [
        Self::Home,
        Self::Login,
        Self::AdminDashboard,
        Self::AdminNewClient,
        Self::ClientDashboard,
        Self::Unauthorized,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Login => "/login",
            Self::AdminDashboard => "/admin/dashboard",
            Self::AdminNewClient => "/admin/clients/new",
            Self::ClientDashboard => "/client/dashboard",
            Self::Unauthorized => "/unauthorized",
        }
    }

    /// Unknown paths land on `Home`. A trailing slash is ignored, and the
    /// bare `/admin` and `/client` prefixes open their dashboards.
    pub fn from_path(path: &str) -> Self {
        let trimmed = path.trim();
        let normalized = match trimmed.trim_end_matches('/') {
            "" => "/",
            "/admin" => return Self::AdminDashboard,
            "/client" => return Self::ClientDashboard,
            p => p,
        };
        Self::ALL
            .into_iter()
            .find(|r| r.path() == normalized)
            .unwrap_or(Self::Home)
    }

    /// `None` for public views.
    pub fn allowed_roles(self) -> Option<&'static [Role]> {
        match self {
            Self::AdminDashboard | Self::AdminNewClient => Some(ADMIN_ONLY),
            Self::ClientDashboard => Some(CLIENT_ONLY),
            Self::Home | Self::Login | Self::Unauthorized => None,
        }
    }

    pub fn is_protected(self) -> bool {
        self.allowed_roles().is_some()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Where a role lands after signing in.
pub fn landing_for(role: Role) -> Route {
    match role {
        Role::Admin => Route::AdminDashboard,
        Role::Client => Route::ClientDashboard,
    }
}

/// The view actually shown when `requested` is navigated to.
pub fn resolve_route(session: Option<&Session>, requested: Route) -> Route {
    let Some(allowed) = requested.allowed_roles() else {
        return requested;
    };
    match authorize(session, allowed) {
        AccessDecision::Permit => requested,
        AccessDecision::RedirectToLogin => Route::Login,
        AccessDecision::RedirectToUnauthorized => Route::Unauthorized,
    }
}
