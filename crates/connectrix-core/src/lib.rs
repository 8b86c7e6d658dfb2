//! Subscriber roster and session guard for the Connectrix WiFi dashboard.
//!
//! This crate owns the business logic and domain model shared by every
//! Connectrix front end:
//!
//! - **[`RosterController`]**: the admin roster. Loads subscriber records
//!   from a [`ClientRecordsService`], derives the filtered view
//!   ([`compute_view`]), tracks the multi-select [`SelectionSet`], and
//!   dispatches per-record and bulk actions. Successful disconnects are
//!   applied locally right away; the next [`load()`](RosterController::load)
//!   is authoritative.
//!
//! - **[`AccessGuard`]**: session restore / login / logout against an
//!   [`IdentityService`], persisted through a [`SessionStore`]. The pure
//!   [`authorize`] and [`resolve_route`] functions decide which [`Route`]
//!   a session may see.
//!
//! - **Collaborator seams** ([`service`], [`notify`]): object-safe traits
//!   for every external dependency, plus in-memory implementations seeded
//!   with demo data ([`service::memory`]).
//!
//! Every external call is bounded by [`ServiceConfig::action_timeout`].
//! Action failures are turned into a single [`Notification`] at the action
//! boundary and reported back as an [`ActionOutcome`], never propagated.

pub mod config;
pub mod error;
pub mod guard;
pub mod model;
pub mod notify;
pub mod requests;
pub mod roster;
pub mod service;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{DEFAULT_ACTION_TIMEOUT, ServiceConfig};
pub use error::{CoreError, ErrorKind};
pub use guard::{
    AccessDecision, AccessGuard, GuardState, LoginSuccess, Route, authorize, landing_for,
    resolve_route,
};
pub use notify::{Notification, NotificationSink, Severity, ToastQueue};
pub use requests::{CreateClientRequest, LoginRequest};
pub use roster::{
    ActionOutcome, BulkFailure, BulkReport, RosterController, RosterQuery, RosterSummary,
    SPEED_PRESETS, SelectionSet, StatusFilter, UsageSummary, compute_view,
};
pub use service::{
    AutoConfirm, ClientRecordsService, ConfirmationPrompt, IdentityService, SessionStore,
};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    ClientId, ClientRecord, ExpiryState, MacAddress, PaymentStatus, PlanTier, Role, Session,
    SubscriptionStatus, UserIdentity,
};
