// ── Unified domain model ──
//
// Every type in this module is the canonical representation of a
// Connectrix entity. Service implementations translate to and from these
// types; consumers (CLI or a future web/TUI front end) only ever see them.

pub mod entity_id;

pub mod client;
pub mod session;

// ── Re-exports ──────────────────────────────────────────────────────
// Flat access: `use connectrix_core::model::*` gives you everything.

// Core identity
pub use entity_id::{ClientId, MacAddress};

// Subscribers
pub use client::{
    ClientRecord, EXPIRING_THRESHOLD_DAYS, ExpiryState, PaymentStatus, PlanTier,
    SubscriptionStatus,
};

// Sessions
pub use session::{Role, Session, UserIdentity};
