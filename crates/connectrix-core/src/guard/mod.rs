// ── Session / access guard ──

mod access;
mod route;

pub use access::{AccessGuard, GuardState, LoginSuccess};
pub use route::{AccessDecision, Route, authorize, landing_for, resolve_route};
