// ── Admin roster ──

mod controller;
mod filter;
mod selection;

pub use controller::{
    ActionOutcome, BulkFailure, BulkReport, RosterController, RosterSummary, SPEED_PRESETS,
    UsageSummary,
};
pub use filter::{RosterQuery, StatusFilter, compute_view};
pub use selection::SelectionSet;
