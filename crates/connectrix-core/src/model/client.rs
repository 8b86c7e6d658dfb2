// ── Subscriber domain types ──

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::entity_id::{ClientId, MacAddress};

/// Days below which a still-valid subscription is flagged as expiring.
pub const EXPIRING_THRESHOLD_DAYS: i32 = 7;

/// Billing state of a subscriber.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PaymentStatus {
    Paid,
    Pending,
    Overdue,
}

/// Whether the subscription is currently in force.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SubscriptionStatus {
    Active,
    Suspended,
}

/// Display state derived from `days_remaining`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryState {
    #[strum(to_string = "Expired")]
    Expired,
    #[strum(to_string = "Expiring")]
    Expiring,
    #[strum(to_string = "Remaining")]
    Current,
}

impl ExpiryState {
    pub fn from_days(days_remaining: i32) -> Self {
        if days_remaining < 0 {
            Self::Expired
        } else if days_remaining < EXPIRING_THRESHOLD_DAYS {
            Self::Expiring
        } else {
            Self::Current
        }
    }
}

/// Plan tiers offered on the sign-up form.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PlanTier {
    Basic,
    Premium,
    Enterprise,
}

impl PlanTier {
    pub const ALL: [Self; 3] = [Self::Basic, Self::Premium, Self::Enterprise];
}

/// The canonical subscriber record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: ClientId,

    // Profile
    pub name: String,
    pub email: String,
    pub phone: String,
    pub mac: Option<MacAddress>,

    // Subscription
    pub plan: String,
    pub speed_mbps: u32,
    pub data_used_gb: f64,
    /// `None` means no cap.
    pub data_limit_gb: Option<f64>,

    // Status
    pub connected: bool,
    pub payment_status: PaymentStatus,
    pub subscription_status: SubscriptionStatus,

    // Billing
    pub last_payment: Option<NaiveDate>,
    pub next_payment: Option<NaiveDate>,
    /// Negative once the paid period has lapsed.
    pub days_remaining: i32,
    pub join_date: Option<NaiveDate>,
}

impl ClientRecord {
    pub fn expiry_state(&self) -> ExpiryState {
        ExpiryState::from_days(self.days_remaining)
    }

    pub fn is_expired(&self) -> bool {
        self.expiry_state() == ExpiryState::Expired
    }

    /// Share of the data cap consumed, in percent.
    pub fn usage_percent(&self) -> Option<f64> {
        match self.data_limit_gb {
            Some(limit) if limit > 0.0 => Some(self.data_used_gb * 100.0 / limit),
            _ => None,
        }
    }
}
