// ── Typed request structs ──
//
// Input that arrives from a form or the command line is validated here,
// before any collaborator is called.

use chrono::{Days, NaiveDate};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateEmail, ValidationError};

use crate::error::CoreError;
use crate::model::{ClientId, ClientRecord, MacAddress, PaymentStatus, Role, SubscriptionStatus};

/// Length of a fresh billing period.
pub const BILLING_PERIOD_DAYS: u32 = 30;

/// Minimum digit/separator count accepted for a phone number.
const MIN_PHONE_LEN: usize = 10;

// ── Client creation ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateClientRequest {
    #[validate(custom(function = "validate_required", message = "name is required"))]
    pub name: String,
    #[validate(email(message = "a valid email address is required"))]
    pub email: String,
    #[validate(custom(function = "validate_phone", message = "a valid phone number is required"))]
    pub phone: String,
    #[validate(custom(function = "validate_required", message = "plan is required"))]
    pub plan: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_mbps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "data limit cannot be negative"))]
    pub data_limit_gb: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_mac", message = "MAC address must be six hex octets"))]
    pub mac: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join_date: Option<NaiveDate>,
}

impl CreateClientRequest {
    /// Validate, then build the record a new subscriber starts with.
    ///
    /// The returned record carries an empty id; the records service
    /// assigns the real one.
    pub fn into_record(self, today: NaiveDate) -> Result<ClientRecord, CoreError> {
        self.validate()?;

        let join_date = self.join_date.unwrap_or(today);
        let next_payment = join_date.checked_add_days(Days::new(u64::from(BILLING_PERIOD_DAYS)));

        Ok(ClientRecord {
            id: ClientId::new(String::new()),
            name: self.name.trim().to_owned(),
            email: self.email.trim().to_owned(),
            phone: self.phone.trim().to_owned(),
            mac: self
                .mac
                .as_deref()
                .filter(|m| !m.trim().is_empty())
                .map(MacAddress::new),
            plan: self.plan.trim().to_owned(),
            speed_mbps: self.speed_mbps.unwrap_or(0),
            data_used_gb: 0.0,
            data_limit_gb: self.data_limit_gb.filter(|l| *l > 0.0),
            connected: false,
            payment_status: PaymentStatus::Pending,
            subscription_status: SubscriptionStatus::Active,
            last_payment: None,
            next_payment,
            days_remaining: i32::try_from(BILLING_PERIOD_DAYS).unwrap_or(i32::MAX),
            join_date: Some(join_date),
        })
    }
}

fn validate_required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("required"))
    } else {
        Ok(())
    }
}

fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let trimmed = phone.trim();
    let body = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let allowed = body
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')'));
    if allowed && body.chars().count() >= MIN_PHONE_LEN {
        Ok(())
    } else {
        Err(ValidationError::new("phone"))
    }
}

fn validate_mac(mac: &str) -> Result<(), ValidationError> {
    if mac.trim().is_empty() || MacAddress::new(mac).is_well_formed() {
        Ok(())
    } else {
        Err(ValidationError::new("mac"))
    }
}

// ── Login ──────────────────────────────────────────────────────────

/// Credentials submitted on the sign-in form.
#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: SecretString,
    pub role: Role,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>, role: Role) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
            role,
        }
    }

    /// Required-field checks; no collaborator is consulted.
    pub fn check(&self) -> Result<(), CoreError> {
        if self.email.trim().is_empty() || self.password.expose_secret().is_empty() {
            return Err(CoreError::ValidationFailed {
                message: "email and password are required".into(),
            });
        }
        if !self.email.trim().validate_email() {
            return Err(CoreError::ValidationFailed {
                message: "a valid email address is required".into(),
            });
        }
        Ok(())
    }
}
