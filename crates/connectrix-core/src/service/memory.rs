// ── In-memory collaborators ──
//
// Stand-ins for the future backend: seeded demo data, simulated latency,
// a call log, and fault injection. The records mock mirrors a read-only
// backend: `disconnect`/`limit_speed`/`send_reminder` are acknowledged
// and logged but do not change what the next `list` returns. `create`
// is the one call that grows the seeded collection.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use secrecy::ExposeSecret;
use tokio::sync::Mutex;
use tracing::debug;

use super::{ClientRecordsService, IdentityService, SessionStore};
use crate::config::ServiceConfig;
use crate::error::CoreError;
use crate::model::{
    ClientId, ClientRecord, MacAddress, PaymentStatus, Role, Session, SubscriptionStatus,
    UserIdentity,
};
use crate::requests::LoginRequest;

const RECORDS_SERVICE: &str = "Client records service";
const IDENTITY_SERVICE: &str = "Identity service";

/// Reason reported for any rejected credential, including a role mismatch.
pub const INVALID_CREDENTIALS: &str = "Invalid email, password, or role";

// ── Seed data ───────────────────────────────────────────────────────

fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

/// The three demo subscribers, in roster order.
pub fn demo_clients() -> Vec<ClientRecord> {
    vec![
        ClientRecord {
            id: ClientId::from(1u64),
            name: "John Doe".into(),
            email: "john@example.com".into(),
            phone: "+254712345678".into(),
            mac: Some(MacAddress::new("00:1A:2B:3C:4D:5E")),
            plan: "50Mbps Premium".into(),
            speed_mbps: 50,
            data_used_gb: 45.0,
            data_limit_gb: Some(100.0),
            connected: true,
            payment_status: PaymentStatus::Overdue,
            subscription_status: SubscriptionStatus::Active,
            last_payment: date(2024, 1, 1),
            next_payment: date(2024, 2, 1),
            days_remaining: -3,
            join_date: date(2023, 12, 1),
        },
        ClientRecord {
            id: ClientId::from(2u64),
            name: "Jane Smith".into(),
            email: "jane@example.com".into(),
            phone: "+254723456789".into(),
            mac: Some(MacAddress::new("00:2B:3C:4D:5E:6F")),
            plan: "100Mbps Business".into(),
            speed_mbps: 100,
            data_used_gb: 120.0,
            data_limit_gb: Some(200.0),
            connected: true,
            payment_status: PaymentStatus::Paid,
            subscription_status: SubscriptionStatus::Active,
            last_payment: date(2024, 1, 15),
            next_payment: date(2024, 2, 15),
            days_remaining: 15,
            join_date: date(2023, 11, 15),
        },
        ClientRecord {
            id: ClientId::from(3u64),
            name: "Mike Johnson".into(),
            email: "mike@example.com".into(),
            phone: "+254734567890".into(),
            mac: Some(MacAddress::new("00:3C:4D:5E:6F:7A")),
            plan: "20Mbps Basic".into(),
            speed_mbps: 20,
            data_used_gb: 18.0,
            data_limit_gb: Some(50.0),
            connected: false,
            payment_status: PaymentStatus::Pending,
            subscription_status: SubscriptionStatus::Suspended,
            last_payment: date(2023, 12, 20),
            next_payment: date(2024, 1, 20),
            days_remaining: 0,
            join_date: date(2023, 10, 20),
        },
    ]
}

// ── Client records ──────────────────────────────────────────────────

/// Records-service entry points, used to target injected faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
    List,
    Disconnect,
    LimitSpeed,
    SendReminder,
    Create,
}

/// One entry in the records call log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    Disconnect(ClientId),
    LimitSpeed(ClientId, u32),
    SendReminder(ClientId),
    /// Carries the submitted name; the id is not known yet.
    Create(String),
}

impl Call {
    pub fn operation(&self) -> Operation {
        match self {
            Self::List => Operation::List,
            Self::Disconnect(_) => Operation::Disconnect,
            Self::LimitSpeed(..) => Operation::LimitSpeed,
            Self::SendReminder(_) => Operation::SendReminder,
            Self::Create(_) => Operation::Create,
        }
    }
}

/// Injected misbehaviour for one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// Fail immediately with this reason.
    Fail(String),
    /// Never answer.
    Stall,
}

/// Seeded in-memory Client Records Service.
pub struct InMemoryClientRecords {
    records: Mutex<Vec<ClientRecord>>,
    next_id: AtomicU64,
    list_latency: Duration,
    action_latency: Duration,
    calls: Mutex<Vec<Call>>,
    faults: Mutex<HashMap<Operation, Fault>>,
    failing_ids: Mutex<HashSet<ClientId>>,
}

impl InMemoryClientRecords {
    /// Seeded with [`demo_clients`].
    pub fn new(config: &ServiceConfig) -> Self {
        Self::with_records(demo_clients(), config)
    }

    pub fn with_records(records: Vec<ClientRecord>, config: &ServiceConfig) -> Self {
        let next_id = records
            .iter()
            .filter_map(|r| r.id.as_str().parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        Self {
            records: Mutex::new(records),
            next_id: AtomicU64::new(next_id),
            list_latency: config.list_latency,
            action_latency: config.action_latency,
            calls: Mutex::new(Vec::new()),
            faults: Mutex::new(HashMap::new()),
            failing_ids: Mutex::new(HashSet::new()),
        }
    }

    /// Builder form of [`inject`](Self::inject).
    pub fn with_fault(mut self, operation: Operation, fault: Fault) -> Self {
        self.faults.get_mut().insert(operation, fault);
        self
    }

    pub async fn inject(&self, operation: Operation, fault: Fault) {
        self.faults.lock().await.insert(operation, fault);
    }

    pub async fn heal(&self, operation: Operation) {
        self.faults.lock().await.remove(&operation);
    }

    /// Make every per-record action on `id` fail.
    pub async fn fail_for(&self, id: ClientId) {
        self.failing_ids.lock().await.insert(id);
    }

    /// Snapshot of every call received so far, in arrival order.
    pub async fn calls(&self) -> Vec<Call> {
        self.calls.lock().await.clone()
    }

    pub async fn count(&self, operation: Operation) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|c| c.operation() == operation)
            .count()
    }

    /// Log, wait, then apply any injected fault.
    async fn enter(&self, call: Call) -> Result<(), CoreError> {
        let operation = call.operation();
        debug!(?call, "records service call");
        self.calls.lock().await.push(call);

        let latency = if operation == Operation::List {
            self.list_latency
        } else {
            self.action_latency
        };
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let fault = self.faults.lock().await.get(&operation).cloned();
        match fault {
            Some(Fault::Fail(reason)) => Err(CoreError::service(RECORDS_SERVICE, reason)),
            Some(Fault::Stall) => std::future::pending().await,
            None => Ok(()),
        }
    }

    async fn check_target(&self, id: &ClientId) -> Result<(), CoreError> {
        if self.failing_ids.lock().await.contains(id) {
            return Err(CoreError::service(
                RECORDS_SERVICE,
                format!("request for client {id} was rejected"),
            ));
        }
        if self.records.lock().await.iter().any(|r| &r.id == id) {
            Ok(())
        } else {
            Err(CoreError::ClientNotFound {
                identifier: id.to_string(),
            })
        }
    }
}

#[async_trait]
impl ClientRecordsService for InMemoryClientRecords {
    async fn list(&self) -> Result<Vec<ClientRecord>, CoreError> {
        self.enter(Call::List).await?;
        Ok(self.records.lock().await.clone())
    }

    async fn disconnect(&self, id: &ClientId) -> Result<(), CoreError> {
        self.enter(Call::Disconnect(id.clone())).await?;
        self.check_target(id).await
    }

    async fn limit_speed(&self, id: &ClientId, mbps: u32) -> Result<(), CoreError> {
        self.enter(Call::LimitSpeed(id.clone(), mbps)).await?;
        self.check_target(id).await
    }

    async fn send_reminder(&self, id: &ClientId) -> Result<(), CoreError> {
        self.enter(Call::SendReminder(id.clone())).await?;
        self.check_target(id).await
    }

    async fn create(&self, mut record: ClientRecord) -> Result<ClientRecord, CoreError> {
        self.enter(Call::Create(record.name.clone())).await?;
        record.id = ClientId::from(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.records.lock().await.push(record.clone());
        Ok(record)
    }
}

// ── Identity ────────────────────────────────────────────────────────

/// A seeded login.
#[derive(Debug, Clone)]
pub struct Account {
    pub user: UserIdentity,
    pub password: String,
    pub role: Role,
}

impl Account {
    fn new(id: &str, name: &str, email: &str, password: &str, role: Role) -> Self {
        Self {
            user: UserIdentity {
                id: id.into(),
                name: name.into(),
                email: email.into(),
            },
            password: password.into(),
            role,
        }
    }
}

/// One admin and two client logins. Client accounts share their email
/// with a seeded subscriber record.
pub fn demo_accounts() -> Vec<Account> {
    vec![
        Account::new(
            "admin-1",
            "Admin User",
            "admin@connectrix.io",
            "Admin@123",
            Role::Admin,
        ),
        Account::new(
            "client-1",
            "John Doe",
            "john@example.com",
            "Client@123",
            Role::Client,
        ),
        Account::new(
            "client-2",
            "Jane Smith",
            "jane@example.com",
            "Client@123",
            Role::Client,
        ),
    ]
}

/// Seeded in-memory Identity Service.
///
/// Tokens have the form `{user_id}.{uuid}`, so a token written to disk by
/// one process can be resumed by the next. Revocation only lasts for the
/// lifetime of this value.
pub struct InMemoryIdentity {
    accounts: Vec<Account>,
    latency: Duration,
    revoked: Mutex<HashSet<String>>,
    outage: Mutex<Option<Fault>>,
}

impl InMemoryIdentity {
    pub fn new(config: &ServiceConfig) -> Self {
        Self::with_accounts(demo_accounts(), config)
    }

    pub fn with_accounts(accounts: Vec<Account>, config: &ServiceConfig) -> Self {
        Self {
            accounts,
            latency: config.action_latency,
            revoked: Mutex::new(HashSet::new()),
            outage: Mutex::new(None),
        }
    }

    /// Make every call misbehave until [`restore`](Self::restore).
    pub async fn fail_with(&self, fault: Fault) {
        *self.outage.lock().await = Some(fault);
    }

    pub async fn restore(&self) {
        *self.outage.lock().await = None;
    }

    async fn enter(&self) -> Result<(), CoreError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let outage = self.outage.lock().await.clone();
        match outage {
            Some(Fault::Fail(reason)) => Err(CoreError::service(IDENTITY_SERVICE, reason)),
            Some(Fault::Stall) => std::future::pending().await,
            None => Ok(()),
        }
    }

    fn session_for(account: &Account, token: String) -> Session {
        Session {
            user: account.user.clone(),
            role: account.role,
            token,
        }
    }
}

fn rejected(message: &str) -> CoreError {
    CoreError::AuthenticationFailed {
        message: message.into(),
    }
}

#[async_trait]
impl IdentityService for InMemoryIdentity {
    async fn authenticate(&self, request: &LoginRequest) -> Result<Session, CoreError> {
        self.enter().await?;
        let email = request.email.trim();
        let account = self
            .accounts
            .iter()
            .find(|a| {
                a.user.email.eq_ignore_ascii_case(email)
                    && a.password == request.password.expose_secret()
                    && a.role == request.role
            })
            .ok_or_else(|| rejected(INVALID_CREDENTIALS))?;
        let token = format!("{}.{}", account.user.id, uuid::Uuid::new_v4());
        debug!(user = %account.user.id, role = %account.role, "issued session token");
        Ok(Self::session_for(account, token))
    }

    async fn resume(&self, token: &str) -> Result<Session, CoreError> {
        self.enter().await?;
        if self.revoked.lock().await.contains(token) {
            return Err(rejected("session has been revoked"));
        }
        let (user_id, nonce) = token
            .split_once('.')
            .ok_or_else(|| rejected("malformed session token"))?;
        if uuid::Uuid::parse_str(nonce).is_err() {
            return Err(rejected("malformed session token"));
        }
        let account = self
            .accounts
            .iter()
            .find(|a| a.user.id == user_id)
            .ok_or_else(|| rejected("session no longer valid"))?;
        Ok(Self::session_for(account, token.to_owned()))
    }

    async fn revoke(&self, token: &str) -> Result<(), CoreError> {
        self.enter().await?;
        self.revoked.lock().await.insert(token.to_owned());
        Ok(())
    }
}

// ── Session store ───────────────────────────────────────────────────

/// Process-local session store.
#[derive(Default)]
pub struct MemorySessionStore {
    slot: std::sync::RwLock<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            slot: std::sync::RwLock::new(Some(session)),
        }
    }
}

fn poisoned() -> CoreError {
    CoreError::Persistence {
        message: "session store lock poisoned".into(),
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>, CoreError> {
        self.slot.read().map(|s| s.clone()).map_err(|_| poisoned())
    }

    fn save(&self, session: &Session) -> Result<(), CoreError> {
        *self.slot.write().map_err(|_| poisoned())? = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        *self.slot.write().map_err(|_| poisoned())? = None;
        Ok(())
    }
}
