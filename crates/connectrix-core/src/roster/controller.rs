// ── Client roster controller ──
//
// Owns the local record collection, the roster query and the selection
// for one roster-view session. Every action catches its own failure and
// turns it into exactly one notification; callers get an outcome value,
// never a propagated error.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::filter::{RosterQuery, StatusFilter, compute_view};
use super::selection::SelectionSet;
use crate::config::{ServiceConfig, bounded};
use crate::error::CoreError;
use crate::model::{ClientId, ClientRecord, ExpiryState, PaymentStatus, Role, Session};
use crate::notify::{Notification, NotificationSink};
use crate::requests::CreateClientRequest;
use crate::service::{ClientRecordsService, ConfirmationPrompt};
use crate::store::{RecordCollection, Snapshot};

/// One-click speed caps offered on each roster row, in Mbps.
pub const SPEED_PRESETS: [u32; 3] = [10, 5, 1];

// ── Outcomes ─────────────────────────────────────────────────────────

/// Result of a roster action after its notification has been raised.
#[derive(Debug)]
pub enum ActionOutcome<T = ()> {
    Completed(T),
    /// Nothing to do; the record was already in the requested state.
    Skipped,
    /// The operator answered "no" to the confirmation prompt.
    Declined,
    /// Bulk action requested with an empty selection.
    NothingSelected,
    Failed(CoreError),
}

impl<T> ActionOutcome<T> {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&CoreError> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// `Skipped` and `Declined` are not errors; `NothingSelected` is.
    pub fn into_result(self) -> Result<Option<T>, CoreError> {
        match self {
            Self::Completed(value) => Ok(Some(value)),
            Self::Skipped | Self::Declined => Ok(None),
            Self::NothingSelected => Err(CoreError::NothingSelected),
            Self::Failed(e) => Err(e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkFailure {
    pub id: ClientId,
    pub reason: String,
}

/// Per-id tally of a bulk disconnect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkReport {
    pub requested: usize,
    pub succeeded: Vec<ClientId>,
    pub failed: Vec<BulkFailure>,
    /// Ids skipped because the run was cancelled first.
    pub not_attempted: Vec<ClientId>,
    pub cancelled: bool,
    /// Why the follow-up roster refresh failed, if it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_error: Option<String>,
}

impl BulkReport {
    /// Every requested id was disconnected and the roster was refreshed.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.not_attempted.is_empty() && self.refresh_error.is_none()
    }
}

/// Header counts for the roster view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RosterSummary {
    /// Records in the current view.
    pub shown: usize,
    pub total: usize,
    pub connected: usize,
    pub overdue: usize,
    pub selected: usize,
}

/// What the client portal shows about the signed-in subscriber.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageSummary {
    pub id: ClientId,
    pub name: String,
    pub plan: String,
    pub speed_mbps: u32,
    pub connected: bool,
    pub data_used_gb: f64,
    pub data_limit_gb: Option<f64>,
    pub usage_percent: Option<f64>,
    pub days_remaining: i32,
    pub expiry: ExpiryState,
    pub payment_status: PaymentStatus,
    pub next_payment: Option<chrono::NaiveDate>,
}

impl From<&ClientRecord> for UsageSummary {
    fn from(r: &ClientRecord) -> Self {
        Self {
            id: r.id.clone(),
            name: r.name.clone(),
            plan: r.plan.clone(),
            speed_mbps: r.speed_mbps,
            connected: r.connected,
            data_used_gb: r.data_used_gb,
            data_limit_gb: r.data_limit_gb,
            usage_percent: r.usage_percent(),
            days_remaining: r.days_remaining,
            expiry: r.expiry_state(),
            payment_status: r.payment_status,
            next_payment: r.next_payment,
        }
    }
}

// ── Loading guard ────────────────────────────────────────────────────

/// Holds the loading flag up for as long as it lives.
struct LoadingGuard<'a> {
    in_flight: &'a watch::Sender<usize>,
}

impl<'a> LoadingGuard<'a> {
    fn hold(in_flight: &'a watch::Sender<usize>) -> Self {
        in_flight.send_modify(|n| *n += 1);
        Self { in_flight }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.send_modify(|n| *n = n.saturating_sub(1));
    }
}

// ── RosterController ─────────────────────────────────────────────────

pub struct RosterController {
    service: Arc<dyn ClientRecordsService>,
    notifier: Arc<dyn NotificationSink>,
    prompt: Arc<dyn ConfirmationPrompt>,
    config: ServiceConfig,
    records: RecordCollection,
    query: watch::Sender<RosterQuery>,
    selection: watch::Sender<SelectionSet>,
    in_flight: watch::Sender<usize>,
}

impl RosterController {
    /// Create an empty roster. Call [`load`](Self::load) to populate it.
    pub fn new(
        service: Arc<dyn ClientRecordsService>,
        notifier: Arc<dyn NotificationSink>,
        prompt: Arc<dyn ConfirmationPrompt>,
        config: ServiceConfig,
    ) -> Self {
        let (query, _) = watch::channel(RosterQuery::default());
        let (selection, _) = watch::channel(SelectionSet::default());
        let (in_flight, _) = watch::channel(0);
        Self {
            service,
            notifier,
            prompt,
            config,
            records: RecordCollection::new(),
            query,
            selection,
            in_flight,
        }
    }

    // ── Observable state ─────────────────────────────────────────

    /// Full local collection, unfiltered.
    pub fn records(&self) -> Snapshot {
        self.records.snapshot()
    }

    pub fn subscribe_records(&self) -> watch::Receiver<Snapshot> {
        self.records.subscribe()
    }

    pub fn record(&self, id: &ClientId) -> Option<Arc<ClientRecord>> {
        self.records.get(id)
    }

    /// Bumped on every local mutation, including each `load`.
    pub fn version(&self) -> u64 {
        self.records.version()
    }

    pub fn query(&self) -> RosterQuery {
        self.query.borrow().clone()
    }

    pub fn subscribe_query(&self) -> watch::Receiver<RosterQuery> {
        self.query.subscribe()
    }

    pub fn selection(&self) -> SelectionSet {
        self.selection.borrow().clone()
    }

    pub fn subscribe_selection(&self) -> watch::Receiver<SelectionSet> {
        self.selection.subscribe()
    }

    /// True while any external call is outstanding.
    pub fn is_loading(&self) -> bool {
        *self.in_flight.borrow() > 0
    }

    /// Number of outstanding external calls.
    pub fn subscribe_loading(&self) -> watch::Receiver<usize> {
        self.in_flight.subscribe()
    }

    /// The filtered roster for the current query.
    pub fn view(&self) -> Vec<Arc<ClientRecord>> {
        compute_view(&self.records.snapshot(), &self.query.borrow())
    }

    pub fn summary(&self) -> RosterSummary {
        let all = self.records.snapshot();
        RosterSummary {
            shown: self.view().len(),
            total: all.len(),
            connected: all.iter().filter(|r| r.connected).count(),
            overdue: all
                .iter()
                .filter(|r| r.payment_status == PaymentStatus::Overdue)
                .count(),
            selected: self.selection.borrow().len(),
        }
    }

    // ── Query and selection ──────────────────────────────────────

    pub fn set_search(&self, term: impl Into<String>) {
        let term = term.into();
        self.query.send_modify(|q| q.search = term);
    }

    pub fn set_status_filter(&self, status: StatusFilter) {
        self.query.send_modify(|q| q.status = status);
    }

    pub fn set_query(&self, query: RosterQuery) {
        self.query.send_replace(query);
    }

    /// Returns whether `id` is selected afterwards.
    pub fn toggle_select(&self, id: ClientId) -> bool {
        let mut selected = false;
        self.selection.send_modify(|s| selected = s.toggle(id));
        selected
    }

    /// "Select all" against the current view.
    pub fn select_all(&self) {
        let view = self.view();
        self.selection
            .send_modify(|s| s.select_all(view.iter().map(|r| &**r)));
    }

    pub fn clear_selection(&self) {
        self.selection.send_modify(SelectionSet::clear);
    }

    // ── Actions ──────────────────────────────────────────────────

    /// Replace the local collection with the service's. On failure the
    /// collection is left as it was. Resolves to the number of records.
    pub async fn load(&self) -> ActionOutcome<usize> {
        let _loading = LoadingGuard::hold(&self.in_flight);
        match self.fetch_all().await {
            Ok(count) => ActionOutcome::Completed(count),
            Err(e) => self.fail("Failed to fetch clients", e),
        }
    }

    /// Disconnect one record after confirmation. A record that is already
    /// disconnected is left alone without calling the service.
    pub async fn disconnect(&self, id: &ClientId) -> ActionOutcome {
        let record = match self.lookup(id) {
            Ok(record) => record,
            Err(outcome) => return outcome,
        };
        if !record.connected {
            debug!(%id, "disconnect skipped, already disconnected");
            self.notifier.notify(Notification::info(format!(
                "{} is already disconnected",
                record.name
            )));
            return ActionOutcome::Skipped;
        }
        if !self
            .prompt
            .confirm(&format!("Disconnect {} from WiFi?", record.name))
        {
            return ActionOutcome::Declined;
        }

        let _loading = LoadingGuard::hold(&self.in_flight);
        debug!(%id, "dispatching disconnect");
        match bounded("Disconnect", self.config.action_timeout, self.service.disconnect(id)).await {
            Ok(()) => {
                // Provisional; the next load() is authoritative.
                self.records.update(id, |r| r.connected = false);
                info!(%id, "client disconnected");
                self.notifier.notify(Notification::success(format!(
                    "{} has been disconnected",
                    record.name
                )));
                ActionOutcome::Completed(())
            }
            Err(e) => self.fail("Failed to disconnect client", e),
        }
    }

    /// Disconnect every selected id, one call at a time, then refetch the
    /// roster and clear the selection. One notification covers the run,
    /// including a failed refetch.
    ///
    /// `cancel` is checked between ids. A cancelled run issues no further
    /// calls but still reconciles and clears the selection.
    pub async fn bulk_disconnect(
        &self,
        cancel: Option<&CancellationToken>,
    ) -> ActionOutcome<BulkReport> {
        let ids = self.selection.borrow().to_vec();
        if ids.is_empty() {
            self.notifier
                .notify(Notification::warning(CoreError::NothingSelected.to_string()));
            return ActionOutcome::NothingSelected;
        }
        if !self
            .prompt
            .confirm(&format!("Disconnect {} selected clients?", ids.len()))
        {
            return ActionOutcome::Declined;
        }

        let _loading = LoadingGuard::hold(&self.in_flight);
        let mut report = self.disconnect_each(ids, cancel).await;
        if let Err(e) = self.fetch_all().await {
            warn!(error = %e, "roster refresh after bulk disconnect failed");
            report.refresh_error = Some(e.to_string());
        }
        self.clear_selection();
        self.notifier.notify(bulk_notification(&report));
        ActionOutcome::Completed(report)
    }

    async fn disconnect_each(
        &self,
        ids: Vec<ClientId>,
        cancel: Option<&CancellationToken>,
    ) -> BulkReport {
        let mut report = BulkReport {
            requested: ids.len(),
            ..BulkReport::default()
        };
        let mut pending = ids.into_iter();
        while let Some(id) = pending.next() {
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                info!(remaining = pending.len() + 1, "bulk disconnect cancelled");
                report.cancelled = true;
                report.not_attempted.push(id);
                report.not_attempted.extend(pending);
                break;
            }
            debug!(%id, "bulk disconnect");
            match bounded("Disconnect", self.config.action_timeout, self.service.disconnect(&id)).await {
                Ok(()) => report.succeeded.push(id),
                Err(e) => {
                    warn!(%id, error = %e, "bulk disconnect failed for client");
                    report.failed.push(BulkFailure {
                        id,
                        reason: e.to_string(),
                    });
                }
            }
        }
        report
    }

    /// Cap a record's bandwidth. Local state is not touched.
    pub async fn limit_speed(&self, id: &ClientId, mbps: u32) -> ActionOutcome {
        if mbps == 0 {
            return self.fail(
                "Failed to limit speed",
                CoreError::ValidationFailed {
                    message: "speed limit must be a positive number of Mbps".into(),
                },
            );
        }
        let record = match self.lookup(id) {
            Ok(record) => record,
            Err(outcome) => return outcome,
        };

        let _loading = LoadingGuard::hold(&self.in_flight);
        debug!(%id, mbps, "dispatching speed limit");
        match bounded(
            "Speed limit",
            self.config.action_timeout,
            self.service.limit_speed(id, mbps),
        )
        .await
        {
            Ok(()) => {
                self.notifier.notify(Notification::success(format!(
                    "{} limited to {mbps}Mbps",
                    record.name
                )));
                ActionOutcome::Completed(())
            }
            Err(e) => self.fail("Failed to limit speed", e),
        }
    }

    pub async fn send_reminder(&self, id: &ClientId) -> ActionOutcome {
        let record = match self.lookup(id) {
            Ok(record) => record,
            Err(outcome) => return outcome,
        };

        let _loading = LoadingGuard::hold(&self.in_flight);
        debug!(%id, "dispatching payment reminder");
        match bounded(
            "Payment reminder",
            self.config.action_timeout,
            self.service.send_reminder(id),
        )
        .await
        {
            Ok(()) => {
                self.notifier.notify(Notification::success(format!(
                    "Reminder sent to {}",
                    record.name
                )));
                ActionOutcome::Completed(())
            }
            Err(e) => self.fail("Failed to send reminder", e),
        }
    }

    /// Validate and submit a new subscriber, then append the record the
    /// service returns to the local collection.
    pub async fn create_client(
        &self,
        request: CreateClientRequest,
    ) -> ActionOutcome<Arc<ClientRecord>> {
        let today = chrono::Local::now().date_naive();
        let draft = match request.into_record(today) {
            Ok(draft) => draft,
            Err(e) => return self.fail("Please fill in all required fields", e),
        };

        let _loading = LoadingGuard::hold(&self.in_flight);
        debug!(name = %draft.name, "dispatching create");
        match bounded("Create client", self.config.action_timeout, self.service.create(draft)).await {
            Ok(created) => {
                let id = created.id.clone();
                self.records.upsert(created);
                info!(%id, "client created");
                self.notifier
                    .notify(Notification::success("Client created successfully!"));
                match self.records.get(&id) {
                    Some(record) => ActionOutcome::Completed(record),
                    None => ActionOutcome::Failed(CoreError::Internal(format!(
                        "created client {id} missing from roster"
                    ))),
                }
            }
            Err(e) => self.fail("Failed to create client", e),
        }
    }

    /// Fetch the record belonging to a client session, matched by email.
    pub async fn usage_for(&self, session: &Session) -> ActionOutcome<UsageSummary> {
        // Access problems are the guard's to redirect, not a toast.
        if !session.has_role(Role::Client) {
            return ActionOutcome::Failed(CoreError::Unauthorized {
                message: "usage is only available to client accounts".into(),
            });
        }

        let _loading = LoadingGuard::hold(&self.in_flight);
        let email = session.user.email.as_str();
        debug!(%email, "loading usage");
        let records =
            match bounded("Loading usage", self.config.action_timeout, self.service.list()).await {
                Ok(records) => records,
                Err(e) => return self.fail("Failed to load usage", e),
            };
        match records
            .iter()
            .find(|r| r.email.eq_ignore_ascii_case(email))
        {
            Some(record) => ActionOutcome::Completed(UsageSummary::from(record)),
            None => self.fail(
                "Failed to load usage",
                CoreError::ClientNotFound {
                    identifier: email.to_owned(),
                },
            ),
        }
    }

    // ── Private helpers ──────────────────────────────────────────

    /// Replace the collection with the service's list and drop selected
    /// ids that no longer exist. Raises no notification.
    async fn fetch_all(&self) -> Result<usize, CoreError> {
        debug!("loading client roster");
        let records =
            bounded("Loading clients", self.config.action_timeout, self.service.list()).await?;
        let count = records.len();
        self.records.replace(records);
        let records = &self.records;
        self.selection.send_if_modified(|s| {
            let before = s.len();
            s.retain(|id| records.contains(id));
            s.len() != before
        });
        info!(count, "client roster loaded");
        Ok(count)
    }

    fn lookup<T>(&self, id: &ClientId) -> Result<Arc<ClientRecord>, ActionOutcome<T>> {
        self.records.get(id).ok_or_else(|| {
            self.fail(
                "Unknown client",
                CoreError::ClientNotFound {
                    identifier: id.to_string(),
                },
            )
        })
    }

    /// Raise the one error notification for a failed action.
    fn fail<T>(&self, context: &str, error: CoreError) -> ActionOutcome<T> {
        warn!(kind = %error.kind(), error = %error, "{context}");
        self.notifier
            .notify(Notification::error(format!("{context}: {error}")));
        ActionOutcome::Failed(error)
    }
}

fn bulk_notification(report: &BulkReport) -> Notification {
    let done = report.succeeded.len();
    let total = report.requested;
    if let Some(reason) = &report.refresh_error {
        let mut message = format!("{done} of {total} clients disconnected");
        if !report.failed.is_empty() {
            message.push_str(&format!(", {} failed", report.failed.len()));
        }
        if report.cancelled {
            message.push_str(", run cancelled");
        }
        message.push_str(&format!("; failed to fetch clients: {reason}"));
        Notification::error(message)
    } else if !report.failed.is_empty() {
        let mut message = format!(
            "Failed to disconnect some clients ({} of {total} failed)",
            report.failed.len()
        );
        if report.cancelled {
            message.push_str(", run cancelled");
        }
        Notification::error(message)
    } else if report.cancelled {
        Notification::warning(format!(
            "Bulk disconnect cancelled after {done} of {total} clients"
        ))
    } else {
        Notification::success(format!("{done} clients disconnected"))
    }
}
