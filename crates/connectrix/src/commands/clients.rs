//! Client roster command handlers.

use std::sync::Arc;

use tabled::Tabled;
use tokio_util::sync::CancellationToken;

use connectrix_core::{
    BulkReport, ClientId, ClientRecord, CreateClientRequest, ExpiryState, RosterQuery,
    SPEED_PRESETS, StatusFilter,
};

use crate::cli::{ClientsArgs, ClientsCommand, CreateArgs, FilterArgs, OutputFormat, StatusArg};
use crate::error::{CliError, exit_code};
use crate::output;

use super::App;
use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ClientRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Plan")]
    plan: String,
    #[tabled(rename = "Speed")]
    speed: String,
    #[tabled(rename = "Data")]
    data: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Payment")]
    payment: String,
    #[tabled(rename = "Expiry")]
    expiry: String,
}

impl From<&Arc<ClientRecord>> for ClientRow {
    fn from(c: &Arc<ClientRecord>) -> Self {
        Self {
            id: c.id.to_string(),
            name: c.name.clone(),
            email: c.email.clone(),
            plan: c.plan.clone(),
            speed: format!("{} Mbps", c.speed_mbps),
            data: data_usage(c),
            status: connection(c).into(),
            payment: c.payment_status.to_string(),
            expiry: expiry(c),
        }
    }
}

fn connection(c: &ClientRecord) -> &'static str {
    if c.connected { "Connected" } else { "Disconnected" }
}

fn data_usage(c: &ClientRecord) -> String {
    match c.data_limit_gb {
        Some(limit) => format!("{:.1} / {limit:.0} GB", c.data_used_gb),
        None => format!("{:.1} GB / unlimited", c.data_used_gb),
    }
}

fn expiry(c: &ClientRecord) -> String {
    match c.expiry_state() {
        ExpiryState::Expired => format!("Expired {} days ago", c.days_remaining.unsigned_abs()),
        state => format!("{} days ({state})", c.days_remaining),
    }
}

fn date(d: Option<chrono::NaiveDate>) -> String {
    d.map_or_else(|| "-".into(), |d| d.to_string())
}

fn detail(c: &Arc<ClientRecord>) -> String {
    let mut lines = vec![
        format!("ID:           {}", c.id),
        format!("Name:         {}", c.name),
        format!("Email:        {}", c.email),
        format!("Phone:        {}", c.phone),
        format!(
            "MAC:          {}",
            c.mac.as_ref().map_or_else(|| "-".into(), ToString::to_string)
        ),
        format!("Plan:         {} ({} Mbps)", c.plan, c.speed_mbps),
        format!("Data:         {}", data_usage(c)),
    ];
    if let Some(pct) = c.usage_percent() {
        lines.push(format!("Usage:        {pct:.0}%"));
    }
    lines.extend([
        format!("Status:       {}", connection(c)),
        format!("Subscription: {}", c.subscription_status),
        format!("Payment:      {}", c.payment_status),
        format!("Last paid:    {}", date(c.last_payment)),
        format!("Next due:     {}", date(c.next_payment)),
        format!("Expiry:       {}", expiry(c)),
        format!("Joined:       {}", date(c.join_date)),
    ]);
    lines.join("\n")
}

fn report_detail(r: &BulkReport) -> String {
    let ids = |ids: &[ClientId]| {
        ids.iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };
    let mut lines = vec![format!("Disconnected:  {}", ids(&r.succeeded))];
    for failure in &r.failed {
        lines.push(format!("Failed:        {} ({})", failure.id, failure.reason));
    }
    if !r.not_attempted.is_empty() {
        lines.push(format!("Not attempted: {}", ids(&r.not_attempted)));
    }
    if let Some(reason) = &r.refresh_error {
        lines.push(format!("Refresh:       failed ({reason})"));
    }
    lines.join("\n")
}

// ── Argument mapping ────────────────────────────────────────────────

impl From<StatusArg> for StatusFilter {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::All => Self::All,
            StatusArg::Connected => Self::Connected,
            StatusArg::Disconnected => Self::Disconnected,
            StatusArg::Overdue => Self::Overdue,
            StatusArg::Active => Self::Active,
        }
    }
}

impl From<FilterArgs> for RosterQuery {
    fn from(args: FilterArgs) -> Self {
        RosterQuery::new(args.search, args.filter.into())
    }
}

fn create_request(args: CreateArgs) -> Result<CreateClientRequest, CliError> {
    let join_date = args
        .join_date
        .as_deref()
        .map(|raw| util::parse_date("join-date", raw))
        .transpose()?;
    Ok(CreateClientRequest {
        name: args.name,
        email: args.email,
        phone: args.phone,
        plan: args.plan,
        speed_mbps: args.speed,
        data_limit_gb: args.data_limit,
        mac: args.mac,
        join_date,
    })
}

// ── Handler ─────────────────────────────────────────────────────────

async fn load(app: &App) -> Result<(), CliError> {
    let outcome =
        util::with_spinner("Loading clients", app.settings.quiet, app.roster.load()).await;
    util::settle(outcome, &app.prompt, "load")?;
    Ok(())
}

fn found(app: &App, raw: &str) -> Result<Arc<ClientRecord>, CliError> {
    app.roster
        .record(&ClientId::new(raw.trim()))
        .ok_or_else(|| CliError::NotFound {
            identifier: raw.into(),
        })
}

async fn create(args: CreateArgs, app: &App) -> Result<(), CliError> {
    let request = create_request(args)?;
    let outcome = app.roster.create_client(request).await;
    if let Some(record) = util::settle(outcome, &app.prompt, "create")? {
        let out =
            output::render_single(app.settings.output, &record, detail, |c| c.id.to_string());
        output::print_output(&out, app.settings.quiet);
    }
    Ok(())
}

#[allow(clippy::too_many_lines)]
pub async fn handle(args: ClientsArgs, app: &App) -> Result<(), CliError> {
    let format = app.settings.output;
    let quiet = app.settings.quiet;

    // Create needs no roster; every other command starts from a fresh one.
    if !matches!(args.command, ClientsCommand::Create(_)) {
        load(app).await?;
    }

    match args.command {
        ClientsCommand::List(filter) => {
            app.roster.set_query(filter.into());
            let view = app.roster.view();
            let out =
                output::render_list(format, &view, |c| ClientRow::from(c), |c| c.id.to_string());
            output::print_output(&out, quiet);
            if format == OutputFormat::Table {
                let s = app.roster.summary();
                output::print_output(
                    &format!(
                        "Showing {} of {} clients ({} connected, {} overdue)",
                        s.shown, s.total, s.connected, s.overdue
                    ),
                    quiet,
                );
            }
            Ok(())
        }

        ClientsCommand::Get { client } => {
            let record = found(app, &client)?;
            let out = output::render_single(format, &record, detail, |c| c.id.to_string());
            output::print_output(&out, quiet);
            Ok(())
        }

        ClientsCommand::Disconnect { client } => {
            let id = ClientId::new(client.trim());
            let outcome = app.roster.disconnect(&id).await;
            util::settle(outcome, &app.prompt, "disconnect")?;
            Ok(())
        }

        ClientsCommand::BulkDisconnect {
            clients,
            all_visible,
            filter,
        } => {
            if all_visible {
                app.roster.set_query(filter.into());
                app.roster.select_all();
            } else {
                for id in util::client_ids(&clients) {
                    if !app.roster.selection().contains(&id) {
                        app.roster.toggle_select(id);
                    }
                }
            }

            let cancel = CancellationToken::new();
            let on_interrupt = {
                let cancel = cancel.clone();
                tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        tracing::info!("interrupt received, stopping after the current client");
                        cancel.cancel();
                    }
                })
            };
            let outcome = app.roster.bulk_disconnect(Some(&cancel)).await;
            on_interrupt.abort();

            let Some(report) = util::settle(outcome, &app.prompt, "bulk-disconnect")? else {
                return Ok(());
            };
            let out = output::render_single(format, &report, report_detail, |r| {
                r.succeeded
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("\n")
            });
            output::print_output(&out, quiet);
            let missed = report.requested - report.succeeded.len();
            if report.is_clean() {
                Ok(())
            } else if missed > 0 {
                Err(CliError::ActionFailed {
                    message: format!(
                        "{missed} of {} clients were not disconnected",
                        report.requested
                    ),
                    exit: exit_code::GENERAL,
                })
            } else {
                Err(CliError::ActionFailed {
                    message: "clients were disconnected but the roster could not be refreshed"
                        .into(),
                    exit: exit_code::GENERAL,
                })
            }
        }

        ClientsCommand::LimitSpeed { client, mbps } => {
            if !SPEED_PRESETS.contains(&mbps) {
                tracing::debug!(mbps, presets = ?SPEED_PRESETS, "custom speed limit");
            }
            let id = ClientId::new(client.trim());
            let outcome = app.roster.limit_speed(&id, mbps).await;
            util::settle(outcome, &app.prompt, "limit-speed")?;
            Ok(())
        }

        ClientsCommand::SendReminder { client } => {
            let id = ClientId::new(client.trim());
            let outcome = app.roster.send_reminder(&id).await;
            util::settle(outcome, &app.prompt, "send-reminder")?;
            Ok(())
        }

        ClientsCommand::Create(args) => create(args, app).await,
    }
}
