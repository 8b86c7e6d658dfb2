//! Client portal: the signed-in subscriber's own plan and usage.

use connectrix_core::{ExpiryState, Session, UsageSummary};

use crate::error::CliError;
use crate::output;

use super::App;
use super::util;

fn detail(u: &UsageSummary) -> String {
    let data = match (u.data_limit_gb, u.usage_percent) {
        (Some(limit), Some(pct)) => format!("{:.1} of {limit:.0} GB ({pct:.0}%)", u.data_used_gb),
        _ => format!("{:.1} GB (unlimited)", u.data_used_gb),
    };
    let expiry = match u.expiry {
        ExpiryState::Expired => format!("expired {} days ago", u.days_remaining.unsigned_abs()),
        ExpiryState::Expiring => format!("{} days left, renew soon", u.days_remaining),
        ExpiryState::Current => format!("{} days left", u.days_remaining),
    };
    [
        format!("Name:     {}", u.name),
        format!("Plan:     {} ({} Mbps)", u.plan, u.speed_mbps),
        format!(
            "Status:   {}",
            if u.connected { "Connected" } else { "Disconnected" }
        ),
        format!("Data:     {data}"),
        format!("Payment:  {}", u.payment_status),
        format!(
            "Next due: {}",
            u.next_payment.map_or_else(|| "-".into(), |d| d.to_string())
        ),
        format!("Validity: {expiry}"),
    ]
    .join("\n")
}

pub async fn handle(session: &Session, app: &App) -> Result<(), CliError> {
    let outcome = util::with_spinner(
        "Loading usage",
        app.settings.quiet,
        app.roster.usage_for(session),
    )
    .await;
    if let Some(usage) = util::settle(outcome, &app.prompt, "usage")? {
        let out = output::render_single(app.settings.output, &usage, detail, |u| {
            u.usage_percent
                .map_or_else(|| u.data_used_gb.to_string(), |p| format!("{p:.0}"))
        });
        output::print_output(&out, app.settings.quiet);
    }
    Ok(())
}
