//! Command handlers and the wiring they share.

pub mod auth;
pub mod clients;
pub mod config_cmd;
pub mod usage;
pub mod util;

use std::sync::Arc;

use connectrix_config::FileSessionStore;
use connectrix_core::service::memory::{InMemoryClientRecords, InMemoryIdentity};
use connectrix_core::{AccessDecision, AccessGuard, Role, RosterController, Session};

use crate::cli::Command;
use crate::config::Settings;
use crate::error::CliError;

use self::util::{ConsoleSink, DialoguerPrompt};

/// Guard, roster, and the collaborators behind them, built once per run.
pub struct App {
    pub settings: Settings,
    pub guard: AccessGuard,
    pub roster: RosterController,
    pub prompt: Arc<DialoguerPrompt>,
}

impl App {
    pub fn new(settings: Settings) -> Self {
        let sink = Arc::new(ConsoleSink::new(settings.color, settings.quiet));
        let prompt = Arc::new(DialoguerPrompt::new(settings.yes));

        let guard = AccessGuard::new(
            Arc::new(InMemoryIdentity::new(&settings.service)),
            Arc::new(FileSessionStore::new(settings.session_path.clone())),
            sink.clone(),
            settings.service.clone(),
        );
        let roster = RosterController::new(
            Arc::new(InMemoryClientRecords::new(&settings.service)),
            sink,
            prompt.clone(),
            settings.service.clone(),
        );

        Self {
            settings,
            guard,
            roster,
            prompt,
        }
    }

    /// Restore the stored session and check it against `role`.
    pub async fn require(&self, role: Role) -> Result<Session, CliError> {
        let session = self.guard.restore_session().await;
        match (self.guard.authorize(&[role]), session) {
            (AccessDecision::Permit, Some(session)) => Ok(session),
            (AccessDecision::RedirectToUnauthorized, Some(session)) => Err(CliError::WrongRole {
                required: role.to_string(),
                current: session.role.to_string(),
            }),
            _ => Err(CliError::NotSignedIn),
        }
    }
}

/// Dispatch a command that needs the session guard or the roster.
pub async fn dispatch(cmd: Command, app: &App) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => auth::login(args, app).await,
        Command::Logout => auth::logout(app).await,
        Command::Whoami => auth::whoami(app).await,
        Command::Route { path } => auth::route(&path, app).await,
        Command::Clients(args) => {
            app.require(Role::Admin).await?;
            clients::handle(args, app).await
        }
        Command::Usage => {
            let session = app.require(Role::Client).await?;
            usage::handle(&session, app).await
        }
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "command does not use the dashboard services".into(),
        )),
    }
}
