//! Login, logout, whoami, and route resolution.

use serde::Serialize;

use connectrix_core::{LoginRequest, Role, Route, Session};

use crate::cli::{LoginArgs, RoleArg};
use crate::error::CliError;
use crate::output;

use super::App;
use super::util::prompt_err;

#[derive(Debug, Serialize)]
struct SessionView<'a> {
    id: &'a str,
    name: &'a str,
    email: &'a str,
    role: Role,
    landing: &'static str,
}

impl<'a> From<&'a Session> for SessionView<'a> {
    fn from(s: &'a Session) -> Self {
        Self {
            id: &s.user.id,
            name: &s.user.name,
            email: &s.user.email,
            role: s.role,
            landing: connectrix_core::landing_for(s.role).path(),
        }
    }
}

fn detail(v: &SessionView<'_>) -> String {
    [
        format!("Name:      {}", v.name),
        format!("Email:     {}", v.email),
        format!("Role:      {}", v.role),
        format!("Dashboard: {}", v.landing),
    ]
    .join("\n")
}

fn print_session(session: &Session, app: &App) {
    let view = SessionView::from(session);
    let out = output::render_single(app.settings.output, &view, detail, |v| v.email.to_owned());
    output::print_output(&out, app.settings.quiet);
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Admin => Self::Admin,
            RoleArg::Client => Self::Client,
        }
    }
}

pub async fn login(args: LoginArgs, app: &App) -> Result<(), CliError> {
    let password = match args.password {
        Some(p) => p,
        None => rpassword::prompt_password("Password: ").map_err(prompt_err)?,
    };
    let request = LoginRequest::new(args.email, password, args.role.into());

    // The guard has already raised the failure notification.
    let success = app.guard.login(request).await.map_err(CliError::reported)?;
    tracing::debug!(landing = %success.landing, "login landing");
    print_session(&success.session, app);
    Ok(())
}

pub async fn logout(app: &App) -> Result<(), CliError> {
    app.guard.logout().await;
    Ok(())
}

pub async fn whoami(app: &App) -> Result<(), CliError> {
    let session = app
        .guard
        .restore_session()
        .await
        .ok_or(CliError::NotSignedIn)?;
    print_session(&session, app);
    Ok(())
}

#[derive(Debug, Serialize)]
struct RouteView {
    requested: &'static str,
    shown: &'static str,
    protected: bool,
}

pub async fn route(path: &str, app: &App) -> Result<(), CliError> {
    app.guard.restore_session().await;
    let requested = Route::from_path(path);
    let view = RouteView {
        requested: requested.path(),
        shown: app.guard.resolve(requested).path(),
        protected: requested.is_protected(),
    };
    let out = output::render_single(
        app.settings.output,
        &view,
        |v| {
            if v.requested == v.shown {
                v.shown.to_owned()
            } else {
                format!("{} -> {}", v.requested, v.shown)
            }
        },
        |v| v.shown.to_owned(),
    );
    output::print_output(&out, app.settings.quiet);
    Ok(())
}
