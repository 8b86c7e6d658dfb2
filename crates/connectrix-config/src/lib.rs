//! Shared configuration for Connectrix front ends.
//!
//! TOML config loading (defaults, file, `CONNECTRIX_` environment),
//! platform paths, translation to `connectrix_core::ServiceConfig`, and a
//! file-backed [`SessionStore`] so a login survives between invocations.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use connectrix_core::{CoreError, ServiceConfig, Session, SessionStore};

/// Prefix for environment overrides. Nested keys use `__`, e.g.
/// `CONNECTRIX_DEFAULTS__TIMEOUT=5`.
pub const ENV_PREFIX: &str = "CONNECTRIX_";

const OUTPUT_FORMATS: [&str; 5] = ["table", "json", "json-compact", "yaml", "plain"];
const COLOR_MODES: [&str; 3] = ["auto", "always", "never"];

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub session: SessionSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Upper bound on a single service call, in seconds. 0 disables it.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Simulated latency of the built-in demo services. Unset keeps the
    /// service defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            latency_ms: None,
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    connectrix_core::DEFAULT_ACTION_TIMEOUT.as_secs()
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SessionSettings {
    /// Where the signed-in session is kept. Defaults to the platform
    /// data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Config {
    /// Reject values no front end could act on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !OUTPUT_FORMATS.contains(&self.defaults.output.as_str()) {
            return Err(ConfigError::Validation {
                field: "defaults.output".into(),
                reason: format!(
                    "expected one of {}, got '{}'",
                    OUTPUT_FORMATS.join(", "),
                    self.defaults.output
                ),
            });
        }
        if !COLOR_MODES.contains(&self.defaults.color.as_str()) {
            return Err(ConfigError::Validation {
                field: "defaults.color".into(),
                reason: format!(
                    "expected one of {}, got '{}'",
                    COLOR_MODES.join(", "),
                    self.defaults.color
                ),
            });
        }
        Ok(())
    }

    /// Runtime tuning for the core services.
    pub fn service_config(&self) -> ServiceConfig {
        let mut cfg = ServiceConfig {
            action_timeout: Duration::from_secs(self.defaults.timeout),
            ..ServiceConfig::default()
        };
        if let Some(ms) = self.defaults.latency_ms {
            cfg = cfg.with_latency(Duration::from_millis(ms));
        }
        cfg
    }

    /// Configured session path, or the platform default.
    pub fn session_path(&self) -> PathBuf {
        self.session.path.clone().unwrap_or_else(default_session_path)
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("io", "connectrix", "connectrix")
}

fn dirs_fallback(kind: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(kind);
    p.push("connectrix");
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Default location of the persisted session.
pub fn default_session_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".local/share").join("session.toml"),
        |dirs| dirs.data_dir().join("session.toml"),
    )
}

// ── Loading / saving ────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` (missing file is fine) layered under the environment.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    config.validate()?;
    Ok(config)
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── FileSessionStore ────────────────────────────────────────────────

/// Session persisted as a small TOML file, readable only by its owner on
/// Unix.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn persistence(action: &str, path: &Path, err: impl std::fmt::Display) -> CoreError {
    CoreError::Persistence {
        message: format!("{action} {}: {err}", path.display()),
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>, CoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(persistence("cannot read", &self.path, e)),
        };
        toml::from_str(&raw)
            .map(Some)
            .map_err(|e| persistence("cannot parse", &self.path, e))
    }

    fn save(&self, session: &Session) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| persistence("cannot create", parent, e))?;
        }
        let body =
            toml::to_string_pretty(session).map_err(|e| persistence("cannot encode", &self.path, e))?;
        std::fs::write(&self.path, body).map_err(|e| persistence("cannot write", &self.path, e))?;
        restrict_permissions(&self.path)?;
        tracing::debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(persistence("cannot remove", &self.path, e)),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), CoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| persistence("cannot restrict", path, e))
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
fn restrict_permissions(_path: &Path) -> Result<(), CoreError> {
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use connectrix_core::{Role, UserIdentity};
    use figment::Jail;
    use pretty_assertions::assert_eq;

    fn session() -> Session {
        Session {
            user: UserIdentity {
                id: "admin-1".into(),
                name: "Admin User".into(),
                email: "admin@connectrix.io".into(),
            },
            role: Role::Admin,
            token: "admin-1.00000000-0000-0000-0000-000000000000".into(),
        }
    }

    #[test]
    fn defaults_apply_without_a_file() {
        Jail::expect_with(|_| {
            let cfg = load_config_from(Path::new("missing.toml")).unwrap();
            assert_eq!(cfg, Config::default());
            assert_eq!(cfg.service_config().action_timeout, Duration::from_secs(10));
            Ok(())
        });
    }

    #[test]
    fn file_and_env_layer_over_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                "[defaults]\noutput = \"json\"\ntimeout = 3\n",
            )?;
            jail.set_env("CONNECTRIX_DEFAULTS__LATENCY_MS", "0");
            jail.set_env("CONNECTRIX_SESSION__PATH", "/tmp/elsewhere.toml");

            let cfg = load_config_from(Path::new("config.toml")).unwrap();
            assert_eq!(cfg.defaults.output, "json");
            assert_eq!(cfg.defaults.color, "auto");
            assert_eq!(cfg.session_path(), PathBuf::from("/tmp/elsewhere.toml"));

            let svc = cfg.service_config();
            assert_eq!(svc.action_timeout, Duration::from_secs(3));
            assert!(svc.list_latency.is_zero());
            Ok(())
        });
    }

    #[test]
    fn unknown_output_is_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[defaults]\noutput = \"xml\"\n")?;
            let err = load_config_from(Path::new("config.toml")).unwrap_err();
            assert!(err.to_string().contains("defaults.output"), "{err}");
            Ok(())
        });
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.defaults.timeout = 25;
        save_config_to(&cfg, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("timeout = 25"), "{text}");
    }

    #[test]
    fn file_store_persists_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("data").join("session.toml"));

        assert!(store.load().unwrap().is_none());
        store.save(&session()).unwrap();
        assert_eq!(store.load().unwrap(), Some(session()));

        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn file_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.toml"));
        store.save(&session()).unwrap();
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn corrupt_session_file_is_a_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.toml");
        std::fs::write(&path, "not = [valid").unwrap();
        let err = FileSessionStore::new(&path).load().unwrap_err();
        assert!(matches!(err, CoreError::Persistence { .. }));
    }
}
