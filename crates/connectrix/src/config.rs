//! CLI configuration -- thin wrapper around `connectrix_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--output, --color, --timeout).

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

use connectrix_core::ServiceConfig;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use connectrix_config::{Config, config_path, load_config, save_config};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Everything a command handler needs, with flags applied over config.
#[derive(Debug, Clone)]
pub struct Settings {
    pub output: OutputFormat,
    pub color: bool,
    pub quiet: bool,
    pub yes: bool,
    pub service: ServiceConfig,
    pub session_path: PathBuf,
}

/// Flag > env > config file > default.
pub fn resolve(global: &GlobalOpts, cfg: &Config) -> Result<Settings, CliError> {
    let output = match global.output {
        Some(format) => format,
        None => parse_value::<OutputFormat>("defaults.output", &cfg.defaults.output)?,
    };
    let color_mode = match global.color {
        Some(mode) => mode,
        None => parse_value::<ColorMode>("defaults.color", &cfg.defaults.color)?,
    };

    let mut service = cfg.service_config();
    if let Some(secs) = global.timeout {
        service.action_timeout = Duration::from_secs(secs);
    }

    Ok(Settings {
        output,
        color: crate::output::should_color(color_mode),
        quiet: global.quiet,
        yes: global.yes,
        service,
        session_path: cfg.session_path(),
    })
}

fn parse_value<T: ValueEnum>(field: &str, raw: &str) -> Result<T, CliError> {
    T::from_str(raw, true).map_err(|reason| CliError::Validation {
        field: field.into(),
        reason,
    })
}
