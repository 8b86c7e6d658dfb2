//! Config subcommand handlers.

use std::path::PathBuf;

use dialoguer::{Input, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

use super::util::prompt_err;

const OUTPUT_CHOICES: [&str; 5] = ["table", "json", "json-compact", "yaml", "plain"];
const COLOR_CHOICES: [&str; 3] = ["auto", "always", "never"];

fn render(cfg: &Config) -> Result<String, CliError> {
    toml::to_string_pretty(cfg).map_err(|e| CliError::Config(e.into()))
}

fn parse_number(key: &str, value: &str) -> Result<u64, CliError> {
    value.trim().parse().map_err(|_| CliError::Validation {
        field: key.into(),
        reason: format!("expected a non-negative integer, got '{value}'"),
    })
}

/// Apply a single dotted `key = value` assignment.
fn set_value(cfg: &mut Config, key: &str, value: &str) -> Result<(), CliError> {
    match key {
        "defaults.output" => cfg.defaults.output = value.into(),
        "defaults.color" => cfg.defaults.color = value.into(),
        "defaults.timeout" => cfg.defaults.timeout = parse_number(key, value)?,
        "defaults.latency_ms" => {
            cfg.defaults.latency_ms = if value.is_empty() {
                None
            } else {
                Some(parse_number(key, value)?)
            };
        }
        "session.path" => {
            cfg.session.path = (!value.is_empty()).then(|| PathBuf::from(value));
        }
        other => {
            return Err(CliError::Validation {
                field: "key".into(),
                reason: format!(
                    "unknown key '{other}' (expected defaults.output, defaults.color, \
                     defaults.timeout, defaults.latency_ms, or session.path)"
                ),
            });
        }
    }
    cfg.validate()?;
    Ok(())
}

fn interactive_init() -> Result<Config, CliError> {
    let mut cfg = Config::default();

    let output = Select::new()
        .with_prompt("Default output format")
        .items(&OUTPUT_CHOICES)
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    let color = Select::new()
        .with_prompt("Color output")
        .items(&COLOR_CHOICES)
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    let timeout: u64 = Input::new()
        .with_prompt("Request timeout in seconds (0 disables)")
        .default(cfg.defaults.timeout)
        .interact_text()
        .map_err(prompt_err)?;

    cfg.defaults.output = OUTPUT_CHOICES.get(output).copied().unwrap_or("table").into();
    cfg.defaults.color = COLOR_CHOICES.get(color).copied().unwrap_or("auto").into();
    cfg.defaults.timeout = timeout;
    Ok(cfg)
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => {
            let cfg = if global.yes || !std::io::IsTerminal::is_terminal(&std::io::stdin()) {
                Config::default()
            } else {
                interactive_init()?
            };
            let path = config::save_config(&cfg)?;
            eprintln!("✓ Config written to {}", path.display());
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            output::print_output(&render(&cfg)?, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config()?;
            set_value(&mut cfg, &key, &value)?;
            config::save_config(&cfg)?;
            eprintln!("✓ {key} = {value}");
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn set_known_keys() {
        let mut cfg = Config::default();
        set_value(&mut cfg, "defaults.timeout", "3").unwrap();
        set_value(&mut cfg, "defaults.output", "yaml").unwrap();
        set_value(&mut cfg, "session.path", "/tmp/s.toml").unwrap();
        assert_eq!(cfg.defaults.timeout, 3);
        assert_eq!(cfg.defaults.output, "yaml");
        assert_eq!(cfg.session_path(), PathBuf::from("/tmp/s.toml"));
    }

    #[test]
    fn set_rejects_unknown_keys_and_bad_values() {
        let mut cfg = Config::default();
        assert!(set_value(&mut cfg, "profiles.home", "x").is_err());
        assert!(set_value(&mut cfg, "defaults.timeout", "soon").is_err());
        assert!(set_value(&mut cfg, "defaults.color", "sometimes").is_err());
    }
}
