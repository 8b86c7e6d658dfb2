//! Clap derive structures for the `connectrix` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// connectrix -- WiFi subscriber dashboard for the terminal
#[derive(Debug, Parser)]
#[command(
    name = "connectrix",
    version,
    about = "Manage Connectrix WiFi subscribers from the command line",
    long_about = "Admin roster and subscriber portal for a Connectrix WiFi service.\n\n\
        Sign in with `connectrix login`, then manage clients as an admin or\n\
        check your own usage as a subscriber.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Output format (overrides config)
    #[arg(long, short = 'o', env = "CONNECTRIX_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output (overrides config)
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Per-request timeout in seconds, 0 to disable (overrides config)
    #[arg(long, env = "CONNECTRIX_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and remember the session
    Login(LoginArgs),

    /// Sign out and forget the stored session
    Logout,

    /// Show who is signed in
    Whoami,

    /// Manage subscribers (admin)
    #[command(alias = "cl")]
    Clients(ClientsArgs),

    /// Show your own plan and data usage (client)
    Usage,

    /// Show which view a path resolves to for the current session
    Route {
        /// Dashboard path, e.g. /admin/dashboard
        path: String,
    },

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  AUTH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    Admin,
    Client,
}

#[derive(Args)]
pub struct LoginArgs {
    /// Account email
    #[arg(long, short = 'e')]
    pub email: String,

    /// Password (prompted when omitted)
    #[arg(long, env = "CONNECTRIX_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Role to sign in as
    #[arg(long, short = 'r', default_value = "client")]
    pub role: RoleArg,
}

impl std::fmt::Debug for LoginArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginArgs")
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "****"))
            .field("role", &self.role)
            .finish()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CLIENTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    #[default]
    All,
    Connected,
    Disconnected,
    Overdue,
    Active,
}

/// Search and status filter shared by roster commands.
#[derive(Debug, Default, Args)]
pub struct FilterArgs {
    /// Case-insensitive match on name, email, or phone
    #[arg(long, short = 's', default_value = "")]
    pub search: String,

    /// Status filter
    #[arg(long, short = 'f', value_enum, default_value = "all")]
    pub filter: StatusArg,
}

#[derive(Debug, Args)]
pub struct ClientsArgs {
    #[command(subcommand)]
    pub command: ClientsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ClientsCommand {
    /// List subscribers
    #[command(alias = "ls")]
    List(FilterArgs),

    /// Show one subscriber
    Get {
        /// Client ID
        client: String,
    },

    /// Disconnect a subscriber from WiFi
    Disconnect {
        /// Client ID
        client: String,
    },

    /// Disconnect several subscribers in one run
    BulkDisconnect {
        /// Client IDs to disconnect
        #[arg(required_unless_present = "all_visible", conflicts_with = "all_visible")]
        clients: Vec<String>,

        /// Select every subscriber matching the filter instead
        #[arg(long)]
        all_visible: bool,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Cap a subscriber's bandwidth
    LimitSpeed {
        /// Client ID
        client: String,

        /// New limit in Mbps (presets: 10, 5, 1)
        mbps: u32,
    },

    /// Send a payment reminder
    #[command(alias = "remind")]
    SendReminder {
        /// Client ID
        client: String,
    },

    /// Register a new subscriber
    Create(CreateArgs),
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub phone: String,

    /// Plan name: basic, premium, or enterprise
    #[arg(long)]
    pub plan: String,

    /// Bandwidth in Mbps
    #[arg(long)]
    pub speed: Option<u32>,

    /// Monthly data cap in GB (omit for unlimited)
    #[arg(long)]
    pub data_limit: Option<f64>,

    /// Device MAC address
    #[arg(long)]
    pub mac: Option<String>,

    /// Join date (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub join_date: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Print the config file location
    Path,

    /// Set a configuration value
    Set {
        /// Config key, e.g. "defaults.timeout"
        key: String,

        /// Value to set
        value: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
