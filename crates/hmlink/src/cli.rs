//! Clap derive structures for the `hmlink` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// hmlink -- bridge HomeMatic CCU actuators to an accessory protocol
#[derive(Debug, Parser)]
#[command(
    name = "hmlink",
    version,
    about = "Bridge HomeMatic CCU switches and blinds",
    long_about = "Exposes the switch and blind channels of a HomeMatic CCU as \
        smart-home accessories.\n\n\
        Talks to the CCU's JSON-RPC API, keeps the session alive and \
        reconciles optimistic accessory state with the hub.",
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
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "HMLINK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Hub address: host[:port] or full URL (overrides config)
    #[arg(long, short = 'a', global = true)]
    pub address: Option<String>,

    /// Hub username (overrides config)
    #[arg(long, short = 'u', global = true)]
    pub user: Option<String>,

    /// Hub password (prefer HM_CCU_PASSWORD)
    #[arg(long, global = true, hide = true)]
    pub password: Option<String>,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output format
    #[arg(long, short = 'o', default_value = "table", global = true)]
    pub output: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the bridge until interrupted
    Serve,

    /// List bridged devices
    #[command(alias = "ls")]
    Devices(DevicesArgs),

    /// Read the current value of a device
    Get(GetArgs),

    /// Write a value to a device
    Set(SetArgs),

    /// Inspect configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Command Args ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    /// Also read each device's current value
    #[arg(long)]
    pub values: bool,
}

#[derive(Debug, Args)]
pub struct GetArgs {
    /// Channel address, e.g. NEQ0000001:1
    pub address: String,
}

#[derive(Debug, Args)]
pub struct SetArgs {
    /// Channel address, e.g. NEQ0000001:1
    pub address: String,

    /// Value on the accessory scale: 0/1 for switches, 0-100 for blinds
    #[arg(allow_negative_numbers = true)]
    pub value: i64,

    /// Wait for the grace period and print the value the hub reports
    #[arg(long)]
    pub wait: bool,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration (password masked)
    Show,
    /// Print the default config file path
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
