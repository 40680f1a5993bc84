//! Clap derive structures for the `ifsync` CLI.
//!
//! Defines the command tree, global flags, and shared argument types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// ifsync -- reconcile live SNMP inventory with external records
#[derive(Debug, Parser)]
#[command(
    name = "ifsync",
    version,
    about = "Discover network devices over SNMP and synchronize interface metadata",
    long_about = "Walks a fleet of SNMP agents, joins vendor interface and chassis\n\
        tables into per-serial device inventories, reconciles them against a\n\
        delimited record export, and writes the merged metadata back to the\n\
        devices. Each stage can snapshot its output so later runs resume\n\
        from cache instead of re-walking the network.",
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
    /// Site profile to use
    #[arg(long, short = 'p', env = "IFSYNC_PROFILE", global = true)]
    pub profile: Option<String>,

    /// SNMP community string (overrides profile and keyring)
    #[arg(long, env = "IFSYNC_COMMUNITY", global = true, hide_env = true)]
    pub community: Option<String>,

    /// Output format (default from config, else table)
    #[arg(long, short = 'o', env = "IFSYNC_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output (default from config, else auto)
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

    /// Per-request SNMP timeout in seconds
    #[arg(long, env = "IFSYNC_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Append structured logs to this file
    #[arg(long, env = "IFSYNC_LOG_FILE", global = true)]
    pub log_file: Option<PathBuf>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
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
    /// Probe the node list and report what answered
    #[command(alias = "disc")]
    Discover(DiscoverArgs),

    /// Discover, then reconcile inventory records onto the topology
    #[command(alias = "id")]
    Identify(IdentifyArgs),

    /// Identify, then write merged metadata back to the devices
    #[command(alias = "up")]
    Update(UpdateArgs),

    /// Manage configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Stage arguments ──────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DiscoverArgs {
    /// Zone-file shaped node list ("-" for stdin; default from profile)
    #[arg(long, short = 'n')]
    pub nodes: Option<PathBuf>,

    /// Write the discovered hosts to this zone cache
    #[arg(long)]
    pub cache: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct IdentifyArgs {
    /// Zone-file shaped node list ("-" for stdin; default from profile)
    #[arg(long, short = 'n')]
    pub nodes: Option<PathBuf>,

    /// Resume from a zone cache instead of a node list
    #[arg(long, conflicts_with = "nodes")]
    pub from_cache: Option<PathBuf>,

    /// Delimited record export (default from profile)
    #[arg(long, short = 's')]
    pub source: Option<PathBuf>,

    /// Record column delimiter
    #[arg(long)]
    pub delimiter: Option<char>,

    /// Resolve conflicts without prompting (keep existing values)
    #[arg(long)]
    pub auto: bool,

    /// Also offer initialization of unrecognized interfaces
    #[arg(long)]
    pub deep: bool,

    /// Write the recognized topology to this record cache
    #[arg(long)]
    pub cache: Option<PathBuf>,

    /// Write records that matched nothing to this file
    #[arg(long)]
    pub unmatched: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    #[command(flatten)]
    pub identify: IdentifyArgs,

    /// Resume from a record cache instead of running the pipeline
    #[arg(long, conflicts_with_all = ["nodes", "from_cache", "source"])]
    pub from_record_cache: Option<PathBuf>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive configuration wizard
    Init,

    /// Show the effective configuration
    Show,

    /// Print the config file path
    Path,

    /// Store a community string in the system keyring
    SetCommunity {
        /// Profile to store it for (default: active profile)
        #[arg(long)]
        profile: Option<String>,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn update_rejects_mixed_cache_sources() {
        let err = Cli::try_parse_from([
            "ifsync",
            "update",
            "--from-record-cache",
            "records",
            "--nodes",
            "hosts",
        ]);
        assert!(err.is_err());
    }
}
