//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` / `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use ifsync_config::ConfigError;
use ifsync_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONNECTION: i32 = 7;
    pub const CONFIG: i32 = 64;
    pub const SCHEMA: i32 = 65;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(ifsync::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: ifsync config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(ifsync::no_config),
        help(
            "Create one with: ifsync config init\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("No community string configured for profile '{profile}'")]
    #[diagnostic(
        code(ifsync::no_community),
        help(
            "Store one with: ifsync config set-community\n\
             Or set the IFSYNC_COMMUNITY environment variable."
        )
    )]
    NoCommunity { profile: String },

    #[error(transparent)]
    #[diagnostic(code(ifsync::config))]
    Config(Box<figment::Error>),

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(ifsync::validation))]
    Validation { field: String, reason: String },

    // ── Records ──────────────────────────────────────────────────────

    #[error("Record source {path} is missing required columns: {missing}")]
    #[diagnostic(
        code(ifsync::schema_mismatch),
        help(
            "The header row must name every configured field.\n\
             Check device_field, interface_field, and info_fields in your profile."
        )
    )]
    SchemaMismatch { path: String, missing: String },

    #[error("Cache error: {message}")]
    #[diagnostic(
        code(ifsync::cache),
        help("Re-run the producing stage without --from-cache to rebuild it.")
    )]
    Cache { message: String },

    #[error("No usable host records in the node list")]
    #[diagnostic(
        code(ifsync::no_hosts),
        help("Expected zone-file shaped lines: <name> [ttl] IN A <address>")
    )]
    NoHosts,

    // ── Network ──────────────────────────────────────────────────────

    #[error("SNMP failure: {0}")]
    #[diagnostic(
        code(ifsync::snmp),
        help("Check the community string and that UDP port 161 is reachable.")
    )]
    Snmp(#[from] ifsync_snmp::SnmpError),

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to serialize config: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ProfileNotFound { .. }
            | Self::NoConfig { .. }
            | Self::NoCommunity { .. }
            | Self::Config(_) => exit_code::CONFIG,
            Self::SchemaMismatch { .. } => exit_code::SCHEMA,
            Self::Validation { .. } => exit_code::USAGE,
            Self::Snmp(err) if err.is_unreachable() => exit_code::CONNECTION,
            _ => exit_code::GENERAL,
        }
    }
}

// ── Error translation at the crate boundary ──────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::SchemaMismatch { path, missing } => Self::SchemaMismatch { path, missing },
            CoreError::Config { message } => Self::Validation {
                field: "fields".into(),
                reason: message,
            },
            CoreError::Cache { message } => Self::Cache { message },
            CoreError::Snmp(err) => Self::Snmp(err),
            CoreError::Io(err) => Self::Io(err),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::NoCommunity { profile } => Self::NoCommunity { profile },
            ConfigError::Serialization(err) => Self::TomlSer(err),
            ConfigError::Figment(err) => Self::Config(err),
            ConfigError::Io(err) => Self::Io(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_class() {
        let err = CliError::NoCommunity {
            profile: "default".into(),
        };
        assert_eq!(err.exit_code(), exit_code::CONFIG);

        let err = CliError::SchemaMismatch {
            path: "records".into(),
            missing: "note".into(),
        };
        assert_eq!(err.exit_code(), exit_code::SCHEMA);

        let err = CliError::Snmp(ifsync_snmp::SnmpError::Timeout {
            target: "10.0.0.1:161".into(),
            retries: 2,
        });
        assert_eq!(err.exit_code(), exit_code::CONNECTION);
    }
}
