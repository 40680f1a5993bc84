// ── Core error types ──
//
// Soft conditions (unreachable node, malformed table row, unmatched
// record) never surface here; they are logged and counted. These
// variants are the run-fatal and stage-fatal failures.

use thiserror::Error;

/// Unified error type for the engine crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The external record source does not carry the configured
    /// columns. Run-fatal: reconciling against a wrong schema would
    /// silently mismatch every record.
    #[error("record source '{path}' is missing configured columns: {missing}")]
    SchemaMismatch { path: String, missing: String },

    /// Required configuration is absent (field names, sync target).
    #[error("invalid configuration: {message}")]
    Config { message: String },

    #[error("malformed cache data: {message}")]
    Cache { message: String },

    #[error(transparent)]
    Snmp(#[from] ifsync_snmp::SnmpError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
