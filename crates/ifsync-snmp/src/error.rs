// ── Session-layer error type ──
//
// Consumers in ifsync-core never see async-snmp's error surface
// directly; everything is folded into these variants at the adapter.

use thiserror::Error;

use crate::oid::Oid;

#[derive(Debug, Error)]
pub enum SnmpError {
    /// The agent never answered within the session timeout, across all
    /// retries. The prober treats this as an inactive node.
    #[error("no response from {target} after {retries} retries")]
    Timeout { target: String, retries: u32 },

    #[error("cannot open SNMP session to {target}: {reason}")]
    SessionOpen { target: String, reason: String },

    /// The agent answered with an SNMP-level error status.
    #[error("agent error for {oid}: {status}")]
    Agent { oid: Oid, status: String },

    /// The requested object does not exist on the agent.
    #[error("no such object: {oid}")]
    NoSuchObject { oid: Oid },

    #[error("malformed OID: {text}")]
    BadOid { text: String },

    #[error("transport error: {0}")]
    Transport(String),
}

impl SnmpError {
    /// Whether this error means "the node is unreachable" as opposed to
    /// "the node answered something we could not use".
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::SessionOpen { .. })
    }
}
