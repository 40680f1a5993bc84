//! SNMP session layer for the ifsync workspace.
//!
//! This crate isolates everything protocol-shaped from the engine in
//! `ifsync-core`:
//!
//! - **[`SnmpSession`]** — the seam the engine talks through: scalar
//!   `get`, table `walk` (entries keyed by their index suffix), and
//!   `set_string` for the write-back stage.
//! - **[`UdpSession`]** — production implementation over the
//!   `async-snmp` client with per-session timeout and bounded retries.
//! - **[`SimSession`]** — deterministic in-memory implementation used by
//!   engine tests; no sockets involved.
//! - **[`oids`]** — the literal OID tables (IF-MIB, ENTITY-MIB and the
//!   Cisco / Brocade / HP enterprise arcs) the resolver joins over.

pub mod error;
pub mod oid;
pub mod oids;
pub mod session;
pub mod sim;
pub mod value;

pub use error::SnmpError;
pub use oid::Oid;
pub use session::{SessionConfig, SnmpSession, UdpSession};
pub use sim::SimSession;
pub use value::SnmpValue;
