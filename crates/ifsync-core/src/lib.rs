//! Discovery and reconciliation engine for the ifsync workspace.
//!
//! The pipeline has three stages, each of which can be a run's terminus
//! (resumable via the caches in [`cache`]):
//!
//! 1. **Discover** — [`discover::discover`] probes candidate hosts over
//!    SNMP with a bounded worker pool. Each active node yields devices
//!    (chassis serials) and their interfaces via the vendor-specific
//!    joins in [`resolver`], merged into the [`model::Topology`] arena.
//! 2. **Identify** — [`reconcile::Reconciler`] matches external records
//!    against the topology, marking devices/interfaces recognized,
//!    collecting duplicate conflicts into a transient [`conflict::ConflictLog`],
//!    and side-listing unmatched records. [`conflict::resolve`] then
//!    drains the log through a [`conflict::Chooser`] (auto policy or an
//!    interactive adapter supplied by the CLI).
//! 3. **Update** — [`update::update`] writes the reconciled interface
//!    metadata back to each device (default target: ifAlias).
//!
//! The topology is single-owner: probing runs on independent per-node
//! sessions and the per-node results are merged sequentially, so no
//! locks guard the maps.

pub mod cache;
pub mod config;
pub mod conflict;
pub mod discover;
pub mod error;
pub mod model;
pub mod probe;
pub mod reconcile;
pub mod record;
pub mod resolver;
pub mod source;
pub mod update;

pub use config::{FieldConfig, RunConfig};
pub use conflict::{AutoChooser, Chooser, Choice, ConflictKind, ConflictLog, ResolveSummary};
pub use discover::{DiscoverSummary, HostRecord, SessionFactory};
pub use error::CoreError;
pub use model::{Device, DeviceKey, Interface, InterfaceKey, Node, NodeState, Serial, Topology};
pub use reconcile::Reconciler;
pub use record::Record;
pub use resolver::Vendor;
pub use source::{DelimitedFileSource, RecordSource};
pub use update::UpdateSummary;
