// ── Updater ──
//
// Pushes reconciled interface metadata back to the devices: one SNMP
// string write per recognized interface, non-fatal per failure.

use serde::Serialize;
use tracing::{info, warn};

use ifsync_snmp::{Oid, SnmpSession};

use crate::config::FieldConfig;
use crate::discover::SessionFactory;
use crate::model::{Interface, Topology};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpdateSummary {
    pub written: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Render the interface's info map as `field:value` pairs comma-joined
/// in configured order. A present-but-blank value renders as the
/// literal `(empty)`; fields the map never received are omitted.
pub fn encode_info(iface: &Interface, fields: &FieldConfig) -> String {
    let mut pairs = Vec::new();
    for name in &fields.info_fields {
        let Some(value) = iface.info.get(name) else {
            continue;
        };
        let rendered = if value.trim().is_empty() {
            "(empty)"
        } else {
            value.as_str()
        };
        pairs.push(format!("{name}:{rendered}"));
    }
    pairs.join(",")
}

/// Write every recognized interface's encoding to `sync_oid.<iid>` on
/// the owning node's session. Deterministic sorted order; a failed
/// write is logged and counted, the run continues.
pub async fn update<F: SessionFactory>(
    topology: &Topology,
    factory: &F,
    fields: &FieldConfig,
    sync_oid: &Oid,
) -> UpdateSummary {
    let mut summary = UpdateSummary::default();

    for node in topology.nodes() {
        // Collect this node's pending writes before opening a session;
        // a node with nothing to write is not contacted at all.
        let mut writes: Vec<(Oid, String, String)> = Vec::new();
        for device in topology.devices_of(node.ip) {
            if !device.recognized {
                continue;
            }
            for iface in topology.interfaces_of(&device.key) {
                if !iface.recognized {
                    continue;
                }
                let encoded = encode_info(iface, fields);
                if encoded.is_empty() {
                    summary.skipped += 1;
                    continue;
                }
                writes.push((
                    sync_oid.clone().child(iface.iid),
                    encoded,
                    iface.key.to_string(),
                ));
            }
        }
        if writes.is_empty() {
            continue;
        }

        let session = match factory.open(node.ip).await {
            Ok(session) => session,
            Err(err) => {
                warn!(node = %node.ip, %err, "cannot open session for update");
                summary.failed += writes.len();
                continue;
            }
        };
        for (oid, encoded, iface) in writes {
            match session.set_string(&oid, &encoded).await {
                Ok(()) => {
                    info!(interface = %iface, value = %encoded, "updated");
                    summary.written += 1;
                }
                Err(err) => {
                    warn!(interface = %iface, %err, "update write failed");
                    summary.failed += 1;
                }
            }
        }
    }

    info!(
        written = summary.written,
        failed = summary.failed,
        skipped = summary.skipped,
        "update complete"
    );
    summary
}
