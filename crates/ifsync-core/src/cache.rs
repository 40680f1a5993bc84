// ── Run caches ──
//
// Each pipeline stage can snapshot its output so a later invocation
// resumes from disk instead of re-walking the network:
//
//   zone cache    — discovered hosts, zone-file shaped so the discover
//                   stage re-reads it with the same parser as live input
//   record cache  — recognized topology after identify, tab-delimited
//   unmatched     — records the reconciler could not place, re-loadable
//                   as an ordinary record source

use std::fmt::Write as _;
use std::net::IpAddr;
use std::path::Path;

use tracing::info;

use crate::config::FieldConfig;
use crate::error::CoreError;
use crate::model::{NodeState, Serial, Topology};
use crate::record::Record;

// ── Zone cache ──────────────────────────────────────────────────────

/// Write every node as a `hostname. IN A <ip>` line (AAAA for v6).
/// The output is accepted verbatim by [`crate::discover::parse_host_records`].
pub fn write_zone_cache(path: &Path, topology: &Topology) -> Result<(), CoreError> {
    let mut out = String::new();
    for node in topology.nodes() {
        let rtype = match node.ip {
            IpAddr::V4(_) => "A",
            IpAddr::V6(_) => "AAAA",
        };
        writeln!(out, "{}.\tIN\t{}\t{}", node.hostname, rtype, node.ip)
            .map_err(|e| CoreError::Cache {
                message: e.to_string(),
            })?;
    }
    std::fs::write(path, out)?;
    info!(path = %path.display(), nodes = topology.nodes().count(), "zone cache written");
    Ok(())
}

// ── Record cache ────────────────────────────────────────────────────

const FIXED_COLUMNS: [&str; 5] = ["ip", "hostname", "serial", "interface", "iid"];

/// Snapshot the recognized slice of the topology: one row per
/// recognized interface, fixed columns then the configured info fields.
pub fn write_record_cache(
    path: &Path,
    topology: &Topology,
    fields: &FieldConfig,
) -> Result<(), CoreError> {
    let mut out = String::new();
    let mut header: Vec<&str> = FIXED_COLUMNS.to_vec();
    header.extend(fields.info_fields.iter().map(String::as_str));
    out.push_str(&header.join("\t"));
    out.push('\n');

    let mut rows = 0usize;
    for node in topology.nodes() {
        for device in topology.devices_of(node.ip) {
            if !device.recognized {
                continue;
            }
            for iface in topology.interfaces_of(&device.key) {
                if !iface.recognized {
                    continue;
                }
                let mut cells = vec![
                    node.ip.to_string(),
                    node.hostname.clone(),
                    device.key.serial.to_string(),
                    iface.key.name.clone(),
                    iface.iid.to_string(),
                ];
                for field in &fields.info_fields {
                    cells.push(iface.info.get(field).cloned().unwrap_or_default());
                }
                out.push_str(&cells.join("\t"));
                out.push('\n');
                rows += 1;
            }
        }
    }
    std::fs::write(path, out)?;
    info!(path = %path.display(), rows, "record cache written");
    Ok(())
}

/// Rebuild a recognized-only topology from a record cache. Every row
/// yields an active node, a recognized device, and a recognized
/// interface carrying the cached info fields.
pub fn read_record_cache(path: &Path, fields: &FieldConfig) -> Result<Topology, CoreError> {
    let text = std::fs::read_to_string(path)?;
    let origin = path.display().to_string();

    let mut lines = text.lines().enumerate();
    let Some((_, header)) = lines.find(|(_, line)| !line.trim().is_empty()) else {
        return Err(CoreError::Cache {
            message: format!("{origin}: empty record cache"),
        });
    };
    let columns: Vec<&str> = header.split('\t').map(str::trim).collect();
    let mut wanted: Vec<&str> = FIXED_COLUMNS.to_vec();
    wanted.extend(fields.info_fields.iter().map(String::as_str));
    let missing: Vec<&str> = wanted
        .iter()
        .copied()
        .filter(|w| !columns.contains(w))
        .collect();
    if !missing.is_empty() {
        return Err(CoreError::SchemaMismatch {
            path: origin,
            missing: missing.join(", "),
        });
    }

    let cell = |cells: &[&str], name: &str| -> String {
        columns
            .iter()
            .position(|c| *c == name)
            .and_then(|i| cells.get(i).copied())
            .unwrap_or_default()
            .to_string()
    };

    let mut topology = Topology::new();
    // `lines` resumes after the header, wherever it sat in the file.
    for (idx, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let cells: Vec<&str> = line.split('\t').map(str::trim).collect();
        let parse = || -> Option<(IpAddr, u32)> {
            let ip = cell(&cells, "ip").parse().ok()?;
            let iid = cell(&cells, "iid").parse().ok()?;
            Some((ip, iid))
        };
        let Some((ip, iid)) = parse() else {
            return Err(CoreError::Cache {
                message: format!("{origin}: unparseable row at line {}", idx + 1),
            });
        };

        topology.insert_node(ip, cell(&cells, "hostname"));
        topology.set_node_state(ip, NodeState::Active);
        let dev = topology.merge_device(ip, Serial::new(cell(&cells, "serial")));
        let name = cell(&cells, "interface");
        topology.merge_interface(dev.clone(), name.clone(), iid);
        let key = crate::model::InterfaceKey { device: dev, name };
        if let Some(iface) = topology.interface_mut(&key) {
            for field in &fields.info_fields {
                let value = cell(&cells, field);
                if !value.is_empty() {
                    iface.info.insert(field.clone(), value);
                }
            }
        }
        topology.mark_recognized(&key);
    }
    Ok(topology)
}

// ── Unmatched records ───────────────────────────────────────────────

/// Dump the reconciler's side list in the same delimited shape a
/// [`crate::source::DelimitedFileSource`] reads back.
pub fn write_unmatched(
    path: &Path,
    records: &[Record],
    fields: &FieldConfig,
) -> Result<(), CoreError> {
    let columns = fields.all_columns();
    let mut out = String::new();
    out.push_str(&columns.join("\t"));
    out.push('\n');
    for record in records {
        let cells: Vec<&str> = columns
            .iter()
            .map(|c| record.get(c).unwrap_or_default())
            .collect();
        out.push_str(&cells.join("\t"));
        out.push('\n');
    }
    std::fs::write(path, out)?;
    info!(path = %path.display(), records = records.len(), "unmatched records written");
    Ok(())
}
