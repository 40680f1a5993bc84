// ── Discovery driver ──
//
// Consumes candidate host records, probes them with a bounded worker
// pool, and merges per-node results sequentially into the topology.

use std::net::IpAddr;

use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use serde::Serialize;
use tracing::{debug, info};

use ifsync_snmp::{SnmpError, SnmpSession};

use crate::model::{NodeState, Topology};
use crate::probe::{self, ProbeReport};

/// One candidate host from the node-list input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRecord {
    pub hostname: String,
    pub ip: IpAddr,
}

/// Hands out one session per probed host. The update stage reuses the
/// same seam to re-open sessions for write-back.
#[allow(async_fn_in_trait)]
pub trait SessionFactory {
    type Session: SnmpSession;

    async fn open(&self, ip: IpAddr) -> Result<Self::Session, SnmpError>;
}

/// Per-stage counters, printed at stage end.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiscoverSummary {
    pub probed: usize,
    pub active: usize,
    pub inactive: usize,
    pub devices: usize,
    pub interfaces: usize,
}

// ── Node-list parsing ───────────────────────────────────────────────

/// Parse zone-transfer-style host lines.
///
/// A line matches when it starts with a hostname-like token and later
/// carries a record-type token `A` or `AAAA` followed by an address of
/// the matching family. Everything else (SOA/NS/MX/TXT records,
/// comments, noise) is ignored.
pub fn parse_host_records(input: &str) -> Vec<HostRecord> {
    input.lines().filter_map(parse_host_line).collect()
}

fn parse_host_line(line: &str) -> Option<HostRecord> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let first = *tokens.first()?;
    if first.starts_with(';') || first.starts_with('#') {
        return None;
    }
    // The prefix must look like a name, not itself a type token.
    if first == "A" || first == "AAAA" || first.parse::<IpAddr>().is_ok() {
        return None;
    }

    for pair in tokens.windows(2).skip(1) {
        let [rtype, addr] = pair else { continue };
        let ip: IpAddr = match addr.parse() {
            Ok(ip) => ip,
            Err(_) => continue,
        };
        let family_ok = match *rtype {
            "A" => ip.is_ipv4(),
            "AAAA" => ip.is_ipv6(),
            _ => continue,
        };
        if family_ok {
            return Some(HostRecord {
                hostname: first.trim_end_matches('.').to_string(),
                ip,
            });
        }
    }
    None
}

// ── Driver ──────────────────────────────────────────────────────────

/// Discover the topology for a set of candidate hosts.
///
/// Probing is latency-bound, so up to `workers` nodes are probed
/// concurrently; reports are merged one at a time, keeping the
/// topology single-owner. Inactive nodes are dropped from the topology
/// (and counted), matching the model's "a node only exists if it
/// yields devices" lifecycle.
pub async fn discover<F: SessionFactory>(
    factory: &F,
    hosts: &[HostRecord],
    workers: usize,
) -> (Topology, DiscoverSummary) {
    let mut topology = Topology::new();
    for host in hosts {
        topology.insert_node(host.ip, host.hostname.clone());
    }

    let mut pending: FuturesUnordered<_> = FuturesUnordered::new();
    let mut queue = hosts.iter();
    let workers = workers.max(1);
    let mut summary = DiscoverSummary::default();

    loop {
        while pending.len() < workers {
            let Some(host) = queue.next() else { break };
            pending.push(probe_host(factory, host.ip));
        }
        let Some(report) = pending.next().await else { break };
        merge_report(&mut topology, &mut summary, report);
    }

    summary.devices = topology.device_count();
    summary.interfaces = topology.interface_count();
    info!(
        probed = summary.probed,
        active = summary.active,
        inactive = summary.inactive,
        devices = summary.devices,
        interfaces = summary.interfaces,
        "discovery complete"
    );
    (topology, summary)
}

async fn probe_host<F: SessionFactory>(factory: &F, ip: IpAddr) -> ProbeReport {
    match factory.open(ip).await {
        Ok(session) => probe::probe(&session, ip).await,
        Err(err) => {
            debug!(node = %ip, %err, "session open failed");
            ProbeReport {
                ip,
                state: NodeState::Inactive,
                devices: Default::default(),
            }
        }
    }
}

fn merge_report(topology: &mut Topology, summary: &mut DiscoverSummary, report: ProbeReport) {
    summary.probed += 1;
    match report.state {
        NodeState::Active => {
            summary.active += 1;
            topology.set_node_state(report.ip, NodeState::Active);
            for (serial, interfaces) in report.devices {
                let device = topology.merge_device(report.ip, serial);
                for (iid, name) in interfaces {
                    topology.merge_interface(device.clone(), name, iid);
                }
            }
        }
        NodeState::Inactive | NodeState::Unprobed => {
            summary.inactive += 1;
            topology.remove_node(report.ip);
        }
    }
}
