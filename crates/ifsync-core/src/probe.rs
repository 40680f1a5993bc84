// ── Node prober ──

use std::collections::BTreeMap;
use std::net::IpAddr;

use tracing::{debug, warn};

use ifsync_snmp::{Oid, SnmpSession, oids};

use crate::model::{NodeState, Serial};
use crate::resolver::{self, ResolveError, Vendor};

/// Outcome of probing one candidate host. Reports are produced on
/// independent sessions and merged into the topology sequentially by
/// the discovery driver.
#[derive(Debug)]
pub struct ProbeReport {
    pub ip: IpAddr,
    pub state: NodeState,
    pub devices: BTreeMap<Serial, BTreeMap<u32, String>>,
}

impl ProbeReport {
    fn inactive(ip: IpAddr) -> Self {
        Self {
            ip,
            state: NodeState::Inactive,
            devices: BTreeMap::new(),
        }
    }
}

/// Probe one node: classify it active/inactive and, when active,
/// resolve its devices and interfaces.
///
/// Every failure mode short of a successful multi-device resolution is
/// "inactive": an unreachable agent, a vendor that yields no serials,
/// and a stack whose join produced nothing are all counted the same
/// way. A node is only active if it yields at least one device.
pub async fn probe<S: SnmpSession>(session: &S, ip: IpAddr) -> ProbeReport {
    // The vendor tag comes from sysObjectID; an agent that cannot
    // answer this answers nothing.
    let sys_object_id = Oid::from(oids::SYS_OBJECT_ID).child(0);
    let vendor = match session.get(&sys_object_id).await {
        Ok(value) => match value.as_str().and_then(|s| s.parse::<Oid>().ok()) {
            Some(oid) => Vendor::from_sys_object_id(&oid),
            None => Vendor::Unsupported(0),
        },
        Err(err) => {
            warn!(node = %ip, %err, "node did not respond, marking inactive");
            return ProbeReport::inactive(ip);
        }
    };

    match resolver::resolve(vendor, session).await {
        Ok(devices) if devices.is_empty() => {
            warn!(node = %ip, %vendor, "no interface joined to any serial, marking inactive");
            ProbeReport::inactive(ip)
        }
        Ok(devices) => {
            debug!(node = %ip, %vendor, devices = devices.len(), "node active");
            ProbeReport {
                ip,
                state: NodeState::Active,
                devices,
            }
        }
        Err(ResolveError::NoSerials { vendor }) => {
            warn!(node = %ip, %vendor, "no serial discovered, marking inactive");
            ProbeReport::inactive(ip)
        }
        Err(ResolveError::Snmp(err)) => {
            warn!(node = %ip, %err, "probe failed, marking inactive");
            ProbeReport::inactive(ip)
        }
    }
}
