// End-to-end pipeline tests over simulated sessions: discover a small
// network, reconcile external records against it, resolve the raised
// conflicts, and verify the exact SNMP writes the update stage issues.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};

use ifsync_core::conflict::{self, Chooser, Choice, ConflictLog, DuplicateDecision};
use ifsync_core::discover::{self, HostRecord, SessionFactory};
use ifsync_core::update;
use ifsync_core::{FieldConfig, InterfaceKey, Record, Reconciler, Serial};
use ifsync_snmp::{Oid, SimSession, SnmpError, SnmpValue, oids};

// ── Helpers ─────────────────────────────────────────────────────────

struct SimFactory {
    sessions: Mutex<HashMap<IpAddr, Arc<SimSession>>>,
}

impl SimFactory {
    fn new(sessions: impl IntoIterator<Item = (IpAddr, SimSession)>) -> Self {
        Self {
            sessions: Mutex::new(
                sessions
                    .into_iter()
                    .map(|(ip, s)| (ip, Arc::new(s)))
                    .collect(),
            ),
        }
    }

    fn session(&self, ip: IpAddr) -> Arc<SimSession> {
        let guard = self.sessions.lock().unwrap();
        guard.get(&ip).cloned().unwrap()
    }
}

impl SessionFactory for SimFactory {
    type Session = Arc<SimSession>;

    async fn open(&self, ip: IpAddr) -> Result<Self::Session, SnmpError> {
        let guard = self
            .sessions
            .lock()
            .map_err(|_| SnmpError::Transport("poisoned".into()))?;
        Ok(guard
            .get(&ip)
            .cloned()
            .unwrap_or_else(|| Arc::new(SimSession::unreachable())))
    }
}

fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

fn fields() -> FieldConfig {
    FieldConfig {
        device_field: "serial".into(),
        interface_field: "interface".into(),
        info_fields: vec!["jack".into(), "note".into()],
    }
}

/// A single-chassis Cisco switch with two ethernet interfaces.
fn switch_session(serial: &str) -> SimSession {
    SimSession::new()
        .scalar(
            &[1, 3, 6, 1, 2, 1, 1, 2, 0],
            SnmpValue::Str("1.3.6.1.4.1.9.1.1".into()),
        )
        .table(
            oids::IF_TYPE,
            &[(101, SnmpValue::Int(6)), (102, SnmpValue::Int(6))],
        )
        .table(
            oids::IF_NAME,
            &[
                (101, SnmpValue::Str("Gi1/0/1".into())),
                (102, SnmpValue::Str("Gi1/0/2".into())),
            ],
        )
        .table(oids::ENT_PHYSICAL_CLASS, &[(1, SnmpValue::Int(3))])
        .table(oids::ENT_PHYSICAL_SERIAL, &[(1, SnmpValue::Str(serial.into()))])
}

fn records() -> Vec<Record> {
    vec![
        // Recognizes Gi1/0/1; lower-case serial, blank note.
        Record::new()
            .with("serial", "sw-a")
            .with("interface", "Gi1/0/1")
            .with("jack", "A-01")
            .with("note", ""),
        // Auto-matches "1" to Gi1/0/1, raising a duplicate.
        Record::new()
            .with("serial", "SW-A")
            .with("interface", "1")
            .with("jack", "B-07")
            .with("note", "swap"),
        // No such device: lands on the unmatched side list.
        Record::new()
            .with("serial", "NOPE")
            .with("interface", "Gi1/0/1")
            .with("jack", "X-99"),
        // No such interface but all-blank info: silently ignored.
        Record::new()
            .with("serial", "SW-A")
            .with("interface", "Gi9/9/9")
            .with("jack", "")
            .with("note", ""),
    ]
}

async fn discovered(factory: &SimFactory) -> ifsync_core::Topology {
    let hosts = vec![
        HostRecord { hostname: "sw-a".into(), ip: ip("10.0.0.1") },
        HostRecord { hostname: "dead".into(), ip: ip("10.0.0.2") },
    ];
    let (topology, summary) = discover::discover(factory, &hosts, 4).await;
    assert_eq!(summary.active, 1);
    assert_eq!(summary.inactive, 1);
    assert_eq!(summary.interfaces, 2);
    topology
}

// ── Full runs ───────────────────────────────────────────────────────

#[tokio::test]
async fn full_run_keeps_first_record_and_writes_alias() {
    let factory = SimFactory::new([
        (ip("10.0.0.1"), switch_session("SW-A")),
        (ip("10.0.0.2"), SimSession::unreachable()),
    ]);
    let mut topology = discovered(&factory).await;

    let cfg = fields();
    let mut conflicts = ConflictLog::new();
    let mut reconciler = Reconciler::new(&cfg, true);
    let raised = reconciler.synchronize(&mut topology, &mut conflicts, records());
    assert_eq!(raised, 1);
    assert_eq!(reconciler.unmatched().len(), 1);
    assert_eq!(reconciler.unmatched()[0].get("serial"), Some("NOPE"));

    let mut chooser = conflict::AutoChooser;
    let summary = conflict::resolve(&mut topology, conflicts, &cfg, &mut chooser, false);
    assert_eq!(summary.duplicates_kept, 1);
    assert_eq!(summary.duplicates_replaced, 0);
    // Gi1/0/2 never saw a record.
    assert_eq!(summary.unrecognized_interfaces, 1);

    let sync_oid = Oid::from(oids::IF_ALIAS);
    let pushed = update::update(&topology, &factory, &cfg, &sync_oid).await;
    assert_eq!(pushed.written, 1);
    assert_eq!(pushed.failed, 0);

    // The first record won: its blank note renders as the marker.
    let writes = factory.session(ip("10.0.0.1")).writes();
    assert_eq!(
        writes,
        vec![(sync_oid.child(101), "jack:A-01,note:(empty)".to_string())]
    );

    // The duplicate never leaked into the topology.
    let device = topology.find_device(&Serial::new("SW-A")).unwrap();
    let key = InterfaceKey { device, name: "Gi1/0/1".into() };
    let iface = topology.interface(&key).unwrap();
    assert_eq!(iface.info.get("jack").map(String::as_str), Some("A-01"));
    topology.check_invariants().unwrap();
}

#[tokio::test]
async fn replacing_the_duplicate_changes_the_written_encoding() {
    struct ReplaceAll;
    impl Chooser for ReplaceAll {
        fn choose_duplicate(&mut self, _d: &DuplicateDecision) -> Choice {
            Choice::Replace
        }
        fn initialize_interface(
            &mut self,
            _key: &InterfaceKey,
            _fields: &FieldConfig,
        ) -> Option<std::collections::BTreeMap<String, String>> {
            None
        }
    }

    let factory = SimFactory::new([
        (ip("10.0.0.1"), switch_session("SW-A")),
        (ip("10.0.0.2"), SimSession::unreachable()),
    ]);
    let mut topology = discovered(&factory).await;

    let cfg = fields();
    let mut conflicts = ConflictLog::new();
    let mut reconciler = Reconciler::new(&cfg, true);
    reconciler.synchronize(&mut topology, &mut conflicts, records());

    let mut chooser = ReplaceAll;
    let summary = conflict::resolve(&mut topology, conflicts, &cfg, &mut chooser, false);
    assert_eq!(summary.duplicates_replaced, 1);

    let sync_oid = Oid::from(oids::IF_ALIAS);
    let pushed = update::update(&topology, &factory, &cfg, &sync_oid).await;
    assert_eq!(pushed.written, 1);

    let writes = factory.session(ip("10.0.0.1")).writes();
    assert_eq!(
        writes,
        vec![(sync_oid.child(101), "jack:B-07,note:swap".to_string())]
    );
}
