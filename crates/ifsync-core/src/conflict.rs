// ── Conflict log and resolution ──
//
// The conflict bags are a side-map scoped to the identify stage, not a
// permanent field on the entities: after `resolve` drains them the
// steady-state model is conflict-free.
//
// Resolution is split into a pure decision core (`plan`, which renders
// every pending decision deterministically) and the `Chooser` seam the
// CLI plugs its prompts into; the engine never touches a terminal.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::FieldConfig;
use crate::model::{DeviceKey, InterfaceKey, Topology};
use crate::record::Record;

// ── Conflict bags ───────────────────────────────────────────────────

/// Interface-level conflict classes. `Duplicate` is the only one the
/// reconciler raises today; the device-level bag below is the
/// extension point for future kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConflictKind {
    Duplicate,
}

/// Pending conflicts collected during one reconciliation pass.
#[derive(Debug, Default)]
pub struct ConflictLog {
    interfaces: BTreeMap<InterfaceKey, BTreeMap<ConflictKind, Vec<Record>>>,
    devices: BTreeMap<DeviceKey, Vec<Record>>,
}

impl ConflictLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_duplicate(&mut self, key: InterfaceKey, record: Record) {
        self.interfaces
            .entry(key)
            .or_default()
            .entry(ConflictKind::Duplicate)
            .or_default()
            .push(record);
    }

    /// Device-level catch-all; nothing raises these yet.
    pub fn add_device_conflict(&mut self, key: DeviceKey, record: Record) {
        self.devices.entry(key).or_default().push(record);
    }

    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty() && self.devices.is_empty()
    }

    /// Total pending records across all bags.
    pub fn len(&self) -> usize {
        let iface: usize = self
            .interfaces
            .values()
            .flat_map(|kinds| kinds.values())
            .map(Vec::len)
            .sum();
        let dev: usize = self.devices.values().map(Vec::len).sum();
        iface + dev
    }

    fn take_duplicates(&mut self, key: &InterfaceKey) -> Vec<Record> {
        self.interfaces
            .get_mut(key)
            .and_then(|kinds| kinds.remove(&ConflictKind::Duplicate))
            .unwrap_or_default()
    }

    fn take_device(&mut self, key: &DeviceKey) -> Vec<Record> {
        self.devices.remove(key).unwrap_or_default()
    }
}

// ── Decisions ───────────────────────────────────────────────────────

/// A duplicate record against an already-recognized interface, with
/// both sides rendered as comma-joined configured-field lists.
#[derive(Debug, Clone)]
pub struct DuplicateDecision {
    pub key: InterfaceKey,
    /// Existing ("old") values.
    pub old: String,
    /// The record's candidate ("new") values.
    pub new: String,
    pub record: Record,
}

/// Everything the resolver will act on, in deterministic sorted order.
#[derive(Debug)]
pub enum Decision {
    Duplicate(DuplicateDecision),
    UnrecognizedInterface(InterfaceKey),
    UnrecognizedDevice(DeviceKey),
    /// Drained from the device-level catch-all bag.
    UnsupportedDeviceConflict { key: DeviceKey, records: usize },
}

/// Pure decision core: walk nodes → devices → interfaces in sorted key
/// order and list every pending decision without mutating anything.
pub fn plan(topology: &Topology, conflicts: &ConflictLog, fields: &FieldConfig) -> Vec<Decision> {
    let mut decisions = Vec::new();
    for node in topology.nodes() {
        for device in topology.devices_of(node.ip) {
            if device.recognized {
                if let Some(records) = conflicts.devices.get(&device.key) {
                    decisions.push(Decision::UnsupportedDeviceConflict {
                        key: device.key.clone(),
                        records: records.len(),
                    });
                }
                for iface in topology.interfaces_of(&device.key) {
                    if iface.recognized {
                        let Some(kinds) = conflicts.interfaces.get(&iface.key) else {
                            continue;
                        };
                        let old = render_info(&iface.info, fields);
                        for record in kinds.get(&ConflictKind::Duplicate).into_iter().flatten() {
                            decisions.push(Decision::Duplicate(DuplicateDecision {
                                key: iface.key.clone(),
                                old: old.clone(),
                                new: record.render_info(fields),
                                record: record.clone(),
                            }));
                        }
                    } else {
                        decisions.push(Decision::UnrecognizedInterface(iface.key.clone()));
                    }
                }
            } else {
                decisions.push(Decision::UnrecognizedDevice(device.key.clone()));
            }
        }
    }
    decisions
}

fn render_info(info: &BTreeMap<String, String>, fields: &FieldConfig) -> String {
    fields
        .info_fields
        .iter()
        .map(|name| info.get(name).map_or("", String::as_str))
        .collect::<Vec<_>>()
        .join(",")
}

// ── Chooser seam ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// Keep the existing values, drop the record.
    Keep,
    /// Overwrite the interface's info from the record, field by field.
    Replace,
}

/// UI adapter the resolver consults. Implementations must be
/// single-threaded; the resolve pass is strictly sequential so prompts
/// never interleave.
pub trait Chooser {
    fn choose_duplicate(&mut self, decision: &DuplicateDecision) -> Choice;

    /// Offered for unrecognized entities in deep interactive mode:
    /// return the info values to initialize the interface with (one
    /// entry per configured field), or `None` to leave it alone.
    fn initialize_interface(
        &mut self,
        key: &InterfaceKey,
        fields: &FieldConfig,
    ) -> Option<BTreeMap<String, String>>;
}

/// The `auto` policy: keep old values, log, never initialize.
#[derive(Debug, Default)]
pub struct AutoChooser;

impl Chooser for AutoChooser {
    fn choose_duplicate(&mut self, decision: &DuplicateDecision) -> Choice {
        info!(
            interface = %decision.key,
            old = %decision.old,
            new = %decision.new,
            "duplicate record, keeping existing values"
        );
        Choice::Keep
    }

    fn initialize_interface(
        &mut self,
        _key: &InterfaceKey,
        _fields: &FieldConfig,
    ) -> Option<BTreeMap<String, String>> {
        None
    }
}

// ── Resolution ──────────────────────────────────────────────────────

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolveSummary {
    pub duplicates_kept: usize,
    pub duplicates_replaced: usize,
    pub unrecognized_interfaces: usize,
    pub unrecognized_devices: usize,
    pub initialized: usize,
    pub device_conflicts: usize,
}

/// Drain the conflict log against the topology.
///
/// `deep` additionally offers initialization of unrecognized entities
/// through the chooser (meaningful with an interactive chooser; the
/// [`AutoChooser`] declines every offer, so auto runs only log).
pub fn resolve<C: Chooser>(
    topology: &mut Topology,
    mut conflicts: ConflictLog,
    fields: &FieldConfig,
    chooser: &mut C,
    deep: bool,
) -> ResolveSummary {
    let mut summary = ResolveSummary::default();
    for decision in plan(topology, &conflicts, fields) {
        match decision {
            Decision::Duplicate(dup) => {
                // The bag entry is consumed whichever way it resolves.
                conflicts.take_duplicates(&dup.key);
                match chooser.choose_duplicate(&dup) {
                    Choice::Keep => summary.duplicates_kept += 1,
                    Choice::Replace => {
                        if let Some(iface) = topology.interface_mut(&dup.key) {
                            for (name, value) in dup.record.info_values(fields) {
                                iface.info.insert(name.to_string(), value.to_string());
                            }
                        }
                        summary.duplicates_replaced += 1;
                    }
                }
            }
            Decision::UnrecognizedInterface(key) => {
                if deep && try_initialize(topology, chooser, &key, fields) {
                    summary.initialized += 1;
                } else {
                    info!(interface = %key, "unrecognized interface");
                    summary.unrecognized_interfaces += 1;
                }
            }
            Decision::UnrecognizedDevice(key) => {
                // Mirror the per-interface initialization for the whole
                // device: one offer per interface.
                let mut initialized_any = false;
                if deep {
                    let names = topology.interface_names(&key);
                    for name in names {
                        let iface_key = InterfaceKey {
                            device: key.clone(),
                            name,
                        };
                        if try_initialize(topology, chooser, &iface_key, fields) {
                            summary.initialized += 1;
                            initialized_any = true;
                        }
                    }
                }
                if !initialized_any {
                    info!(device = %key, "unrecognized device");
                    summary.unrecognized_devices += 1;
                }
            }
            Decision::UnsupportedDeviceConflict { key, records } => {
                warn!(device = %key, records, "unsupported device-level conflict");
                conflicts.take_device(&key);
                summary.device_conflicts += records;
            }
        }
    }
    summary
}

fn try_initialize<C: Chooser>(
    topology: &mut Topology,
    chooser: &mut C,
    key: &InterfaceKey,
    fields: &FieldConfig,
) -> bool {
    let Some(values) = chooser.initialize_interface(key, fields) else {
        return false;
    };
    if let Some(iface) = topology.interface_mut(key) {
        iface.info = values;
    }
    topology.mark_recognized(key);
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::net::IpAddr;

    use crate::model::Serial;

    fn fields() -> FieldConfig {
        FieldConfig {
            device_field: "serial".into(),
            interface_field: "if".into(),
            info_fields: vec!["note".into(), "owner".into()],
        }
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    fn topology_with_recognized_iface() -> (Topology, InterfaceKey) {
        let mut topo = Topology::new();
        topo.insert_node(ip("10.0.0.1"), "host1");
        let dev = topo.merge_device(ip("10.0.0.1"), Serial::new("S1"));
        topo.merge_interface(dev.clone(), "eth1", 1001);
        topo.merge_interface(dev.clone(), "eth2", 1002);
        let key = InterfaceKey {
            device: dev,
            name: "eth1".into(),
        };
        topo.mark_recognized(&key);
        topo.interface_mut(&key)
            .unwrap()
            .info
            .insert("note".into(), "old-note".into());
        (topo, key)
    }

    /// Scripted chooser for tests: fixed duplicate answer, fixed init.
    struct Scripted {
        answer: Choice,
        init: Option<BTreeMap<String, String>>,
    }

    impl Chooser for Scripted {
        fn choose_duplicate(&mut self, _d: &DuplicateDecision) -> Choice {
            self.answer
        }
        fn initialize_interface(
            &mut self,
            _key: &InterfaceKey,
            _fields: &FieldConfig,
        ) -> Option<BTreeMap<String, String>> {
            self.init.clone()
        }
    }

    #[test]
    fn plan_renders_old_and_new_in_field_order() {
        let (topo, key) = topology_with_recognized_iface();
        let mut log = ConflictLog::new();
        log.add_duplicate(
            key.clone(),
            Record::new().with("note", "new-note").with("owner", "netops"),
        );

        let decisions = plan(&topo, &log, &fields());
        let dup = decisions
            .iter()
            .find_map(|d| match d {
                Decision::Duplicate(dup) => Some(dup),
                _ => None,
            })
            .unwrap();
        assert_eq!(dup.key, key);
        assert_eq!(dup.old, "old-note,");
        assert_eq!(dup.new, "new-note,netops");
    }

    #[test]
    fn auto_keeps_existing_values() {
        let (mut topo, key) = topology_with_recognized_iface();
        let mut log = ConflictLog::new();
        log.add_duplicate(key.clone(), Record::new().with("note", "new-note"));

        let summary = resolve(&mut topo, log, &fields(), &mut AutoChooser, false);
        assert_eq!(summary.duplicates_kept, 1);
        assert_eq!(summary.duplicates_replaced, 0);
        assert_eq!(topo.interface(&key).unwrap().info["note"], "old-note");
    }

    #[test]
    fn replace_overwrites_field_by_field() {
        let (mut topo, key) = topology_with_recognized_iface();
        let mut log = ConflictLog::new();
        log.add_duplicate(
            key.clone(),
            Record::new().with("note", "new-note").with("owner", "netops"),
        );

        let mut chooser = Scripted {
            answer: Choice::Replace,
            init: None,
        };
        let summary = resolve(&mut topo, log, &fields(), &mut chooser, false);
        assert_eq!(summary.duplicates_replaced, 1);

        let info = &topo.interface(&key).unwrap().info;
        assert_eq!(info["note"], "new-note");
        assert_eq!(info["owner"], "netops");
    }

    #[test]
    fn deep_initialization_marks_recognized() {
        let mut topo = Topology::new();
        topo.insert_node(ip("10.0.0.1"), "host1");
        let dev = topo.merge_device(ip("10.0.0.1"), Serial::new("S1"));
        topo.merge_interface(dev.clone(), "eth1", 1001);

        let mut init = BTreeMap::new();
        init.insert("note".to_string(), "manual".to_string());
        let mut chooser = Scripted {
            answer: Choice::Keep,
            init: Some(init),
        };

        let summary = resolve(&mut topo, ConflictLog::new(), &fields(), &mut chooser, true);
        assert_eq!(summary.initialized, 1);
        assert_eq!(summary.unrecognized_devices, 0);

        let key = InterfaceKey {
            device: dev.clone(),
            name: "eth1".into(),
        };
        assert!(topo.interface(&key).unwrap().recognized);
        assert!(topo.device(&dev).unwrap().recognized);
        topo.check_invariants().unwrap();
    }

    #[test]
    fn non_deep_counts_unrecognized_entities() {
        let (mut topo, _key) = topology_with_recognized_iface();
        // eth2 stays unrecognized on a recognized device.
        let summary = resolve(&mut topo, ConflictLog::new(), &fields(), &mut AutoChooser, false);
        assert_eq!(summary.unrecognized_interfaces, 1);
        assert_eq!(summary.unrecognized_devices, 0);
    }
}
