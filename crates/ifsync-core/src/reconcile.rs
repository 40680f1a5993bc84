// ── Reconciler ──
//
// Matches external records against the discovered topology: resolves
// the serial to a device (cache, then first-found linear scan), finds
// the interface (exact name, then optional auto-match on trailing
// digits), and either recognizes the interface, raises a duplicate
// conflict, or side-lists the record as unmatched.

use std::collections::HashMap;

use regex::Regex;
use tracing::{debug, warn};

use crate::config::FieldConfig;
use crate::conflict::ConflictLog;
use crate::model::{DeviceKey, InterfaceKey, Serial, Topology};
use crate::record::Record;

pub struct Reconciler<'cfg> {
    fields: &'cfg FieldConfig,
    auto_match: bool,
    /// serial → device key, filled on first resolution. Only ever
    /// grows; a second record for the same serial skips the scan.
    recognized: HashMap<Serial, DeviceKey>,
    /// Records that matched nothing: unknown serials and unidentified
    /// interfaces. The caller persists these when producing caches.
    unmatched: Vec<Record>,
}

impl<'cfg> Reconciler<'cfg> {
    pub fn new(fields: &'cfg FieldConfig, auto_match: bool) -> Self {
        Self {
            fields,
            auto_match,
            recognized: HashMap::new(),
            unmatched: Vec::new(),
        }
    }

    /// Process a batch of records against the topology, accumulating
    /// conflicts. Returns the number of new conflicts raised.
    pub fn synchronize(
        &mut self,
        topology: &mut Topology,
        conflicts: &mut ConflictLog,
        records: impl IntoIterator<Item = Record>,
    ) -> usize {
        let mut raised = 0;
        for record in records {
            raised += self.apply(topology, conflicts, record);
        }
        raised
    }

    fn apply(
        &mut self,
        topology: &mut Topology,
        conflicts: &mut ConflictLog,
        record: Record,
    ) -> usize {
        let Some(raw_serial) = record.device_id(self.fields) else {
            warn!("record without a device-id column, skipping");
            return 0;
        };
        let serial = Serial::new(raw_serial);

        // Cache first, then the linear scan (first match wins; a serial
        // under two nodes resolves to the lower node, undetected).
        let device = match self.recognized.get(&serial) {
            Some(key) => key.clone(),
            None => match topology.find_device(&serial) {
                Some(key) => {
                    self.recognized.insert(serial.clone(), key.clone());
                    key
                }
                None => {
                    warn!(%serial, "unidentified device in external records");
                    self.unmatched.push(record);
                    return 0;
                }
            },
        };

        let Some(if_name) = record.interface_id(self.fields).map(str::to_string) else {
            warn!(%serial, "record without an interface-id column, skipping");
            return 0;
        };

        let resolved = self.resolve_interface(topology, &device, &if_name);
        let Some(key) = resolved else {
            if record.info_is_blank(self.fields) {
                // Nothing to reconcile; not even worth a log line.
                return 0;
            }
            warn!(%serial, interface = %if_name, "unidentified interface in external records");
            self.unmatched.push(record);
            return 0;
        };

        let already = topology
            .interface(&key)
            .is_some_and(|iface| iface.recognized);
        if already {
            debug!(interface = %key, "duplicate record");
            conflicts.add_duplicate(key, record);
            return 1;
        }

        // First record for this interface wins: copy the configured
        // info fields and recognize interface + device together.
        if let Some(iface) = topology.interface_mut(&key) {
            for (name, value) in record.info_values(self.fields) {
                iface.info.insert(name.to_string(), value.to_string());
            }
        }
        topology.mark_recognized(&key);
        0
    }

    /// Exact interface name, else (with auto-match) the first
    /// sorted-order name ending in the record's digits preceded by a
    /// non-digit: `"23"` resolves to `"Gi1/0/23"` but not `"Gi1/0/123"`.
    fn resolve_interface(
        &self,
        topology: &Topology,
        device: &DeviceKey,
        if_name: &str,
    ) -> Option<InterfaceKey> {
        let exact = InterfaceKey {
            device: device.clone(),
            name: if_name.to_string(),
        };
        if topology.interface(&exact).is_some() {
            return Some(exact);
        }
        if !self.auto_match {
            return None;
        }

        let pattern = format!("[^0-9]{}$", regex::escape(if_name));
        let re = Regex::new(&pattern).ok()?;
        // interface_names is sorted; the first match is substituted.
        topology
            .interface_names(device)
            .into_iter()
            .find(|name| re.is_match(name))
            .map(|name| InterfaceKey {
                device: device.clone(),
                name,
            })
    }

    /// Records that resolved to no device or no interface, in arrival
    /// order.
    pub fn unmatched(&self) -> &[Record] {
        &self.unmatched
    }

    pub fn into_unmatched(self) -> Vec<Record> {
        self.unmatched
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::net::IpAddr;

    fn fields() -> FieldConfig {
        FieldConfig {
            device_field: "serial".into(),
            interface_field: "if".into(),
            info_fields: vec!["note".into()],
        }
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    fn lab_topology() -> Topology {
        let mut topo = Topology::new();
        topo.insert_node(ip("10.0.0.1"), "host1");
        let d1 = topo.merge_device(ip("10.0.0.1"), Serial::new("1A2B3C4D5E6F"));
        topo.merge_interface(d1.clone(), "eth1/1/1", 1001);
        topo.merge_interface(d1, "eth1/1/2", 1002);

        topo.insert_node(ip("10.0.0.2"), "host2");
        let d2 = topo.merge_device(ip("10.0.0.2"), Serial::new("OTHER"));
        topo.merge_interface(d2, "eth1/1/1", 1001);
        topo
    }

    fn iface_key(node: &str, serial: &str, name: &str) -> InterfaceKey {
        InterfaceKey {
            device: DeviceKey {
                node: ip(node),
                serial: Serial::new(serial),
            },
            name: name.into(),
        }
    }

    #[test]
    fn recognizes_interface_and_copies_info() {
        let mut topo = lab_topology();
        let f = fields();
        let mut rec = Reconciler::new(&f, false);
        let mut log = ConflictLog::new();

        let raised = rec.synchronize(
            &mut topo,
            &mut log,
            [Record::new()
                .with("serial", "1a2b3c4d5e6f")
                .with("if", "eth1/1/1")
                .with("note", "lab-A")],
        );
        assert_eq!(raised, 0);

        let key = iface_key("10.0.0.1", "1A2B3C4D5E6F", "eth1/1/1");
        let iface = topo.interface(&key).unwrap();
        assert!(iface.recognized);
        assert_eq!(iface.info["note"], "lab-A");
        assert!(topo.device(&key.device).unwrap().recognized);

        let other = iface_key("10.0.0.1", "1A2B3C4D5E6F", "eth1/1/2");
        assert!(!topo.interface(&other).unwrap().recognized);
        topo.check_invariants().unwrap();
    }

    #[test]
    fn second_application_raises_duplicate() {
        let mut topo = lab_topology();
        let f = fields();
        let mut rec = Reconciler::new(&f, false);
        let mut log = ConflictLog::new();

        let record = Record::new()
            .with("serial", "1A2B3C4D5E6F")
            .with("if", "eth1/1/1")
            .with("note", "lab-A");
        let first = rec.synchronize(&mut topo, &mut log, [record.clone()]);
        let second = rec.synchronize(&mut topo, &mut log, [record]);

        assert_eq!(first, 0);
        assert_eq!(second, 1);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn devices_never_cross_contaminate() {
        let mut topo = lab_topology();
        let f = fields();
        let mut rec = Reconciler::new(&f, false);
        let mut log = ConflictLog::new();

        rec.synchronize(
            &mut topo,
            &mut log,
            [
                Record::new().with("serial", "1A2B3C4D5E6F").with("if", "eth1/1/1").with("note", "first"),
                Record::new().with("serial", "OTHER").with("if", "eth1/1/1").with("note", "second"),
            ],
        );

        let a = iface_key("10.0.0.1", "1A2B3C4D5E6F", "eth1/1/1");
        let b = iface_key("10.0.0.2", "OTHER", "eth1/1/1");
        assert_eq!(topo.interface(&a).unwrap().info["note"], "first");
        assert_eq!(topo.interface(&b).unwrap().info["note"], "second");
    }

    #[test]
    fn auto_match_resolves_trailing_digits() {
        let mut topo = Topology::new();
        topo.insert_node(ip("10.0.0.1"), "host1");
        let dev = topo.merge_device(ip("10.0.0.1"), Serial::new("SW"));
        topo.merge_interface(dev.clone(), "Gi1/0/23", 23);
        topo.merge_interface(dev, "Gi1/0/123", 123);

        let f = fields();
        let mut rec = Reconciler::new(&f, true);
        let mut log = ConflictLog::new();
        rec.synchronize(
            &mut topo,
            &mut log,
            [Record::new().with("serial", "SW").with("if", "23").with("note", "x")],
        );

        let matched = iface_key("10.0.0.1", "SW", "Gi1/0/23");
        let not_matched = iface_key("10.0.0.1", "SW", "Gi1/0/123");
        assert!(topo.interface(&matched).unwrap().recognized);
        assert!(!topo.interface(&not_matched).unwrap().recognized);
    }

    #[test]
    fn auto_match_disabled_leaves_record_unmatched() {
        let mut topo = Topology::new();
        topo.insert_node(ip("10.0.0.1"), "host1");
        let dev = topo.merge_device(ip("10.0.0.1"), Serial::new("SW"));
        topo.merge_interface(dev, "Gi1/0/23", 23);

        let f = fields();
        let mut rec = Reconciler::new(&f, false);
        let mut log = ConflictLog::new();
        rec.synchronize(
            &mut topo,
            &mut log,
            [Record::new().with("serial", "SW").with("if", "23").with("note", "x")],
        );
        assert_eq!(rec.unmatched().len(), 1);
    }

    #[test]
    fn blank_records_for_missing_interfaces_are_silently_ignored() {
        let mut topo = lab_topology();
        let f = fields();
        let mut rec = Reconciler::new(&f, false);
        let mut log = ConflictLog::new();

        rec.synchronize(
            &mut topo,
            &mut log,
            [Record::new().with("serial", "1A2B3C4D5E6F").with("if", "nope").with("note", "  ")],
        );
        assert!(rec.unmatched().is_empty());
        assert!(log.is_empty());
    }

    #[test]
    fn unknown_serial_is_side_listed() {
        let mut topo = lab_topology();
        let f = fields();
        let mut rec = Reconciler::new(&f, false);
        let mut log = ConflictLog::new();

        rec.synchronize(
            &mut topo,
            &mut log,
            [Record::new().with("serial", "GHOST").with("if", "eth0").with("note", "x")],
        );
        assert_eq!(rec.unmatched().len(), 1);
        assert_eq!(rec.unmatched()[0].get("serial"), Some("GHOST"));
    }
}
