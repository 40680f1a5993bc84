// ── Topology arena ──
//
// Nodes, devices, and interfaces live in flat ordered maps keyed by
// their natural ids; back references are keys, not pointers, so there
// are no reference cycles and iteration order is the canonical sorted
// walk order (node IP, serial, interface name).

use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use strum::Display;

// ── Keys ────────────────────────────────────────────────────────────

/// A chassis serial number, normalized to upper case on construction.
/// Every path that creates a device goes through this type, which is
/// what keeps the §8 "serial == uppercase(serial)" property true.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Serial(String);

impl Serial {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Smallest possible serial, used as a range lower bound.
    pub(crate) fn lowest() -> Self {
        Self(String::new())
    }
}

impl fmt::Display for Serial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Natural id of a device: owning node IP plus serial. Two nodes *can*
/// carry the same serial; see [`Topology::find_device`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeviceKey {
    pub node: IpAddr,
    pub serial: Serial,
}

impl fmt::Display for DeviceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.node, self.serial)
    }
}

/// Natural id of an interface: its device plus the interface name,
/// which is unique within the device.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InterfaceKey {
    pub device: DeviceKey,
    pub name: String,
}

impl fmt::Display for InterfaceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.device, self.name)
    }
}

// ── Entities ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum NodeState {
    Unprobed,
    Inactive,
    Active,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub ip: IpAddr,
    pub hostname: String,
    pub state: NodeState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub key: DeviceKey,
    /// Recognized ⇔ identified: set by the reconciliation record that
    /// recognizes at least one of the device's interfaces.
    pub recognized: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interface {
    pub key: InterfaceKey,
    /// Numeric interface id (ifIndex) used for SNMP addressing.
    pub iid: u32,
    pub recognized: bool,
    /// Informational fields copied from the matching external record.
    pub info: BTreeMap<String, String>,
}

// ── Topology ────────────────────────────────────────────────────────

/// The discovered network: three flat arenas plus key-based ownership.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Topology {
    nodes: BTreeMap<IpAddr, Node>,
    devices: BTreeMap<DeviceKey, Device>,
    interfaces: BTreeMap<InterfaceKey, Interface>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Nodes ────────────────────────────────────────────────────────

    /// Register a candidate host. Re-inserting an IP refreshes the
    /// hostname but keeps the probe state.
    pub fn insert_node(&mut self, ip: IpAddr, hostname: impl Into<String>) {
        let hostname = hostname.into();
        self.nodes
            .entry(ip)
            .and_modify(|n| n.hostname.clone_from(&hostname))
            .or_insert(Node {
                ip,
                hostname,
                state: NodeState::Unprobed,
            });
    }

    /// Drop a node and everything it owns. Inactive nodes are removed
    /// from the topology after probing.
    pub fn remove_node(&mut self, ip: IpAddr) {
        self.nodes.remove(&ip);
        self.devices.retain(|k, _| k.node != ip);
        self.interfaces.retain(|k, _| k.device.node != ip);
    }

    pub fn set_node_state(&mut self, ip: IpAddr, state: NodeState) {
        if let Some(node) = self.nodes.get_mut(&ip) {
            node.state = state;
        }
    }

    pub fn node(&self, ip: &IpAddr) -> Option<&Node> {
        self.nodes.get(ip)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    // ── Devices ──────────────────────────────────────────────────────

    /// Create or refresh a device under a node. Re-probing the same
    /// serial resets `recognized` to false.
    pub fn merge_device(&mut self, node: IpAddr, serial: Serial) -> DeviceKey {
        let key = DeviceKey { node, serial };
        self.devices
            .entry(key.clone())
            .and_modify(|d| d.recognized = false)
            .or_insert(Device {
                key: key.clone(),
                recognized: false,
            });
        key
    }

    pub fn device(&self, key: &DeviceKey) -> Option<&Device> {
        self.devices.get(key)
    }

    pub fn device_mut(&mut self, key: &DeviceKey) -> Option<&mut Device> {
        self.devices.get_mut(key)
    }

    /// Devices owned by one node, in serial order.
    pub fn devices_of(&self, node: IpAddr) -> impl Iterator<Item = &Device> {
        let from = DeviceKey {
            node,
            serial: Serial::lowest(),
        };
        self.devices
            .range(from..)
            .take_while(move |(k, _)| k.node == node)
            .map(|(_, d)| d)
    }

    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    /// Resolve a serial to its device by linear scan over nodes in
    /// sorted order, first match wins. A serial appearing under two
    /// nodes is neither detected nor reported; the scan order IS the
    /// behavior contract here.
    pub fn find_device(&self, serial: &Serial) -> Option<DeviceKey> {
        for ip in self.nodes.keys() {
            let key = DeviceKey {
                node: *ip,
                serial: serial.clone(),
            };
            if self.devices.contains_key(&key) {
                return Some(key);
            }
        }
        None
    }

    // ── Interfaces ───────────────────────────────────────────────────

    /// Create or refresh an interface. Re-probing re-applies the IID
    /// and resets `recognized` to false.
    pub fn merge_interface(&mut self, device: DeviceKey, name: impl Into<String>, iid: u32) {
        let key = InterfaceKey {
            device,
            name: name.into(),
        };
        self.interfaces
            .entry(key.clone())
            .and_modify(|i| {
                i.iid = iid;
                i.recognized = false;
            })
            .or_insert(Interface {
                key,
                iid,
                recognized: false,
                info: BTreeMap::new(),
            });
    }

    pub fn interface(&self, key: &InterfaceKey) -> Option<&Interface> {
        self.interfaces.get(key)
    }

    pub fn interface_mut(&mut self, key: &InterfaceKey) -> Option<&mut Interface> {
        self.interfaces.get_mut(key)
    }

    /// Interfaces of one device, in name order.
    pub fn interfaces_of(&self, device: &DeviceKey) -> impl Iterator<Item = &Interface> {
        let from = InterfaceKey {
            device: device.clone(),
            name: String::new(),
        };
        let device = device.clone();
        self.interfaces
            .range(from..)
            .take_while(move |(k, _)| k.device == device)
            .map(|(_, i)| i)
    }

    pub fn interface_names(&self, device: &DeviceKey) -> Vec<String> {
        self.interfaces_of(device).map(|i| i.key.name.clone()).collect()
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &Interface> {
        self.interfaces.values()
    }

    /// Mark an interface recognized, propagating recognition to its
    /// device (a device is identified by the record that identifies one
    /// of its interfaces).
    pub fn mark_recognized(&mut self, key: &InterfaceKey) {
        if let Some(iface) = self.interfaces.get_mut(key) {
            iface.recognized = true;
        }
        if let Some(device) = self.devices.get_mut(&key.device) {
            device.recognized = true;
        }
    }

    // ── Counters / invariants ────────────────────────────────────────

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn interface_count(&self) -> usize {
        self.interfaces.len()
    }

    /// Structural invariants, asserted by tests after every mutation
    /// path: upper-case serial keys, recognition coherence both ways.
    pub fn check_invariants(&self) -> Result<(), String> {
        for key in self.devices.keys() {
            if key.serial.as_str() != key.serial.as_str().to_ascii_uppercase() {
                return Err(format!("serial not upper-cased: {}", key.serial));
            }
            if !self.nodes.contains_key(&key.node) {
                return Err(format!("device {key} references missing node"));
            }
        }
        for device in self.devices.values() {
            let any_recognized = self
                .interfaces_of(&device.key)
                .any(|iface| iface.recognized);
            if device.recognized && !any_recognized {
                return Err(format!(
                    "device {} recognized with no recognized interface",
                    device.key
                ));
            }
            if !device.recognized && any_recognized {
                return Err(format!(
                    "device {} unrecognized but has a recognized interface",
                    device.key
                ));
            }
        }
        for key in self.interfaces.keys() {
            if !self.devices.contains_key(&key.device) {
                return Err(format!("interface {key} references missing device"));
            }
        }
        Ok(())
    }
}
