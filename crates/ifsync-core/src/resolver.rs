// ── Vendor interface resolver ──
//
// Turns a raw SNMP session into serial → {iid → interface name}. The
// standard path (IF-MIB + ENTITY-MIB) covers single-chassis devices;
// stacks need a vendor-specific multi-hop join from interface id to the
// owning member's serial.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

use ifsync_snmp::{Oid, SnmpError, SnmpSession, SnmpValue, oids};

use crate::model::Serial;

/// Per-serial interface map produced by [`resolve`].
pub type InterfaceMap = BTreeMap<Serial, BTreeMap<u32, String>>;

/// Closed vendor tag, selected from the sysObjectID enterprise arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vendor {
    Cisco,
    Brocade,
    Hp,
    Unsupported(u32),
}

impl Vendor {
    /// `sysObjectID` is `1.3.6.1.4.1.<enterprise>...`; the enterprise
    /// arc is the tag.
    pub fn from_sys_object_id(sys_object_id: &Oid) -> Self {
        let Some(suffix) = sys_object_id.strip_prefix(&Oid::from(oids::ENTERPRISE_PREFIX)) else {
            return Self::Unsupported(0);
        };
        match suffix.head() {
            Some(oids::ENTERPRISE_CISCO) => Self::Cisco,
            Some(oids::ENTERPRISE_BROCADE) => Self::Brocade,
            Some(oids::ENTERPRISE_HP) => Self::Hp,
            Some(other) => Self::Unsupported(other),
            None => Self::Unsupported(0),
        }
    }
}

impl std::fmt::Display for Vendor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cisco => f.write_str("cisco"),
            Self::Brocade => f.write_str("brocade"),
            Self::Hp => f.write_str("hp"),
            Self::Unsupported(arc) => write!(f, "unsupported({arc})"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    /// The node answered but yielded no chassis serial; discovery for
    /// this node fails (it is counted like an unreachable one).
    #[error("no serial discovered on {vendor} device")]
    NoSerials { vendor: Vendor },

    #[error(transparent)]
    Snmp(#[from] SnmpError),
}

/// Resolve the per-serial interface map for one device.
pub async fn resolve<S: SnmpSession>(
    vendor: Vendor,
    session: &S,
) -> Result<InterfaceMap, ResolveError> {
    let interfaces = candidate_interfaces(session).await?;
    let serials = candidate_serials(vendor, session).await?;
    if serials.is_empty() {
        return Err(ResolveError::NoSerials { vendor });
    }

    let mut out = InterfaceMap::new();
    if let [only] = serials.as_slice() {
        // Single chassis: every interface belongs to it.
        out.insert(only.clone(), interfaces);
        return Ok(out);
    }

    // Stack: join interface id → member serial, vendor-specifically.
    // Interfaces whose join path fails are dropped, never duplicated.
    let iid_to_serial = stack_join(vendor, session).await?;
    for (iid, name) in interfaces {
        if let Some(serial) = iid_to_serial.get(&iid) {
            out.entry(serial.clone()).or_default().insert(iid, name);
        }
    }
    debug!(%vendor, members = out.len(), "stack join assembled");
    Ok(out)
}

// ── Step 1: candidate interfaces ────────────────────────────────────

async fn candidate_interfaces<S: SnmpSession>(
    session: &S,
) -> Result<BTreeMap<u32, String>, SnmpError> {
    let types = session.walk(&Oid::from(oids::IF_TYPE)).await?;

    let mut kept: Vec<u32> = Vec::new();
    for (suffix, value) in &types {
        let Some(iid) = suffix.as_single() else {
            warn!(index = %suffix, "malformed ifType row index, skipping");
            continue;
        };
        match value.as_int() {
            Some(if_type) if oids::EXCLUDED_IF_TYPES.contains(&if_type) => {}
            Some(_) => kept.push(iid),
            None => {
                warn!(iid, value = ?value, "foreign ifType value, skipping");
            }
        }
    }

    // Name resolution with table-level fallback: whichever of
    // ifName/ifDescr yields at least one row is used for the whole
    // table, never mixed per interface.
    let names = walk_first_nonempty(session, &[oids::IF_NAME, oids::IF_DESCR]).await?;
    let names: BTreeMap<u32, String> = names
        .into_iter()
        .filter_map(|(suffix, value)| {
            let iid = suffix.as_single()?;
            Some((iid, value.as_str()?.to_string()))
        })
        .collect();

    let mut out = BTreeMap::new();
    for iid in kept {
        match names.get(&iid) {
            Some(name) => {
                out.insert(iid, name.clone());
            }
            None => warn!(iid, "interface present in type table but not in name table"),
        }
    }
    Ok(out)
}

// ── Step 2: candidate serials ───────────────────────────────────────

async fn candidate_serials<S: SnmpSession>(
    vendor: Vendor,
    session: &S,
) -> Result<Vec<Serial>, SnmpError> {
    // Standard path: ENTITY-MIB chassis rows with ASCII serials.
    let classes: BTreeMap<Oid, i64> = session
        .walk(&Oid::from(oids::ENT_PHYSICAL_CLASS))
        .await?
        .into_iter()
        .filter_map(|(idx, v)| Some((idx, v.as_int()?)))
        .collect();
    let entity_serials = session.walk(&Oid::from(oids::ENT_PHYSICAL_SERIAL)).await?;

    let mut serials: Vec<Serial> = Vec::new();
    for (idx, value) in &entity_serials {
        if classes.get(idx).copied() != Some(oids::ENT_CLASS_CHASSIS) {
            continue;
        }
        if let Some(text) = ascii_serial(value) {
            push_unique(&mut serials, Serial::new(text));
        }
    }
    if !serials.is_empty() {
        return Ok(serials);
    }

    // Proprietary fallback, vendor-dispatched, ordered-OID-fallback.
    let fallback: &[&[u32]] = match vendor {
        Vendor::Cisco => &[oids::CISCO_MODULE_SERIAL, oids::CISCO_MODULE_SERIAL_STRING],
        Vendor::Brocade => &[oids::BROCADE_UNIT_SERIAL, oids::BROCADE_CHASSIS_SERIAL],
        Vendor::Hp => &[oids::HP_SERIAL],
        Vendor::Unsupported(_) => {
            warn!(%vendor, "unsupported vendor for serial discovery");
            &[]
        }
    };
    for (_, value) in walk_first_nonempty(session, fallback).await? {
        if let Some(text) = ascii_serial(&value) {
            push_unique(&mut serials, Serial::new(text));
        }
    }
    Ok(serials)
}

fn ascii_serial(value: &SnmpValue) -> Option<&str> {
    let text = value.as_ascii_str()?.trim();
    (!text.is_empty()).then_some(text)
}

fn push_unique(serials: &mut Vec<Serial>, serial: Serial) {
    if !serials.contains(&serial) {
        serials.push(serial);
    }
}

// ── Step 3: stack joins ─────────────────────────────────────────────

async fn stack_join<S: SnmpSession>(
    vendor: Vendor,
    session: &S,
) -> Result<BTreeMap<u32, Serial>, SnmpError> {
    match vendor {
        Vendor::Cisco => cisco_join(session).await,
        Vendor::Brocade => brocade_join(session).await,
        Vendor::Hp => {
            warn!("HP stacks are unsupported, skipping stack mapping");
            Ok(BTreeMap::new())
        }
        Vendor::Unsupported(_) => {
            warn!(%vendor, "unsupported vendor for stack mapping");
            Ok(BTreeMap::new())
        }
    }
}

/// Cisco: portIfIndex ⋈ portModuleIndex (both indexed `module.port`),
/// then module → serial via moduleSerialNumber with the string variant
/// as the alternate source.
async fn cisco_join<S: SnmpSession>(session: &S) -> Result<BTreeMap<u32, Serial>, SnmpError> {
    let port_iid = session.walk(&Oid::from(oids::CISCO_PORT_IF_INDEX)).await?;
    let port_module: BTreeMap<Oid, i64> = session
        .walk(&Oid::from(oids::CISCO_PORT_MODULE_INDEX))
        .await?
        .into_iter()
        .filter_map(|(idx, v)| Some((idx, v.as_int()?)))
        .collect();
    let module_serial: BTreeMap<u32, Serial> = walk_first_nonempty(
        session,
        &[oids::CISCO_MODULE_SERIAL, oids::CISCO_MODULE_SERIAL_STRING],
    )
    .await?
    .into_iter()
    .filter_map(|(idx, v)| {
        let module = idx.as_single()?;
        let text = ascii_serial(&v)?;
        Some((module, Serial::new(text)))
    })
    .collect();

    let mut out = BTreeMap::new();
    for (port, value) in port_iid {
        let Some(iid) = value.as_int() else {
            warn!(port = %port, "malformed portIfIndex value, skipping");
            continue;
        };
        let Some(module) = port_module.get(&port) else {
            // Length mismatch between the parallel port walks.
            warn!(port = %port, "port missing from portModuleIndex, skipping");
            continue;
        };
        let (Ok(module), Ok(iid)) = (u32::try_from(*module), u32::try_from(iid)) else {
            continue;
        };
        if let Some(serial) = module_serial.get(&module) {
            out.insert(iid, serial.clone());
        }
    }
    Ok(out)
}

/// Brocade: snSwPortIfIndex ⋈ snSwPortDescr on the port index, parse
/// the leading stack `unit` out of the "unit/module/port" descriptor,
/// then unit → serial via snChasUnitSerNum.
async fn brocade_join<S: SnmpSession>(session: &S) -> Result<BTreeMap<u32, Serial>, SnmpError> {
    let port_iid = session.walk(&Oid::from(oids::BROCADE_PORT_IF_INDEX)).await?;
    let port_descr: BTreeMap<Oid, String> = session
        .walk(&Oid::from(oids::BROCADE_PORT_DESCR))
        .await?
        .into_iter()
        .filter_map(|(idx, v)| Some((idx, v.as_str()?.to_string())))
        .collect();
    let unit_serial: BTreeMap<u32, Serial> = session
        .walk(&Oid::from(oids::BROCADE_UNIT_SERIAL))
        .await?
        .into_iter()
        .filter_map(|(idx, v)| {
            let unit = idx.as_single()?;
            let text = ascii_serial(&v)?;
            Some((unit, Serial::new(text)))
        })
        .collect();

    let mut out = BTreeMap::new();
    for (port, value) in port_iid {
        let Some(iid) = value.as_int() else {
            warn!(port = %port, "malformed snSwPortIfIndex value, skipping");
            continue;
        };
        let Some(descr) = port_descr.get(&port) else {
            warn!(port = %port, "port missing from snSwPortDescr, skipping");
            continue;
        };
        let Some(unit) = parse_unit(descr) else {
            warn!(port = %port, descr, "unparseable port descriptor, skipping");
            continue;
        };
        let Ok(iid) = u32::try_from(iid) else {
            continue;
        };
        if let Some(serial) = unit_serial.get(&unit) {
            out.insert(iid, serial.clone());
        }
    }
    Ok(out)
}

/// Leading `unit` of a `unit/module/port` descriptor. The whole string
/// must match `^(\d+)(/\d+)+$`.
fn parse_unit(descr: &str) -> Option<u32> {
    static UNIT_RE: OnceLock<Regex> = OnceLock::new();
    let re = UNIT_RE.get_or_init(|| {
        Regex::new(r"^(\d+)(?:/\d+)+$").unwrap_or_else(|_| unreachable!("static pattern"))
    });
    re.captures(descr)?.get(1)?.as_str().parse().ok()
}

// ── Walk helpers ────────────────────────────────────────────────────

/// Ordered-OID-fallback walk: the first base yielding at least one row
/// is used exclusively; later bases are not consulted.
async fn walk_first_nonempty<S: SnmpSession>(
    session: &S,
    bases: &[&[u32]],
) -> Result<Vec<(Oid, SnmpValue)>, SnmpError> {
    for base in bases {
        let rows = session.walk(&Oid::from(*base)).await?;
        if !rows.is_empty() {
            return Ok(rows);
        }
    }
    Ok(Vec::new())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use ifsync_snmp::SimSession;

    fn s(text: &str) -> SnmpValue {
        SnmpValue::Str(text.into())
    }

    fn single_chassis_session() -> SimSession {
        SimSession::new()
            .table(
                oids::IF_TYPE,
                &[
                    (1001, SnmpValue::Int(6)),
                    (1002, SnmpValue::Int(6)),
                    (9, SnmpValue::Int(24)),  // loopback, excluded
                    (10, SnmpValue::Int(53)), // propVirtual, excluded
                ],
            )
            .table(
                oids::IF_NAME,
                &[(1001, s("eth1/1/1")), (1002, s("eth1/1/2")), (9, s("lo0"))],
            )
            .table(oids::ENT_PHYSICAL_CLASS, &[(1, SnmpValue::Int(3))])
            .table(oids::ENT_PHYSICAL_SERIAL, &[(1, s("1a2b3c4d5e6f"))])
    }

    #[tokio::test]
    async fn single_serial_owns_every_interface() {
        let session = single_chassis_session();
        let map = resolve(Vendor::Cisco, &session).await.unwrap();

        assert_eq!(map.len(), 1);
        let ifaces = &map[&Serial::new("1A2B3C4D5E6F")];
        assert_eq!(ifaces.len(), 2);
        assert_eq!(ifaces[&1001], "eth1/1/1");
        assert_eq!(ifaces[&1002], "eth1/1/2");

        // Idempotent re-run yields the same map.
        let again = resolve(Vendor::Cisco, &session).await.unwrap();
        assert_eq!(map, again);
    }

    #[tokio::test]
    async fn if_descr_fallback_is_table_level() {
        let session = SimSession::new()
            .table(oids::IF_TYPE, &[(1, SnmpValue::Int(6))])
            // ifName table entirely absent: whole table falls to ifDescr.
            .table(oids::IF_DESCR, &[(1, s("FastEthernet0/1"))])
            .table(oids::ENT_PHYSICAL_CLASS, &[(1, SnmpValue::Int(3))])
            .table(oids::ENT_PHYSICAL_SERIAL, &[(1, s("SER1"))]);

        let map = resolve(Vendor::Cisco, &session).await.unwrap();
        assert_eq!(map[&Serial::new("SER1")][&1], "FastEthernet0/1");
    }

    #[tokio::test]
    async fn non_chassis_and_non_ascii_entity_rows_are_dropped() {
        let session = SimSession::new()
            .table(oids::IF_TYPE, &[(1, SnmpValue::Int(6))])
            .table(oids::IF_NAME, &[(1, s("eth0"))])
            .table(
                oids::ENT_PHYSICAL_CLASS,
                &[(1, SnmpValue::Int(9)), (2, SnmpValue::Int(3)), (3, SnmpValue::Int(3))],
            )
            .table(
                oids::ENT_PHYSICAL_SERIAL,
                &[(1, s("MODULE1")), (2, s("sn\u{00e9}01")), (3, s("good1"))],
            );

        let map = resolve(Vendor::Cisco, &session).await.unwrap();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec![&Serial::new("GOOD1")]);
    }

    #[tokio::test]
    async fn proprietary_fallback_when_entity_mib_is_empty() {
        let session = SimSession::new()
            .table(oids::IF_TYPE, &[(1, SnmpValue::Int(6))])
            .table(oids::IF_NAME, &[(1, s("1/1/1"))])
            .table(oids::BROCADE_CHASSIS_SERIAL, &[(0, s("br-chassis-1"))]);

        let map = resolve(Vendor::Brocade, &session).await.unwrap();
        assert_eq!(
            map.keys().collect::<Vec<_>>(),
            vec![&Serial::new("BR-CHASSIS-1")]
        );
    }

    #[tokio::test]
    async fn zero_serials_is_terminal() {
        let session = SimSession::new()
            .table(oids::IF_TYPE, &[(1, SnmpValue::Int(6))])
            .table(oids::IF_NAME, &[(1, s("eth0"))]);

        let err = resolve(Vendor::Hp, &session).await.unwrap_err();
        assert!(matches!(err, ResolveError::NoSerials { vendor: Vendor::Hp }));
    }

    #[tokio::test]
    async fn cisco_stack_join_drops_unresolvable_ports() {
        let session = SimSession::new()
            .table(
                oids::IF_TYPE,
                &[(101, SnmpValue::Int(6)), (102, SnmpValue::Int(6)), (103, SnmpValue::Int(6))],
            )
            .table(
                oids::IF_NAME,
                &[(101, s("Gi1/0/1")), (102, s("Gi2/0/1")), (103, s("Gi3/0/1"))],
            )
            .table(
                oids::ENT_PHYSICAL_CLASS,
                &[(1, SnmpValue::Int(3)), (2, SnmpValue::Int(3))],
            )
            .table(
                oids::ENT_PHYSICAL_SERIAL,
                &[(1, s("STACK-S1")), (2, s("STACK-S2"))],
            )
            .table_wide(
                oids::CISCO_PORT_IF_INDEX,
                &[
                    (&[1, 1], SnmpValue::Int(101)),
                    (&[2, 1], SnmpValue::Int(102)),
                    (&[3, 1], SnmpValue::Int(103)), // module 3 has no serial
                ],
            )
            .table_wide(
                oids::CISCO_PORT_MODULE_INDEX,
                &[
                    (&[1, 1], SnmpValue::Int(1)),
                    (&[2, 1], SnmpValue::Int(2)),
                    (&[3, 1], SnmpValue::Int(3)),
                ],
            )
            .table(
                oids::CISCO_MODULE_SERIAL,
                &[(1, s("STACK-S1")), (2, s("STACK-S2"))],
            );

        let map = resolve(Vendor::Cisco, &session).await.unwrap();
        let s1 = &map[&Serial::new("STACK-S1")];
        let s2 = &map[&Serial::new("STACK-S2")];
        assert_eq!(s1.keys().copied().collect::<Vec<_>>(), vec![101]);
        assert_eq!(s2.keys().copied().collect::<Vec<_>>(), vec![102]);
        // 103's join failed: absent from every output set, never orphaned.
        assert!(map.values().all(|ifaces| !ifaces.contains_key(&103)));
    }

    #[tokio::test]
    async fn brocade_stack_join_parses_unit_from_descriptor() {
        let session = SimSession::new()
            .table(
                oids::IF_TYPE,
                &[(64, SnmpValue::Int(6)), (128, SnmpValue::Int(6)), (129, SnmpValue::Int(6))],
            )
            .table(
                oids::IF_NAME,
                &[(64, s("ethernet1/1/1")), (128, s("ethernet2/1/1")), (129, s("mgmt"))],
            )
            .table(
                oids::ENT_PHYSICAL_CLASS,
                &[(1, SnmpValue::Int(3)), (2, SnmpValue::Int(3))],
            )
            .table(
                oids::ENT_PHYSICAL_SERIAL,
                &[(1, s("BR-U1")), (2, s("BR-U2"))],
            )
            .table(oids::BROCADE_PORT_IF_INDEX, &[
                (1, SnmpValue::Int(64)),
                (65, SnmpValue::Int(128)),
                (66, SnmpValue::Int(129)),
            ])
            .table(oids::BROCADE_PORT_DESCR, &[
                (1, s("1/1/1")),
                (65, s("2/1/1")),
                (66, s("mgmt0")), // does not match unit pattern
            ])
            .table(oids::BROCADE_UNIT_SERIAL, &[(1, s("BR-U1")), (2, s("BR-U2"))]);

        let map = resolve(Vendor::Brocade, &session).await.unwrap();
        assert_eq!(
            map[&Serial::new("BR-U1")].keys().copied().collect::<Vec<_>>(),
            vec![64]
        );
        assert_eq!(
            map[&Serial::new("BR-U2")].keys().copied().collect::<Vec<_>>(),
            vec![128]
        );
        assert!(map.values().all(|ifaces| !ifaces.contains_key(&129)));
    }

    #[tokio::test]
    async fn hp_stack_is_skipped_entirely() {
        let session = SimSession::new()
            .table(oids::IF_TYPE, &[(1, SnmpValue::Int(6))])
            .table(oids::IF_NAME, &[(1, s("1"))])
            .table(
                oids::ENT_PHYSICAL_CLASS,
                &[(1, SnmpValue::Int(3)), (2, SnmpValue::Int(3))],
            )
            .table(
                oids::ENT_PHYSICAL_SERIAL,
                &[(1, s("HP-1")), (2, s("HP-2"))],
            );

        // Two serials force the stack path, which HP does not support:
        // the join is empty, so no interface lands anywhere.
        let map = resolve(Vendor::Hp, &session).await.unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn vendor_from_sys_object_id() {
        let cisco: Oid = "1.3.6.1.4.1.9.1.1208".parse().unwrap();
        let brocade: Oid = "1.3.6.1.4.1.1991.1.3.48.1".parse().unwrap();
        let hp: Oid = "1.3.6.1.4.1.11.2.3.7.11.119".parse().unwrap();
        let juniper: Oid = "1.3.6.1.4.1.2636.1.1.1.2".parse().unwrap();

        assert_eq!(Vendor::from_sys_object_id(&cisco), Vendor::Cisco);
        assert_eq!(Vendor::from_sys_object_id(&brocade), Vendor::Brocade);
        assert_eq!(Vendor::from_sys_object_id(&hp), Vendor::Hp);
        assert_eq!(Vendor::from_sys_object_id(&juniper), Vendor::Unsupported(2636));
    }

    #[test]
    fn unit_pattern_requires_full_match() {
        assert_eq!(parse_unit("1/1/1"), Some(1));
        assert_eq!(parse_unit("12/3"), Some(12));
        assert_eq!(parse_unit("mgmt0"), None);
        assert_eq!(parse_unit("1"), None);
        assert_eq!(parse_unit("1/1/1 uplink"), None);
    }
}
