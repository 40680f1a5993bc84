//! Literal OID tables the resolver and updater address.
//!
//! Kept as arc slices so constants stay `const`; call [`oid`] (or
//! `Oid::from`) to get an owned identifier.

use crate::oid::Oid;

/// Owned [`Oid`] from one of the constant arc tables below.
pub fn oid(arcs: &[u32]) -> Oid {
    Oid::from(arcs)
}

// ── MIB-II / IF-MIB ─────────────────────────────────────────────────

/// sysObjectID — the vendor tag comes from its enterprise arc.
pub const SYS_OBJECT_ID: &[u32] = &[1, 3, 6, 1, 2, 1, 1, 2];
/// sysName.
pub const SYS_NAME: &[u32] = &[1, 3, 6, 1, 2, 1, 1, 5];

/// ifType — .1.3.6.1.2.1.2.2.1.3
pub const IF_TYPE: &[u32] = &[1, 3, 6, 1, 2, 1, 2, 2, 1, 3];
/// ifName — .1.3.6.1.2.1.31.1.1.1.1
pub const IF_NAME: &[u32] = &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 1];
/// ifDescr — .1.3.6.1.2.1.2.2.1.2 (name fallback when ifName is empty)
pub const IF_DESCR: &[u32] = &[1, 3, 6, 1, 2, 1, 2, 2, 1, 2];
/// ifAlias — .1.3.6.1.2.1.31.1.1.1.18, the default write-back target.
pub const IF_ALIAS: &[u32] = &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 18];

/// ifType values excluded from discovery:
/// other(1), softwareLoopback(24), propVirtual(53).
pub const EXCLUDED_IF_TYPES: &[i64] = &[1, 24, 53];

// ── ENTITY-MIB ──────────────────────────────────────────────────────

/// entPhysicalClass — .1.3.6.1.2.1.47.1.1.1.1.5
pub const ENT_PHYSICAL_CLASS: &[u32] = &[1, 3, 6, 1, 2, 1, 47, 1, 1, 1, 1, 5];
/// entPhysicalSerialNum — .1.3.6.1.2.1.47.1.1.1.1.11
pub const ENT_PHYSICAL_SERIAL: &[u32] = &[1, 3, 6, 1, 2, 1, 47, 1, 1, 1, 1, 11];
/// entPhysicalClass value for a chassis.
pub const ENT_CLASS_CHASSIS: i64 = 3;

// ── CISCO-STACK-MIB ─────────────────────────────────────────────────

/// moduleSerialNumber — .1.3.6.1.4.1.9.5.1.3.1.1.3
pub const CISCO_MODULE_SERIAL: &[u32] = &[1, 3, 6, 1, 4, 1, 9, 5, 1, 3, 1, 1, 3];
/// moduleSerialNumberString — .1.3.6.1.4.1.9.5.1.3.1.1.26
pub const CISCO_MODULE_SERIAL_STRING: &[u32] = &[1, 3, 6, 1, 4, 1, 9, 5, 1, 3, 1, 1, 26];
/// portIfIndex — .1.3.6.1.4.1.9.5.1.4.1.1.11 (indexed module.port)
pub const CISCO_PORT_IF_INDEX: &[u32] = &[1, 3, 6, 1, 4, 1, 9, 5, 1, 4, 1, 1, 11];
/// portModuleIndex — .1.3.6.1.4.1.9.5.1.4.1.1.1 (indexed module.port)
pub const CISCO_PORT_MODULE_INDEX: &[u32] = &[1, 3, 6, 1, 4, 1, 9, 5, 1, 4, 1, 1, 1];

// ── FOUNDRY-SN-AGENT-MIB (Brocade) ──────────────────────────────────

/// snChasUnitSerNum — .1.3.6.1.4.1.1991.1.1.1.4.1.1.2
pub const BROCADE_UNIT_SERIAL: &[u32] = &[1, 3, 6, 1, 4, 1, 1991, 1, 1, 1, 4, 1, 1, 2];
/// snChasSerNum — .1.3.6.1.4.1.1991.1.1.1.1.2
pub const BROCADE_CHASSIS_SERIAL: &[u32] = &[1, 3, 6, 1, 4, 1, 1991, 1, 1, 1, 1, 2];
/// snSwPortIfIndex — .1.3.6.1.4.1.1991.1.1.3.3.1.1.38
pub const BROCADE_PORT_IF_INDEX: &[u32] = &[1, 3, 6, 1, 4, 1, 1991, 1, 1, 3, 3, 1, 1, 38];
/// snSwPortDescr — .1.3.6.1.4.1.1991.1.1.3.3.1.1.39 ("unit/module/port")
pub const BROCADE_PORT_DESCR: &[u32] = &[1, 3, 6, 1, 4, 1, 1991, 1, 1, 3, 3, 1, 1, 39];

// ── HP ──────────────────────────────────────────────────────────────

/// hpHttpMgSerialNumber — .1.3.6.1.4.1.11.2.36.1.1.2.9
pub const HP_SERIAL: &[u32] = &[1, 3, 6, 1, 4, 1, 11, 2, 36, 1, 1, 2, 9];

// ── Enterprise arcs for vendor tagging ──────────────────────────────

pub const ENTERPRISE_PREFIX: &[u32] = &[1, 3, 6, 1, 4, 1];
pub const ENTERPRISE_CISCO: u32 = 9;
pub const ENTERPRISE_HP: u32 = 11;
pub const ENTERPRISE_BROCADE: u32 = 1991;
