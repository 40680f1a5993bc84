// ── Object identifier newtype ──
//
// A thin owned OID the engine can hash, order, and strip prefixes from
// without pulling protocol types across the crate boundary. The
// async-snmp adapter converts at the edge.

use std::fmt;
use std::str::FromStr;

use crate::error::SnmpError;

/// An SNMP object identifier as a sequence of sub-identifier arcs.
///
/// Ordering is lexicographic over the arcs, which matches MIB walk
/// order and makes `BTreeMap<Oid, _>` tables iterate deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Oid(Vec<u32>);

impl Oid {
    pub fn new(arcs: impl Into<Vec<u32>>) -> Self {
        Self(arcs.into())
    }

    pub fn arcs(&self) -> &[u32] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Append one arc, consuming self. Used to address a table cell:
    /// `ifAlias.child(iid)`.
    pub fn child(mut self, arc: u32) -> Self {
        self.0.push(arc);
        self
    }

    /// The suffix of `self` under `base`, if `base` is a strict prefix.
    ///
    /// `1.3.6.1.2.1.2.2.1.3.1001` stripped of `1.3.6.1.2.1.2.2.1.3`
    /// yields `1001`. Returns `None` when `base` does not prefix `self`.
    pub fn strip_prefix(&self, base: &Oid) -> Option<Oid> {
        if self.0.len() <= base.0.len() || !self.0.starts_with(&base.0) {
            return None;
        }
        Some(Oid(self.0[base.0.len()..].to_vec()))
    }

    /// The first arc, for single-integer table indexes.
    pub fn head(&self) -> Option<u32> {
        self.0.first().copied()
    }

    /// Single-arc index as a plain integer, `None` for compound indexes.
    pub fn as_single(&self) -> Option<u32> {
        match self.0.as_slice() {
            [one] => Some(*one),
            _ => None,
        }
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for arc in &self.0 {
            if first {
                first = false;
            } else {
                f.write_str(".")?;
            }
            write!(f, "{arc}")?;
        }
        Ok(())
    }
}

impl FromStr for Oid {
    type Err = SnmpError;

    /// Parse dotted form; a single leading dot is accepted
    /// (`.1.3.6.1.2.1` and `1.3.6.1.2.1` are the same identifier).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.strip_prefix('.').unwrap_or(s);
        if trimmed.is_empty() {
            return Err(SnmpError::BadOid { text: s.into() });
        }
        trimmed
            .split('.')
            .map(|arc| {
                arc.parse::<u32>()
                    .map_err(|_| SnmpError::BadOid { text: s.into() })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Oid)
    }
}

impl From<&[u32]> for Oid {
    fn from(arcs: &[u32]) -> Self {
        Self(arcs.to_vec())
    }
}
