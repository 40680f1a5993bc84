// ── Deterministic in-memory session for tests ──
//
// Engine tests script an agent as plain data: scalar cells, table rows
// keyed by index suffix, and optional failure injection. Writes are
// recorded for assertion. No sockets, no timing.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use crate::error::SnmpError;
use crate::oid::Oid;
use crate::session::SnmpSession;
use crate::value::SnmpValue;

/// Scriptable [`SnmpSession`] implementation.
#[derive(Debug, Default)]
pub struct SimSession {
    scalars: BTreeMap<Oid, SnmpValue>,
    tables: BTreeMap<Oid, Vec<(Oid, SnmpValue)>>,
    /// Every get/walk/set fails with a timeout: an unreachable node.
    unreachable: bool,
    /// Writes to these cells fail with an agent error.
    failing_sets: HashSet<Oid>,
    writes: Mutex<Vec<(Oid, String)>>,
}

impl SimSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// An agent that never answers.
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    pub fn scalar(mut self, oid: &[u32], value: impl Into<SnmpValue>) -> Self {
        self.scalars.insert(Oid::from(oid), value.into());
        self
    }

    /// Install a table: rows are `(single-arc index, value)`.
    pub fn table(mut self, base: &[u32], rows: &[(u32, SnmpValue)]) -> Self {
        let rows = rows
            .iter()
            .map(|(idx, v)| (Oid::new(vec![*idx]), v.clone()))
            .collect();
        self.tables.insert(Oid::from(base), rows);
        self
    }

    /// Install a table with compound indexes (e.g. `module.port`).
    pub fn table_wide(mut self, base: &[u32], rows: &[(&[u32], SnmpValue)]) -> Self {
        let rows = rows
            .iter()
            .map(|(idx, v)| (Oid::from(*idx), v.clone()))
            .collect();
        self.tables.insert(Oid::from(base), rows);
        self
    }

    pub fn fail_set(mut self, oid: Oid) -> Self {
        self.failing_sets.insert(oid);
        self
    }

    /// Every `set_string` issued so far, in order.
    pub fn writes(&self) -> Vec<(Oid, String)> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }

    fn check_reachable(&self) -> Result<(), SnmpError> {
        if self.unreachable {
            return Err(SnmpError::Timeout {
                target: "sim".into(),
                retries: 0,
            });
        }
        Ok(())
    }
}

impl SnmpSession for SimSession {
    async fn get(&self, oid: &Oid) -> Result<SnmpValue, SnmpError> {
        self.check_reachable()?;
        self.scalars
            .get(oid)
            .cloned()
            .ok_or_else(|| SnmpError::NoSuchObject { oid: oid.clone() })
    }

    async fn walk(&self, base: &Oid) -> Result<Vec<(Oid, SnmpValue)>, SnmpError> {
        self.check_reachable()?;
        Ok(self.tables.get(base).cloned().unwrap_or_default())
    }

    async fn set_string(&self, oid: &Oid, text: &str) -> Result<(), SnmpError> {
        self.check_reachable()?;
        if self.failing_sets.contains(oid) {
            return Err(SnmpError::Agent {
                oid: oid.clone(),
                status: "notWritable".into(),
            });
        }
        if let Ok(mut writes) = self.writes.lock() {
            writes.push((oid.clone(), text.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::oids;

    #[test]
    fn scripted_tables_and_writes() {
        tokio_test::block_on(async {
            let session = SimSession::new()
                .scalar(oids::SYS_NAME, "sw1")
                .table(oids::IF_TYPE, &[(1, SnmpValue::Int(6)), (2, SnmpValue::Int(24))]);

            let name = session.get(&Oid::from(oids::SYS_NAME)).await.unwrap();
            assert_eq!(name.as_str(), Some("sw1"));

            let rows = session.walk(&Oid::from(oids::IF_TYPE)).await.unwrap();
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0].0.as_single(), Some(1));

            let target = Oid::from(oids::IF_ALIAS).child(1);
            session.set_string(&target, "note:lab-A").await.unwrap();
            assert_eq!(session.writes(), vec![(target, "note:lab-A".to_string())]);
        });
    }

    #[test]
    fn unreachable_times_out_everywhere() {
        tokio_test::block_on(async {
            let session = SimSession::unreachable();
            let err = session.get(&Oid::from(oids::SYS_OBJECT_ID)).await.unwrap_err();
            assert!(err.is_unreachable());
        });
    }
}
