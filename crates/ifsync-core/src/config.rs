// ── Engine configuration ──
//
// One explicit struct constructed at startup and passed by reference
// into each stage; no ambient globals.

use ifsync_snmp::{Oid, oids};

use crate::error::CoreError;

/// Names of the external-record columns the reconciler operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldConfig {
    /// Column holding the device serial.
    pub device_field: String,
    /// Column holding the interface name (or its trailing digits when
    /// auto-match is on).
    pub interface_field: String,
    /// Informational columns, in the order they are rendered and
    /// written back.
    pub info_fields: Vec<String>,
}

impl FieldConfig {
    /// Missing field names are run-fatal, caught before any probing.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.device_field.trim().is_empty() {
            return Err(CoreError::Config {
                message: "device field name is not set".into(),
            });
        }
        if self.interface_field.trim().is_empty() {
            return Err(CoreError::Config {
                message: "interface field name is not set".into(),
            });
        }
        if self.info_fields.is_empty() || self.info_fields.iter().any(|f| f.trim().is_empty()) {
            return Err(CoreError::Config {
                message: "at least one non-empty info field name is required".into(),
            });
        }
        Ok(())
    }

    /// All configured columns: device, interface, then info fields.
    pub fn all_columns(&self) -> Vec<&str> {
        let mut cols = vec![self.device_field.as_str(), self.interface_field.as_str()];
        cols.extend(self.info_fields.iter().map(String::as_str));
        cols
    }
}

/// Engine knobs for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub fields: FieldConfig,
    /// Substitute `[^0-9]<ifName>$` matches when the record's interface
    /// name does not exist verbatim on the device.
    pub auto_match: bool,
    /// Bounded probe concurrency.
    pub workers: usize,
    /// Write-back target column OID (without the interface index).
    pub sync_oid: Oid,
}

impl RunConfig {
    pub fn new(fields: FieldConfig) -> Result<Self, CoreError> {
        fields.validate()?;
        Ok(Self {
            fields,
            auto_match: false,
            workers: 8,
            sync_oid: Oid::from(oids::IF_ALIAS),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::FieldConfig;

    fn fields() -> FieldConfig {
        FieldConfig {
            device_field: "serial".into(),
            interface_field: "if".into(),
            info_fields: vec!["note".into(), "owner".into()],
        }
    }

    #[test]
    fn validation_rejects_missing_names() {
        assert!(fields().validate().is_ok());

        let mut f = fields();
        f.device_field = String::new();
        assert!(f.validate().is_err());

        let mut f = fields();
        f.info_fields.clear();
        assert!(f.validate().is_err());

        let mut f = fields();
        f.info_fields = vec![" ".into()];
        assert!(f.validate().is_err());
    }

    #[test]
    fn all_columns_keeps_configured_order() {
        assert_eq!(fields().all_columns(), vec!["serial", "if", "note", "owner"]);
    }
}
