// ── External records ──

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::FieldConfig;

/// One row from the external record source: an ordered field → value
/// map. Field order follows the configured column order so rendered
/// summaries and cache rows stay deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    fields: IndexMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// The device-id column (raw, not yet case-normalized).
    pub fn device_id<'a>(&'a self, fields: &FieldConfig) -> Option<&'a str> {
        self.get(&fields.device_field)
    }

    /// The interface-id column.
    pub fn interface_id<'a>(&'a self, fields: &FieldConfig) -> Option<&'a str> {
        self.get(&fields.interface_field)
    }

    /// Configured info columns in order; missing columns yield "".
    pub fn info_values<'a>(&'a self, fields: &'a FieldConfig) -> impl Iterator<Item = (&'a str, &'a str)> {
        fields
            .info_fields
            .iter()
            .map(|name| (name.as_str(), self.get(name).unwrap_or("")))
    }

    /// True when every configured info column is blank or whitespace —
    /// such a record carries nothing to reconcile.
    pub fn info_is_blank(&self, fields: &FieldConfig) -> bool {
        self.info_values(fields).all(|(_, v)| v.trim().is_empty())
    }

    /// Comma-joined info values in configured order, for conflict
    /// prompts and logs.
    pub fn render_info(&self, fields: &FieldConfig) -> String {
        self.info_values(fields)
            .map(|(_, v)| v)
            .collect::<Vec<_>>()
            .join(",")
    }
}
