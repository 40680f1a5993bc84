// ── Record sources ──
//
// Inventory records arrive from delimited files today; the trait keeps
// room for other backends (a database export, an API pull) without
// touching the reconciler.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::config::FieldConfig;
use crate::error::CoreError;
use crate::record::Record;

pub trait RecordSource {
    fn load(&self, fields: &FieldConfig) -> Result<Vec<Record>, CoreError>;
}

/// Header-driven delimited file. The first non-empty line names the
/// columns; every column the field configuration references must be
/// present or the load fails. Extra columns are ignored.
#[derive(Debug, Clone)]
pub struct DelimitedFileSource {
    path: PathBuf,
    delimiter: char,
}

impl DelimitedFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: '\t',
        }
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for DelimitedFileSource {
    fn load(&self, fields: &FieldConfig) -> Result<Vec<Record>, CoreError> {
        let text = std::fs::read_to_string(&self.path)?;
        parse_records(&text, self.delimiter, fields, &self.path.display().to_string())
    }
}

fn parse_records(
    text: &str,
    delimiter: char,
    fields: &FieldConfig,
    origin: &str,
) -> Result<Vec<Record>, CoreError> {
    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let Some((_, header)) = lines.next() else {
        return Err(CoreError::SchemaMismatch {
            path: origin.to_string(),
            missing: fields.all_columns().join(", "),
        });
    };
    let columns: Vec<&str> = header.split(delimiter).map(str::trim).collect();

    let missing: Vec<&str> = fields
        .all_columns()
        .into_iter()
        .filter(|wanted| !columns.contains(wanted))
        .collect();
    if !missing.is_empty() {
        return Err(CoreError::SchemaMismatch {
            path: origin.to_string(),
            missing: missing.join(", "),
        });
    }

    let mut records = Vec::new();
    for (idx, line) in lines {
        let cells: Vec<&str> = line.split(delimiter).map(str::trim).collect();
        if cells.len() < columns.len() {
            warn!(
                origin,
                line = idx + 1,
                cells = cells.len(),
                columns = columns.len(),
                "short row skipped"
            );
            continue;
        }
        let mut record = Record::new();
        for (name, value) in columns.iter().zip(&cells) {
            record.set(*name, *value);
        }
        records.push(record);
    }
    Ok(records)
}
