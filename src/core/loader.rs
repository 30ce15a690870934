//! Equipment list loading
//!
//! Reads a commissioning equipment list from CSV into normalized
//! [`EquipmentRecord`]s. Header names are matched case-insensitively with a
//! small alias table; every unknown column is carried as metadata.

use csv::{ReaderBuilder, StringRecord, Trim};
use miette::Diagnostic;
use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::entities::{Commissioning, EquipmentRecord};

/// Canonical field names and the header spellings accepted for them
const FIELD_ALIASES: &[(&str, &[&str])] = &[
    ("equipment_number", &["equipment_number", "equipment_no", "equipment", "tag"]),
    ("parent_equipment_number", &["parent_equipment_number", "parent_equipment", "parent"]),
    ("subsystem", &["subsystem", "sub_system"]),
    ("description", &["description"]),
    ("commissioning", &["commissioning", "commissioning_yn", "commissioning_y_n", "commissioned"]),
    ("plu", &["plu"]),
];

const REQUIRED_FIELDS: [&str; 4] = ["equipment_number", "subsystem", "description", "commissioning"];

/// A data row that was not turned into a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based line in the source file
    pub line: u64,
    pub reason: String,
}

/// Records read from an equipment list plus the rows that were skipped
#[derive(Debug, Clone, Default)]
pub struct EquipmentList {
    pub records: Vec<EquipmentRecord>,
    pub skipped: Vec<SkippedRow>,
}

impl EquipmentList {
    pub fn rows(&self) -> usize {
        self.records.len() + self.skipped.len()
    }
}

/// Errors that can occur while reading an equipment list
#[derive(Debug, Error, Diagnostic)]
pub enum LoadError {
    #[error("equipment list not found: {0:?}")]
    #[diagnostic(code(wbsgen::load::not_found))]
    NotFound(PathBuf),

    #[error("equipment list is missing required column '{column}'")]
    #[diagnostic(
        code(wbsgen::load::missing_column),
        help("expected columns: equipment_number, parent_equipment_number, subsystem, description, commissioning, plu")
    )]
    MissingColumn { column: String },

    #[error("CSV error: {0}")]
    #[diagnostic(code(wbsgen::load::csv))]
    Csv(String),

    #[error("IO error: {0}")]
    #[diagnostic(code(wbsgen::load::io))]
    IoError(String),
}

/// Normalize a header: lowercase, runs of non-alphanumerics become `_`
pub fn normalize_header(header: &str) -> String {
    let mut out = String::with_capacity(header.len());
    let mut pending_sep = false;
    for c in header.trim().chars() {
        if c.is_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.extend(c.to_lowercase());
        } else {
            pending_sep = true;
        }
    }
    out
}

/// Canonical field name for a normalized header
fn canonical_field(normalized: &str) -> Option<&'static str> {
    FIELD_ALIASES
        .iter()
        .find(|(_, aliases)| aliases.contains(&normalized))
        .map(|(field, _)| *field)
}

/// Map canonical field names to column indexes; the first matching column wins
fn build_header_map(headers: &StringRecord) -> (HashMap<&'static str, usize>, Vec<(String, usize)>) {
    let mut fields = HashMap::new();
    let mut extra = Vec::new();
    for (i, header) in headers.iter().enumerate() {
        let normalized = normalize_header(header);
        match canonical_field(&normalized) {
            Some(field) if !fields.contains_key(field) => {
                fields.insert(field, i);
            }
            _ if !normalized.is_empty() => extra.push((header.trim().trim_start_matches('\u{feff}').to_string(), i)),
            _ => {}
        }
    }
    (fields, extra)
}

fn get_field(record: &StringRecord, fields: &HashMap<&'static str, usize>, field: &str) -> Option<String> {
    fields
        .get(field)
        .and_then(|&idx| record.get(idx))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Load an equipment list from a CSV file
pub fn load_equipment(path: &Path) -> Result<EquipmentList, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }
    let file = std::fs::File::open(path).map_err(|e| LoadError::IoError(e.to_string()))?;
    let list = read_equipment(file)?;
    tracing::info!(
        path = %path.display(),
        records = list.records.len(),
        skipped = list.skipped.len(),
        "loaded equipment list"
    );
    Ok(list)
}

/// Read an equipment list from any CSV source
pub fn read_equipment<R: Read>(source: R) -> Result<EquipmentList, LoadError> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| LoadError::Csv(e.to_string()))?
        .clone();
    let (fields, extra) = build_header_map(&headers);

    for required in REQUIRED_FIELDS {
        if !fields.contains_key(required) {
            return Err(LoadError::MissingColumn {
                column: required.to_string(),
            });
        }
    }

    let mut list = EquipmentList::default();
    for (row, result) in reader.records().enumerate() {
        let record = result.map_err(|e| LoadError::Csv(e.to_string()))?;
        let line = record.position().map_or(row as u64 + 2, |p| p.line());

        if record.iter().all(|v| v.trim().is_empty()) {
            continue;
        }

        match parse_row(&record, &fields, &extra) {
            Ok(equipment) => list.records.push(equipment),
            Err(reason) => {
                tracing::debug!(line, %reason, "skipping equipment row");
                list.skipped.push(SkippedRow { line, reason });
            }
        }
    }

    Ok(list)
}

fn parse_row(
    record: &StringRecord,
    fields: &HashMap<&'static str, usize>,
    extra: &[(String, usize)],
) -> Result<EquipmentRecord, String> {
    let mut values = HashMap::new();
    for field in REQUIRED_FIELDS {
        let value = get_field(record, fields, field).ok_or_else(|| format!("missing {}", field))?;
        values.insert(field, value);
    }

    let commissioning: Commissioning = values["commissioning"].parse()?;

    let mut equipment = EquipmentRecord::new(
        values["equipment_number"].clone(),
        values["subsystem"].clone(),
        values["description"].clone(),
        commissioning,
    );
    if let Some(parent) = get_field(record, fields, "parent_equipment_number") {
        equipment = equipment.with_parent(parent);
    }
    if let Some(plu) = get_field(record, fields, "plu") {
        equipment = equipment.with_plu(plu);
    }

    let mut metadata = BTreeMap::new();
    for (name, idx) in extra {
        if let Some(value) = record.get(*idx).map(str::trim).filter(|v| !v.is_empty()) {
            metadata.insert(name.clone(), value.to_string());
        }
    }
    equipment.metadata = metadata;

    Ok(equipment)
}
