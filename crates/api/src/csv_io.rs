// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! CSV import and export for hardware and the history log.
//!
//! Import happens in two steps. [`preview_csv_import`] parses and validates
//! every row without touching the database. [`import_csv`] then commits row
//! by row: a failed row is reported and skipped, and the rest still import.
//!
//! A row is a duplicate of an existing active row when the name, serial
//! number, brand, and category all match ignoring case. Duplicates add their
//! quantities to the existing row instead of creating a new one.

use csv::StringRecord;
use pcinv::{Command, TransitionResult, apply};
use pcinv_domain::{
    CategoryRef, DomainError, Hardware, HardwareFields, StatusQuantities, fold_case,
    validate_category_name, validate_hardware_fields,
};
use pcinv_history::{Actor, HistoryEntry};
use pcinv_persistence::{PersistedTransition, Persistence};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{info, warn};

use crate::error::{ApiError, translate_core_error, translate_persistence_error};
use crate::request_response::{
    CsvImportOutcome, CsvImportResponse, CsvImportRowResult, CsvPreviewResponse, CsvPreviewRow,
    CsvRowAction, CsvRowStatus,
};

/// Hardware CSV columns, in export order.
pub const CSV_COLUMNS: [&str; 11] = [
    "name",
    "category",
    "type",
    "brand",
    "model",
    "serial_number",
    "unused",
    "in_use",
    "damaged",
    "repair",
    "location",
];

/// History CSV columns, in export order.
pub const HISTORY_CSV_COLUMNS: [&str; 16] = [
    "created_at",
    "user",
    "action",
    "hardware",
    "category",
    "serial_number",
    "quantity_change",
    "unused_before",
    "in_use_before",
    "damaged_before",
    "repair_before",
    "unused_after",
    "in_use_after",
    "damaged_after",
    "repair_after",
    "details",
];

const REQUIRED_HEADERS: &[&str] = &["name", "category"];

/// A problem with one field of one CSV row.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CsvFieldError {
    /// A required column is empty.
    #[error("{column}: required field is missing or empty")]
    Missing { column: &'static str },

    /// A quantity column does not hold a non-negative whole number.
    #[error("{column}: '{value}' is not a non-negative whole number")]
    InvalidQuantity { column: &'static str, value: String },

    /// A field fails domain validation.
    #[error("{column}: {message}")]
    Invalid { column: &'static str, message: String },

    /// The row itself could not be read.
    #[error("CSV parse error: {0}")]
    Malformed(String),
}

/// A validated CSV row, ready to import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvHardwareRow {
    /// The normalized category label.
    pub category: String,
    /// The descriptive fields.
    pub fields: HardwareFields,
    /// The unit counts.
    pub quantities: StatusQuantities,
}

/// A parsed CSV row, valid or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCsvRow {
    /// The row number (1-based, excluding header).
    pub row_number: usize,
    /// The raw name, if present.
    pub name: Option<String>,
    /// The raw category, if present.
    pub category: Option<String>,
    /// The validated row, or every problem found with it.
    pub result: Result<CsvHardwareRow, Vec<CsvFieldError>>,
}

/// Normalizes a CSV header string for case-insensitive, whitespace-tolerant matching.
fn normalize_header(header: &str) -> String {
    let normalized: String = header
        .trim_start_matches('\u{feff}')
        .trim()
        .to_lowercase()
        .replace(' ', "_");
    match normalized.as_str() {
        "hardware_type" => String::from("type"),
        _ => normalized,
    }
}

/// Validates that all required headers are present in the CSV.
fn validate_headers(headers: &StringRecord) -> Result<HashMap<String, usize>, ApiError> {
    let header_map: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| (normalize_header(header), idx))
        .collect();

    let missing: Vec<&str> = REQUIRED_HEADERS
        .iter()
        .copied()
        .filter(|required| !header_map.contains_key(*required))
        .collect();
    if !missing.is_empty() {
        return Err(ApiError::InvalidCsvFormat {
            reason: format!("Missing required headers: {}", missing.join(", ")),
        });
    }

    Ok(header_map)
}

fn parse_quantity(column: &'static str, value: &str) -> Result<u32, CsvFieldError> {
    if value.is_empty() {
        return Ok(0);
    }
    value
        .parse::<u32>()
        .map_err(|_| CsvFieldError::InvalidQuantity {
            column,
            value: value.to_string(),
        })
}

fn field_error(err: &DomainError) -> CsvFieldError {
    let column: &'static str = match err {
        DomainError::FieldTooLong { field, .. } => *field,
        _ => "name",
    };
    CsvFieldError::Invalid {
        column,
        message: err.to_string(),
    }
}

/// Returns a trimmed field by normalized column name, or `""` if absent.
fn field<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> &'a str {
    header_map
        .get(name)
        .and_then(|&idx| record.get(idx))
        .map_or("", str::trim)
}

/// Parses one record into a validated row, collecting every error.
fn parse_record(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
) -> Result<CsvHardwareRow, Vec<CsvFieldError>> {
    let get_field = |name: &str| field(record, header_map, name);
    let mut errors: Vec<CsvFieldError> = Vec::new();

    let fields: HardwareFields = HardwareFields::new(
        get_field("name"),
        get_field("type"),
        get_field("brand"),
        get_field("model"),
        get_field("serial_number"),
        get_field("location"),
    );
    if fields.name.is_empty() {
        errors.push(CsvFieldError::Missing { column: "name" });
    } else if let Err(e) = validate_hardware_fields(&fields) {
        errors.push(field_error(&e));
    }

    let category: String = match get_field("category") {
        "" => {
            errors.push(CsvFieldError::Missing { column: "category" });
            String::new()
        }
        raw => validate_category_name(raw).unwrap_or_else(|e| {
            errors.push(CsvFieldError::Invalid {
                column: "category",
                message: e.to_string(),
            });
            String::new()
        }),
    };

    let mut counts: [u32; 4] = [0; 4];
    for (slot, column) in counts
        .iter_mut()
        .zip(["unused", "in_use", "damaged", "repair"])
    {
        match parse_quantity(column, get_field(column)) {
            Ok(value) => *slot = value,
            Err(e) => errors.push(e),
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    let [unused, in_use, damaged, repair] = counts;
    Ok(CsvHardwareRow {
        category,
        fields,
        quantities: StatusQuantities::new(unused, in_use, damaged, repair),
    })
}

/// Parses and validates CSV hardware data.
///
/// Rows whose fields are all empty are skipped. Quantity columns are
/// optional and default to 0.
///
/// # Errors
///
/// Returns `InvalidCsvFormat` if the header row cannot be read or lacks a
/// required column. Problems with individual rows are reported per row.
pub fn parse_hardware_csv(csv_content: &str) -> Result<Vec<ParsedCsvRow>, ApiError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_content.as_bytes());

    let headers: StringRecord = reader
        .headers()
        .map_err(|e| ApiError::InvalidCsvFormat {
            reason: format!("Failed to read CSV headers: {e}"),
        })?
        .clone();
    let header_map: HashMap<String, usize> = validate_headers(&headers)?;

    let column_value = |record: &StringRecord, name: &str| -> Option<String> {
        header_map
            .get(name)
            .and_then(|&idx| record.get(idx))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    };

    let mut rows: Vec<ParsedCsvRow> = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let row_number: usize = idx + 1;

        let record: StringRecord = match result {
            Ok(rec) => rec,
            Err(e) => {
                rows.push(ParsedCsvRow {
                    row_number,
                    name: None,
                    category: None,
                    result: Err(vec![CsvFieldError::Malformed(e.to_string())]),
                });
                continue;
            }
        };

        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        rows.push(ParsedCsvRow {
            row_number,
            name: column_value(&record, "name"),
            category: column_value(&record, "category"),
            result: parse_record(&record, &header_map),
        });
    }

    Ok(rows)
}

/// Key used to spot rows within one file that will merge into each other.
fn duplicate_key(row: &CsvHardwareRow) -> (String, String, String, String) {
    (
        fold_case(&row.category),
        fold_case(&row.fields.name),
        fold_case(&row.fields.serial_number),
        fold_case(&row.fields.brand),
    )
}

/// Previews a CSV import without writing anything.
///
/// Valid rows report whether they would create a new row or merge into an
/// existing one, including rows that duplicate an earlier row of the same
/// file.
///
/// # Errors
///
/// Returns an error if the CSV header is invalid or a lookup fails.
pub fn preview_csv_import(
    persistence: &mut Persistence,
    csv_content: &str,
) -> Result<CsvPreviewResponse, ApiError> {
    let parsed: Vec<ParsedCsvRow> = parse_hardware_csv(csv_content)?;
    let mut seen: HashSet<(String, String, String, String)> = HashSet::new();
    let mut rows: Vec<CsvPreviewRow> = Vec::with_capacity(parsed.len());

    for row in parsed {
        let (status, action, errors) = match &row.result {
            Ok(valid) => {
                let merges: bool =
                    !seen.insert(duplicate_key(valid)) || existing_duplicate(persistence, valid)?;
                let action: CsvRowAction = if merges {
                    CsvRowAction::Merge
                } else {
                    CsvRowAction::Create
                };
                (CsvRowStatus::Valid, Some(action), Vec::new())
            }
            Err(errors) => (
                CsvRowStatus::Invalid,
                None,
                errors.iter().map(ToString::to_string).collect(),
            ),
        };
        rows.push(CsvPreviewRow {
            row_number: row.row_number,
            name: row.name,
            category: row.category,
            status,
            action,
            errors,
        });
    }

    let valid_count: usize = rows
        .iter()
        .filter(|row| row.status == CsvRowStatus::Valid)
        .count();
    Ok(CsvPreviewResponse {
        total_rows: rows.len(),
        valid_count,
        invalid_count: rows.len() - valid_count,
        rows,
    })
}

fn existing_duplicate(
    persistence: &mut Persistence,
    row: &CsvHardwareRow,
) -> Result<bool, ApiError> {
    let Some(category) = persistence
        .get_category_by_name(&row.category)
        .map_err(translate_persistence_error)?
    else {
        return Ok(false);
    };
    persistence
        .find_import_duplicate(
            category.category_id,
            &row.fields.name,
            &row.fields.serial_number,
            &row.fields.brand,
        )
        .map(|found| found.is_some())
        .map_err(translate_persistence_error)
}

/// Imports CSV hardware data, committing each row on its own.
///
/// Unknown categories are created on the fly. Each imported row writes
/// exactly one history entry: `imported` for a new row, `import_merged`
/// when quantities were added to a duplicate.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `csv_content` - The raw CSV text
/// * `actor` - The user recorded on history entries
/// * `now` - The timestamp recorded on every change
///
/// # Errors
///
/// Returns an error only if the CSV header is invalid. Row failures are
/// reported in the response.
pub fn import_csv(
    persistence: &mut Persistence,
    csv_content: &str,
    actor: &Actor,
    now: &str,
) -> Result<CsvImportResponse, ApiError> {
    let parsed: Vec<ParsedCsvRow> = parse_hardware_csv(csv_content)?;
    let mut rows: Vec<CsvImportRowResult> = Vec::with_capacity(parsed.len());

    for row in parsed {
        let outcome: CsvImportOutcome = match &row.result {
            Ok(valid) => import_row(persistence, valid, actor, now).unwrap_or_else(|e| {
                warn!(row = row.row_number, error = %e, "CSV row failed to import");
                CsvImportOutcome::Failed {
                    message: e.to_string(),
                }
            }),
            Err(errors) => CsvImportOutcome::Failed {
                message: errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<String>>()
                    .join("; "),
            },
        };
        rows.push(CsvImportRowResult {
            row_number: row.row_number,
            name: row.name,
            outcome,
        });
    }

    let count = |pred: fn(&CsvImportOutcome) -> bool| -> usize {
        rows.iter().filter(|row| pred(&row.outcome)).count()
    };
    let created: usize = count(|o| matches!(o, CsvImportOutcome::Created { .. }));
    let merged: usize = count(|o| matches!(o, CsvImportOutcome::Merged { .. }));
    let failed: usize = count(|o| matches!(o, CsvImportOutcome::Failed { .. }));

    info!(created, merged, failed, "CSV import finished");

    Ok(CsvImportResponse {
        message: format!("Imported {created} new, merged {merged}, skipped {failed} row(s)"),
        rows,
        created,
        merged,
        failed,
    })
}

fn import_row(
    persistence: &mut Persistence,
    row: &CsvHardwareRow,
    actor: &Actor,
    now: &str,
) -> Result<CsvImportOutcome, ApiError> {
    let category: CategoryRef = resolve_category(persistence, &row.category, now)?;

    let duplicate: Option<Hardware> = persistence
        .find_import_duplicate(
            category.id,
            &row.fields.name,
            &row.fields.serial_number,
            &row.fields.brand,
        )
        .map_err(translate_persistence_error)?;

    let (transition, existing_id): (TransitionResult, Option<i64>) = match duplicate {
        Some(existing) => (
            apply(
                Some(&existing),
                Command::MergeImport {
                    quantities: row.quantities,
                },
                actor.clone(),
                now,
            )
            .map_err(translate_core_error)?,
            existing.id,
        ),
        None => (
            apply(
                None,
                Command::Import {
                    category,
                    fields: row.fields.clone(),
                    quantities: row.quantities,
                },
                actor.clone(),
                now,
            )
            .map_err(translate_core_error)?,
            None,
        ),
    };

    let persisted: PersistedTransition = persistence
        .persist_transition(&transition, now)
        .map_err(translate_persistence_error)?;
    let hardware_id: i64 = persisted.hardware_id.unwrap_or_default();

    Ok(if existing_id.is_some() {
        CsvImportOutcome::Merged { hardware_id }
    } else {
        CsvImportOutcome::Created { hardware_id }
    })
}

/// Looks a category up by name, creating it if it does not exist.
fn resolve_category(
    persistence: &mut Persistence,
    name: &str,
    now: &str,
) -> Result<CategoryRef, ApiError> {
    if let Some(existing) = persistence
        .get_category_by_name(name)
        .map_err(translate_persistence_error)?
    {
        return Ok(CategoryRef::new(existing.category_id, &existing.name));
    }

    let category_id: i64 = persistence
        .create_category(name, now)
        .map_err(translate_persistence_error)?;
    info!(category_id, name, "Created category during CSV import");
    Ok(CategoryRef::new(category_id, name))
}

fn write_csv<const N: usize>(
    header: [&str; N],
    records: impl IntoIterator<Item = [String; N]>,
) -> Result<String, ApiError> {
    let to_internal = |e: &dyn std::fmt::Display| ApiError::Internal {
        message: format!("Failed to write CSV: {e}"),
    };

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(header).map_err(|e| to_internal(&e))?;
    for record in records {
        writer.write_record(&record).map_err(|e| to_internal(&e))?;
    }
    let bytes: Vec<u8> = writer.into_inner().map_err(|e| to_internal(&e))?;
    String::from_utf8(bytes).map_err(|e| to_internal(&e))
}

/// Renders hardware rows as CSV in [`CSV_COLUMNS`] order.
///
/// The output has a header row and can be imported again unchanged.
///
/// # Errors
///
/// Returns an error if the CSV writer fails.
pub fn export_hardware_csv(items: &[Hardware]) -> Result<String, ApiError> {
    write_csv(
        CSV_COLUMNS,
        items.iter().map(|hardware| {
            [
                hardware.fields.name.clone(),
                hardware.category.name.clone(),
                hardware.fields.hardware_type.clone(),
                hardware.fields.brand.clone(),
                hardware.fields.model.clone(),
                hardware.fields.serial_number.clone(),
                hardware.quantities.unused.to_string(),
                hardware.quantities.in_use.to_string(),
                hardware.quantities.damaged.to_string(),
                hardware.quantities.repair.to_string(),
                hardware.fields.location.clone(),
            ]
        }),
    )
}

/// Renders history entries as CSV in [`HISTORY_CSV_COLUMNS`] order.
///
/// # Errors
///
/// Returns an error if the CSV writer fails.
pub fn export_history_csv(entries: &[HistoryEntry]) -> Result<String, ApiError> {
    write_csv(
        HISTORY_CSV_COLUMNS,
        entries.iter().map(|entry| {
            let event = &entry.event;
            [
                entry.created_at.clone(),
                event.actor.user_name.clone(),
                event.action.as_str().to_string(),
                event.hardware.hardware_name.clone(),
                event.hardware.category_name.clone(),
                event.hardware.serial_number.clone(),
                entry.quantity_change.to_string(),
                event.before.unused.to_string(),
                event.before.in_use.to_string(),
                event.before.damaged.to_string(),
                event.before.repair.to_string(),
                event.after.unused.to_string(),
                event.after.in_use.to_string(),
                event.after.damaged.to_string(),
                event.after.repair.to_string(),
                event.details.clone().unwrap_or_default(),
            ]
        }),
    )
}
