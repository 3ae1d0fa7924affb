//! CSV bulk import.
//!
//! Rows are header-less, in a fixed column order. Each row is turned into a
//! [`FormData`] keyed by column name and validated with the same field
//! checks the edit forms use. Any error anywhere rejects the whole batch.

use std::collections::HashSet;

use super::forms::{Fields, FormError, FormErrors, INVALID_CHOICE, NON_FIELD_ERRORS};
use super::forms::clean_provider;
use crate::common::FormData;
use crate::domains::circuits::models::{CircuitInput, ProviderInput};
use crate::kernel::store::EntityStore;

pub const PROVIDER_COLUMNS: &[&str] = &["name", "slug", "asn", "account", "portal_url"];

pub const CIRCUIT_COLUMNS: &[&str] = &[
    "cid",
    "provider",
    "type",
    "tenant",
    "install_date",
    "commit_rate",
    "description",
];

/// Form field holding the pasted CSV
pub const CSV_FIELD: &str = "csv";

/// One CSV record keyed by column name.
#[derive(Debug)]
pub struct ImportRow {
    /// Line of the pasted text the record starts on, from 1
    pub line: u64,
    pub data: FormData,
}

/// Split CSV text into rows of exactly `columns.len()` fields.
///
/// Blank lines are skipped. Error messages name the line a row starts on,
/// so every check reports the same number for the same record.
pub fn parse_rows(text: &str, columns: &[&str]) -> Result<Vec<ImportRow>, FormErrors> {
    let mut errors = FormErrors::new();
    let mut rows = Vec::new();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    for (index, record) in reader.records().enumerate() {
        let fallback = index as u64 + 1;
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                let line = e.position().map_or(fallback, |pos| pos.line());
                errors.add(CSV_FIELD, format!("Row {}: {}", line, e));
                continue;
            }
        };
        let line = record.position().map_or(fallback, |pos| pos.line());
        if record.iter().all(str::is_empty) {
            continue;
        }
        if record.len() != columns.len() {
            errors.add(
                CSV_FIELD,
                format!(
                    "Row {}: expected {} fields but found {}",
                    line,
                    columns.len(),
                    record.len()
                ),
            );
            continue;
        }
        let pairs = columns
            .iter()
            .zip(record.iter())
            .map(|(column, value)| (column.to_string(), value.to_string()))
            .collect();
        rows.push(ImportRow {
            line,
            data: FormData::from_pairs(pairs),
        });
    }

    if rows.is_empty() && errors.is_empty() {
        errors.add(CSV_FIELD, "No records were found.");
    }
    errors.finish(rows)
}

/// Fold one row's field errors into the batch under `csv`.
fn add_row_errors(batch: &mut FormErrors, line: u64, row_errors: &FormErrors) {
    for message in row_errors.messages() {
        batch.add(CSV_FIELD, format!("Row {}: {}", line, message));
    }
}

pub async fn clean_provider_import(
    store: &dyn EntityStore,
    text: &str,
) -> Result<Vec<ProviderInput>, FormError> {
    let rows = parse_rows(text, PROVIDER_COLUMNS)?;
    let mut errors = FormErrors::new();
    let mut inputs = Vec::with_capacity(rows.len());
    let mut names = HashSet::new();
    let mut slugs = HashSet::new();

    for row in &rows {
        let line = row.line;
        match clean_provider(store, &row.data, None).await {
            Ok(input) => {
                if !names.insert(input.name.clone()) {
                    errors.add(CSV_FIELD, format!("Row {}: duplicate name {}", line, input.name));
                }
                if !slugs.insert(input.slug.clone()) {
                    errors.add(CSV_FIELD, format!("Row {}: duplicate slug {}", line, input.slug));
                }
                inputs.push(input);
            }
            Err(FormError::Invalid(row_errors)) => add_row_errors(&mut errors, line, &row_errors),
            Err(e) => return Err(e),
        }
    }

    Ok(errors.finish(inputs)?)
}

pub async fn clean_circuit_import(
    store: &dyn EntityStore,
    text: &str,
) -> Result<Vec<CircuitInput>, FormError> {
    let rows = parse_rows(text, CIRCUIT_COLUMNS)?;
    let mut errors = FormErrors::new();
    let mut inputs = Vec::with_capacity(rows.len());
    let mut seen = HashSet::new();

    for row in &rows {
        let line = row.line;
        match clean_circuit_row(store, &row.data).await? {
            Ok(input) => {
                if !seen.insert((input.provider_id, input.cid.clone())) {
                    errors.add(
                        CSV_FIELD,
                        format!("Row {}: duplicate circuit {}", line, input.cid),
                    );
                }
                inputs.push(input);
            }
            Err(row_errors) => add_row_errors(&mut errors, line, &row_errors),
        }
    }

    Ok(errors.finish(inputs)?)
}

/// Circuits reference provider, type and tenant by name in CSV.
async fn clean_circuit_row(
    store: &dyn EntityStore,
    row: &FormData,
) -> Result<Result<CircuitInput, FormErrors>, FormError> {
    let mut fields = Fields::new(row);
    let cid = fields.required_str("cid", 50);
    let install_date = fields.optional_date("install_date");
    let commit_rate = fields
        .optional_int("commit_rate", 0, i32::MAX as i64)
        .map(|v| v as i32);
    let description = fields.optional_str("description", 100);

    let provider = match fields.raw("provider") {
        Some(name) => store.find_provider_by_name(name).await?,
        None => None,
    };
    if provider.is_none() {
        fields.error("provider", INVALID_CHOICE);
    }
    let circuit_type = match fields.raw("type") {
        Some(name) => store.find_circuit_type_by_name(name).await?,
        None => None,
    };
    if circuit_type.is_none() {
        fields.error("type", INVALID_CHOICE);
    }
    let tenant_id = match fields.raw("tenant") {
        Some(name) => match store.find_tenant_by_name(name).await? {
            Some(tenant) => Some(tenant.id),
            None => {
                fields.error("tenant", INVALID_CHOICE);
                None
            }
        },
        None => None,
    };

    let (Some(provider), Some(circuit_type)) = (provider, circuit_type) else {
        return Ok(Err(fields.into_errors()));
    };

    if !cid.is_empty() && store.find_circuit(provider.id, &cid).await?.is_some() {
        fields.error(
            "cid",
            "Circuit with this Provider and Circuit ID already exists.",
        );
    }

    Ok(fields.finish(CircuitInput {
        cid,
        provider_id: provider.id,
        type_id: circuit_type.id,
        tenant_id,
        site_id: None,
        install_date,
        commit_rate,
        description,
        comments: String::new(),
    }))
}

/// Error shown when the form was submitted without any CSV at all
pub fn missing_csv() -> FormErrors {
    let mut errors = FormErrors::new();
    errors.add(CSV_FIELD, super::forms::REQUIRED);
    errors
}

/// Store-level rejection of an otherwise valid batch
pub fn batch_rejected(reason: impl std::fmt::Display) -> FormErrors {
    let mut errors = FormErrors::new();
    errors.add(NON_FIELD_ERRORS, format!("Import failed: {}", reason));
    errors
}
