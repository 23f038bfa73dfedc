//! Spreadsheet ingestion pipeline
//!
//! Turns an uploaded contact file (.csv, .xlsx or .xls) into validated
//! `ContactRecord`s plus per-row errors. The pipeline is a pure
//! transformation over the file content — no network or storage access.
//!
//! Row errors accumulate instead of aborting: a handful of malformed rows
//! must not block import of the rest of a large contact list. Structural
//! problems (wrong format, empty file, zero valid rows) abort with a single
//! user-facing message.

pub mod columns;
pub mod phone;

mod csv;
mod sheet;

use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::types::{ContactRecord, ParseResult};
use self::columns::{first_present, RowBag, EMAIL_KEYS, NAME_KEYS, PHONE_KEYS};

/// Structural parse failures. Row-level validation problems are not errors
/// at this level — they accumulate inside a successful `ParseResult`.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Please upload a valid Excel file (.xlsx, .xls, or .csv)")]
    UnsupportedFormat,

    #[error("File is empty")]
    EmptyFile,

    #[error("No data found in file")]
    NoData,

    #[error("No valid contacts found. Please check that your file has Name and Phone columns.")]
    NoValidContacts,

    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse file: {0}")]
    Malformed(String),
}

/// Parse a contact spreadsheet into validated records.
///
/// Format is inferred from the file extension: `.csv` is read as UTF-8
/// delimited text, `.xlsx`/`.xls` as a binary workbook (first sheet only).
/// Anything else is rejected outright.
pub fn parse_file(path: &Path) -> Result<ParseResult, ParseError> {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let rows = match extension.as_str() {
        "csv" => {
            let text = std::fs::read_to_string(path)?;
            csv::rows_from_text(&text)?
        }
        "xlsx" | "xls" => sheet::rows_from_workbook(path)?,
        _ => return Err(ParseError::UnsupportedFormat),
    };

    debug!(rows = rows.len(), file = %path.display(), "decoded spreadsheet rows");
    records_from_rows(rows)
}

/// Resolve columns, normalize phones and validate each row bag.
///
/// Row numbers in synthesized names and error messages are 2-based: data row
/// 0 sits on spreadsheet row 2, below the header, which is how a human reads
/// the file.
fn records_from_rows(rows: Vec<RowBag>) -> Result<ParseResult, ParseError> {
    if rows.is_empty() {
        return Err(ParseError::NoData);
    }

    let mut contacts = Vec::new();
    let mut errors = Vec::new();

    for (idx, row) in rows.iter().enumerate() {
        let row_number = idx + 2;

        let name = first_present(row, NAME_KEYS)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Contact {}", row_number));
        let raw_phone = first_present(row, PHONE_KEYS).unwrap_or("");
        let email = first_present(row, EMAIL_KEYS).map(str::to_string);

        let normalized = phone::normalize(raw_phone);
        if !phone::is_valid(&normalized) {
            errors.push(format!("Row {}: Invalid phone number", row_number));
            continue;
        }

        contacts.push(ContactRecord {
            name,
            phone: normalized,
            email,
        });
    }

    if contacts.is_empty() {
        return Err(ParseError::NoValidContacts);
    }

    Ok(ParseResult {
        contacts,
        errors: if errors.is_empty() { None } else { Some(errors) },
    })
}
