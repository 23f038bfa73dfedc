//! Delimited-text decoding
//!
//! A `.csv` upload is read as UTF-8 text: comma-separated, first record is
//! the header row. Rows are converted to header-keyed bags; fully blank
//! rows are dropped, matching how the workbook path behaves.

use csv::ReaderBuilder;

use super::columns::RowBag;
use super::ParseError;

/// Decode CSV text into one row bag per populated data row.
pub fn rows_from_text(text: &str) -> Result<Vec<RowBag>, ParseError> {
    if text.trim().is_empty() {
        return Err(ParseError::EmptyFile);
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ParseError::Malformed(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ParseError::Malformed(e.to_string()))?;

        let mut bag = RowBag::new();
        for (idx, value) in record.iter().enumerate() {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            if let Some(header) = headers.get(idx) {
                if !header.is_empty() {
                    bag.insert(header.clone(), value.to_string());
                }
            }
        }

        if !bag.is_empty() {
            rows.push(bag);
        }
    }

    Ok(rows)
}
