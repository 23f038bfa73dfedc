//! Binary workbook decoding (.xlsx / .xls)
//!
//! Only the first sheet of an uploaded workbook is read. Cells are rendered
//! to display strings — dates come out formatted, not as raw serials — and
//! the first row supplies the header labels for the row bags.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveTime;

use super::columns::RowBag;
use super::ParseError;

/// Decode the first sheet of a workbook into one row bag per populated row.
pub fn rows_from_workbook(path: &Path) -> Result<Vec<RowBag>, ParseError> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| ParseError::Malformed(e.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(ParseError::EmptyFile)?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ParseError::Malformed(e.to_string()))?;

    if range.is_empty() {
        return Err(ParseError::EmptyFile);
    }

    let mut row_iter = range.rows();
    let headers: Vec<String> = row_iter
        .next()
        .map(|cells| {
            cells
                .iter()
                .map(|c| cell_text(c).unwrap_or_default())
                .collect()
        })
        .unwrap_or_default();

    let mut rows = Vec::new();
    for cells in row_iter {
        let mut bag = RowBag::new();
        for (idx, cell) in cells.iter().enumerate() {
            let Some(value) = cell_text(cell) else {
                continue;
            };
            if let Some(header) = headers.get(idx) {
                if !header.is_empty() {
                    bag.insert(header.clone(), value);
                }
            }
        }
        if !bag.is_empty() {
            rows.push(bag);
        }
    }

    Ok(rows)
}

/// Render a cell to its display string. Empty and error cells read as absent.
fn cell_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty => return None,
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) if ndt.time() == NaiveTime::MIN => ndt.format("%Y-%m-%d").to_string(),
            Some(ndt) => ndt.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => dt.as_f64().to_string(),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        Data::Error(_) => return None,
    };

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
