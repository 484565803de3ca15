use std::collections::BTreeMap;
use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};
use tracing::{debug, instrument};

use crate::error::{ReportError, Result};
use crate::model::{RawCell, RawRow, RawTable};

/// Sheet holding the per-client enrollment counts in the weekly export.
pub const OE_COUNTS_SHEET: &str = "OE Counts";

/// Reads `sheet` from the workbook at `path`. The first row is taken as the
/// header row; every following row becomes a [`RawRow`] in source order.
#[instrument(level = "debug", skip_all, fields(path = %path.display(), sheet = %sheet))]
pub fn read_sheet(path: &Path, sheet: &str) -> Result<RawTable> {
    if !path.exists() {
        return Err(ReportError::MissingInput(path.to_path_buf()));
    }

    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = read_required_sheet(&mut workbook, sheet)?;

    // Ranges begin at the first used cell, so leading blank rows shift the
    // header away from sheet row 1.
    let header_row = range.start().map(|(row, _)| row as usize).unwrap_or(0) + 1;

    let mut rows_iter = range.rows();
    let headers: Vec<String> = match rows_iter.next() {
        Some(first_row) => first_row
            .iter()
            .map(|cell| cell_to_string(Some(cell)).trim().to_string())
            .collect(),
        None => Vec::new(),
    };

    let rows: Vec<RawRow> = rows_iter
        .enumerate()
        .map(|(index, row)| {
            let mut cells = BTreeMap::new();
            for (header, cell) in headers.iter().zip(row.iter()) {
                if header.is_empty() {
                    continue;
                }
                // Duplicate headers resolve to the leftmost column.
                cells.entry(header.clone()).or_insert_with(|| to_raw_cell(cell));
            }
            RawRow {
                index,
                sheet_row: header_row + 1 + index,
                cells,
            }
        })
        .collect();

    debug!(columns = headers.len(), rows = rows.len(), "sheet loaded");
    Ok(RawTable {
        sheet_name: sheet.to_string(),
        headers,
        rows,
    })
}

fn read_required_sheet<R: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<R>,
    name: &str,
) -> Result<calamine::Range<DataType>> {
    let available = workbook.sheet_names().to_vec();
    let range_result = workbook
        .worksheet_range(name)
        .ok_or_else(|| ReportError::MissingSheet {
            sheet: name.to_string(),
            available,
        })?;
    let range = range_result.map_err(ReportError::from)?;
    Ok(range)
}

fn to_raw_cell(cell: &DataType) -> RawCell {
    match cell {
        DataType::Empty => RawCell::Empty,
        DataType::String(value) => RawCell::Text(value.clone()),
        DataType::Float(value) => RawCell::Number(*value),
        DataType::Int(value) => RawCell::Number(*value as f64),
        DataType::Bool(value) => RawCell::Bool(*value),
        DataType::DateTime(serial) => RawCell::DateSerial(*serial),
        other => RawCell::Text(other.to_string()),
    }
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
