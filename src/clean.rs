//! Turns loosely typed sheet rows into [`ClientRecord`]s.
//!
//! Coercion rules:
//!
//! * count columns (`Population Size`, `Total OE Count`,
//!   `Confirmed OE Events`) accept numbers and numeric text, truncated toward
//!   zero; anything missing, non-numeric, negative or non-finite becomes `0`
//!   and never drops the row;
//! * window dates that are blank, `No date configured`, or unparsable drop the
//!   row, as do an empty `ControlId` and a window that ends before it starts.

use chrono::{Days, NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

use crate::error::{ReportError, Result, RowParseError};
use crate::model::{ClientRecord, ControlId, PopulationType, RawCell, RawRow, RawTable};

pub const CONTROL_ID: &str = "ControlId";
pub const POPULATION_TYPE: &str = "Population Type";
pub const POPULATION_SIZE: &str = "Population Size";
pub const TOTAL_OE_COUNT: &str = "Total OE Count";
pub const CONFIRMED_OE_EVENTS: &str = "Confirmed OE Events";
pub const WINDOW_START: &str = "Window Start from CDR";
pub const WINDOW_END: &str = "Window End from CDR";

const REQUIRED_COLUMNS: [&str; 3] = [CONTROL_ID, WINDOW_START, WINDOW_END];

/// Placeholder the export writes instead of leaving a date cell empty.
const NO_DATE_SENTINEL: &str = "No date configured";

// Two-digit years are tried first; `%Y` would read "25" as year 25.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%y", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
];

/// A row discarded during cleaning.
#[derive(Debug, Clone, PartialEq)]
pub struct RowIssue {
    /// Zero-based data row index, matching `ClientRecord::source_order`.
    pub row: usize,
    /// One-based row number as shown in Excel.
    pub sheet_row: usize,
    pub error: RowParseError,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CleanedTable {
    pub records: Vec<ClientRecord>,
    pub dropped: Vec<RowIssue>,
}

/// Cleans every row of `table`. Fails only when a required column is absent.
pub fn clean_table(table: &RawTable) -> Result<CleanedTable> {
    for column in REQUIRED_COLUMNS {
        if !table.headers.iter().any(|header| header == column) {
            return Err(ReportError::MissingColumn {
                sheet: table.sheet_name.clone(),
                column: column.to_string(),
            });
        }
    }

    let mut cleaned = CleanedTable::default();
    for row in &table.rows {
        if row.is_blank() {
            continue;
        }
        match clean_row(row) {
            Ok(record) => cleaned.records.push(record),
            Err(error) => {
                debug!(row = row.sheet_row, %error, "dropping row");
                cleaned.dropped.push(RowIssue {
                    row: row.index,
                    sheet_row: row.sheet_row,
                    error,
                });
            }
        }
    }

    if !cleaned.dropped.is_empty() {
        warn!(
            dropped = cleaned.dropped.len(),
            kept = cleaned.records.len(),
            "rows dropped during cleaning"
        );
    }
    Ok(cleaned)
}

/// Cleans a single row, keeping its index as the record's `source_order`.
pub fn clean_row(row: &RawRow) -> std::result::Result<ClientRecord, RowParseError> {
    let control_id =
        ControlId::new(cell_text(row.get(CONTROL_ID))).ok_or(RowParseError::MissingControlId)?;

    let window_start = parse_date(row.get(WINDOW_START), WINDOW_START)?;
    let window_end = parse_date(row.get(WINDOW_END), WINDOW_END)?;
    if window_start > window_end {
        return Err(RowParseError::InvertedWindow {
            start: window_start,
            end: window_end,
        });
    }

    Ok(ClientRecord {
        control_id,
        population_type: PopulationType::parse(&cell_text(row.get(POPULATION_TYPE))),
        population_size: parse_count(row.get(POPULATION_SIZE)),
        total_oe_count: parse_count(row.get(TOTAL_OE_COUNT)),
        confirmed_oe_events: parse_count(row.get(CONFIRMED_OE_EVENTS)),
        window_start,
        window_end,
        source_order: row.index,
    })
}

fn cell_text(cell: &RawCell) -> String {
    match cell {
        RawCell::Empty => String::new(),
        RawCell::Text(value) => value.trim().to_string(),
        RawCell::Number(value) | RawCell::DateSerial(value) => format_number(*value),
        RawCell::Bool(value) => value.to_string(),
    }
}

// Integral floats come back from calamine as e.g. `1042.0`.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

fn parse_count(cell: &RawCell) -> u64 {
    let value = match cell {
        RawCell::Number(value) => *value,
        RawCell::Text(text) => match text.trim().replace(',', "").parse::<f64>() {
            Ok(value) => value,
            Err(_) => return 0,
        },
        RawCell::Bool(_) | RawCell::Empty | RawCell::DateSerial(_) => return 0,
    };
    if value.is_finite() && value >= 0.0 {
        value.trunc() as u64
    } else {
        0
    }
}

fn parse_date(cell: &RawCell, column: &str) -> std::result::Result<NaiveDate, RowParseError> {
    let missing = || RowParseError::MissingDate {
        column: column.to_string(),
    };
    let invalid = |value: String| RowParseError::InvalidDate {
        column: column.to_string(),
        value,
    };

    match cell {
        RawCell::Empty => Err(missing()),
        RawCell::DateSerial(serial) | RawCell::Number(serial) => {
            from_excel_serial(*serial).ok_or_else(|| invalid(serial.to_string()))
        }
        RawCell::Bool(value) => Err(invalid(value.to_string())),
        RawCell::Text(text) => {
            let text = text.trim();
            if text.is_empty() || text.eq_ignore_ascii_case(NO_DATE_SENTINEL) {
                return Err(missing());
            }
            parse_date_text(text).ok_or_else(|| invalid(text.to_string()))
        }
    }
}

/// Parses the textual date layouts seen in exports; time of day is discarded.
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
                .map(|datetime| datetime.date())
        })
}

/// Converts an Excel 1900-system serial to a calendar date.
pub fn from_excel_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_days(Days::new(serial.trunc() as u64))
}
