#![allow(dead_code)]

use std::path::Path;

use chrono::NaiveDate;
use oe_weekly::model::{ClientRecord, ControlId, PopulationType};
use rust_xlsxwriter::Workbook;

pub const HEADERS: [&str; 7] = [
    "ControlId",
    "Population Type",
    "Population Size",
    "Total OE Count",
    "Confirmed OE Events",
    "Window Start from CDR",
    "Window End from CDR",
];

pub fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("valid test date")
}

pub fn record(
    control_id: &str,
    population_type: &str,
    start: &str,
    end: &str,
    source_order: usize,
) -> ClientRecord {
    ClientRecord {
        control_id: ControlId::new(control_id).expect("non-empty id"),
        population_type: PopulationType::parse(population_type),
        population_size: 0,
        total_oe_count: 0,
        confirmed_oe_events: 0,
        window_start: date(start),
        window_end: date(end),
        source_order,
    }
}

/// A spreadsheet cell written by [`write_workbook`].
#[derive(Clone, Copy)]
pub enum Cell<'a> {
    Text(&'a str),
    Number(f64),
    Blank,
}

/// Writes `rows` under `headers` into a sheet called `sheet`.
pub fn write_workbook(path: &Path, sheet: &str, headers: &[&str], rows: &[Vec<Cell<'_>>]) {
    write_workbook_at(path, sheet, 0, headers, rows);
}

/// Like [`write_workbook`], with the header on zero-based row `header_row`.
pub fn write_workbook_at(
    path: &Path,
    sheet: &str,
    header_row: u32,
    headers: &[&str],
    rows: &[Vec<Cell<'_>>],
) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet).expect("sheet named");

    for (col_idx, header) in headers.iter().enumerate() {
        worksheet
            .write_string(header_row, col_idx as u16, *header)
            .expect("header written");
    }

    for (row_idx, row) in rows.iter().enumerate() {
        let excel_row = header_row + 1 + row_idx as u32;
        for (col_idx, cell) in row.iter().enumerate() {
            match cell {
                Cell::Text(value) => {
                    worksheet
                        .write_string(excel_row, col_idx as u16, *value)
                        .expect("cell written");
                }
                Cell::Number(value) => {
                    worksheet
                        .write_number(excel_row, col_idx as u16, *value)
                        .expect("cell written");
                }
                Cell::Blank => {}
            }
        }
    }

    workbook.save(path).expect("workbook saved");
}

/// Row in the standard `OE Counts` layout with dates written as text.
pub fn client_row<'a>(
    control_id: &'a str,
    population_type: &'a str,
    counts: (f64, f64, f64),
    start: &'a str,
    end: &'a str,
) -> Vec<Cell<'a>> {
    vec![
        Cell::Text(control_id),
        Cell::Text(population_type),
        Cell::Number(counts.0),
        Cell::Number(counts.1),
        Cell::Number(counts.2),
        Cell::Text(start),
        Cell::Text(end),
    ]
}
