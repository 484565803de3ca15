mod common;

use std::collections::HashSet;
use std::fs;

use common::{Cell, HEADERS, client_row, date, write_workbook, write_workbook_at};
use oe_weekly::ReportError;
use oe_weekly::io::discover::latest_workbook;
use oe_weekly::io::excel_read::{OE_COUNTS_SHEET, read_sheet};
use oe_weekly::pipeline;
use oe_weekly::week::Week;
use tempfile::tempdir;

fn report_week() -> Week {
    Week::new(date("2025-10-27"), date("2025-11-02")).expect("valid week")
}

fn sample_rows() -> Vec<Vec<Cell<'static>>> {
    vec![
        client_row("1001", "Retiree", (40.0, 35.0, 10.0), "2025-10-27", "2025-11-07"),
        client_row("1002", "Active", (900.0, 880.0, 400.0), "2025-10-01", "2025-10-20"),
        client_row("1003", "COBRA", (12.0, 0.0, 0.0), "2025-10-25", "2025-10-29"),
        client_row("1001", "Active", (500.0, 480.0, 120.0), "2025-10-28", "2025-11-07"),
        vec![
            Cell::Number(1004.0),
            Cell::Text("Active"),
            Cell::Number(75.0),
            Cell::Blank,
            Cell::Text("n/a"),
            Cell::Number(45961.0),
            Cell::Text("11/14/2025"),
        ],
        client_row("1005", "Active", (10.0, 0.0, 0.0), "No date configured", "2025-11-07"),
    ]
}

#[test]
fn workbook_reports_going_live_and_active_clients() {
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("Asof_2025-10-30.xlsx");
    write_workbook(&xlsx_path, OE_COUNTS_SHEET, &HEADERS, &sample_rows());

    let cleaned = pipeline::load_clients(&xlsx_path, OE_COUNTS_SHEET).expect("clients loaded");
    assert_eq!(cleaned.records.len(), 5);
    assert_eq!(cleaned.dropped.len(), 1);
    assert_eq!(cleaned.dropped[0].row, 5);
    assert_eq!(cleaned.dropped[0].sheet_row, 7);

    let [going_live, active] = pipeline::weekly_reports(&cleaned, report_week());

    let going_ids: Vec<&str> = going_live
        .records
        .iter()
        .map(|record| record.control_id.as_str())
        .collect();
    assert_eq!(going_ids, vec!["1001", "1004"]);
    assert_eq!(going_live.records[0].population_size, 500);
    assert_eq!(going_live.records[1].total_oe_count, 0);

    let active_ids: Vec<&str> = active
        .records
        .iter()
        .map(|record| record.control_id.as_str())
        .collect();
    assert_eq!(active_ids, vec!["1003", "1001", "1004"]);

    assert!(going_live.header().starts_with("=== CLIENTS GOING LIVE (2 unique) ==="));
    assert_eq!(active.header(), "=== CLIENTS ACTIVE (3 unique) ===");
}

#[test]
fn rendered_table_lists_columns_and_dates() {
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("export.xlsx");
    write_workbook(&xlsx_path, OE_COUNTS_SHEET, &HEADERS, &sample_rows());

    let cleaned = pipeline::load_clients(&xlsx_path, OE_COUNTS_SHEET).expect("clients loaded");
    let [going_live, _] = pipeline::weekly_reports(&cleaned, report_week());
    let rendered = going_live.render();

    assert!(rendered.starts_with("=== CLIENTS GOING LIVE (2 unique) ===\n"));
    for column in ["ControlId", "Population Type", "Confirmed OE Events", "__Start", "__End"] {
        assert!(rendered.contains(column), "missing column {column}");
    }
    assert!(rendered.contains("2025-10-28"));
    assert!(rendered.contains("2025-11-14"));
    assert!(!rendered.contains("Retiree"));

    let json = going_live.to_json();
    assert_eq!(json["unique"], 2);
    assert_eq!(json["clients"][0]["control_id"], "1001");
    assert_eq!(json["clients"][0]["population_type"], "Active");
    assert_eq!(json["clients"][1]["window_start"], "2025-10-31");
}

#[test]
fn dropped_rows_report_sheet_rows_below_leading_blanks() {
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("offset.xlsx");
    let rows = vec![
        client_row("1001", "Active", (1.0, 0.0, 0.0), "2025-10-27", "2025-11-07"),
        client_row("1002", "Active", (1.0, 0.0, 0.0), "not a date", "2025-11-07"),
    ];
    // Header on sheet row 3, data on rows 4 and 5.
    write_workbook_at(&xlsx_path, OE_COUNTS_SHEET, 2, &HEADERS, &rows);

    let cleaned = pipeline::load_clients(&xlsx_path, OE_COUNTS_SHEET).expect("clients loaded");

    assert_eq!(cleaned.records.len(), 1);
    assert_eq!(cleaned.records[0].source_order, 0);
    assert_eq!(cleaned.dropped.len(), 1);
    assert_eq!(cleaned.dropped[0].row, 1);
    assert_eq!(cleaned.dropped[0].sheet_row, 5);
}

#[test]
fn running_twice_gives_identical_output() {
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("export.xlsx");
    write_workbook(&xlsx_path, OE_COUNTS_SHEET, &HEADERS, &sample_rows());

    let render = || {
        let cleaned =
            pipeline::load_clients(&xlsx_path, OE_COUNTS_SHEET).expect("clients loaded");
        let reports = pipeline::weekly_reports(&cleaned, report_week());
        reports.iter().map(|report| report.render()).collect::<Vec<_>>()
    };

    assert_eq!(render(), render());
}

#[test]
fn cleaned_table_is_reusable_across_weeks() {
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("export.xlsx");
    write_workbook(&xlsx_path, OE_COUNTS_SHEET, &HEADERS, &sample_rows());
    let cleaned = pipeline::load_clients(&xlsx_path, OE_COUNTS_SHEET).expect("clients loaded");
    let snapshot = cleaned.clone();

    let earlier = Week::containing(date("2025-09-10"));
    let [going_early, _] = pipeline::weekly_reports(&cleaned, earlier);
    let [going_now, active_now] = pipeline::weekly_reports(&cleaned, report_week());

    assert_eq!(going_early.unique_count(), 0);
    assert_eq!(going_now.unique_count(), 2);
    for report in [&going_now, &active_now] {
        let unique: HashSet<_> = report.records.iter().map(|record| &record.control_id).collect();
        assert_eq!(unique.len(), report.unique_count());
    }
    assert_eq!(cleaned, snapshot);
}

#[test]
fn header_only_sheet_yields_empty_reports() {
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("empty.xlsx");
    write_workbook(&xlsx_path, OE_COUNTS_SHEET, &HEADERS, &[]);

    let cleaned = pipeline::load_clients(&xlsx_path, OE_COUNTS_SHEET).expect("clients loaded");
    let reports = pipeline::weekly_reports(&cleaned, report_week());

    assert!(cleaned.records.is_empty());
    assert_eq!(reports[0].header(), "=== CLIENTS GOING LIVE (0 unique) ===");
    assert_eq!(reports[1].header(), "=== CLIENTS ACTIVE (0 unique) ===");
    assert!(reports[1].render().contains("ControlId"));
}

#[test]
fn missing_sheet_names_the_sheets_found() {
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("wrong.xlsx");
    write_workbook(&xlsx_path, "Summary", &HEADERS, &sample_rows());

    let error = read_sheet(&xlsx_path, OE_COUNTS_SHEET).expect_err("sheet missing");

    match &error {
        ReportError::MissingSheet { sheet, available } => {
            assert_eq!(sheet, OE_COUNTS_SHEET);
            assert_eq!(available, &vec!["Summary".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(error.to_string().contains("Summary"));
}

#[test]
fn missing_file_is_reported() {
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("absent.xlsx");

    let error = pipeline::load_clients(&xlsx_path, OE_COUNTS_SHEET).expect_err("file missing");

    assert!(matches!(error, ReportError::MissingInput(path) if path == xlsx_path));
}

#[test]
fn missing_window_column_is_reported() {
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("partial.xlsx");
    write_workbook(&xlsx_path, OE_COUNTS_SHEET, &HEADERS[..6], &[]);

    let error = pipeline::load_clients(&xlsx_path, OE_COUNTS_SHEET).expect_err("column missing");

    assert!(error.to_string().contains("Window End from CDR"));
}

#[test]
fn latest_workbook_picks_newest_xlsx() {
    let temp_dir = tempdir().expect("temporary directory");
    let older = temp_dir.path().join("Asof_2025-10-23.xlsx");
    let newer = temp_dir.path().join("Asof_2025-10-30.XLSX");
    write_workbook(&older, OE_COUNTS_SHEET, &HEADERS, &[]);
    write_workbook(&newer, OE_COUNTS_SHEET, &HEADERS, &[]);
    fs::write(temp_dir.path().join("notes.txt"), "not a workbook").expect("notes written");
    fs::write(temp_dir.path().join("~$Asof_2025-10-30.xlsx"), "lock").expect("lock written");

    let modified = fs::metadata(&older).and_then(|meta| meta.modified()).expect("mtime");
    let file = fs::File::options().write(true).open(&newer).expect("newer opened");
    file.set_modified(modified + std::time::Duration::from_secs(60))
        .expect("mtime updated");

    assert_eq!(latest_workbook(temp_dir.path()).expect("workbook found"), newer);
}

#[test]
fn directory_without_workbooks_is_reported() {
    let temp_dir = tempdir().expect("temporary directory");

    let error = latest_workbook(temp_dir.path()).expect_err("nothing to pick");

    assert!(matches!(error, ReportError::NoWorkbookFound(_)));
}
