use std::path::Path;

use tracing::{info, instrument};

use crate::clean::{CleanedTable, clean_table};
use crate::error::Result;
use crate::io::excel_read;
use crate::report::ClientReport;
use crate::summary::{SummaryOptions, WeekSummary, summarize};
use crate::week::{ClientSet, Week, WeekRanges};

/// Loads and cleans `sheet` from the workbook at `input`.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), sheet = %sheet)
)]
pub fn load_clients(input: &Path, sheet: &str) -> Result<CleanedTable> {
    let raw = excel_read::read_sheet(input, sheet)?;
    info!(row_count = raw.rows.len(), "read rows from workbook");
    let cleaned = clean_table(&raw)?;
    info!(
        record_count = cleaned.records.len(),
        dropped = cleaned.dropped.len(),
        "cleaned client records"
    );
    Ok(cleaned)
}

/// The going-live and active reports for `week`, in that order.
#[instrument(level = "info", skip_all, fields(%week))]
pub fn weekly_reports(cleaned: &CleanedTable, week: Week) -> [ClientReport<'_>; 2] {
    let going_live = ClientReport::build(ClientSet::GoingLive, week, &cleaned.records);
    let active = ClientReport::build(ClientSet::Active, week, &cleaned.records);
    info!(
        going_live = going_live.unique_count(),
        active = active.unique_count(),
        "classified clients"
    );
    [going_live, active]
}

/// Last, this and next week summary rows.
#[instrument(level = "info", skip_all, fields(this_week = %ranges.this))]
pub fn weekly_summary(
    cleaned: &CleanedTable,
    ranges: WeekRanges,
    options: &SummaryOptions,
) -> Vec<WeekSummary> {
    summarize(&cleaned.records, &ranges, options)
}
