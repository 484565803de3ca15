//! Three-week overview: last, this and next week around a base date.

use chrono::{Datelike, NaiveDate};
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table, presets};
use serde::Serialize;

use crate::dedupe::dedupe_by_priority;
use crate::model::ClientRecord;
use crate::week::{ClientSet, Week, WeekRanges};

/// Confirmed events are counted from this day of the week-end year unless
/// overridden.
const SEASON_START_MONTH: u32 = 9;
const SEASON_START_DAY: u32 = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekSummary {
    pub name: &'static str,
    pub week: Week,
    pub going_live: usize,
    pub active: usize,
    pub completed: usize,
    pub lives_active: u64,
    pub lives_confirmed: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryOptions {
    pub season_start: Option<NaiveDate>,
}

/// Builds the summary rows for last, this and next week.
///
/// Next week's `lives_active` is a projection: this week's figure plus the
/// population of next week's go-lives. Totals saturate at `u64::MAX`.
pub fn summarize(
    records: &[ClientRecord],
    ranges: &WeekRanges,
    options: &SummaryOptions,
) -> Vec<WeekSummary> {
    let mut rows: Vec<WeekSummary> = ranges
        .labelled()
        .into_iter()
        .map(|(name, week)| summarize_week(name, week, records, options))
        .collect();

    let this_lives = rows[1].lives_active;
    let next_population: u64 = dedupe_by_priority(records, |record| {
        ranges.next.is_going_live(record)
    })
    .iter()
    .map(|record| record.population_size)
    .fold(0, u64::saturating_add);
    rows[2].lives_active = this_lives.saturating_add(next_population);

    rows
}

fn summarize_week(
    name: &'static str,
    week: Week,
    records: &[ClientRecord],
    options: &SummaryOptions,
) -> WeekSummary {
    let count = |set: ClientSet| {
        dedupe_by_priority(records, |record| set.matches(&week, record)).len()
    };
    let active = dedupe_by_priority(records, |record| week.is_active(record));

    let season_start = options.season_start.unwrap_or_else(|| default_season_start(&week));
    let lives_confirmed = active
        .iter()
        .filter(|record| season_start <= record.window_start && record.window_start <= week.end())
        .map(|record| record.confirmed_oe_events)
        .fold(0, u64::saturating_add);

    WeekSummary {
        name,
        week,
        going_live: count(ClientSet::GoingLive),
        active: active.len(),
        completed: count(ClientSet::Completed),
        lives_active: active
            .iter()
            .copied()
            .map(lives_active)
            .fold(0, u64::saturating_add),
        lives_confirmed,
    }
}

/// Lives still to confirm for one client; falls back to the population size
/// when no OE count has been reported.
pub fn lives_active(record: &ClientRecord) -> u64 {
    if record.total_oe_count == 0 {
        record.population_size
    } else {
        record.total_oe_count.saturating_sub(record.confirmed_oe_events)
    }
}

fn default_season_start(week: &Week) -> NaiveDate {
    NaiveDate::from_ymd_opt(week.end().year(), SEASON_START_MONTH, SEASON_START_DAY)
        .unwrap_or(week.start())
}

pub fn render_summary(rows: &[WeekSummary]) -> String {
    let mut table = Table::new();
    table
        .load_preset(presets::ASCII_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Disabled)
        .set_header(vec![
            "Week",
            "Clients Going Live",
            "Clients Active",
            "Clients Completed",
            "Lives Active (Not Confirmed)",
            "Lives Confirmed & Complete",
        ]);

    for row in rows {
        table.add_row(vec![
            Cell::new(row.week.label()),
            Cell::new(row.going_live).set_alignment(CellAlignment::Right),
            Cell::new(row.active).set_alignment(CellAlignment::Right),
            Cell::new(row.completed).set_alignment(CellAlignment::Right),
            Cell::new(row.lives_active).set_alignment(CellAlignment::Right),
            Cell::new(row.lives_confirmed).set_alignment(CellAlignment::Right),
        ]);
    }

    format!("=== Weekly OE Summary ===\n{table}")
}
