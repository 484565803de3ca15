use comfy_table::{Cell, CellAlignment, ContentArrangement, Table, presets};
use serde_json::{Value, json};

use crate::dedupe::dedupe_by_priority;
use crate::model::ClientRecord;
use crate::week::{ClientSet, Week};

/// Column headers of a client table, in display order.
pub const COLUMNS: [&str; 7] = [
    "ControlId",
    "Population Type",
    "Population Size",
    "Total OE Count",
    "Confirmed OE Events",
    "__Start",
    "__End",
];

/// A deduplicated client set for one week, borrowed from the cleaned table.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientReport<'a> {
    pub set: ClientSet,
    pub week: Week,
    pub records: Vec<&'a ClientRecord>,
}

impl<'a> ClientReport<'a> {
    pub fn build(set: ClientSet, week: Week, records: &'a [ClientRecord]) -> Self {
        let records = dedupe_by_priority(records, |record| set.matches(&week, record));
        Self { set, week, records }
    }

    pub fn unique_count(&self) -> usize {
        self.records.len()
    }

    pub fn header(&self) -> String {
        format!(
            "=== CLIENTS {} ({} unique) ===",
            self.set.label(),
            self.unique_count()
        )
    }

    /// Header line followed by the client table.
    pub fn render(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(presets::ASCII_FULL_CONDENSED)
            .set_content_arrangement(ContentArrangement::Disabled)
            .set_header(COLUMNS.to_vec());

        for record in &self.records {
            table.add_row(vec![
                Cell::new(&record.control_id),
                Cell::new(&record.population_type),
                Cell::new(record.population_size).set_alignment(CellAlignment::Right),
                Cell::new(record.total_oe_count).set_alignment(CellAlignment::Right),
                Cell::new(record.confirmed_oe_events).set_alignment(CellAlignment::Right),
                Cell::new(record.window_start.format("%Y-%m-%d")),
                Cell::new(record.window_end.format("%Y-%m-%d")),
            ]);
        }

        format!("{}\n{table}", self.header())
    }

    pub fn to_json(&self) -> Value {
        json!({
            "label": self.set.label(),
            "week_start": self.week.start(),
            "week_end": self.week.end(),
            "unique": self.unique_count(),
            "clients": self.records,
        })
    }
}
