use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

/// A cell value as read from the workbook, before any cleaning.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Excel date serial (days since 1899-12-30, fraction is time of day).
    DateSerial(f64),
}

/// One data row keyed by trimmed header name.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// Zero-based index among all data rows of the sheet (header excluded).
    pub index: usize,
    /// One-based row number as shown in Excel.
    pub sheet_row: usize,
    pub cells: BTreeMap<String, RawCell>,
}

impl RawRow {
    /// Cell under `column`; absent columns read as empty.
    pub fn get(&self, column: &str) -> &RawCell {
        static EMPTY: RawCell = RawCell::Empty;
        self.cells.get(column).unwrap_or(&EMPTY)
    }

    pub fn is_blank(&self) -> bool {
        self.cells.values().all(|cell| match cell {
            RawCell::Empty => true,
            RawCell::Text(text) => text.trim().is_empty(),
            _ => false,
        })
    }
}

/// A sheet as loaded from disk, rows in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub sheet_name: String,
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

/// Client identifier used for deduplication. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ControlId(String);

impl ControlId {
    /// Returns `None` for blank identifiers.
    pub fn new(value: impl AsRef<str>) -> Option<Self> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Category of covered population. Only used to break ties between rows
/// sharing a `ControlId`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PopulationType {
    Active,
    Cobra,
    Retiree,
    Other(String),
}

impl PopulationType {
    /// Priority table consulted by the deduplicator; lower wins.
    pub fn rank(&self) -> u8 {
        match self {
            PopulationType::Active => 1,
            PopulationType::Cobra => 2,
            PopulationType::Retiree => 3,
            PopulationType::Other(_) => 4,
        }
    }

    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "active" => PopulationType::Active,
            "cobra" => PopulationType::Cobra,
            "retiree" => PopulationType::Retiree,
            "" => PopulationType::Other("Unknown".to_string()),
            _ => PopulationType::Other(trimmed.to_string()),
        }
    }
}

impl fmt::Display for PopulationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PopulationType::Active => f.write_str("Active"),
            PopulationType::Cobra => f.write_str("COBRA"),
            PopulationType::Retiree => f.write_str("Retiree"),
            PopulationType::Other(name) => f.write_str(name),
        }
    }
}

impl Serialize for PopulationType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A cleaned spreadsheet row. Built once by the cleaner and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientRecord {
    pub control_id: ControlId,
    pub population_type: PopulationType,
    pub population_size: u64,
    pub total_oe_count: u64,
    pub confirmed_oe_events: u64,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    #[serde(skip)]
    pub source_order: usize,
}
