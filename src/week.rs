use std::fmt;

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

use crate::error::{ReportError, Result};
use crate::model::ClientRecord;

/// Inclusive reporting window, conventionally a Monday through Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Week {
    start: NaiveDate,
    end: NaiveDate,
}

impl Week {
    /// Validates the bounds once; every predicate relies on `start <= end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(ReportError::InvalidWeek { start, end });
        }
        Ok(Self { start, end })
    }

    /// Picks the reporting week from operator input.
    ///
    /// Explicit bounds win and must come as a pair; otherwise the week of
    /// `week_of`, falling back to the week of `today`.
    pub fn resolve(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        week_of: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Self> {
        match (start, end) {
            (Some(start), Some(end)) => Self::new(start, end),
            (Some(_), None) | (None, Some(_)) => Err(ReportError::IncompleteWeek),
            (None, None) => Ok(Self::containing(week_of.unwrap_or(today))),
        }
    }

    /// The Monday–Sunday week that contains `date`.
    pub fn containing(date: NaiveDate) -> Self {
        let offset = u64::from(date.weekday().num_days_from_monday());
        let start = date - Days::new(offset);
        Self {
            start,
            end: start + Days::new(6),
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn previous(&self) -> Self {
        Self {
            start: self.start - Days::new(7),
            end: self.end - Days::new(7),
        }
    }

    pub fn next(&self) -> Self {
        Self {
            start: self.start + Days::new(7),
            end: self.end + Days::new(7),
        }
    }

    /// Window starts inside the week.
    pub fn is_going_live(&self, record: &ClientRecord) -> bool {
        self.start <= record.window_start && record.window_start <= self.end
    }

    /// Window overlaps the week by at least one day.
    pub fn is_active(&self, record: &ClientRecord) -> bool {
        record.window_start <= self.end && record.window_end >= self.start
    }

    /// Window closed before the week began.
    pub fn is_completed(&self, record: &ClientRecord) -> bool {
        record.window_end < self.start
    }

    /// Short label such as `10/27 - 11/02`.
    pub fn label(&self) -> String {
        format!("{} - {}", self.start.format("%m/%d"), self.end.format("%m/%d"))
    }
}

impl fmt::Display for Week {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Last, this and next week around a base date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekRanges {
    pub last: Week,
    pub this: Week,
    pub next: Week,
}

impl WeekRanges {
    pub fn around(date: NaiveDate) -> Self {
        let this = Week::containing(date);
        Self {
            last: this.previous(),
            this,
            next: this.next(),
        }
    }

    pub fn labelled(&self) -> [(&'static str, Week); 3] {
        [
            ("Last Week", self.last),
            ("This Week", self.this),
            ("Next Week", self.next),
        ]
    }
}

/// The client sets a report can be built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ClientSet {
    GoingLive,
    Active,
    Completed,
}

impl ClientSet {
    pub fn label(&self) -> &'static str {
        match self {
            ClientSet::GoingLive => "GOING LIVE",
            ClientSet::Active => "ACTIVE",
            ClientSet::Completed => "COMPLETED",
        }
    }

    pub fn matches(&self, week: &Week, record: &ClientRecord) -> bool {
        match self {
            ClientSet::GoingLive => week.is_going_live(record),
            ClientSet::Active => week.is_active(record),
            ClientSet::Completed => week.is_completed(record),
        }
    }
}
