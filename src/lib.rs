//! Core library for the oe-weekly command line application.
//!
//! The pipeline is linear: [`io`] loads the `OE Counts` sheet of a weekly
//! export, [`clean`] turns its rows into typed [`model::ClientRecord`]s,
//! [`week`] classifies records against a reporting week, [`dedupe`] keeps one
//! record per client, and [`report`] / [`summary`] render the results.
//! [`pipeline`] ties the stages together for the CLI and the tests.

pub mod clean;
pub mod dedupe;
pub mod error;
pub mod io;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod summary;
pub mod week;

pub use error::{ReportError, Result, RowParseError};
