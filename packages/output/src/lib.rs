#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Writers for parsed verba indenizatória reports.
//!
//! A parsed [`Document`](verba_report_models::Document) leaves the extractor
//! in one of three shapes:
//!
//! - [`table`]: a `;`-separated CSV with the report's fixed column order,
//!   one line per row.
//! - [`index`]: newline-delimited JSON documents keyed by
//!   `year_month_ordinal`, ready for a search-store bulk loader.
//! - [`markdown`]: a human-readable summary for eyeballing a parse.
//!
//! [`amount`] parses the Brazilian-formatted amounts found in the cells.

pub mod amount;
pub mod index;
pub mod markdown;
pub mod table;

use verba_report_models::InvalidMonthError;

/// Errors that can occur while writing or reading parsed reports.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding or decoding failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON encoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A stored period is not a valid calendar month.
    #[error("Invalid period: {0}")]
    Period(#[from] InvalidMonthError),

    /// A CSV file did not have the expected shape.
    #[error("Malformed table: {0}")]
    Malformed(String),
}
