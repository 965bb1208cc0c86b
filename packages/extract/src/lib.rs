#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Layout-inference table extraction for verba indenizatória reports.
//!
//! The Câmara Legislativa publishes the monthly expense table only as a PDF.
//! Once converted to plain text the table keeps its visual alignment but
//! loses every cell boundary. This crate rebuilds the rows using nothing but
//! the character offsets of the words on each line:
//!
//! 1. [`tokenizer`] turns a line into positioned tokens.
//! 2. [`columns`] infers evenly spaced column midpoints per line length and
//!    classifies each token into a column.
//! 3. [`scanner`] and [`period`] skip the boilerplate above the table and
//!    work out the reporting month.
//! 4. [`rows`] assembles classified tokens into rows and spots pending
//!    entries.
//!
//! [`parser::ParserState`] ties these together one line at a time;
//! [`parse_reader`] and [`parse_path`] drive it over a whole input.

pub mod columns;
pub mod parser;
pub mod pdf_text;
pub mod period;
pub mod rows;
pub mod scanner;
pub mod tokenizer;

use std::borrow::Cow;
use std::io::BufRead;
use std::path::Path;

use verba_report_models::{Document, ExtractConfig};

use crate::parser::{ParserState, Phase};

/// Errors that abort the parse of a single document.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// No year or month could be found before the table.
    #[error("{document}: could not determine the reporting period (section marker at line {line})")]
    Period {
        /// Identifying name of the document.
        document: String,
        /// Line of the section marker.
        line: usize,
    },

    /// The input ended before the expected marker or terminator.
    #[error("{document}: input ended while {phase} (last parsed line {line})")]
    NonTerminatingScan {
        /// Identifying name of the document.
        document: String,
        /// Phase the parser was stuck in.
        phase: Phase,
        /// Last line that was not skipped.
        line: usize,
    },

    /// Reading the text stream failed part way through.
    #[error("{document}: read failed after line {line}: {source}")]
    Read {
        /// Identifying name of the document.
        document: String,
        /// Last line read successfully.
        line: usize,
        source: std::io::Error,
    },

    /// PDF text extraction failed.
    #[error("PDF extraction error: {0}")]
    Extraction(String),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Parses a report from a line-oriented reader.
///
/// `name` identifies the document in logs and errors, and serves as the last
/// resort for the reporting period, so pass the file name when there is one.
///
/// Lines are decoded as UTF-8; invalid bytes left behind by the text
/// extraction become U+FFFD instead of failing the document.
///
/// # Errors
///
/// Returns [`ExtractError`] if reading fails, the period cannot be resolved,
/// or the table is never opened or closed.
pub fn parse_reader<R: BufRead>(
    mut reader: R,
    name: &str,
    config: &ExtractConfig,
) -> Result<Document, ExtractError> {
    let mut state = ParserState::new(name, config);
    let mut buf = Vec::new();
    let mut line_number = 0;
    let mut lossy_lines = 0;

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|source| ExtractError::Read {
                document: name.to_owned(),
                line: line_number,
                source,
            })?;
        if read == 0 {
            break;
        }
        line_number += 1;

        let line = String::from_utf8_lossy(strip_line_ending(&buf));
        if matches!(line, Cow::Owned(_)) {
            lossy_lines += 1;
            log::warn!("{name}:{line_number}: invalid UTF-8 replaced: {line}");
        }

        state.step(&line)?;
        if state.is_done() {
            break;
        }
    }

    let stats = state.stats();
    let document = state.finish()?;

    log::info!(
        "{name}: {} rows for {} ({} pending), {} lines discarded, {} layout anomalies corrected, {} column schemes, {lossy_lines} lines with invalid UTF-8",
        stats.rows_added,
        document.date,
        document.pending_count(),
        stats.rows_discarded,
        stats.anomalies,
        stats.schemes
    );

    Ok(document)
}

fn strip_line_ending(buf: &[u8]) -> &[u8] {
    let line = buf.strip_suffix(b"\n").unwrap_or(buf);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Parses a report held in memory.
///
/// # Errors
///
/// See [`parse_reader`].
pub fn parse_str(text: &str, name: &str, config: &ExtractConfig) -> Result<Document, ExtractError> {
    parse_reader(text.as_bytes(), name, config)
}

/// Parses a report from disk.
///
/// PDF files are converted to text first (see [`pdf_text`]); the text is
/// saved next to the PDF and parsed from there.
///
/// # Errors
///
/// Returns [`ExtractError`] if the file cannot be read or converted, or if
/// parsing fails.
pub fn parse_path(path: &Path, config: &ExtractConfig) -> Result<Document, ExtractError> {
    let text_path = if pdf_text::is_pdf(path) {
        pdf_text::extract_to_text_file(path)?
    } else {
        path.to_path_buf()
    };

    let name = document_name(&text_path);
    log::debug!("Reading file: {}", text_path.display());

    let file = std::fs::File::open(&text_path)?;
    parse_reader(std::io::BufReader::new(file), &name, config)
}

/// The identifying name used for a file: its file name, lossily decoded.
#[must_use]
pub fn document_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |n| n.to_string_lossy().into_owned(),
    )
}
