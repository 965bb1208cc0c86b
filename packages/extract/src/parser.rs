//! Line-by-line parser state machine.
//!
//! A report goes through four phases: boilerplate above the table
//! ([`Phase::Preamble`]), column headings ([`Phase::Headers`]), table rows
//! ([`Phase::Rows`]) and the footnotes after it ([`Phase::Done`]). Each call
//! to [`ParserState::step`] consumes exactly one line and reports what it
//! did with it, so every transition can be exercised without a stream.

use verba_report_models::{ColumnName, Document, ExtractConfig, Period, Row};

use crate::ExtractError;
use crate::columns::SchemeCache;
use crate::period::{self, PeriodSignal};
use crate::rows::{self, DiscardReason, RowOutcome};
use crate::scanner::{is_data_start, is_name_heading, starts_with_marker};
use crate::tokenizer::tokenize;

/// Where in the report the parser currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Preamble,
    Headers,
    Rows,
    Done,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Preamble => "looking for the section marker",
            Self::Headers => "reading the table headings",
            Self::Rows => "reading table rows without a terminator line",
            Self::Done => "past the table",
        })
    }
}

/// What a single line turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Blank line, or anything after the table.
    Skipped,
    /// Boilerplate kept as a period hint.
    Buffered,
    /// The "updated as of" note.
    Updated,
    /// The section marker; the period is now known.
    SectionStarted(Period, PeriodSignal),
    Header,
    RowAdded,
    RowDiscarded(DiscardReason),
    /// Footnote line that closes the table.
    Terminated,
}

/// Counters collected over one parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub lines: usize,
    pub rows_added: usize,
    pub rows_discarded: usize,
    pub anomalies: usize,
    /// Distinct row line lengths, i.e. column schemes built.
    pub schemes: usize,
}

/// Parsing state for one document.
#[derive(Debug)]
pub struct ParserState<'a> {
    config: &'a ExtractConfig,
    name: String,
    phase: Phase,
    line_number: usize,
    last_parsed_line: usize,
    preceding: Vec<String>,
    period: Option<Period>,
    updated_at: Option<String>,
    headers: Vec<String>,
    schemes: SchemeCache,
    rows: Vec<Row>,
    stats: ParseStats,
}

impl<'a> ParserState<'a> {
    /// Starts parsing the document identified by `name`.
    #[must_use]
    pub fn new(name: &str, config: &'a ExtractConfig) -> Self {
        Self {
            config,
            name: name.to_owned(),
            phase: Phase::Preamble,
            line_number: 0,
            last_parsed_line: 0,
            preceding: Vec::new(),
            period: None,
            updated_at: None,
            headers: Vec::new(),
            schemes: SchemeCache::new(ColumnName::COUNT),
            rows: Vec::new(),
            stats: ParseStats::default(),
        }
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub const fn is_done(&self) -> bool {
        matches!(self.phase, Phase::Done)
    }

    #[must_use]
    pub const fn stats(&self) -> ParseStats {
        self.stats
    }

    /// Rows assembled so far.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Consumes one line (without its terminator).
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Period`] when the section marker is reached
    /// and no period can be resolved.
    pub fn step(&mut self, line: &str) -> Result<Event, ExtractError> {
        self.line_number += 1;
        self.stats.lines += 1;

        let event = match self.phase {
            Phase::Preamble => self.preamble(line)?,
            Phase::Headers => self.header(line),
            Phase::Rows => self.row(line),
            Phase::Done => Event::Skipped,
        };

        if event != Event::Skipped {
            self.last_parsed_line = self.line_number;
        }
        Ok(event)
    }

    fn preamble(&mut self, line: &str) -> Result<Event, ExtractError> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(Event::Skipped);
        }

        if starts_with_marker(trimmed, &self.config.section_marker) {
            let Some((period, signal)) = period::resolve(&self.preceding, &self.name) else {
                return Err(ExtractError::Period {
                    document: self.name.clone(),
                    line: self.line_number,
                });
            };
            log::debug!(
                "{}: section starts at line {} ({}, from {signal:?})",
                self.name,
                self.line_number,
                period.date()
            );
            self.period = Some(period);
            self.preceding.clear();
            self.phase = Phase::Headers;
            return Ok(Event::SectionStarted(period, signal));
        }

        if starts_with_marker(trimmed, &self.config.updated_marker) {
            self.record_update(trimmed);
            self.preceding.clear();
            return Ok(Event::Updated);
        }

        log::trace!("{}: >> buffered ({:3}) {trimmed}", self.name, self.line_number);
        self.preceding.push(trimmed.to_owned());
        Ok(Event::Buffered)
    }

    fn header(&mut self, line: &str) -> Event {
        let taken = tokenize(line, self.config.join_words, |_, _| false);
        if taken.trimmed.is_empty() {
            return Event::Skipped;
        }

        if starts_with_marker(taken.trimmed, &self.config.updated_marker) {
            self.record_update(taken.trimmed);
            return Event::Updated;
        }

        if is_data_start(&taken) {
            log::debug!(
                "{}: records started at line {}: {}",
                self.name,
                self.line_number,
                taken.trimmed
            );
            self.phase = Phase::Rows;
            return self.row(line);
        }

        self.headers.push(taken.trimmed.to_owned());
        Event::Header
    }

    fn row(&mut self, line: &str) -> Event {
        if rows::is_terminator(line) {
            log::debug!("{}: table ends at line {}", self.name, self.line_number);
            self.phase = Phase::Done;
            return Event::Terminated;
        }

        let config = self.config;
        let taken = tokenize(line, config.join_words, |w, _| config.is_ignored(w));

        let outcome = if taken.is_empty() {
            RowOutcome::Discarded(DiscardReason::Empty)
        } else if rows::is_page_footer(taken.trimmed) {
            RowOutcome::Discarded(DiscardReason::PageFooter)
        } else if is_name_heading(taken.trimmed)
            || starts_with_marker(taken.trimmed, &config.section_marker)
        {
            RowOutcome::Discarded(DiscardReason::RepeatedHeading)
        } else {
            let scheme = self.schemes.get(taken.length);
            let name = &self.name;
            let line_number = self.line_number;
            let anomalies = &mut self.stats.anomalies;
            rows::assemble(
                &taken.tokens,
                scheme,
                config.short_line_threshold,
                |token, anomaly| {
                    *anomalies += 1;
                    log::warn!(
                        "{name}:{line_number}: token \"{}\" {anomaly} in \"{}\"",
                        token.text,
                        taken.trimmed
                    );
                },
            )
        };
        self.stats.schemes = self.schemes.len();

        match outcome {
            RowOutcome::Added(row) => {
                log::trace!("{}: >> row added: {:?}", self.name, row.fields);
                self.rows.push(row);
                self.stats.rows_added += 1;
                Event::RowAdded
            }
            RowOutcome::Discarded(reason) => {
                if reason != DiscardReason::Empty {
                    log::debug!(
                        "{}: >> row discarded at line {} ({reason}): {}",
                        self.name,
                        self.line_number,
                        taken.trimmed
                    );
                }
                self.stats.rows_discarded += 1;
                Event::RowDiscarded(reason)
            }
        }
    }

    fn record_update(&mut self, trimmed: &str) {
        log::debug!("{}: update note: {trimmed}", self.name);
        self.updated_at = Some(trimmed.to_owned());
    }

    /// Turns a finished parse into its [`Document`].
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::NonTerminatingScan`] if the input ended
    /// before the table was closed by a terminator line.
    pub fn finish(self) -> Result<Document, ExtractError> {
        let (Phase::Done, Some(period)) = (self.phase, self.period) else {
            return Err(ExtractError::NonTerminatingScan {
                document: self.name,
                phase: self.phase,
                line: self.last_parsed_line,
            });
        };

        let mut document = Document::new(&self.name, period);
        document.rows = self.rows;
        document.updated_at = self.updated_at;
        document.headers = self.headers;
        Ok(document)
    }
}
