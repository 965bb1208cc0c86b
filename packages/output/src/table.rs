//! Row-oriented CSV output.
//!
//! The header is the report's column labels in layout order followed by
//! `pendente`, `date`, `month` and `year`. Cells the report left blank are
//! written empty, never as `0`, so downstream tools can tell "no expense
//! reported" from "zero".

use std::io::{Read, Write};
use std::sync::LazyLock;

use regex::Regex;
use verba_report_models::{ColumnName, Document, Period, Row};

use crate::OutputError;

/// Columns appended after the report's own.
pub const EXTRA_COLUMNS: [&str; 4] = ["pendente", "date", "month", "year"];

const DELIMITER: u8 = b';';

/// Matches the names produced by [`file_name`].
static FILE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[/\\])(\d{4})-(\d{2})\.csv$").expect("valid regex"));

/// Full CSV header in output order.
#[must_use]
pub fn header() -> Vec<&'static str> {
    ColumnName::all()
        .map(ColumnName::label)
        .chain(EXTRA_COLUMNS)
        .collect()
}

/// File name for a document's CSV: `YYYY-MM.csv`.
#[must_use]
pub fn file_name(document: &Document) -> String {
    format!("{}.csv", document.date)
}

/// Writes `document` as CSV.
///
/// # Errors
///
/// Returns [`OutputError`] if encoding or writing fails.
pub fn write_csv<W: Write>(writer: W, document: &Document) -> Result<(), OutputError> {
    let mut csv = csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .from_writer(writer);

    csv.write_record(header())?;

    let month = document.month.to_string();
    let year = document.year.to_string();
    for row in &document.rows {
        let mut record: Vec<&str> = ColumnName::all()
            .map(|c| row.get(c).unwrap_or_default())
            .collect();
        record.push(if row.pending { "true" } else { "false" });
        record.push(&document.date);
        record.push(&month);
        record.push(&year);
        csv.write_record(&record)?;
    }

    csv.flush()?;
    log::debug!(
        "Wrote {} rows for {} as CSV",
        document.rows.len(),
        document.date
    );
    Ok(())
}

/// Reads a CSV written by [`write_csv`] back into a [`Document`].
///
/// A table without rows carries no period of its own, so it is taken from
/// `source` when that is a `YYYY-MM.csv` name as written by [`file_name`].
///
/// # Errors
///
/// Returns [`OutputError::Malformed`] if a column is missing, a value does
/// not parse, rows disagree on the period, or there are no rows and `source`
/// does not name the period.
pub fn read_csv<R: Read>(reader: R, source: &str) -> Result<Document, OutputError> {
    let mut csv = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .from_reader(reader);

    let headers = csv.headers()?.clone();
    let position = |label: &str| {
        headers
            .iter()
            .position(|h| h == label)
            .ok_or_else(|| OutputError::Malformed(format!("{source}: missing column '{label}'")))
    };

    let columns = ColumnName::all()
        .map(|c| position(c.label()).map(|i| (c, i)))
        .collect::<Result<Vec<_>, _>>()?;
    let pending_at = position("pendente")?;
    let month_at = position("month")?;
    let year_at = position("year")?;

    let mut document: Option<Document> = None;

    for (line, record) in csv.records().enumerate() {
        let record = record?;
        let field = |i: usize| record.get(i).unwrap_or_default().trim();

        let year = field(year_at).parse::<i32>().map_err(|e| {
            OutputError::Malformed(format!("{source}: row {line}: bad year: {e}"))
        })?;
        let month = field(month_at).parse::<u32>().map_err(|e| {
            OutputError::Malformed(format!("{source}: row {line}: bad month: {e}"))
        })?;
        let period = Period::new(year, month)?;

        let document = document.get_or_insert_with(|| Document::new(source, period));
        if document.year != year || document.month != month {
            return Err(OutputError::Malformed(format!(
                "{source}: row {line} belongs to {} but the file started with {}",
                period.date(),
                document.date
            )));
        }

        let mut row = Row::default();
        for &(column, i) in &columns {
            let value = field(i);
            if !value.is_empty() {
                row.fields.insert(column, value.to_owned());
            }
        }
        row.pending = field(pending_at).eq_ignore_ascii_case("true");
        document.rows.push(row);
    }

    match document {
        Some(document) => Ok(document),
        None => period_from_file_name(source)?.map_or_else(
            || Err(OutputError::Malformed(format!("{source}: no rows"))),
            |period| Ok(Document::new(source, period)),
        ),
    }
}

fn period_from_file_name(source: &str) -> Result<Option<Period>, OutputError> {
    let Some(caps) = FILE_NAME_RE.captures(source) else {
        return Ok(None);
    };
    let (Ok(year), Ok(month)) = (caps[1].parse::<i32>(), caps[2].parse::<u32>()) else {
        return Ok(None);
    };
    Ok(Some(Period::new(year, month)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        let mut document = Document::new("verba.txt", Period::new(2019, 8).unwrap());
        let mut first = Row::default();
        first
            .fields
            .insert(ColumnName::Deputado, "Fulano de Tal".to_owned());
        first.fields.insert(ColumnName::Imovel, "1.500,00".to_owned());
        first.fields.insert(ColumnName::Total, "1.500,00".to_owned());
        let mut second = Row::default();
        second
            .fields
            .insert(ColumnName::Deputado, "Beltrano".to_owned());
        second.pending = true;
        document.rows = vec![first, second];
        document
    }

    fn to_string(document: &Document) -> String {
        let mut out = Vec::new();
        write_csv(&mut out, document).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn header_lists_columns_then_extras() {
        let header = header();
        assert_eq!(header.len(), ColumnName::COUNT + EXTRA_COLUMNS.len());
        assert_eq!(header[0], "Deputado (a)");
        assert_eq!(header[9], "pendente");
        assert_eq!(header[12], "year");
    }

    #[test]
    fn blank_cells_stay_blank() {
        let text = to_string(&sample());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            "Fulano de Tal;1.500,00;;;;;;;1.500,00;false;2019-08;8;2019"
        );
        assert_eq!(lines[2], "Beltrano;;;;;;;;;true;2019-08;8;2019");
    }

    #[test]
    fn reads_back_what_it_wrote() {
        let original = sample();
        let text = to_string(&original);
        let read = read_csv(text.as_bytes(), "verba.txt").unwrap();
        assert_eq!(read.date, "2019-08");
        assert_eq!(read.rows, original.rows);
    }

    #[test]
    fn missing_column_is_malformed() {
        let err = read_csv("Deputado (a);Total\nFulano;1,00\n".as_bytes(), "x.csv").unwrap_err();
        assert!(matches!(err, OutputError::Malformed(msg) if msg.contains("Imóvel")));
    }

    #[test]
    fn empty_table_takes_period_from_file_name() {
        let empty = Document::new("verba.txt", Period::new(2019, 8).unwrap());
        let text = to_string(&empty);
        let read = read_csv(text.as_bytes(), &file_name(&empty)).unwrap();
        assert_eq!(read.date, "2019-08");
        assert_eq!(read.source, "2019-08.csv");
        assert!(read.rows.is_empty());
    }

    #[test]
    fn empty_table_without_period_is_malformed() {
        let header = header().join(";");
        let err = read_csv(format!("{header}\n").as_bytes(), "x.csv").unwrap_err();
        assert!(matches!(err, OutputError::Malformed(_)));

        let err = read_csv(format!("{header}\n").as_bytes(), "2019-13.csv").unwrap_err();
        assert!(matches!(err, OutputError::Period(_)));
    }

    #[test]
    fn file_name_uses_period() {
        assert_eq!(file_name(&sample()), "2019-08.csv");
    }
}
