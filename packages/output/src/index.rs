//! Search-index documents.
//!
//! Each row becomes one JSON object whose `index_id` combines year, month
//! and the row's position in the report, so re-indexing a corrected report
//! overwrites its previous documents instead of duplicating them. Documents
//! are written as JSON Lines for a bulk loader to pick up.

use std::collections::BTreeMap;
use std::io::Write;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use verba_report_models::{ColumnName, Document};

use crate::OutputError;
use crate::amount::parse_amount;

/// One row, flattened for a search store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDocument {
    /// `{year}_{month}_{ordinal}`.
    pub index_id: String,
    pub year: i32,
    pub month: u32,
    /// First day of the reporting month.
    pub date: NaiveDate,
    pub deputado: String,
    pub pendente: bool,
    /// Parsed amounts by category label. Blank or unparseable cells are
    /// left out.
    pub valores: BTreeMap<String, f64>,
    pub total: Option<f64>,
}

/// Synthetic identifier for the `ordinal`-th row of a period.
///
/// ```
/// assert_eq!(verba_output::index::index_id(2019, 8, 0), "2019_8_0");
/// ```
#[must_use]
pub fn index_id(year: i32, month: u32, ordinal: usize) -> String {
    format!("{year}_{month}_{ordinal}")
}

/// Flattens every named row of `document`.
///
/// # Errors
///
/// Returns [`OutputError::Period`] if the document's month is invalid.
pub fn index_documents(document: &Document) -> Result<Vec<IndexDocument>, OutputError> {
    let period = document.period()?;
    let date = period.first_day().ok_or_else(|| {
        OutputError::Malformed(format!("{}: year out of range", document.source))
    })?;

    Ok(document
        .rows
        .iter()
        .enumerate()
        .filter_map(|(ordinal, row)| {
            let name = row.name()?;
            let valores = ColumnName::categories()
                .filter_map(|c| Some((c.label().to_owned(), parse_amount(row.get(c)?)?)))
                .collect();
            Some(IndexDocument {
                index_id: index_id(document.year, document.month, ordinal),
                year: document.year,
                month: document.month,
                date,
                deputado: name.to_owned(),
                pendente: row.pending,
                valores,
                total: row.get(ColumnName::Total).and_then(parse_amount),
            })
        })
        .collect())
}

/// Writes documents as JSON Lines.
///
/// # Errors
///
/// Returns [`OutputError`] if serialization or writing fails.
pub fn write_json_lines<W: Write>(
    mut writer: W,
    documents: &[IndexDocument],
) -> Result<(), OutputError> {
    for document in documents {
        serde_json::to_writer(&mut writer, document)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use verba_report_models::{Period, Row};

    fn sample() -> Document {
        let mut document = Document::new("verba.txt", Period::new(2019, 8).unwrap());
        let mut row = Row::default();
        row.fields
            .insert(ColumnName::Deputado, "Fulano de Tal".to_owned());
        row.fields.insert(ColumnName::Imovel, "1.500,00".to_owned());
        row.fields.insert(ColumnName::Outros, "n/d".to_owned());
        row.fields.insert(ColumnName::Total, "1.500,00".to_owned());
        let mut pending = Row::default();
        pending
            .fields
            .insert(ColumnName::Deputado, "Beltrano".to_owned());
        pending.pending = true;
        document.rows = vec![row, pending];
        document
    }

    #[test]
    fn one_document_per_row() {
        let docs = index_documents(&sample()).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].index_id, "2019_8_0");
        assert_eq!(docs[1].index_id, "2019_8_1");
        assert_eq!(docs[0].date, NaiveDate::from_ymd_opt(2019, 8, 1).unwrap());
        assert_eq!(docs[0].deputado, "Fulano de Tal");
        assert_eq!(docs[0].valores.get("Imóvel"), Some(&1500.0));
        assert!(!docs[0].valores.contains_key("Outros"));
        assert_eq!(docs[0].total, Some(1500.0));
        assert!(docs[1].pendente);
        assert!(docs[1].valores.is_empty());
        assert_eq!(docs[1].total, None);
    }

    #[test]
    fn writes_one_line_per_document() {
        let docs = index_documents(&sample()).unwrap();
        let mut out = Vec::new();
        write_json_lines(&mut out, &docs).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["index_id"], "2019_8_0");
        assert_eq!(first["date"], "2019-08-01");
        assert_eq!(first["valores"]["Imóvel"], 1500.0);
    }
}
