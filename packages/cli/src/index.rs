//! Builds search-index JSON Lines from parsed reports.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use verba_output::index::{IndexDocument, index_documents, write_json_lines};
use verba_report_models::{Document, ExtractConfig};

use crate::CliError;
use crate::process::validate_input;

/// Loads a report from a CSV written by `process`, or parses it from a text
/// dump or PDF.
///
/// # Errors
///
/// Returns [`CliError`] if the input is missing, of an unknown type, or
/// fails to load.
pub fn load_document(path: &Path, config: &ExtractConfig) -> Result<Document, CliError> {
    validate_input(path)?;
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());

    match extension.as_deref() {
        Some("csv") => {
            let reader = BufReader::new(File::open(path)?);
            Ok(verba_output::table::read_csv(
                reader,
                &verba_extract::document_name(path),
            )?)
        }
        Some("txt" | "pdf") => Ok(verba_extract::parse_path(path, config)?),
        _ => Err(CliError::UnsupportedInput(path.to_path_buf())),
    }
}

/// Indexes every input and writes all documents to `output`.
///
/// Returns the number of documents written.
///
/// # Errors
///
/// Returns [`CliError`] on the first input that fails; nothing is written
/// in that case.
pub fn index_files(
    inputs: &[impl AsRef<Path>],
    output: &Path,
    config: &ExtractConfig,
) -> Result<usize, CliError> {
    let mut documents: Vec<IndexDocument> = Vec::new();
    for input in inputs {
        let document = load_document(input.as_ref(), config)?;
        let indexed = index_documents(&document)?;
        log::info!(
            "{}: {} index documents for {}",
            document.source,
            indexed.len(),
            document.date
        );
        documents.extend(indexed);
    }

    write_json_lines(BufWriter::new(File::create(output)?), &documents)?;
    log::info!("Wrote {} documents to {}", documents.len(), output.display());
    Ok(documents.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexes_text_and_csv_inputs() {
        let dir = std::env::temp_dir().join(format!("verba-index-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let txt = dir.join("report.txt");
        std::fs::write(&txt, "agosto de 2019\nLocação\nFulano de Tal\n(*) nota\n").unwrap();
        let csv = dir.join("2019-09.csv");
        let header = verba_output::table::header().join(";");
        std::fs::write(
            &csv,
            format!("{header}\nBeltrano;1.500,00;;;;;;;1.500,00;true;2019-09;9;2019\n"),
        )
        .unwrap();

        let output = dir.join("index.jsonl");
        let written = index_files(&[&txt, &csv], &output, &ExtractConfig::default()).unwrap();
        assert_eq!(written, 2);

        let text = std::fs::read_to_string(&output).unwrap();
        let ids: Vec<String> = text
            .lines()
            .map(|l| serde_json::from_str::<IndexDocument>(l).unwrap().index_id)
            .collect();
        assert_eq!(ids, ["2019_8_0", "2019_9_0"]);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let path = std::env::temp_dir().join(format!("verba-index-{}.md", std::process::id()));
        std::fs::write(&path, "").unwrap();
        let err = load_document(&path, &ExtractConfig::default()).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(err, CliError::UnsupportedInput(_)));
    }
}
