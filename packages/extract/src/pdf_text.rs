//! PDF to plain text conversion.
//!
//! The parser only ever sees text; this module is the bridge for callers
//! that start from the published PDF. Extraction uses pure-Rust
//! [`pdf_extract`], and the resulting text is kept on disk next to the PDF
//! so a failed parse can be inspected and fixed by hand.

use std::path::{Path, PathBuf};

use crate::ExtractError;

/// Whether `path` has a `.pdf` extension, ignoring case.
#[must_use]
pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Extracts the text content of a PDF.
///
/// # Errors
///
/// Returns [`ExtractError::Extraction`] if the PDF cannot be read or
/// decoded.
pub fn extract_text(pdf_path: &Path) -> Result<String, ExtractError> {
    let text = pdf_extract::extract_text(pdf_path).map_err(|e| {
        ExtractError::Extraction(format!(
            "failed to extract text from {}: {e}",
            pdf_path.display()
        ))
    })?;

    log::debug!(
        "Extracted {} characters of text from {}",
        text.len(),
        pdf_path.display()
    );

    Ok(text)
}

/// Extracts the text of a PDF into a sibling `.txt` file and returns its
/// path. An existing text file is replaced.
///
/// # Errors
///
/// Returns [`ExtractError`] if extraction or writing fails.
pub fn extract_to_text_file(pdf_path: &Path) -> Result<PathBuf, ExtractError> {
    let text = extract_text(pdf_path)?;
    let text_path = pdf_path.with_extension("txt");
    std::fs::write(&text_path, text)?;
    log::info!("Wrote {}", text_path.display());
    Ok(text_path)
}
