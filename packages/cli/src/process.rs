//! Single-document processing: parse one report and write its outputs.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use verba_report_models::{Document, ExtractConfig};

use crate::CliError;

/// Where and what to write for each processed document.
#[derive(Debug, Clone, Default)]
pub struct OutputOptions {
    /// Directory for the CSV. Defaults to the input's directory.
    pub out_dir: Option<PathBuf>,
    /// Also write the `.processed.md` summary next to the input.
    pub markdown: bool,
}

/// Files produced for one document.
#[derive(Debug, Clone)]
pub struct Processed {
    pub document: Document,
    pub csv_path: PathBuf,
    pub markdown_path: Option<PathBuf>,
}

/// Checks that `path` names an existing file before any parsing starts.
///
/// # Errors
///
/// Returns [`CliError::InvalidInput`] if it does not.
pub fn validate_input(path: &Path) -> Result<(), CliError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(CliError::InvalidInput(path.to_path_buf()))
    }
}

/// Parses `path` and writes its CSV (and optionally Markdown) output.
///
/// # Errors
///
/// Returns [`CliError`] if the input is invalid, parsing fails, or an
/// output cannot be written.
pub fn process_file(
    path: &Path,
    config: &ExtractConfig,
    options: &OutputOptions,
) -> Result<Processed, CliError> {
    validate_input(path)?;
    let document = verba_extract::parse_path(path, config)?;

    let out_dir = options
        .out_dir
        .clone()
        .or_else(|| path.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    std::fs::create_dir_all(&out_dir)?;

    let csv_path = out_dir.join(verba_output::table::file_name(&document));
    verba_output::table::write_csv(BufWriter::new(File::create(&csv_path)?), &document)?;
    log::info!("Wrote {}", csv_path.display());

    let markdown_path = if options.markdown {
        let md_path = path.with_extension("processed.md");
        verba_output::markdown::write_markdown(BufWriter::new(File::create(&md_path)?), &document)?;
        log::debug!("Wrote {}", md_path.display());
        Some(md_path)
    } else {
        None
    };

    Ok(Processed {
        document,
        csv_path,
        markdown_path,
    })
}
