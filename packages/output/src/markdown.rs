//! Markdown summary of a parsed report, for checking a parse by eye.

use std::io::Write;

use verba_report_models::{ColumnName, Document};

/// Writes the summary: period and update note, then one section per row
/// listing its non-blank cells.
///
/// # Errors
///
/// Returns an I/O error if writing fails.
pub fn write_markdown<W: Write>(mut out: W, document: &Document) -> std::io::Result<()> {
    writeln!(out, "# {} ({})", document.date, document.source)?;
    writeln!(out)?;
    writeln!(out, "- year: {}", document.year)?;
    writeln!(out, "- month: {}", document.month)?;
    if let Some(updated) = &document.updated_at {
        writeln!(out, "- updated: {updated}")?;
    }
    writeln!(
        out,
        "- rows: {} ({} pending)",
        document.rows.len(),
        document.pending_count()
    )?;

    writeln!(out)?;
    writeln!(out, "## rows")?;
    for row in &document.rows {
        writeln!(out)?;
        let name = row.name().unwrap_or("Sem nome");
        if row.pending {
            writeln!(out, "### {name} (pendente)")?;
        } else {
            writeln!(out, "### {name}")?;
        }
        for column in ColumnName::all().skip(1) {
            if let Some(value) = row.get(column) {
                writeln!(out, "\t* {}: {value}", column.label())?;
            }
        }
    }

    writeln!(out)?;
    writeln!(out, "* * *")?;
    out.flush()
}
