//! Line predicates for the boilerplate and header region above the table.

use std::sync::LazyLock;

use verba_report_models::ColumnName;

use crate::tokenizer::TakenLine;

/// Upper-cased name column heading, as the report prints it.
static NAME_HEADING: LazyLock<String> = LazyLock::new(|| ColumnName::NAME.label().to_uppercase());

/// Case-insensitive prefix test on an already trimmed line.
#[must_use]
pub fn starts_with_marker(trimmed: &str, marker: &str) -> bool {
    trimmed.to_lowercase().starts_with(&marker.to_lowercase())
}

/// Whether a trimmed line starts with the name column heading, as the
/// heading block does on every page.
#[must_use]
pub fn is_name_heading(trimmed: &str) -> bool {
    trimmed.starts_with(NAME_HEADING.as_str())
}

/// Whether a header-region line is actually the first table row.
///
/// Two signatures give a row away: text that starts with a letter and ends
/// with a digit (a name followed by amounts), or a line whose first word sits
/// at the left margin without being the name column heading.
#[must_use]
pub fn is_data_start(line: &TakenLine<'_>) -> bool {
    let (Some(first), Some(last)) = (line.trimmed.chars().next(), line.trimmed.chars().last())
    else {
        return false;
    };

    if first.is_alphabetic() && last.is_numeric() {
        return true;
    }

    line.tokens.first().is_some_and(|t| t.start == 0) && !is_name_heading(line.trimmed)
}
