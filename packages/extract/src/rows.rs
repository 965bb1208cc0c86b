//! Row assembly from classified tokens.

use std::sync::LazyLock;

use regex::Regex;
use verba_report_models::{ColumnName, Row};

use crate::columns::{Anomaly, ColumnScheme};
use crate::tokenizer::Token;

/// A name followed by the trailing asterisk that marks a pending entry.
static PENDING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(.*\S)\s*\*\s*$").expect("valid regex"));

/// Page footers that the text extraction leaves between table rows.
static PAGE_FOOTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^página \d+ de \d+$").expect("valid regex"));

/// Why a line did not become a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// Nothing left after dropping noise tokens.
    Empty,
    /// No token landed in the name column.
    MissingName,
    /// A "Página N de M" footer.
    PageFooter,
    /// Heading or section marker repeated at the top of a new page.
    RepeatedHeading,
}

impl std::fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Empty => "no tokens",
            Self::MissingName => "no name",
            Self::PageFooter => "page footer",
            Self::RepeatedHeading => "repeated heading",
        })
    }
}

/// Result of assembling one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Added(Row),
    Discarded(DiscardReason),
}

/// Whether a line closes the table: footnotes start with `(` or `*`.
#[must_use]
pub fn is_terminator(line: &str) -> bool {
    line.trim_start().starts_with(['(', '*'])
}

#[must_use]
pub fn is_page_footer(trimmed: &str) -> bool {
    PAGE_FOOTER_RE.is_match(trimmed)
}

/// Strips a trailing pending marker from a name.
///
/// ```
/// use verba_extract::rows::split_pending;
///
/// assert_eq!(split_pending("Fulano de Tal *"), ("Fulano de Tal".to_owned(), true));
/// assert_eq!(split_pending("Fulano de Tal"), ("Fulano de Tal".to_owned(), false));
/// ```
#[must_use]
pub fn split_pending(name: &str) -> (String, bool) {
    PENDING_RE.captures(name).map_or_else(
        || (name.to_owned(), false),
        |caps| (caps[1].to_owned(), true),
    )
}

/// Keys each token to its column and builds the row.
///
/// Tokens landing in an already filled column are appended to it with a
/// space. Every corrected classification is passed to `on_anomaly` together
/// with the offending token.
pub fn assemble<F>(
    tokens: &[Token],
    scheme: &ColumnScheme,
    short_line_threshold: usize,
    mut on_anomaly: F,
) -> RowOutcome
where
    F: FnMut(&Token, Anomaly),
{
    if tokens.is_empty() {
        return RowOutcome::Discarded(DiscardReason::Empty);
    }

    let mut row = Row::default();
    for token in tokens {
        let class = scheme.classify(token.start, token.end, short_line_threshold);
        if let Some(anomaly) = class.anomaly {
            on_anomaly(token, anomaly);
        }
        let Some(column) = ColumnName::from_index(class.column()) else {
            continue;
        };
        row.fields
            .entry(column)
            .and_modify(|value| {
                value.push(' ');
                value.push_str(&token.text);
            })
            .or_insert_with(|| token.text.clone());
    }

    let Some(raw_name) = row.fields.get(&ColumnName::NAME) else {
        return RowOutcome::Discarded(DiscardReason::MissingName);
    };
    let (name, pending) = split_pending(raw_name);
    if name.trim().is_empty() {
        return RowOutcome::Discarded(DiscardReason::MissingName);
    }
    row.fields.insert(ColumnName::NAME, name);
    row.pending = pending;

    RowOutcome::Added(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize_all;

    fn assemble_line(line: &str) -> RowOutcome {
        let taken = tokenize_all(line);
        let scheme = ColumnScheme::new(taken.length, ColumnName::COUNT);
        assemble(&taken.tokens, &scheme, 30, |_, _| {})
    }

    #[test]
    fn terminators() {
        assert!(is_terminator("(*) Pendente de aprovação"));
        assert!(is_terminator("* Valores sujeitos a alteração"));
        assert!(is_terminator("   (1) Nota"));
        assert!(!is_terminator("Fulano *"));
        assert!(!is_terminator(""));
    }

    #[test]
    fn page_footer() {
        assert!(is_page_footer("Página 2 de 3"));
        assert!(is_page_footer("PÁGINA 10 DE 12"));
        assert!(!is_page_footer("Página 2 de 3 Fulano"));
    }

    #[test]
    fn pending_marker_variants() {
        assert_eq!(split_pending("Fulano*"), ("Fulano".to_owned(), true));
        assert_eq!(split_pending("  Dep. Fulano  * "), ("Dep. Fulano".to_owned(), true));
        assert_eq!(split_pending("Fulano * Tal"), ("Fulano * Tal".to_owned(), false));
        assert_eq!(split_pending("*"), ("*".to_owned(), false));
    }

    #[test]
    fn full_row_fills_every_column() {
        let line = "  Fulano    1,00      2,00      3,00      4,00      5,00      6,00      7,00     28,00";
        let RowOutcome::Added(row) = assemble_line(line) else {
            panic!("row discarded");
        };
        assert_eq!(row.name(), Some("Fulano"));
        assert_eq!(row.get(ColumnName::Imovel), Some("1,00"));
        assert_eq!(row.get(ColumnName::Outros), Some("7,00"));
        assert_eq!(row.get(ColumnName::Total), Some("28,00"));
        assert!(!row.pending);
    }

    #[test]
    fn tokens_in_one_column_are_joined() {
        let scheme = ColumnScheme::new(90, ColumnName::COUNT);
        let tokens = vec![
            Token {
                text: "Fulano".to_owned(),
                start: 0,
                end: 6,
            },
            Token {
                text: "Tal".to_owned(),
                start: 8,
                end: 11,
            },
        ];
        let RowOutcome::Added(row) = assemble(&tokens, &scheme, 30, |_, _| {}) else {
            panic!("row discarded");
        };
        assert_eq!(row.name(), Some("Fulano Tal"));
    }

    #[test]
    fn no_tokens_is_discarded() {
        assert_eq!(
            assemble_line("        "),
            RowOutcome::Discarded(DiscardReason::Empty)
        );
    }

    #[test]
    fn amounts_without_name_are_discarded() {
        let line = "                         3,00      4,00";
        assert_eq!(
            assemble_line(line),
            RowOutcome::Discarded(DiscardReason::MissingName)
        );
    }

    #[test]
    fn anomalies_are_reported() {
        let taken = tokenize_all("Fulano de Tal Beltrano");
        let scheme = ColumnScheme::new(taken.length, ColumnName::COUNT);
        let mut seen = Vec::new();
        let outcome = assemble(&taken.tokens, &scheme, 30, |t, a| {
            seen.push((t.text.clone(), a));
        });
        assert_eq!(seen.len(), 1);
        assert!(matches!(
            seen[0].1,
            Anomaly::SpansColumns {
                short_line: true,
                ..
            }
        ));
        let RowOutcome::Added(row) = outcome else {
            panic!("row discarded");
        };
        assert_eq!(row.name(), Some("Fulano de Tal Beltrano"));
        assert_eq!(row.fields.len(), 1);
    }
}
