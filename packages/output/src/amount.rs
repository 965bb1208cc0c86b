//! Brazilian currency amounts (`1.234,56`).

use std::sync::LazyLock;

use regex::Regex;

/// Thousands grouped with `.`, decimals after `,`. Ungrouped integers are
/// accepted too.
static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?(\d{1,3}(\.\d{3})+|\d+)(,\d+)?$").expect("valid regex")
});

/// Parses a cell amount, tolerating a leading `R$`.
///
/// ```
/// use verba_output::amount::parse_amount;
///
/// assert_eq!(parse_amount("1.234,56"), Some(1234.56));
/// assert_eq!(parse_amount("R$ 350,00"), Some(350.0));
/// assert_eq!(parse_amount("Fulano"), None);
/// ```
#[must_use]
pub fn parse_amount(text: &str) -> Option<f64> {
    let text = text.trim();
    let text = text.strip_prefix("R$").map_or(text, str::trim_start);
    if !AMOUNT_RE.is_match(text) {
        return None;
    }
    text.replace('.', "").replace(',', ".").parse().ok()
}
