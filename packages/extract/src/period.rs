//! Reporting period resolution.
//!
//! The report states its month and year in a free-text line somewhere above
//! the table ("agosto de 2019"), but not always on the same line and not
//! always legibly. The file name usually carries a hint as well. Signals are
//! tried in a fixed order and the first usable one wins.

use std::sync::LazyLock;

use regex::Regex;
use verba_report_models::Period;

/// Portuguese month names, January first.
pub const MONTHS: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

/// Any month name, anywhere in the text.
static MONTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("(?i)({})", MONTHS.join("|"))).expect("valid regex")
});

/// A whole line of the form `<month> ... de <yyyy>`.
static DATE_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)^\s*({}).* de (\d{{4}})\s*$", MONTHS.join("|")))
        .expect("valid regex")
});

static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b20\d\d\b").expect("valid regex"));

/// Which signal settled the period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodSignal {
    /// The line right above the section marker.
    PrecedingLine,
    /// The line before that.
    SecondPrecedingLine,
    /// Year from the document name, month from the name or the second
    /// preceding line.
    Fallback,
}

/// One-based number of a month name, ignoring case.
#[must_use]
pub fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    MONTHS
        .iter()
        .position(|m| *m == lower)
        .and_then(|i| u32::try_from(i + 1).ok())
}

/// Parses a line of the form `agosto de 2019`.
///
/// ```
/// use verba_extract::period::extract_date;
///
/// let period = extract_date("  Agosto de 2019 ").unwrap();
/// assert_eq!(period.date(), "2019-08");
/// assert!(extract_date("Relatório de 2019").is_none());
/// ```
#[must_use]
pub fn extract_date(line: &str) -> Option<Period> {
    let caps = DATE_LINE_RE.captures(line)?;
    let month = month_number(&caps[1])?;
    let year = caps[2].parse::<i32>().ok()?;
    Period::new(year, month).ok()
}

/// First month name mentioned in `text`.
#[must_use]
pub fn extract_month(text: &str) -> Option<u32> {
    MONTH_RE.find(text).and_then(|m| month_number(m.as_str()))
}

/// First `20xx` year mentioned in `text` as a standalone number.
#[must_use]
pub fn extract_year(text: &str) -> Option<i32> {
    YEAR_RE.find(text).and_then(|m| m.as_str().parse().ok())
}

/// Resolves the period from the lines preceding the section marker and the
/// document's identifying name.
///
/// `preceding` is in input order, so its last element is the line right
/// above the marker. Returns `None` when year or month stays unknown.
#[must_use]
pub fn resolve(preceding: &[String], name: &str) -> Option<(Period, PeriodSignal)> {
    let last = preceding.last().map(String::as_str);
    let second = preceding
        .len()
        .checked_sub(2)
        .map(|i| preceding[i].as_str());

    if let Some(period) = last.and_then(extract_date) {
        return Some((period, PeriodSignal::PrecedingLine));
    }
    if let Some(period) = second.and_then(extract_date) {
        return Some((period, PeriodSignal::SecondPrecedingLine));
    }

    let year = extract_year(name);
    let month = extract_month(name).or_else(|| second.and_then(extract_month));
    log::debug!("Period fallback for {name}: year={year:?} month={month:?}");

    let period = Period::new(year?, month?).ok()?;
    Some((period, PeriodSignal::Fallback))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn month_numbers_ignore_case() {
        assert_eq!(month_number("Janeiro"), Some(1));
        assert_eq!(month_number("MARÇO"), Some(3));
        assert_eq!(month_number("dezembro"), Some(12));
        assert_eq!(month_number("march"), None);
    }

    #[test]
    fn date_line_allows_text_between_month_and_year() {
        let period = extract_date("Março (complementar) de 2020").unwrap();
        assert_eq!((period.year(), period.month()), (2020, 3));
    }

    #[test]
    fn date_line_must_cover_whole_line() {
        assert!(extract_date("Referência: agosto de 2019").is_none());
        assert!(extract_date("agosto de 19").is_none());
    }

    #[test]
    fn year_must_be_standalone() {
        assert_eq!(extract_year("verba_agosto_2019.txt"), None);
        assert_eq!(extract_year("verba agosto 2019.txt"), Some(2019));
        assert_eq!(extract_year("verba-12019.txt"), None);
    }

    #[test]
    fn preceding_line_wins() {
        let preceding = lines(&["QUADRO DEMONSTRATIVO", "agosto de 2019"]);
        let (period, signal) = resolve(&preceding, "verba julho 2018.txt").unwrap();
        assert_eq!(period.date(), "2019-08");
        assert_eq!(signal, PeriodSignal::PrecedingLine);
    }

    #[test]
    fn second_preceding_line_is_next() {
        let preceding = lines(&["setembro de 2018", "Valores em reais"]);
        let (period, signal) = resolve(&preceding, "x.txt").unwrap();
        assert_eq!(period.date(), "2018-09");
        assert_eq!(signal, PeriodSignal::SecondPrecedingLine);
    }

    #[test]
    fn falls_back_to_document_name() {
        let preceding = lines(&["QUADRO DEMONSTRATIVO", "Verba indenizatória"]);
        let (period, signal) = resolve(&preceding, "Outubro 2017.txt").unwrap();
        assert_eq!(period.date(), "2017-10");
        assert_eq!(signal, PeriodSignal::Fallback);
    }

    #[test]
    fn fallback_month_from_second_preceding_line() {
        let preceding = lines(&["Mês: novembro", "Verba indenizatória"]);
        let (period, _) = resolve(&preceding, "verba 2016.txt").unwrap();
        assert_eq!(period.date(), "2016-11");
    }

    #[test]
    fn unresolved_without_year() {
        let preceding = lines(&["Verba indenizatória", "novembro"]);
        assert!(resolve(&preceding, "verba.txt").is_none());
    }

    #[test]
    fn unresolved_without_lines_or_name_hint() {
        assert!(resolve(&[], "verba 2016.txt").is_none());
    }
}
