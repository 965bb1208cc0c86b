#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared types for the verba indenizatória report extractor.
//!
//! This crate contains only data types, the static column contract of the
//! published report, and extraction settings. It has no heavyweight
//! dependencies and performs no I/O.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator as _;
use strum_macros::{AsRefStr, Display, EnumIter};

/// Category columns of the published expense table, in layout order.
///
/// The first column always holds the deputy's name and the last one the row
/// total. This sequence is a fixed contract with the source report and is
/// never inferred from the text.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumIter,
)]
pub enum ColumnName {
    #[serde(rename = "Deputado (a)")]
    #[strum(serialize = "Deputado (a)")]
    Deputado,
    #[serde(rename = "Imóvel")]
    #[strum(serialize = "Imóvel")]
    Imovel,
    #[serde(rename = "Máquina e equipamento")]
    #[strum(serialize = "Máquina e equipamento")]
    MaquinaEquipamento,
    #[serde(rename = "Veículo")]
    #[strum(serialize = "Veículo")]
    Veiculo,
    #[serde(rename = "Combustível e lubrificante")]
    #[strum(serialize = "Combustível e lubrificante")]
    Combustivel,
    #[serde(rename = "Assessoria ou consultoria")]
    #[strum(serialize = "Assessoria ou consultoria")]
    Assessoria,
    #[serde(rename = "Divulgação de atividade parlamentar")]
    #[strum(serialize = "Divulgação de atividade parlamentar")]
    Divulgacao,
    #[serde(rename = "Outros")]
    #[strum(serialize = "Outros")]
    Outros,
    #[serde(rename = "Total")]
    #[strum(serialize = "Total")]
    Total,
}

impl ColumnName {
    /// Number of columns in the report layout.
    pub const COUNT: usize = 9;

    /// The column holding the row's entity name.
    pub const NAME: Self = Self::Deputado;

    /// Label as printed in the report header.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Deputado => "Deputado (a)",
            Self::Imovel => "Imóvel",
            Self::MaquinaEquipamento => "Máquina e equipamento",
            Self::Veiculo => "Veículo",
            Self::Combustivel => "Combustível e lubrificante",
            Self::Assessoria => "Assessoria ou consultoria",
            Self::Divulgacao => "Divulgação de atividade parlamentar",
            Self::Outros => "Outros",
            Self::Total => "Total",
        }
    }

    /// Zero-based position of this column in the layout.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the column at `index`, or `None` when out of range.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::iter().nth(index)
    }

    /// All columns in layout order.
    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }

    /// Expense category columns, i.e. everything between the name and the
    /// total.
    pub fn categories() -> impl Iterator<Item = Self> {
        Self::iter().filter(|c| !matches!(c, Self::Deputado | Self::Total))
    }
}

/// One reconstructed table row.
///
/// Only columns that actually received text are present; a missing numeric
/// field means the report left that cell blank, not that it was zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// Cell text keyed by column.
    pub fields: BTreeMap<ColumnName, String>,
    /// Whether the entry was flagged as provisionally unapproved.
    #[serde(rename = "pendente")]
    pub pending: bool,
}

impl Row {
    /// The entity name, if the row has one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.get(ColumnName::NAME)
    }

    /// Cell text for `column`.
    #[must_use]
    pub fn get(&self, column: ColumnName) -> Option<&str> {
        self.fields.get(&column).map(String::as_str)
    }
}

/// Error returned when building a [`Period`] from an out-of-range month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid month {month}: expected 1-12")]
pub struct InvalidMonthError {
    /// The rejected month number.
    pub month: u32,
}

/// Reporting period of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// Creates a period.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidMonthError`] if `month` is not in `1..=12`.
    pub const fn new(year: i32, month: u32) -> Result<Self, InvalidMonthError> {
        if month >= 1 && month <= 12 {
            Ok(Self { year, month })
        } else {
            Err(InvalidMonthError { month })
        }
    }

    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

    /// `YYYY-MM` form used in file names and the `date` field.
    #[must_use]
    pub fn date(self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    /// First calendar day of the period.
    #[must_use]
    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

/// A fully parsed report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Identifying name of the source (usually the input file name).
    pub source: String,
    pub year: i32,
    pub month: u32,
    /// `YYYY-MM`.
    pub date: String,
    /// Rows in the order they appeared in the input.
    pub rows: Vec<Row>,
    /// Content of the "atualizado em ..." note, when the report has one.
    #[serde(rename = "updated", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Header lines seen between the section marker and the first row.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<String>,
}

impl Document {
    /// Creates an empty document for `period`.
    #[must_use]
    pub fn new(source: &str, period: Period) -> Self {
        Self {
            source: source.to_owned(),
            year: period.year(),
            month: period.month(),
            date: period.date(),
            rows: Vec::new(),
            updated_at: None,
            headers: Vec::new(),
        }
    }

    /// The document's reporting period.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidMonthError`] if the stored month was tampered with.
    pub const fn period(&self) -> Result<Period, InvalidMonthError> {
        Period::new(self.year, self.month)
    }

    /// Number of rows flagged as pending.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.rows.iter().filter(|r| r.pending).count()
    }
}

/// Tunables for the layout-inference extractor.
///
/// Defaults match the published report; a TOML file can override any of
/// them when a new edition shifts its wording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Case-insensitive prefix of the line that opens the table section.
    pub section_marker: String,
    /// Case-insensitive prefix of the "updated as of" note.
    pub updated_marker: String,
    /// Lines shorter than this only carry a name.
    ///
    /// Line length is counted in chars without the `\n` or `\r\n`
    /// terminator, one less than a length taken with the newline still
    /// attached.
    pub short_line_threshold: usize,
    /// Words dropped from row lines before classification.
    pub ignore_tokens: Vec<String>,
    /// Whether single-space separated words form one token.
    pub join_words: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            section_marker: "locação".to_owned(),
            updated_marker: "atual".to_owned(),
            short_line_threshold: 30,
            ignore_tokens: vec!["-".to_owned(), "R$".to_owned()],
            join_words: true,
        }
    }
}

impl ExtractConfig {
    /// Parses settings from TOML, falling back to defaults for missing keys.
    ///
    /// # Errors
    ///
    /// Returns an error if `input` is not valid TOML or has mistyped keys.
    pub fn from_toml_str(input: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(input)
    }

    /// Whether `word` is accounting noise on a row line.
    #[must_use]
    pub fn is_ignored(&self, word: &str) -> bool {
        self.ignore_tokens.iter().any(|t| t == word)
    }
}
