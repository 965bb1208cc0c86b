//! Column scheme inference and token classification.
//!
//! The report is laid out in fixed-width columns, but the left margin drifts
//! slightly between pages and extractions. Instead of hard-coding column
//! positions, each distinct raw line length gets its own scheme: the line is
//! cut into `N` equal slices and the centre of each slice becomes a
//! classification boundary.

use std::collections::BTreeMap;

/// Evenly spaced column midpoints for one raw line length.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnScheme {
    line_length: usize,
    midpoints: Vec<f64>,
}

impl ColumnScheme {
    /// Builds the scheme for lines of `line_length` characters split into
    /// `columns` slices.
    ///
    /// ```
    /// use verba_extract::columns::ColumnScheme;
    ///
    /// let scheme = ColumnScheme::new(90, 9);
    /// assert_eq!(scheme.midpoints()[0], 5.0);
    /// assert_eq!(scheme.midpoints()[8], 85.0);
    /// ```
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn new(line_length: usize, columns: usize) -> Self {
        let width = line_length as f64 / columns as f64;
        let midpoints = (0..columns)
            .map(|i| (i as f64).mul_add(width, width / 2.0))
            .collect();
        Self {
            line_length,
            midpoints,
        }
    }

    #[must_use]
    pub const fn line_length(&self) -> usize {
        self.line_length
    }

    #[must_use]
    pub fn midpoints(&self) -> &[f64] {
        &self.midpoints
    }

    /// Classifies the `[start, end)` span of a token.
    ///
    /// `col_start` is the number of midpoints strictly before `start` and
    /// `col_end` the number of midpoints at or before `end`; the assigned
    /// column is `col_end - 1`. Two layouts are corrected rather than
    /// rejected:
    ///
    /// * a token crossing several midpoints on a line shorter than
    ///   `short_line_threshold` is a lone name, so it goes to column 0;
    /// * a token ending before the first midpoint also goes to column 0.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn classify(&self, start: usize, end: usize, short_line_threshold: usize) -> Classification {
        let col_start = self.midpoints.partition_point(|&m| m < start as f64);
        let mut col_end = self.midpoints.partition_point(|&m| m <= end as f64);
        let mut anomaly = None;

        if col_start + 1 < col_end {
            let short_line = self.line_length < short_line_threshold;
            anomaly = Some(Anomaly::SpansColumns {
                col_start,
                col_end,
                short_line,
            });
            if short_line {
                col_end = 1;
            }
        } else if col_start == 0 && col_end == 0 {
            anomaly = Some(Anomaly::BeforeFirstMidpoint);
            col_end = 1;
        }

        Classification {
            col_start,
            col_end,
            anomaly,
        }
    }
}

/// A layout irregularity that [`ColumnScheme::classify`] corrected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anomaly {
    /// The token crossed the midpoints `col_start..col_end`. When
    /// `short_line` is set it was forced into the name column.
    SpansColumns {
        col_start: usize,
        col_end: usize,
        short_line: bool,
    },
    /// The token ended before the first midpoint.
    BeforeFirstMidpoint,
}

impl std::fmt::Display for Anomaly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SpansColumns {
                col_start,
                col_end,
                short_line: true,
            } => write!(
                f,
                "spans columns {col_start}-{col_end} on a short line, forced into the name column"
            ),
            Self::SpansColumns {
                col_start, col_end, ..
            } => write!(f, "spans columns {col_start}-{col_end}"),
            Self::BeforeFirstMidpoint => write!(f, "ends before the first column midpoint"),
        }
    }
}

/// Outcome of classifying one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub col_start: usize,
    pub col_end: usize,
    pub anomaly: Option<Anomaly>,
}

impl Classification {
    /// Index of the column the token belongs to.
    ///
    /// `col_end` is never zero after correction, so this cannot underflow.
    #[must_use]
    pub const fn column(&self) -> usize {
        self.col_end - 1
    }
}

/// Lazily built schemes keyed by raw line length.
///
/// One cache lives for exactly one document parse.
#[derive(Debug)]
pub struct SchemeCache {
    columns: usize,
    schemes: BTreeMap<usize, ColumnScheme>,
}

impl SchemeCache {
    #[must_use]
    pub const fn new(columns: usize) -> Self {
        Self {
            columns,
            schemes: BTreeMap::new(),
        }
    }

    /// Returns the scheme for `line_length`, building it on first use.
    pub fn get(&mut self, line_length: usize) -> &ColumnScheme {
        let columns = self.columns;
        self.schemes.entry(line_length).or_insert_with(|| {
            let scheme = ColumnScheme::new(line_length, columns);
            log::debug!(
                "Creating row scheme for (line={line_length}, cols={columns}): {:?}",
                scheme.midpoints()
            );
            scheme
        })
    }

    /// Number of distinct line lengths seen so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.schemes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemes.is_empty()
    }
}
