//! Cell-level validation errors and the report that aggregates them.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellErrorKind {
    NullViolation,
    TypeMismatch { expected_type: String },
}

/// A single rejected cell. `row` is the 1-based sheet row, so the first data
/// row after the header is row 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellError {
    pub row: usize,
    pub column: String,
    pub kind: CellErrorKind,
    pub actual_value: String,
}

impl CellError {
    pub fn null_violation(row: usize, column: impl Into<String>) -> Self {
        Self {
            row,
            column: column.into(),
            kind: CellErrorKind::NullViolation,
            actual_value: String::new(),
        }
    }

    pub fn type_mismatch(
        row: usize,
        column: impl Into<String>,
        expected_type: impl Into<String>,
        actual_value: impl Into<String>,
    ) -> Self {
        Self {
            row,
            column: column.into(),
            kind: CellErrorKind::TypeMismatch {
                expected_type: expected_type.into(),
            },
            actual_value: actual_value.into(),
        }
    }

    pub fn expected_type(&self) -> Option<&str> {
        match &self.kind {
            CellErrorKind::TypeMismatch { expected_type } => Some(expected_type),
            CellErrorKind::NullViolation => None,
        }
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            CellErrorKind::NullViolation => {
                write!(f, "Column {} at row {} cannot be null.", self.column, self.row)
            }
            CellErrorKind::TypeMismatch { expected_type } => write!(
                f,
                "Type mismatch at row: {}, column: {}, expected type: {}, value: {}",
                self.row, self.column, expected_type, self.actual_value
            ),
        }
    }
}

/// Every cell error found in one validation pass, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorReport {
    errors: Vec<CellError>,
}

impl ErrorReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: CellError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[CellError] {
        &self.errors
    }

    /// `Ok` when nothing was recorded, otherwise the report itself.
    pub fn into_result(self) -> Result<(), ErrorReport> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// One line per error, joined with `\n`. Empty when there are no errors.
    pub fn render(&self) -> String {
        self.errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
