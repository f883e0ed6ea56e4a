//! Raw cell model shared by every stage of statement generation.
//!
//! A [`Cell`] is what a spreadsheet range or CSV field hands us before any
//! schema is applied: either text or a number. An [`InputTable`] is a header
//! row plus data rows of such cells.

use std::{borrow::Cow, fmt};

/// Single raw value read from a tabular source.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

/// How text sources (CSV, TSV) turn fields into cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellMode {
    /// Fields that are exact numeric literals become [`Cell::Number`].
    #[default]
    Classified,
    /// Every field stays [`Cell::Text`].
    Text,
}

static EMPTY_CELL: Cell = Cell::Text(String::new());

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn empty() -> &'static Cell {
        &EMPTY_CELL
    }

    pub fn as_display(&self) -> Cow<'_, str> {
        match self {
            Cell::Text(text) => Cow::Borrowed(text.as_str()),
            Cell::Number(value) => Cow::Owned(format_number(*value)),
        }
    }

    /// Classifies a text field the way a spreadsheet types a typed-in value.
    ///
    /// A field becomes numeric only when it parses as a finite number and its
    /// canonical rendering gives back the exact same text, so `44197` and
    /// `-3.5` are numbers while `007`, `1.50`, `1e3` and `+4` stay text.
    pub fn classify(field: &str, mode: CellMode) -> Self {
        if mode == CellMode::Text {
            return Cell::text(field);
        }
        match field.parse::<f64>() {
            Ok(value) if value.is_finite() && format_number(value) == field => Cell::Number(value),
            _ => Cell::text(field),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_display())
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::text(value)
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value as f64)
    }
}

/// Shortest text that reads back as the same number; negative zero prints as `0`.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}

/// Header row plus data rows, as read from the data sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl InputTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { headers, rows }
    }

    /// Splits a raw grid into header and data rows. Returns `None` for an empty grid.
    pub fn from_grid(mut grid: Vec<Vec<Cell>>) -> Option<Self> {
        if grid.is_empty() {
            return None;
        }
        let rows = grid.split_off(1);
        let headers = grid
            .pop()
            .unwrap_or_default()
            .iter()
            .map(|cell| cell.as_display().into_owned())
            .collect();
        Some(Self { headers, rows })
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the first header equal to `name`.
    pub fn header_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    /// Cell at `index` in `row`; missing columns and short rows read as empty.
    pub fn cell<'a>(row: &'a [Cell], index: Option<usize>) -> &'a Cell {
        index
            .and_then(|idx| row.get(idx))
            .unwrap_or(Cell::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_keeps_leading_zeros_and_trailing_decimals_as_text() {
        assert_eq!(Cell::classify("44197", CellMode::Classified), Cell::Number(44197.0));
        assert_eq!(Cell::classify("-3.5", CellMode::Classified), Cell::Number(-3.5));
        assert_eq!(Cell::classify("007", CellMode::Classified), Cell::text("007"));
        assert_eq!(Cell::classify("1.50", CellMode::Classified), Cell::text("1.50"));
        assert_eq!(Cell::classify("1e3", CellMode::Classified), Cell::text("1e3"));
        assert_eq!(Cell::classify("NaN", CellMode::Classified), Cell::text("NaN"));
        assert_eq!(Cell::classify("", CellMode::Classified), Cell::text(""));
    }

    #[test]
    fn classify_in_text_mode_never_produces_numbers() {
        assert_eq!(Cell::classify("44197", CellMode::Text), Cell::text("44197"));
    }

    #[test]
    fn numbers_render_without_trailing_fraction() {
        assert_eq!(Cell::Number(1.0).to_string(), "1");
        assert_eq!(Cell::Number(-0.0).to_string(), "0");
        assert_eq!(Cell::Number(2.25).to_string(), "2.25");
    }

    #[test]
    fn from_grid_splits_header_and_reads_missing_cells_as_empty() {
        let grid = vec![
            vec![Cell::text("a"), Cell::text("b"), Cell::text("a")],
            vec![Cell::text("1")],
        ];
        let table = InputTable::from_grid(grid).unwrap();
        assert_eq!(table.headers, vec!["a", "b", "a"]);
        assert_eq!(table.header_index("a"), Some(0));
        assert_eq!(table.header_index("zzz"), None);
        let row = &table.rows[0];
        assert_eq!(InputTable::cell(row, table.header_index("b")), Cell::empty());
        assert_eq!(InputTable::cell(row, None), Cell::empty());
        assert!(InputTable::from_grid(Vec::new()).is_none());
    }
}
