//! `INSERT` statement synthesis.
//!
//! [`generate_insert`] validates every projected cell of every row before any
//! SQL is written. Either all cells pass and a complete statement comes back,
//! or the caller gets the full [`ErrorReport`]. Empty inputs and unknown
//! tables abort before validation starts.
//!
//! Generation is a pure function of its arguments: no shared state, no I/O,
//! so independent calls may run concurrently.

use std::fmt;

use itertools::Itertools;
use log::debug;
use thiserror::Error;

use crate::{
    config::{GenerateOptions, QuoteStyle},
    data::{Cell, InputTable},
    definition::{SchemaCatalog, TableSchema, parse_table_definitions},
    report::ErrorReport,
    types::TypeRegistry,
    validate::{CellValidator, SqlValue},
};

/// Sheet row number of the first data row; the header occupies row 1.
const FIRST_DATA_ROW: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("The input table is empty.")]
    EmptyData,
    #[error("The table definition dataset is empty.")]
    EmptyDefinitions,
    #[error("Table {0} not found in table definitions.")]
    UnknownTable(String),
    #[error("{0}")]
    Validation(ErrorReport),
}

impl GenerateError {
    /// Fatal conditions stop generation before any cell is looked at.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, GenerateError::Validation(_))
    }

    pub fn report(&self) -> Option<&ErrorReport> {
        match self {
            GenerateError::Validation(report) => Some(report),
            _ => None,
        }
    }
}

/// A complete `INSERT` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedStatement {
    text: String,
    row_count: usize,
}

impl GeneratedStatement {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    /// Number of value tuples in the statement.
    pub fn row_count(&self) -> usize {
        self.row_count
    }
}

impl fmt::Display for GeneratedStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Schema columns that are written to the statement, in schema order.
pub fn project_columns<'a>(schema: &'a TableSchema, options: &GenerateOptions) -> Vec<&'a str> {
    schema
        .columns()
        .iter()
        .map(String::as_str)
        .filter(|column| !options.is_ignored(column))
        .collect()
}

/// Generates the statement for `options.table` from an already parsed catalog.
pub fn generate_insert(
    catalog: &SchemaCatalog,
    input: &InputTable,
    options: &GenerateOptions,
    registry: &TypeRegistry,
) -> Result<GeneratedStatement, GenerateError> {
    if input.is_empty() {
        return Err(GenerateError::EmptyData);
    }
    if catalog.is_empty() {
        return Err(GenerateError::EmptyDefinitions);
    }
    let schema = catalog
        .get(&options.table)
        .ok_or_else(|| GenerateError::UnknownTable(options.table.clone()))?;

    let columns = project_columns(schema, options);
    debug!(
        "Projecting {} of {} column(s) for table '{}'",
        columns.len(),
        schema.len(),
        options.table
    );

    let rows = validate_rows(schema, &columns, input, registry).map_err(GenerateError::Validation)?;
    Ok(render_statement(&options.table, &columns, &rows, options.quote_style))
}

/// Generates from the raw datasets: definition rows (header first) and the
/// data grid (header first).
pub fn generate_from_datasets(
    definitions: &[Vec<Cell>],
    data: Vec<Vec<Cell>>,
    options: &GenerateOptions,
    registry: &TypeRegistry,
) -> Result<GeneratedStatement, GenerateError> {
    let input = InputTable::from_grid(data).ok_or(GenerateError::EmptyData)?;
    if input.is_empty() {
        return Err(GenerateError::EmptyData);
    }
    if definitions.len() <= 1 {
        return Err(GenerateError::EmptyDefinitions);
    }
    let catalog = parse_table_definitions(definitions);
    generate_insert(&catalog, &input, options, registry)
}

fn validate_rows(
    schema: &TableSchema,
    columns: &[&str],
    input: &InputTable,
    registry: &TypeRegistry,
) -> Result<Vec<Vec<SqlValue>>, ErrorReport> {
    let validator = CellValidator::new(schema, registry);
    let positions = columns
        .iter()
        .map(|column| input.header_index(column))
        .collect::<Vec<_>>();

    let mut report = ErrorReport::new();
    let mut rows = Vec::with_capacity(input.rows.len());
    for (row_idx, row) in input.rows.iter().enumerate() {
        let sheet_row = row_idx + FIRST_DATA_ROW;
        let mut values = Vec::with_capacity(columns.len());
        for (column, position) in columns.iter().zip(&positions) {
            let raw = InputTable::cell(row, *position);
            match validator.validate(sheet_row, column, raw) {
                Ok(value) => values.push(value),
                Err(error) => report.push(error),
            }
        }
        rows.push(values);
    }

    report.into_result().map(|()| rows)
}

fn render_statement(
    table: &str,
    columns: &[&str],
    rows: &[Vec<SqlValue>],
    quote_style: QuoteStyle,
) -> GeneratedStatement {
    let tuples = rows
        .iter()
        .map(|values| {
            let rendered = values
                .iter()
                .map(|value| match value {
                    SqlValue::Null => "NULL".to_string(),
                    SqlValue::Literal(text) => quote_style.quote(text),
                })
                .join(", ");
            format!("({rendered})")
        })
        .join(",\n");
    let text = format!(
        "INSERT INTO {table} ({})\nVALUES\n{tuples};",
        columns.iter().join(", ")
    );
    GeneratedStatement {
        text,
        row_count: rows.len(),
    }
}
