//! Per-cell validation against a table schema.

use crate::{
    data::Cell,
    definition::TableSchema,
    normalize,
    report::CellError,
    types::{TypeCheck, TypeRegistry},
};

/// A validated value ready to be rendered into a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Null,
    Literal(String),
}

pub struct CellValidator<'a> {
    schema: &'a TableSchema,
    registry: &'a TypeRegistry,
}

impl<'a> CellValidator<'a> {
    pub fn new(schema: &'a TableSchema, registry: &'a TypeRegistry) -> Self {
        Self { schema, registry }
    }

    /// Normalizes and checks one cell of `column` on sheet row `row`.
    ///
    /// Date serials are converted first so the converted text is what gets
    /// checked. Empty values become `NULL` in nullable columns and a null
    /// violation otherwise. Values of unregistered types are not checked.
    pub fn validate(&self, row: usize, column: &str, raw: &Cell) -> Result<SqlValue, CellError> {
        let sql_type = self.schema.sql_type(column).unwrap_or_default();
        let value = normalize::normalize_cell(raw, sql_type)
            .map_err(|_| CellError::type_mismatch(row, column, sql_type, raw.as_display()))?;

        if value.is_empty() {
            return if self.schema.is_nullable(column) {
                Ok(SqlValue::Null)
            } else {
                Err(CellError::null_violation(row, column))
            };
        }

        match self.registry.check(sql_type, &value) {
            TypeCheck::Mismatched => Err(CellError::type_mismatch(row, column, sql_type, value)),
            TypeCheck::Matched | TypeCheck::Unregistered => Ok(SqlValue::Literal(value.into_owned())),
        }
    }
}
