//! Table-definition parsing.
//!
//! The definition sheet lists one column per row: table name, an ordinal that
//! is ignored, column name, SQL type, and a nullable flag. Rows are grouped
//! into one [`TableSchema`] per table name, keeping first-seen column order.

use std::collections::{BTreeMap, HashMap};

use log::{debug, warn};

use crate::data::Cell;

const TABLE_FIELD: usize = 0;
const COLUMN_FIELD: usize = 2;
const TYPE_FIELD: usize = 3;
const NULLABLE_FIELD: usize = 4;

/// One positional row of the definition sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDefinitionRow {
    pub table_name: String,
    pub column_name: String,
    pub sql_type: String,
    pub nullable_flag: String,
}

impl TableDefinitionRow {
    /// Reads the positional fields of `cells`; fields past the end read as empty.
    pub fn from_cells(cells: &[Cell]) -> Self {
        let field = |idx: usize| {
            cells
                .get(idx)
                .map(|cell| cell.as_display().into_owned())
                .unwrap_or_default()
        };
        Self {
            table_name: field(TABLE_FIELD),
            column_name: field(COLUMN_FIELD),
            sql_type: field(TYPE_FIELD),
            nullable_flag: field(NULLABLE_FIELD),
        }
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable_flag.to_lowercase() == "yes"
    }
}

/// Column layout of a single table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSchema {
    columns: Vec<String>,
    types: HashMap<String, String>,
    nullable: HashMap<String, bool>,
}

impl TableSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or redefines a column. Returns `true` when the column already existed,
    /// in which case its position is kept and its type and nullability are replaced.
    pub fn define(
        &mut self,
        column: impl Into<String>,
        sql_type: impl Into<String>,
        nullable: bool,
    ) -> bool {
        let column = column.into();
        let existed = self.types.contains_key(&column);
        if !existed {
            self.columns.push(column.clone());
        }
        self.nullable.insert(column.clone(), nullable);
        self.types.insert(column, sql_type.into());
        existed
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.types.contains_key(column)
    }

    pub fn sql_type(&self, column: &str) -> Option<&str> {
        self.types.get(column).map(String::as_str)
    }

    /// Unknown columns are treated as not nullable.
    pub fn is_nullable(&self, column: &str) -> bool {
        self.nullable.get(column).copied().unwrap_or(false)
    }
}

/// Every table described by a definition dataset, keyed by table name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaCatalog {
    tables: BTreeMap<String, TableSchema>,
}

impl SchemaCatalog {
    pub fn get(&self, table: &str) -> Option<&TableSchema> {
        self.tables.get(table)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TableSchema)> {
        self.tables
            .iter()
            .map(|(name, schema)| (name.as_str(), schema))
    }

    pub fn insert_row(&mut self, row: TableDefinitionRow) {
        let nullable = row.is_nullable();
        let schema = self.tables.entry(row.table_name.clone()).or_default();
        if schema.define(row.column_name.clone(), row.sql_type, nullable) {
            warn!(
                "Column '{}' is defined more than once for table '{}'; keeping the last definition",
                row.column_name, row.table_name
            );
        }
    }
}

impl FromIterator<TableDefinitionRow> for SchemaCatalog {
    fn from_iter<I: IntoIterator<Item = TableDefinitionRow>>(iter: I) -> Self {
        let mut catalog = SchemaCatalog::default();
        for row in iter {
            catalog.insert_row(row);
        }
        catalog
    }
}

/// Builds the catalog from the raw definition dataset. Row 0 is a header and is skipped.
///
/// The definitions themselves are not validated; a bad row shows up later as an
/// unknown table or an unchecked type.
pub fn parse_table_definitions(rows: &[Vec<Cell>]) -> SchemaCatalog {
    let catalog: SchemaCatalog = rows
        .iter()
        .skip(1)
        .map(|row| TableDefinitionRow::from_cells(row))
        .collect();
    debug!(
        "Parsed {} definition row(s) into {} table(s)",
        rows.len().saturating_sub(1),
        catalog.len()
    );
    catalog
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[&str]) -> Vec<Cell> {
        fields.iter().map(|field| Cell::text(*field)).collect()
    }

    #[test]
    fn groups_rows_by_table_in_first_seen_order() {
        let rows = vec![
            row(&["Table", "#", "Column", "Type", "Nullable"]),
            row(&["orders", "1", "id", "int", "NO"]),
            row(&["customers", "1", "name", "varchar(80)", "Yes"]),
            row(&["orders", "2", "note", "varchar", "yes"]),
            row(&["orders", "3", "amount", "decimal", "no"]),
        ];
        let catalog = parse_table_definitions(&rows);
        assert_eq!(catalog.table_names().collect::<Vec<_>>(), vec!["customers", "orders"]);

        let orders = catalog.get("orders").unwrap();
        assert_eq!(orders.columns(), ["id", "note", "amount"]);
        assert_eq!(orders.sql_type("amount"), Some("decimal"));
        assert!(orders.is_nullable("note"));
        assert!(!orders.is_nullable("id"));
        assert!(catalog.get("customers").unwrap().is_nullable("name"));
    }

    #[test]
    fn duplicate_column_keeps_position_and_takes_last_definition() {
        let rows = vec![
            row(&["Table", "#", "Column", "Type", "Nullable"]),
            row(&["t", "1", "a", "int", "no"]),
            row(&["t", "2", "b", "bit", "no"]),
            row(&["t", "3", "a", "varchar(10)", "yes"]),
        ];
        let schema = parse_table_definitions(&rows).get("t").cloned().unwrap();
        assert_eq!(schema.columns(), ["a", "b"]);
        assert_eq!(schema.sql_type("a"), Some("varchar(10)"));
        assert!(schema.is_nullable("a"));
    }

    #[test]
    fn short_rows_read_missing_fields_as_empty() {
        let rows = vec![row(&["header"]), row(&["t", "1", "a"])];
        let schema = parse_table_definitions(&rows).get("t").cloned().unwrap();
        assert_eq!(schema.sql_type("a"), Some(""));
        assert!(!schema.is_nullable("a"));
    }

    #[test]
    fn numeric_cells_are_read_as_their_display_text() {
        let rows = vec![
            row(&["header"]),
            vec![
                Cell::text("t"),
                Cell::Number(1.0),
                Cell::text("flag"),
                Cell::text("bit"),
                Cell::text("no"),
            ],
        ];
        let catalog = parse_table_definitions(&rows);
        assert!(catalog.get("t").unwrap().contains("flag"));
    }

    #[test]
    fn header_only_dataset_yields_empty_catalog() {
        let rows = vec![row(&["Table", "#", "Column", "Type", "Nullable"])];
        assert!(parse_table_definitions(&rows).is_empty());
        assert!(parse_table_definitions(&[]).is_empty());
    }
}
