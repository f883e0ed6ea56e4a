//! Table and column listing from a table-definition file.
//!
//! Without `--table`, lists every table with its column count. With it, lists
//! the table's columns with their type, nullability, whether the default
//! ignore list drops them, and whether the type is checked.

use anyhow::{Context, Result, bail};
use log::info;

use crate::{
    cli::TablesArgs,
    config::GenerateOptions,
    definition::{SchemaCatalog, TableSchema, parse_table_definitions},
    io_utils::{self, ReadOptions},
    table,
    types::TypeRegistry,
};

pub fn execute(args: &TablesArgs) -> Result<()> {
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let rows = io_utils::read_grid(
        &args.definitions,
        &ReadOptions {
            delimiter: args.delimiter,
            encoding,
            ..ReadOptions::default()
        },
    )
    .with_context(|| format!("Loading table definitions from {:?}", args.definitions))?;
    let catalog = parse_table_definitions(&rows);

    if catalog.is_empty() {
        info!("{:?} does not define any tables", args.definitions);
        return Ok(());
    }

    let (headers, listing) = match &args.table {
        Some(name) => match catalog.get(name) {
            Some(schema) => column_listing(name, schema, TypeRegistry::builtin()),
            None => bail!("Table {name} not found in table definitions."),
        },
        None => table_listing(&catalog),
    };
    table::print_table(&headers, &listing);
    info!("Listed {} row(s) from {:?}", listing.len(), args.definitions);
    Ok(())
}

pub fn table_listing(catalog: &SchemaCatalog) -> (Vec<String>, Vec<Vec<String>>) {
    let rows = catalog
        .iter()
        .map(|(name, schema)| vec![name.to_string(), schema.len().to_string()])
        .collect();
    (vec!["table".to_string(), "columns".to_string()], rows)
}

pub fn column_listing(
    table_name: &str,
    schema: &TableSchema,
    registry: &TypeRegistry,
) -> (Vec<String>, Vec<Vec<String>>) {
    let options = GenerateOptions::new(table_name);
    let yes_no = |flag: bool| (if flag { "yes" } else { "no" }).to_string();
    let rows = schema
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            let sql_type = schema.sql_type(column).unwrap_or_default();
            vec![
                (idx + 1).to_string(),
                column.clone(),
                sql_type.to_string(),
                yes_no(schema.is_nullable(column)),
                yes_no(options.is_ignored(column)),
                yes_no(registry.contains(sql_type)),
            ]
        })
        .collect();
    let headers = ["#", "column", "type", "nullable", "ignored", "checked"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    (headers, rows)
}
