use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::io_utils::InputFormat;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Generate validated SQL INSERT statements from tabular data",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate a data file and emit an INSERT statement for the target table
    Generate(GenerateArgs),
    /// Validate a data file against the table definitions without emitting SQL
    Verify(VerifyArgs),
    /// List tables, or the columns of one table, from a table-definition file
    Tables(TablesArgs),
}

#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Table-definition file (table, ordinal, column, type, nullable)
    #[arg(short = 'd', long = "definitions")]
    pub definitions: PathBuf,
    /// Data file whose first row is the header ('-' reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Target table name (required here or in the configuration file)
    #[arg(short = 't', long = "table")]
    pub table: Option<String>,
    /// YAML configuration file with table, ignored columns, quoting and extra types
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
    /// Replace the default ignored system columns with this comma-separated list
    #[arg(long = "ignore-columns", value_delimiter = ',')]
    pub ignore_columns: Option<Vec<String>>,
    /// Read every data field as text instead of detecting numeric cells
    #[arg(long = "text-cells")]
    pub text_cells: bool,
    /// Data file format (detected from the extension when omitted)
    #[arg(long = "input-format", value_enum)]
    pub input_format: Option<InputFormat>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Output SQL file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Double embedded single quotes in string literals
    #[arg(long = "escape-quotes")]
    pub escape_quotes: bool,
    /// Character encoding for the output file/stdout (defaults to utf-8)
    #[arg(long = "output-encoding")]
    pub output_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Debug, Args)]
pub struct TablesArgs {
    /// Table-definition file (table, ordinal, column, type, nullable)
    #[arg(short = 'd', long = "definitions")]
    pub definitions: PathBuf,
    /// Show the columns of this table instead of the table list
    #[arg(short = 't', long = "table")]
    pub table: Option<String>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the definition file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
