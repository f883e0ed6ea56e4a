//! I/O utilities for reading datasets and writing generated text.
//!
//! All file I/O in sheet-sql flows through this module. It provides:
//!
//! - **Delimiter resolution**: extension-based auto-detection (`.csv` → comma,
//!   `.tsv` → tab) with manual override support.
//! - **Format resolution**: `.json` inputs are read as an array of objects,
//!   everything else as delimited text.
//! - **Encoding**: input decoding and output encoding via `encoding_rs`,
//!   defaulting to UTF-8.
//! - **stdin/stdout**: the `-` path convention routes through standard streams.

use std::{
    fs,
    io::{Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow, bail};
use clap::ValueEnum;
use encoding_rs::{Encoding, UTF_8};
use serde_json::Value as JsonValue;

use crate::data::{Cell, CellMode};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum InputFormat {
    Csv,
    Json,
}

/// How a dataset file is turned into a grid of cells.
#[derive(Debug, Clone, Copy)]
pub struct ReadOptions {
    pub delimiter: Option<u8>,
    pub encoding: &'static Encoding,
    pub format: Option<InputFormat>,
    pub cell_mode: CellMode,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            encoding: UTF_8,
            format: None,
            cell_mode: CellMode::default(),
        }
    }
}

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

pub fn resolve_input_format(path: &Path, provided: Option<InputFormat>) -> InputFormat {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => InputFormat::Json,
        _ => InputFormat::Csv,
    })
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    if is_dash(path) {
        let mut buf = Vec::new();
        std::io::stdin()
            .lock()
            .read_to_end(&mut buf)
            .context("Reading standard input")?;
        Ok(buf)
    } else {
        fs::read(path).with_context(|| format!("Opening input file {path:?}"))
    }
}

/// Reads a whole dataset, header row included, into a grid of cells.
pub fn read_grid(path: &Path, options: &ReadOptions) -> Result<Vec<Vec<Cell>>> {
    let bytes = read_bytes(path)?;
    let text = decode_bytes(&bytes, options.encoding)
        .with_context(|| format!("Decoding {path:?}"))?;
    match resolve_input_format(path, options.format) {
        InputFormat::Csv => {
            let delimiter = resolve_input_delimiter(path, options.delimiter);
            parse_delimited(&text, delimiter, options.cell_mode)
                .with_context(|| format!("Reading delimited data from {path:?}"))
        }
        InputFormat::Json => {
            parse_json_records(&text).with_context(|| format!("Reading JSON data from {path:?}"))
        }
    }
}

/// Parses delimited text into rows. Rows may have differing lengths.
pub fn parse_delimited(text: &str, delimiter: u8, mode: CellMode) -> Result<Vec<Vec<Cell>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Reading row {}", idx + 1))?;
        rows.push(record.iter().map(|field| Cell::classify(field, mode)).collect());
    }
    Ok(rows)
}

/// Parses a JSON array of objects into a grid whose first row holds the keys
/// of the first object, in document order.
pub fn parse_json_records(text: &str) -> Result<Vec<Vec<Cell>>> {
    let parsed: JsonValue =
        serde_json::from_str(text).map_err(|err| anyhow!("Invalid JSON format: {err}"))?;
    let records = match parsed {
        JsonValue::Array(records) if !records.is_empty() => records,
        _ => bail!("Invalid JSON data."),
    };
    let headers = match &records[0] {
        JsonValue::Object(first) => first.keys().cloned().collect::<Vec<_>>(),
        _ => bail!("Invalid JSON data."),
    };

    let mut grid = Vec::with_capacity(records.len() + 1);
    grid.push(headers.iter().map(|key| Cell::text(key.as_str())).collect());
    for (idx, record) in records.iter().enumerate() {
        let JsonValue::Object(fields) = record else {
            bail!("Invalid JSON data: element {idx} is not an object");
        };
        grid.push(
            headers
                .iter()
                .map(|key| fields.get(key).map(json_to_cell).unwrap_or_else(|| Cell::text("")))
                .collect(),
        );
    }
    Ok(grid)
}

fn json_to_cell(value: &JsonValue) -> Cell {
    match value {
        JsonValue::Null => Cell::text(""),
        JsonValue::Bool(flag) => Cell::text(flag.to_string()),
        // Integers beyond f64 precision stay text so their digits survive.
        JsonValue::Number(number) => match number.as_f64() {
            Some(parsed) if number.is_f64() && parsed.is_finite() => Cell::Number(parsed),
            _ => Cell::classify(&number.to_string(), CellMode::Classified),
        },
        JsonValue::String(text) => Cell::text(text.as_str()),
        other => Cell::text(other.to_string()),
    }
}

/// Writes `text` to `path` (stdout when absent or `-`) in the requested encoding.
pub fn write_output(path: Option<&Path>, text: &str, encoding: &'static Encoding) -> Result<()> {
    let (encoded, _, had_errors) = encoding.encode(text);
    if had_errors {
        bail!("Failed to encode output using {}", encoding.name());
    }
    match path {
        Some(p) if !is_dash(p) => {
            fs::write(p, encoded.as_ref()).with_context(|| format!("Creating output file {p:?}"))
        }
        _ => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(encoded.as_ref())?;
            stdout.write_all(b"\n")?;
            stdout.flush()?;
            Ok(())
        }
    }
}
