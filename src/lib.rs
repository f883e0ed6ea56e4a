pub mod cli;
pub mod config;
pub mod data;
pub mod definition;
pub mod generate;
pub mod io_utils;
pub mod normalize;
pub mod report;
pub mod table;
pub mod tables;
pub mod types;
pub mod validate;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    cli::{Cli, Commands, GenerateArgs, SourceArgs, VerifyArgs},
    config::{ConfigFile, GenerateOptions, QuoteStyle},
    data::{Cell, CellMode},
    generate::{GenerateError, GeneratedStatement, generate_from_datasets},
    io_utils::ReadOptions,
    types::TypeRegistry,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("sheet_sql", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Generate(args) => handle_generate(&args),
        Commands::Verify(args) => handle_verify(&args),
        Commands::Tables(args) => tables::execute(&args),
    }
}

/// Everything a generation run needs, resolved from flags, config and files.
struct Prepared {
    options: GenerateOptions,
    registry: TypeRegistry,
    definitions: Vec<Vec<Cell>>,
    data: Vec<Vec<Cell>>,
}

fn prepare(source: &SourceArgs, escape_quotes: bool) -> Result<Prepared> {
    let config = match &source.config {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::default(),
    };
    let table = source
        .table
        .clone()
        .or_else(|| config.table.clone())
        .ok_or_else(|| {
            anyhow!("A target table name is required (--table or 'table' in the configuration file)")
        })?;

    let mut options = GenerateOptions::new(table);
    if let Some(columns) = source
        .ignore_columns
        .clone()
        .or_else(|| config.ignored_columns.clone())
    {
        options = options.with_ignored_columns(
            columns
                .iter()
                .map(|c| c.trim())
                .filter(|c| !c.is_empty())
                .map(|c| c.to_string()),
        );
    }
    if escape_quotes || config.escape_quotes {
        options = options.with_quote_style(QuoteStyle::Escaped);
    }
    debug!("Ignored columns: {:?}", options.ignored_columns);

    let registry = config.registry().context("Building type registry")?;

    let encoding = io_utils::resolve_encoding(source.input_encoding.as_deref())?;
    let definitions = io_utils::read_grid(
        &source.definitions,
        &ReadOptions {
            delimiter: source.delimiter,
            encoding,
            ..ReadOptions::default()
        },
    )
    .with_context(|| format!("Loading table definitions from {:?}", source.definitions))?;
    let data = io_utils::read_grid(
        &source.input,
        &ReadOptions {
            delimiter: source.delimiter,
            encoding,
            format: source.input_format,
            cell_mode: if source.text_cells {
                CellMode::Text
            } else {
                CellMode::Classified
            },
        },
    )
    .with_context(|| format!("Loading data from {:?}", source.input))?;

    Ok(Prepared {
        options,
        registry,
        definitions,
        data,
    })
}

fn run_generation(prepared: Prepared) -> Result<(GenerateOptions, GeneratedStatement)> {
    let Prepared {
        options,
        registry,
        definitions,
        data,
    } = prepared;
    match generate_from_datasets(&definitions, data, &options, &registry) {
        Ok(statement) => Ok((options, statement)),
        Err(GenerateError::Validation(report)) => {
            eprintln!("{report}");
            bail!(
                "Validation failed with {} problem(s); no SQL was generated",
                report.len()
            )
        }
        Err(fatal) => Err(fatal.into()),
    }
}

fn handle_generate(args: &GenerateArgs) -> Result<()> {
    info!(
        "Generating INSERT statement from '{}' using definitions '{}'",
        args.source.input.display(),
        args.source.definitions.display()
    );
    let output_encoding = io_utils::resolve_encoding(args.output_encoding.as_deref())?;
    let prepared = prepare(&args.source, args.escape_quotes)?;
    let (options, statement) = run_generation(prepared)?;
    io_utils::write_output(args.output.as_deref(), statement.as_str(), output_encoding)?;
    info!(
        "✓ Generated INSERT INTO {} with {} row(s)",
        options.table,
        statement.row_count()
    );
    Ok(())
}

fn handle_verify(args: &VerifyArgs) -> Result<()> {
    let prepared = prepare(&args.source, false)?;
    let (options, statement) = run_generation(prepared)?;
    info!(
        "✓ {:?} matches table '{}' ({} row(s))",
        args.source.input,
        options.table,
        statement.row_count()
    );
    Ok(())
}
