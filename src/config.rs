//! Generation options and the optional YAML configuration file.
//!
//! A configuration file looks like:
//!
//! ```yaml
//! table: ref_condition
//! ignored_columns: [id, version]
//! escape_quotes: false
//! types:
//!   "char(2)": "^.{2}$"
//! ```
//!
//! Every key is optional. Values given on the command line win over the file.

use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::types::TypeRegistry;

/// System-managed columns that never appear in generated statements.
pub const DEFAULT_IGNORED_COLUMNS: &[&str] = &[
    "id",
    "version",
    "created_date_time",
    "created_by_user_id",
    "modified_date_time",
    "modified_by_user_id",
];

/// How non-null values are written as SQL string literals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStyle {
    /// Wrap in single quotes with no escaping. A value containing `'` produces
    /// a broken or altered literal.
    #[default]
    Verbatim,
    /// Wrap in single quotes and double any embedded `'`.
    Escaped,
}

impl QuoteStyle {
    pub fn quote(self, value: &str) -> String {
        match self {
            QuoteStyle::Verbatim => format!("'{value}'"),
            QuoteStyle::Escaped => format!("'{}'", value.replace('\'', "''")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    pub table: String,
    pub ignored_columns: Vec<String>,
    pub quote_style: QuoteStyle,
}

impl GenerateOptions {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ignored_columns: DEFAULT_IGNORED_COLUMNS
                .iter()
                .map(|column| column.to_string())
                .collect(),
            quote_style: QuoteStyle::default(),
        }
    }

    pub fn with_ignored_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_quote_style(mut self, quote_style: QuoteStyle) -> Self {
        self.quote_style = quote_style;
        self
    }

    pub fn is_ignored(&self, column: &str) -> bool {
        self.ignored_columns.iter().any(|ignored| ignored == column)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub table: Option<String>,
    pub ignored_columns: Option<Vec<String>>,
    pub escape_quotes: bool,
    /// Extra type name to regular expression entries for the type registry.
    pub types: BTreeMap<String, String>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Opening configuration file {path:?}"))?;
        Self::from_yaml(&raw).with_context(|| format!("Parsing configuration file {path:?}"))
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Built-in registry extended with the file's `types` entries.
    pub fn registry(&self) -> Result<TypeRegistry> {
        let mut registry = TypeRegistry::with_builtins()?;
        for (name, pattern) in &self.types {
            registry.register(name.clone(), pattern)?;
        }
        Ok(registry)
    }
}
