use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{EtlError, Result};

/// Pipeline configuration loaded from a TOML file. Missing required keys
/// fail at startup with a configuration error.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub input: InputConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    pub directory: PathBuf,
    pub filename: String,

    /// strftime-style format applied to the date column.
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Source column names mapped onto the canonical fields.
    #[serde(default)]
    pub columns: ColumnMapping,
}

/// Maps source column headers to the canonical field names. Defaults match
/// the naming used by the upstream sales exports.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnMapping {
    #[serde(default = "default_date_column")]
    pub date: String,
    #[serde(default = "default_product_column")]
    pub product: String,
    #[serde(default = "default_quantity_column")]
    pub quantity: String,
    #[serde(default = "default_price_column")]
    pub price: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            date: default_date_column(),
            product: default_product_column(),
            quantity: default_quantity_column(),
            price: default_price_column(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub directory: PathBuf,

    #[serde(default)]
    pub mode: OutputMode,

    #[serde(default)]
    pub files: OutputFiles,
}

/// How the result bundle is persisted: one multi-sheet workbook, or one
/// delimited file per table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    Workbook,
    Split,
}

impl Default for OutputMode {
    fn default() -> Self {
        OutputMode::Workbook
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputFiles {
    #[serde(default = "default_workbook_file")]
    pub workbook: String,
    #[serde(default = "default_detailed_file")]
    pub detailed: String,
    #[serde(default = "default_product_summary_file")]
    pub product_summary: String,
    #[serde(default = "default_daily_summary_file")]
    pub daily_summary: String,
}

impl Default for OutputFiles {
    fn default() -> Self {
        Self {
            workbook: default_workbook_file(),
            detailed: default_detailed_file(),
            product_summary: default_product_summary_file(),
            daily_summary: default_daily_summary_file(),
        }
    }
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_date_column() -> String {
    "data".to_string()
}

fn default_product_column() -> String {
    "produto".to_string()
}

fn default_quantity_column() -> String {
    "quantidade".to_string()
}

fn default_price_column() -> String {
    "preco".to_string()
}

fn default_workbook_file() -> String {
    "sales_report.xlsx".to_string()
}

fn default_detailed_file() -> String {
    "detailed.csv".to_string()
}

fn default_product_summary_file() -> String {
    "product_summary.csv".to_string()
}

fn default_daily_summary_file() -> String {
    "daily_summary.csv".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            EtlError::Config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| EtlError::Config(format!("invalid config '{}': {}", path.display(), e)))?;
        Ok(config)
    }

    /// Full path of the input file.
    pub fn input_path(&self) -> PathBuf {
        self.input.directory.join(&self.input.filename)
    }
}
