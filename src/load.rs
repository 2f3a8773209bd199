use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;
use umya_spreadsheet::Worksheet;

use crate::config::{Config, OutputFiles, OutputMode};
use crate::error::{EtlError, Result};
use crate::types::ReportBundle;

/// Output collaborator: persists a result bundle. Implementations own the
/// file format; the core only hands over the tables.
pub trait Loader {
    fn load(&self, bundle: &ReportBundle) -> Result<()>;
}

/// Builds the loader selected by the output configuration.
pub fn loader_from_config(config: &Config) -> Box<dyn Loader> {
    match config.output.mode {
        OutputMode::Workbook => Box::new(ExcelLoader::new(
            config.output.directory.join(&config.output.files.workbook),
        )),
        OutputMode::Split => Box::new(SplitCsvLoader::new(
            config.output.directory.clone(),
            config.output.files.clone(),
        )),
    }
}

/// Writes the three tables as sheets of a single `.xlsx` workbook.
pub struct ExcelLoader {
    path: PathBuf,
}

impl ExcelLoader {
    pub const DETAILED_SHEET: &'static str = "Detailed";
    pub const PRODUCT_SHEET: &'static str = "Product Summary";
    pub const DAILY_SHEET: &'static str = "Daily Summary";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn write_detailed(sheet: &mut Worksheet, bundle: &ReportBundle) {
        write_header(
            sheet,
            &["date", "product", "quantity", "unit_price", "total_value"],
        );
        for (i, record) in bundle.detailed.iter().enumerate() {
            let row = i as u32 + 2;
            sheet
                .get_cell_mut((1, row))
                .set_value(record.date.to_string());
            sheet
                .get_cell_mut((2, row))
                .set_value(record.product.as_str());
            sheet
                .get_cell_mut((3, row))
                .set_value_number(record.quantity as f64);
            sheet
                .get_cell_mut((4, row))
                .set_value_number(record.unit_price);
            sheet
                .get_cell_mut((5, row))
                .set_value_number(record.total_value);
        }
    }

    fn write_by_product(sheet: &mut Worksheet, bundle: &ReportBundle) {
        write_header(
            sheet,
            &["product", "quantity", "total_value", "average_price"],
        );
        for (i, summary) in bundle.by_product.iter().enumerate() {
            let row = i as u32 + 2;
            sheet
                .get_cell_mut((1, row))
                .set_value(summary.product.as_str());
            sheet
                .get_cell_mut((2, row))
                .set_value_number(summary.quantity as f64);
            sheet
                .get_cell_mut((3, row))
                .set_value_number(summary.total_value);
            sheet
                .get_cell_mut((4, row))
                .set_value_number(summary.average_price);
        }
    }

    fn write_by_date(sheet: &mut Worksheet, bundle: &ReportBundle) {
        write_header(
            sheet,
            &[
                "date",
                "quantity",
                "total_value",
                "total_products",
                "average_ticket",
            ],
        );
        for (i, summary) in bundle.by_date.iter().enumerate() {
            let row = i as u32 + 2;
            sheet
                .get_cell_mut((1, row))
                .set_value(summary.date.to_string());
            sheet
                .get_cell_mut((2, row))
                .set_value_number(summary.quantity as f64);
            sheet
                .get_cell_mut((3, row))
                .set_value_number(summary.total_value);
            sheet
                .get_cell_mut((4, row))
                .set_value_number(summary.total_products as f64);
            sheet
                .get_cell_mut((5, row))
                .set_value_number(summary.average_ticket);
        }
    }
}

fn write_header(sheet: &mut Worksheet, names: &[&str]) {
    for (i, name) in names.iter().enumerate() {
        sheet.get_cell_mut((i as u32 + 1, 1)).set_value(*name);
    }
}

impl Loader for ExcelLoader {
    fn load(&self, bundle: &ReportBundle) -> Result<()> {
        ensure_parent_dir(&self.path)?;

        let mut book = umya_spreadsheet::new_file();
        let detailed = book
            .get_sheet_mut(&0)
            .ok_or_else(|| EtlError::Persistence("workbook has no default sheet".to_string()))?;
        detailed.set_name(Self::DETAILED_SHEET);
        Self::write_detailed(detailed, bundle);

        let by_product = book
            .new_sheet(Self::PRODUCT_SHEET)
            .map_err(|e| EtlError::Persistence(format!("failed to create sheet: {e}")))?;
        Self::write_by_product(by_product, bundle);

        let by_date = book
            .new_sheet(Self::DAILY_SHEET)
            .map_err(|e| EtlError::Persistence(format!("failed to create sheet: {e}")))?;
        Self::write_by_date(by_date, bundle);

        umya_spreadsheet::writer::xlsx::write(&book, &self.path).map_err(|e| {
            EtlError::Persistence(format!(
                "failed to write workbook '{}': {}",
                self.path.display(),
                e
            ))
        })?;

        info!("saved workbook to {}", self.path.display());
        Ok(())
    }
}

/// Writes each table to its own delimited file in the output directory.
pub struct SplitCsvLoader {
    directory: PathBuf,
    files: OutputFiles,
}

impl SplitCsvLoader {
    pub fn new(directory: impl Into<PathBuf>, files: OutputFiles) -> Self {
        Self {
            directory: directory.into(),
            files,
        }
    }

    fn write_table<T: serde::Serialize>(&self, filename: &str, rows: &[T]) -> Result<PathBuf> {
        let path = self.directory.join(filename);
        let mut writer = csv::Writer::from_path(&path).map_err(|e| {
            EtlError::Persistence(format!("failed to open '{}': {}", path.display(), e))
        })?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(path)
    }
}

impl Loader for SplitCsvLoader {
    fn load(&self, bundle: &ReportBundle) -> Result<()> {
        fs::create_dir_all(&self.directory)?;

        let detailed = self.write_table(&self.files.detailed, &bundle.detailed)?;
        let by_product = self.write_table(&self.files.product_summary, &bundle.by_product)?;
        let by_date = self.write_table(&self.files.daily_summary, &bundle.by_date)?;

        info!(
            "saved tables to {}, {}, {}",
            detailed.display(),
            by_product.display(),
            by_date.display()
        );
        Ok(())
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}
