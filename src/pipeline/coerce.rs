use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::config::ColumnMapping;
use crate::error::{EtlError, Result};
use crate::types::{CoercedRow, RawTable};

/// Alternate headers accepted for the unit price when the mapped column is
/// absent from the source file. Kept for compatibility with older exports
/// that never renamed `preco_unitario`.
const PRICE_FALLBACKS: &[&str] = &["preco_unitario", "unit_price", "price"];

/// Headers recognized as a pre-computed total value column. The column is
/// optional; when present its values are passed through untouched.
const TOTAL_VALUE_COLUMNS: &[&str] = &["valor_total", "total_value"];

/// Resolved positions of the canonical columns within a raw header row.
struct ColumnIndices {
    date: usize,
    product: usize,
    quantity: usize,
    price: usize,
    total_value: Option<usize>,
}

/// Renames columns to the canonical naming and parses string cells into
/// typed values. Produces a new table; never mutates its input.
pub struct SchemaCoercer {
    mapping: ColumnMapping,
    date_format: String,
}

impl SchemaCoercer {
    pub fn new(mapping: ColumnMapping, date_format: impl Into<String>) -> Self {
        Self {
            mapping,
            date_format: date_format.into(),
        }
    }

    /// Coerce a raw table into canonical rows. A missing required column,
    /// an unparsable date, or a non-numeric quantity/price cell aborts the
    /// whole table with a schema error carrying the row index.
    pub fn coerce(&self, raw: &RawTable) -> Result<Vec<CoercedRow>> {
        let indices = self.resolve_columns(raw)?;
        debug!(rows = raw.len(), "coercing raw table");

        let mut coerced = Vec::with_capacity(raw.len());
        for (row_idx, row) in raw.rows.iter().enumerate() {
            coerced.push(self.coerce_row(row, &indices, row_idx)?);
        }
        Ok(coerced)
    }

    fn resolve_columns(&self, raw: &RawTable) -> Result<ColumnIndices> {
        let date = self.require_column(raw, &self.mapping.date)?;
        let product = self.require_column(raw, &self.mapping.product)?;
        let quantity = self.require_column(raw, &self.mapping.quantity)?;

        let price = match raw.column_index(&self.mapping.price) {
            Some(idx) => idx,
            None => {
                let (name, idx) = PRICE_FALLBACKS
                    .iter()
                    .find_map(|name| raw.column_index(name).map(|idx| (*name, idx)))
                    .ok_or_else(|| {
                        EtlError::Schema(format!(
                            "required column '{}' not found (no fallback matched)",
                            self.mapping.price
                        ))
                    })?;
                warn!(
                    "column '{}' not found, falling back to '{}'",
                    self.mapping.price, name
                );
                idx
            }
        };

        let total_value = TOTAL_VALUE_COLUMNS
            .iter()
            .find_map(|name| raw.column_index(name));

        Ok(ColumnIndices {
            date,
            product,
            quantity,
            price,
            total_value,
        })
    }

    fn require_column(&self, raw: &RawTable, name: &str) -> Result<usize> {
        raw.column_index(name)
            .ok_or_else(|| EtlError::Schema(format!("required column '{}' not found", name)))
    }

    fn coerce_row(
        &self,
        row: &[String],
        indices: &ColumnIndices,
        row_idx: usize,
    ) -> Result<CoercedRow> {
        let date = match cell(row, indices.date) {
            Some(value) => Some(self.parse_date(value, row_idx)?),
            None => None,
        };

        // Product is kept untrimmed: the validator distinguishes a missing
        // cell from a whitespace-only one.
        let product = row.get(indices.product).cloned();
        let quantity = parse_numeric(row, indices.quantity, "quantity", row_idx, |s| {
            s.parse::<i64>().ok()
        })?;
        let unit_price = parse_numeric(row, indices.price, "unit_price", row_idx, |s| {
            s.parse::<f64>().ok()
        })?;

        let total_value = match indices.total_value {
            Some(idx) => parse_numeric(row, idx, "total_value", row_idx, |s| {
                s.parse::<f64>().ok()
            })?,
            None => None,
        };

        Ok(CoercedRow {
            date,
            product,
            quantity,
            unit_price,
            total_value,
        })
    }

    fn parse_date(&self, value: &str, row_idx: usize) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(value, &self.date_format).map_err(|_| {
            EtlError::Schema(format!(
                "row {}: unparsable date '{}' (expected format '{}')",
                row_idx, value, self.date_format
            ))
        })
    }
}

/// A trimmed cell, or `None` when the row is short or the cell is blank.
fn cell(row: &[String], idx: usize) -> Option<&str> {
    row.get(idx).map(|s| s.trim()).filter(|s| !s.is_empty())
}

fn parse_numeric<T>(
    row: &[String],
    idx: usize,
    field: &str,
    row_idx: usize,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>> {
    match cell(row, idx) {
        None => Ok(None),
        Some(value) => parse(value).map(Some).ok_or_else(|| {
            EtlError::Schema(format!(
                "row {}: non-numeric value '{}' in column '{}'",
                row_idx, value, field
            ))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColumnMapping;

    fn coercer() -> SchemaCoercer {
        SchemaCoercer::new(ColumnMapping::default(), "%Y-%m-%d")
    }

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_coerce_renames_and_parses() {
        let raw = table(
            &["data", "produto", "quantidade", "preco"],
            &[&["2024-01-01", "Produto A", "10", "100.50"]],
        );

        let rows = coercer().coerce(&raw).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(rows[0].product.as_deref(), Some("Produto A"));
        assert_eq!(rows[0].quantity, Some(10));
        assert_eq!(rows[0].unit_price, Some(100.50));
        assert_eq!(rows[0].total_value, None);
    }

    #[test]
    fn test_missing_price_column_falls_back_to_preco_unitario() {
        let raw = table(
            &["data", "produto", "quantidade", "preco_unitario"],
            &[&["2024-01-01", "A", "2", "10.0"]],
        );

        let rows = coercer().coerce(&raw).unwrap();
        assert_eq!(rows[0].unit_price, Some(10.0));
    }

    #[test]
    fn test_missing_required_column_is_schema_error() {
        let raw = table(&["data", "quantidade", "preco"], &[]);
        let err = coercer().coerce(&raw).unwrap_err();
        assert!(matches!(err, EtlError::Schema(_)));
        assert!(err.to_string().contains("produto"));
    }

    #[test]
    fn test_no_price_column_at_all_is_schema_error() {
        let raw = table(&["data", "produto", "quantidade"], &[]);
        let err = coercer().coerce(&raw).unwrap_err();
        assert!(matches!(err, EtlError::Schema(_)));
    }

    #[test]
    fn test_unparsable_date_is_fatal() {
        let raw = table(
            &["data", "produto", "quantidade", "preco"],
            &[&["01/01/2024", "A", "2", "10.0"]],
        );

        let err = coercer().coerce(&raw).unwrap_err();
        assert!(matches!(err, EtlError::Schema(_)));
        assert!(err.to_string().contains("row 0"));
    }

    #[test]
    fn test_custom_date_format() {
        let raw = table(
            &["data", "produto", "quantidade", "preco"],
            &[&["01/02/2024", "A", "2", "10.0"]],
        );

        let coercer = SchemaCoercer::new(ColumnMapping::default(), "%d/%m/%Y");
        let rows = coercer.coerce(&raw).unwrap();
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2024, 2, 1));
    }

    #[test]
    fn test_non_numeric_quantity_is_fatal() {
        let raw = table(
            &["data", "produto", "quantidade", "preco"],
            &[&["2024-01-01", "A", "two", "10.0"]],
        );

        let err = coercer().coerce(&raw).unwrap_err();
        assert!(err.to_string().contains("quantity"));
    }

    #[test]
    fn test_empty_cells_become_none() {
        let raw = table(
            &["data", "produto", "quantidade", "preco"],
            &[&["", "  ", "", ""]],
        );

        let rows = coercer().coerce(&raw).unwrap();
        assert_eq!(rows[0].date, None);
        assert_eq!(rows[0].product.as_deref(), Some("  "));
        assert_eq!(rows[0].quantity, None);
        assert_eq!(rows[0].unit_price, None);
        assert_eq!(rows[0].total_value, None);
    }

    #[test]
    fn test_total_value_column_passes_through() {
        let raw = table(
            &["data", "produto", "quantidade", "preco", "valor_total"],
            &[&["2024-01-01", "A", "2", "10.0", "2000.0"]],
        );

        let rows = coercer().coerce(&raw).unwrap();
        assert_eq!(rows[0].total_value, Some(2000.0));
    }

    #[test]
    fn test_unknown_columns_are_dropped() {
        let raw = table(
            &["data", "produto", "quantidade", "preco", "extra"],
            &[&["2024-01-01", "A", "2", "10.0", "ignored"]],
        );

        let rows = coercer().coerce(&raw).unwrap();
        assert_eq!(rows[0].total_value, None);
        assert_eq!(rows[0].product.as_deref(), Some("A"));
    }
}
