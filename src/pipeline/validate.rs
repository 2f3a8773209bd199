use tracing::trace;

use crate::error::ValidationError;
use crate::types::{CoercedRow, SaleRecord};

/// Validates one coerced row into a `SaleRecord`. The validator is total:
/// a row either fully succeeds or fails with the first violated rule.
#[derive(Debug, Default)]
pub struct RecordValidator;

impl RecordValidator {
    pub fn new() -> Self {
        Self
    }

    /// Checks run in field order: date, product, quantity, unit price.
    /// `total_value` is computed from quantity and price only when the
    /// source did not supply it; a supplied value is kept verbatim even if
    /// it disagrees with quantity times price.
    pub fn validate(&self, row: &CoercedRow, index: usize) -> Result<SaleRecord, ValidationError> {
        trace!(row = index, "validating record");

        let date = row.date.ok_or(ValidationError::MissingField {
            field: "date",
            row: index,
        })?;

        let product = row
            .product
            .as_deref()
            .ok_or(ValidationError::MissingField {
                field: "product",
                row: index,
            })?
            .trim();
        if product.is_empty() {
            return Err(ValidationError::EmptyField {
                field: "product",
                row: index,
            });
        }

        let quantity = row.quantity.ok_or(ValidationError::MissingField {
            field: "quantity",
            row: index,
        })?;
        if quantity <= 0 {
            return Err(ValidationError::OutOfRange {
                field: "quantity",
                row: index,
            });
        }

        let unit_price = row.unit_price.ok_or(ValidationError::MissingField {
            field: "unit_price",
            row: index,
        })?;
        if unit_price <= 0.0 {
            return Err(ValidationError::OutOfRange {
                field: "unit_price",
                row: index,
            });
        }

        let total_value = row
            .total_value
            .unwrap_or_else(|| quantity as f64 * unit_price);

        Ok(SaleRecord {
            date,
            product: product.to_string(),
            quantity,
            unit_price,
            total_value,
        })
    }
}
