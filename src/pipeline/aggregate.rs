use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::types::{DateSummary, ProductSummary, SaleRecord};

/// Groups validated records by exact product name. Output rows are sorted
/// by product in ascending order.
pub fn group_by_product(records: &[SaleRecord]) -> Vec<ProductSummary> {
    let mut groups: BTreeMap<&str, (i64, f64)> = BTreeMap::new();
    for record in records {
        let entry = groups.entry(record.product.as_str()).or_insert((0, 0.0));
        entry.0 += record.quantity;
        entry.1 += record.total_value;
    }

    debug!(groups = groups.len(), "grouped records by product");

    groups
        .into_iter()
        .map(|(product, (quantity, total_value))| ProductSummary {
            product: product.to_string(),
            quantity,
            total_value,
            average_price: ratio(total_value, quantity as f64),
        })
        .collect()
}

/// Groups validated records by calendar date. `total_products` counts the
/// line items for that day. Output rows are sorted by date in ascending
/// order.
pub fn group_by_date(records: &[SaleRecord]) -> Vec<DateSummary> {
    let mut groups: BTreeMap<NaiveDate, (i64, f64, usize)> = BTreeMap::new();
    for record in records {
        let entry = groups.entry(record.date).or_insert((0, 0.0, 0));
        entry.0 += record.quantity;
        entry.1 += record.total_value;
        entry.2 += 1;
    }

    debug!(groups = groups.len(), "grouped records by date");

    groups
        .into_iter()
        .map(|(date, (quantity, total_value, total_products))| DateSummary {
            date,
            quantity,
            total_value,
            total_products,
            average_ticket: ratio(total_value, total_products as f64),
        })
        .collect()
}

/// Zero denominators yield 0.0 rather than NaN. Post-validation groups
/// always have positive quantity and at least one row, so this only guards
/// against misuse.
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}
