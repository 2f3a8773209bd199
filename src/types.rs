use chrono::NaiveDate;
use serde::Serialize;

/// Raw tabular data as read from a delimited file: one header row plus
/// string cells. The extractor produces this; the coercer consumes it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Position of a column by exact header name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A single row after column renaming and type coercion, before validation.
/// `None` means the cell was empty in the source. Columns outside the
/// canonical set are dropped during coercion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoercedRow {
    pub date: Option<NaiveDate>,
    pub product: Option<String>,
    pub quantity: Option<i64>,
    pub unit_price: Option<f64>,
    pub total_value: Option<f64>,
}

/// A fully validated sale. `total_value` is always present here: it is
/// computed from quantity and unit price when the source omitted it, and
/// taken verbatim when supplied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleRecord {
    pub date: NaiveDate,
    pub product: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub total_value: f64,
}

/// Per-product aggregate view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSummary {
    pub product: String,
    pub quantity: i64,
    pub total_value: f64,
    pub average_price: f64,
}

/// Per-day aggregate view. `total_products` counts line items for the day,
/// not distinct products.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateSummary {
    pub date: NaiveDate,
    pub quantity: i64,
    pub total_value: f64,
    pub total_products: usize,
    pub average_ticket: f64,
}

/// Fixed-shape result of one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct ReportBundle {
    pub detailed: Vec<SaleRecord>,
    pub by_product: Vec<ProductSummary>,
    pub by_date: Vec<DateSummary>,
}
