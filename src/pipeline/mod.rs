// Core pipeline stages: coercion, validation, and aggregation

pub mod aggregate;
pub mod coerce;
pub mod validate;

use tracing::{debug, info, instrument};

use crate::config::Config;
use crate::error::Result;
use crate::types::{RawTable, ReportBundle};

use self::coerce::SchemaCoercer;
use self::validate::RecordValidator;

/// Sequences coerce -> validate -> aggregate over an in-memory table.
/// Fail-fast: a coercion error aborts before validation, and the first
/// invalid row aborts before aggregation.
pub struct Pipeline {
    coercer: SchemaCoercer,
    validator: RecordValidator,
}

impl Pipeline {
    pub fn new(config: &Config) -> Self {
        Self {
            coercer: SchemaCoercer::new(
                config.input.columns.clone(),
                config.input.date_format.clone(),
            ),
            validator: RecordValidator::new(),
        }
    }

    /// Run the full transformation over a raw table, producing the detailed
    /// table plus both summary views. The input is never mutated.
    #[instrument(skip(self, raw), fields(rows = raw.len()))]
    pub fn run(&self, raw: &RawTable) -> Result<ReportBundle> {
        info!("coercing {} raw rows", raw.len());
        let coerced = self.coercer.coerce(raw)?;

        info!("validating {} rows", coerced.len());
        let mut detailed = Vec::with_capacity(coerced.len());
        for (index, row) in coerced.iter().enumerate() {
            detailed.push(self.validator.validate(row, index)?);
        }

        info!("aggregating {} validated records", detailed.len());
        let by_product = aggregate::group_by_product(&detailed);
        let by_date = aggregate::group_by_date(&detailed);
        debug!(
            products = by_product.len(),
            days = by_date.len(),
            "aggregation complete"
        );

        Ok(ReportBundle {
            detailed,
            by_product,
            by_date,
        })
    }
}
