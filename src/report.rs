use std::fs;
use std::path::PathBuf;

use tracing::info;

use crate::error::Result;
use crate::types::{DateSummary, ProductSummary, ReportBundle};

const CHART_WIDTH: f64 = 720.0;
const CHART_HEIGHT: f64 = 360.0;
const CHART_MARGIN: f64 = 40.0;

/// Renders self-contained HTML chart pages and a plain-text summary from a
/// result bundle. Reporting sits outside the core pipeline; it only reads
/// the aggregated tables.
pub struct SalesReport {
    output_dir: PathBuf,
}

impl SalesReport {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Line chart of total value per day.
    pub fn render_daily_sales_chart(
        &self,
        by_date: &[DateSummary],
        filename: &str,
    ) -> Result<PathBuf> {
        let max = by_date
            .iter()
            .map(|s| s.total_value)
            .fold(0.0_f64, f64::max);

        let points: Vec<String> = by_date
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let (x, y) = plot_point(i, by_date.len(), s.total_value, max);
                format!("{x:.1},{y:.1}")
            })
            .collect();

        let mut svg = String::new();
        svg.push_str(&format!(
            "<polyline fill=\"none\" stroke=\"#2ecc71\" stroke-width=\"2\" points=\"{}\"/>\n",
            points.join(" ")
        ));
        for (i, s) in by_date.iter().enumerate() {
            let (x, y) = plot_point(i, by_date.len(), s.total_value, max);
            svg.push_str(&format!(
                "<circle cx=\"{x:.1}\" cy=\"{y:.1}\" r=\"3\" fill=\"#2ecc71\"><title>{}: {:.2}</title></circle>\n",
                s.date, s.total_value
            ));
        }

        self.write_page(filename, "Daily Sales", &svg)
    }

    /// Bar chart of quantity sold per product.
    pub fn render_product_chart(
        &self,
        by_product: &[ProductSummary],
        filename: &str,
    ) -> Result<PathBuf> {
        let max = by_product
            .iter()
            .map(|s| s.quantity as f64)
            .fold(0.0_f64, f64::max);
        let slot = plot_width() / by_product.len().max(1) as f64;

        let mut svg = String::new();
        for (i, s) in by_product.iter().enumerate() {
            let height = if max == 0.0 {
                0.0
            } else {
                (s.quantity as f64 / max) * plot_height()
            };
            let x = CHART_MARGIN + i as f64 * slot + slot * 0.1;
            let y = CHART_MARGIN + plot_height() - height;
            svg.push_str(&format!(
                "<rect x=\"{x:.1}\" y=\"{y:.1}\" width=\"{:.1}\" height=\"{height:.1}\" fill=\"#3498db\"><title>{}: {} units, total {:.2}</title></rect>\n",
                slot * 0.8,
                escape_html(&s.product),
                s.quantity,
                s.total_value
            ));
        }

        self.write_page(filename, "Product Summary", &svg)
    }

    /// Plain-text summary: overall totals plus the top five products by
    /// total value.
    pub fn render_text_summary(&self, bundle: &ReportBundle, filename: &str) -> Result<PathBuf> {
        let total_sales: f64 = bundle.detailed.iter().map(|r| r.total_value).sum();
        let total_quantity: i64 = bundle.detailed.iter().map(|r| r.quantity).sum();
        let average_ticket = if bundle.detailed.is_empty() {
            0.0
        } else {
            total_sales / bundle.detailed.len() as f64
        };

        let mut top: Vec<&ProductSummary> = bundle.by_product.iter().collect();
        top.sort_by(|a, b| b.total_value.total_cmp(&a.total_value));

        let mut text = String::new();
        text.push_str("Sales Report\n============\n\n");
        text.push_str(&format!("Total sales value: {total_sales:.2}\n"));
        text.push_str(&format!("Total quantity sold: {total_quantity}\n"));
        text.push_str(&format!("Average ticket: {average_ticket:.2}\n\n"));
        text.push_str("Top products\n------------\n");
        for summary in top.iter().take(5) {
            text.push_str(&format!("{}: {:.2}\n", summary.product, summary.total_value));
        }

        let path = self.prepare_path(filename)?;
        fs::write(&path, text)?;
        info!("saved text summary to {}", path.display());
        Ok(path)
    }

    fn write_page(&self, filename: &str, title: &str, svg_body: &str) -> Result<PathBuf> {
        let html = format!(
            "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
             <body>\n<h1>{title}</h1>\n\
             <svg width=\"{CHART_WIDTH}\" height=\"{CHART_HEIGHT}\" viewBox=\"0 0 {CHART_WIDTH} {CHART_HEIGHT}\">\n\
             <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n{svg_body}</svg>\n</body>\n</html>\n"
        );

        let path = self.prepare_path(filename)?;
        fs::write(&path, html)?;
        info!("saved chart to {}", path.display());
        Ok(path)
    }

    fn prepare_path(&self, filename: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        Ok(self.output_dir.join(filename))
    }
}

fn plot_width() -> f64 {
    CHART_WIDTH - 2.0 * CHART_MARGIN
}

fn plot_height() -> f64 {
    CHART_HEIGHT - 2.0 * CHART_MARGIN
}

fn plot_point(index: usize, count: usize, value: f64, max: f64) -> (f64, f64) {
    let x = if count <= 1 {
        CHART_MARGIN + plot_width() / 2.0
    } else {
        CHART_MARGIN + plot_width() * index as f64 / (count - 1) as f64
    };
    let y = if max == 0.0 {
        CHART_MARGIN + plot_height()
    } else {
        CHART_MARGIN + plot_height() * (1.0 - value / max)
    };
    (x, y)
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
