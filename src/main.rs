use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use sales_etl::config::{Config, OutputMode};
use sales_etl::error::Result;
use sales_etl::extract::{CsvExtractor, Extractor};
use sales_etl::load::loader_from_config;
use sales_etl::logging;
use sales_etl::pipeline::Pipeline;
use sales_etl::report::SalesReport;
use sales_etl::types::ReportBundle;

#[derive(Parser)]
#[command(name = "sales_etl")]
#[command(about = "Batch ETL pipeline for delimited sales data")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract, transform, and persist the sales tables
    Run {
        /// Override the configured output mode (workbook or split)
        #[arg(long)]
        mode: Option<String>,
    },
    /// Run the pipeline and additionally render HTML charts and a text summary
    Report,
}

fn parse_mode(value: &str) -> Option<OutputMode> {
    match value {
        "workbook" => Some(OutputMode::Workbook),
        "split" => Some(OutputMode::Split),
        _ => None,
    }
}

fn run_pipeline(config: &Config) -> Result<ReportBundle> {
    let extractor = CsvExtractor::new(config.input_path());
    info!("extracting from {}", config.input_path().display());
    let raw = extractor.extract()?;

    let pipeline = Pipeline::new(config);
    let bundle = pipeline.run(&raw)?;

    let loader = loader_from_config(config);
    loader.load(&bundle)?;

    Ok(bundle)
}

fn print_summary(bundle: &ReportBundle) {
    println!("\nPipeline results:");
    println!("   Detailed rows:   {}", bundle.detailed.len());
    println!("   Products:        {}", bundle.by_product.len());
    println!("   Days:            {}", bundle.by_date.len());
}

fn execute(cli: Cli) -> Result<()> {
    let mut config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Run { mode } => {
            if let Some(mode) = mode.as_deref() {
                match parse_mode(mode) {
                    Some(parsed) => config.output.mode = parsed,
                    None => {
                        return Err(sales_etl::error::EtlError::Config(format!(
                            "unknown output mode '{mode}' (expected 'workbook' or 'split')"
                        )))
                    }
                }
            }

            let bundle = run_pipeline(&config)?;
            print_summary(&bundle);
        }
        Commands::Report => {
            let bundle = run_pipeline(&config)?;
            print_summary(&bundle);

            let report = SalesReport::new(&config.output.directory);
            report.render_daily_sales_chart(&bundle.by_date, "daily_sales.html")?;
            report.render_product_chart(&bundle.by_product, "product_summary.html")?;
            report.render_text_summary(&bundle, "sales_summary.txt")?;
            println!(
                "   Reports written to {}",
                config.output.directory.display()
            );
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    logging::init_logging();

    let cli = Cli::parse();
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("pipeline failed: {}", e);
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
