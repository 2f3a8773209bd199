use anyhow::Result;
use std::fs;
use std::io::Write;
use tempfile::tempdir;

use sales_etl::config::{Config, OutputMode};
use sales_etl::error::{EtlError, ValidationError};
use sales_etl::extract::{CsvExtractor, Extractor};
use sales_etl::load::loader_from_config;
use sales_etl::pipeline::Pipeline;

fn write_config(dir: &std::path::Path, mode: &str, columns: &str) -> Result<Config> {
    let config_path = dir.join("config.toml");
    let mut file = fs::File::create(&config_path)?;
    write!(
        file,
        r#"
        [input]
        directory = "{input}"
        filename = "sales.csv"
        {columns}

        [output]
        directory = "{output}"
        mode = "{mode}"
        "#,
        input = dir.join("input").display(),
        output = dir.join("output").display(),
        columns = columns,
        mode = mode,
    )?;
    Ok(Config::load(&config_path)?)
}

fn write_input(dir: &std::path::Path, content: &str) -> Result<()> {
    let input_dir = dir.join("input");
    fs::create_dir_all(&input_dir)?;
    fs::write(input_dir.join("sales.csv"), content)?;
    Ok(())
}

#[test]
fn test_full_run_workbook_mode() -> Result<()> {
    let temp = tempdir()?;
    let config = write_config(temp.path(), "workbook", "")?;
    write_input(
        temp.path(),
        "data,produto,quantidade,preco\n\
         2024-01-01,A,2,10.0\n\
         2024-01-01,B,3,20.0\n\
         2024-01-02,A,4,10.0\n",
    )?;

    let raw = CsvExtractor::new(config.input_path()).extract()?;
    let bundle = Pipeline::new(&config).run(&raw)?;
    loader_from_config(&config).load(&bundle)?;

    let totals: Vec<f64> = bundle.detailed.iter().map(|r| r.total_value).collect();
    assert_eq!(totals, vec![20.0, 60.0, 40.0]);
    assert_eq!(bundle.by_product[0].quantity, 6);
    assert_eq!(bundle.by_date[0].average_ticket, 40.0);

    let workbook = temp.path().join("output").join("sales_report.xlsx");
    assert!(workbook.exists());
    Ok(())
}

#[test]
fn test_full_run_split_mode_with_price_fallback() -> Result<()> {
    let temp = tempdir()?;
    assert_eq!(
        write_config(temp.path(), "split", "")?.output.mode,
        OutputMode::Split
    );
    let config = write_config(temp.path(), "split", "")?;

    // Older exports carry `preco_unitario` instead of the mapped `preco`.
    write_input(
        temp.path(),
        "data,produto,quantidade,preco_unitario\n\
         2024-01-01,A,2,10.0\n",
    )?;

    let raw = CsvExtractor::new(config.input_path()).extract()?;
    let bundle = Pipeline::new(&config).run(&raw)?;
    loader_from_config(&config).load(&bundle)?;

    assert_eq!(bundle.detailed[0].total_value, 20.0);

    let detailed = fs::read_to_string(temp.path().join("output").join("detailed.csv"))?;
    assert!(detailed.contains("2024-01-01,A,2,10.0,20.0"));
    assert!(temp.path().join("output").join("product_summary.csv").exists());
    assert!(temp.path().join("output").join("daily_summary.csv").exists());
    Ok(())
}

#[test]
fn test_invalid_row_aborts_before_load() -> Result<()> {
    let temp = tempdir()?;
    let config = write_config(temp.path(), "split", "")?;
    write_input(
        temp.path(),
        "data,produto,quantidade,preco\n\
         2024-01-01,A,2,10.0\n\
         2024-01-01,  ,3,20.0\n",
    )?;

    let raw = CsvExtractor::new(config.input_path()).extract()?;
    let err = Pipeline::new(&config).run(&raw).unwrap_err();
    match err {
        EtlError::Validation(ValidationError::EmptyField { field, row }) => {
            assert_eq!(field, "product");
            assert_eq!(row, 1);
        }
        other => panic!("unexpected error: {other}"),
    }

    assert!(!temp.path().join("output").join("detailed.csv").exists());
    Ok(())
}

#[test]
fn test_missing_input_file_is_reported() -> Result<()> {
    let temp = tempdir()?;
    let config = write_config(temp.path(), "workbook", "")?;

    let err = CsvExtractor::new(config.input_path()).extract().unwrap_err();
    assert!(matches!(err, EtlError::MissingSource(_)));
    Ok(())
}

#[test]
fn test_configured_column_mapping_and_date_format() -> Result<()> {
    let temp = tempdir()?;
    let config = write_config(
        temp.path(),
        "split",
        r#"date_format = "%d/%m/%Y"

        [input.columns]
        date = "sale_date"
        product = "item"
        quantity = "qty"
        price = "unit_price"
        "#,
    )?;
    write_input(
        temp.path(),
        "sale_date,item,qty,unit_price\n\
         05/03/2024,Widget,7,3.0\n",
    )?;

    let raw = CsvExtractor::new(config.input_path()).extract()?;
    let bundle = Pipeline::new(&config).run(&raw)?;

    assert_eq!(bundle.detailed[0].product, "Widget");
    assert_eq!(bundle.detailed[0].total_value, 21.0);
    assert_eq!(
        bundle.detailed[0].date,
        chrono::NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    );
    Ok(())
}

#[test]
fn test_empty_input_produces_empty_outputs() -> Result<()> {
    let temp = tempdir()?;
    let config = write_config(temp.path(), "split", "")?;
    write_input(temp.path(), "data,produto,quantidade,preco\n")?;

    let raw = CsvExtractor::new(config.input_path()).extract()?;
    let bundle = Pipeline::new(&config).run(&raw)?;
    loader_from_config(&config).load(&bundle)?;

    assert!(bundle.detailed.is_empty());
    assert!(bundle.by_product.is_empty());
    assert!(bundle.by_date.is_empty());
    Ok(())
}
