use std::fs;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initializes tracing with a human-readable console layer and a JSON file
/// layer under `logs/` with daily rotation.
pub fn init_logging() {
    let _ = fs::create_dir_all("logs");

    let file_appender = tracing_appender::rolling::daily("logs", "etl.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer().with_writer(std::io::stdout);
    let file_layer = fmt::layer().json().with_writer(file_writer);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("sales_etl=info".parse().unwrap()))
        .with(console_layer)
        .with(file_layer)
        .init();

    // The guard must outlive the process so buffered log lines are flushed.
    std::mem::forget(guard);
}
