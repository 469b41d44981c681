use crate::models::DateRange;
use env_logger::{Builder, Target};
use log::{Level, LevelFilter, SetLoggerError};
use std::env;
use std::io::Write;

fn parse_level(value: &str) -> LevelFilter {
    match value.to_lowercase().as_str() {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Info,
    }
}

pub fn init_logging() -> Result<(), SetLoggerError> {
    let env = env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
    let log_level = parse_level(&env);

    let mut builder = Builder::from_default_env();

    builder.format(|buf, record| {
        let timestamp = buf.timestamp();
        let target = record.target();
        match record.level() {
            Level::Info => writeln!(buf, "{} [INFO] [{}]: {}", timestamp, target, record.args()),
            level => writeln!(
                buf,
                "{} [{}] [{}:{}] {}: {}",
                timestamp,
                level,
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                target,
                record.args()
            ),
        }
    });

    if env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string()) == "production" {
        builder.filter_module("sqlx", LevelFilter::Warn);
        builder.filter_module("tokio", LevelFilter::Info);
    }

    // stdout carries command output
    builder.filter_level(log_level).target(Target::Stderr).try_init()
}

pub fn log_error_with_context(error: &(dyn std::error::Error + 'static), context: &str) {
    log::error!("[{}] {}", context, error);

    let mut source = error.source();
    while let Some(err) = source {
        log::error!("  Caused by: {}", err);
        source = err.source();
    }
}

pub fn log_persistence_failure(operation: &str, error: &dyn std::error::Error) {
    log::warn!("[Persistence] {} failed: {}", operation, error);
}

pub fn log_resolution(range: &DateRange, catalog_size: usize, occurrences: usize, duration_ms: u64) {
    log::debug!(
        "[Resolver] {} events -> {} occurrences over {} in {}ms",
        catalog_size, occurrences, range, duration_ms
    );
}

pub fn log_database_operation(operation: &str, table: &str, duration_ms: u64) {
    log::debug!("[Database] {} on table {} took {}ms", operation, table, duration_ms);
}
