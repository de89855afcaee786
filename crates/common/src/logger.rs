use crate::error::VecgateError;
use std::path::Path;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

const LOG_FILE_NAME: &str = "vecgate.log";

/// Initialize logging system
///
/// Console output is always on. When `log_dir` is given, a second layer
/// appends plain-text records to `vecgate.log` inside it.
///
/// # Arguments
/// * `log_dir` - Optional directory for the log file
/// * `log_level` - Log level (trace, debug, info, warn, error); `RUST_LOG` wins when set
pub fn setup_logging(log_dir: Option<&Path>, log_level: &str) -> Result<(), VecgateError> {
    let level = parse_log_level(log_level);
    let make_filter = || {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()))
    };

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_filter(make_filter());

    let file_layer = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|e| {
                VecgateError::config(format!(
                    "Failed to create log directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;

            let log_file_path = dir.join(LOG_FILE_NAME);
            let log_file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_file_path)
                .map_err(|e| {
                    VecgateError::config(format!(
                        "Failed to open log file {}: {}",
                        log_file_path.display(),
                        e
                    ))
                })?;

            Some(
                fmt::layer()
                    .with_writer(std::sync::Mutex::new(log_file))
                    .with_target(true)
                    .with_line_number(true)
                    .with_ansi(false)
                    .with_filter(make_filter()),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| VecgateError::config(format!("Failed to initialize logging: {}", e)))?;

    match log_dir {
        Some(dir) => tracing::info!(
            "Logging initialized: level={}, log_file={}",
            level,
            dir.join(LOG_FILE_NAME).display()
        ),
        None => tracing::info!("Console logging initialized: level={}", level),
    }

    Ok(())
}

/// Parse string to tracing Level
pub fn parse_log_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to INFO", level);
            Level::INFO
        }
    }
}
