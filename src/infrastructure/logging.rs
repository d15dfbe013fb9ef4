//! Logging system configuration and initialization
//!
//! This module provides the logging setup with:
//! - Console output on stderr (stdout stays free for extracted records)
//! - Optional file logging through a non-blocking appender
//! - Structured JSON logging (optional)
//! - Mexico City (UTC-6) timestamps

use anyhow::{Result, anyhow};
use chrono::{FixedOffset, Utc};
use lazy_static::lazy_static;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{self, time::FormatTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

pub use crate::infrastructure::config::LoggingConfig;

const MEXICO_CITY_OFFSET_SECS: i32 = -6 * 3600;

// Keeps the file writer alive for the life of the process
lazy_static! {
    static ref LOG_GUARDS: Mutex<Vec<tracing_appender::non_blocking::WorkerGuard>> =
        Mutex::new(Vec::new());
}

/// Time formatter for Mexico City (UTC-6)
struct MexicoCityTimeFormatter;

impl FormatTime for MexicoCityTimeFormatter {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        let now = Utc::now();
        match FixedOffset::east_opt(MEXICO_CITY_OFFSET_SECS) {
            Some(offset) => write!(
                w,
                "{}",
                now.with_timezone(&offset).format("%Y-%m-%d %H:%M:%S%.3f %:z")
            ),
            None => write!(w, "{}", now.format("%Y-%m-%d %H:%M:%S%.3f UTC")),
        }
    }
}

/// Get the log directory relative to the executable location
pub fn get_log_directory() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .or_else(|| std::env::current_dir().ok())
        .or_else(dirs::data_local_dir)
        .unwrap_or_default();

    exe_dir.join("logs")
}

/// Initialize the logging system with default configuration
pub fn init_logging() -> Result<()> {
    init_logging_with_config(&LoggingConfig::default())
}

fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let mut filter = EnvFilter::new(&config.level);

        // html5ever and selectors are chatty below warn
        if !config.level.eq_ignore_ascii_case("trace") {
            for directive in ["html5ever=warn", "selectors=warn", "scraper=warn"] {
                if let Ok(directive) = directive.parse() {
                    filter = filter.add_directive(directive);
                }
            }
        }

        for (module, level) in &config.module_filters {
            match format!("{module}={level}").parse() {
                Ok(directive) => filter = filter.add_directive(directive),
                Err(e) => eprintln!("Ignoring invalid log filter {module}={level}: {e}"),
            }
        }

        filter
    })
}

/// Initialize logging with custom configuration
///
/// `RUST_LOG` overrides the configured level and module filters:
/// ```bash
/// RUST_LOG="debug,html5ever=warn" ml-listing-extractor snapshot.html
/// ```
pub fn init_logging_with_config(config: &LoggingConfig) -> Result<()> {
    let registry = Registry::default().with(build_filter(config));

    let console_layer = config.console_output.then(|| {
        fmt::Layer::new()
            .with_writer(std::io::stderr)
            .with_timer(MexicoCityTimeFormatter)
            .with_target(false)
    });

    let log_dir = config.log_dir.clone().unwrap_or_else(get_log_directory);
    let (json_file_layer, plain_file_layer) = if config.file_output {
        std::fs::create_dir_all(&log_dir)
            .map_err(|e| anyhow!("Failed to create log directory {:?}: {}", log_dir, e))?;
        cleanup_old_logs(&log_dir, config.max_files)?;

        let file_appender = rolling::never(&log_dir, &config.file_name);
        let (file_writer, file_guard) = non_blocking(file_appender);
        LOG_GUARDS
            .lock()
            .map_err(|_| anyhow!("Log guard registry is poisoned"))?
            .push(file_guard);

        if config.json_format {
            let layer = fmt::Layer::new()
                .json()
                .with_writer(file_writer)
                .with_timer(MexicoCityTimeFormatter)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false);
            (Some(layer), None)
        } else {
            let layer = fmt::Layer::new()
                .with_writer(file_writer)
                .with_timer(MexicoCityTimeFormatter)
                .with_target(false)
                .with_ansi(false);
            (None, Some(layer))
        }
    } else {
        (None, None)
    };

    if console_layer.is_none() && json_file_layer.is_none() && plain_file_layer.is_none() {
        return Err(anyhow!("No logging output configured"));
    }

    registry
        .with(console_layer)
        .with(json_file_layer)
        .with(plain_file_layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

    info!("Logging system initialized");
    info!("Log level: {}", config.level);
    if config.file_output {
        info!("Log file: {:?}", log_dir.join(&config.file_name));
        info!("JSON format: {}", config.json_format);
    }

    Ok(())
}

/// Keep only the newest `max_files` log files in `log_dir`
fn cleanup_old_logs(log_dir: &Path, max_files: u32) -> Result<()> {
    if !log_dir.exists() {
        return Ok(());
    }

    let mut log_files = Vec::new();
    for entry in std::fs::read_dir(log_dir)? {
        let entry = entry?;
        let path = entry.path();
        let is_log = path.extension().is_some_and(|ext| ext == "log");
        if path.is_file() && is_log {
            if let Ok(modified) = entry.metadata().and_then(|m| m.modified()) {
                log_files.push((path, modified));
            }
        }
    }

    // Newest first
    log_files.sort_by(|a, b| b.1.cmp(&a.1));

    for (path, _) in log_files.iter().skip(max_files as usize) {
        if let Err(e) = std::fs::remove_file(path) {
            warn!("Failed to remove old log file {:?}: {}", path, e);
        }
    }

    Ok(())
}
