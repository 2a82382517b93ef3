//! # Logging Module
//!
//! Inizializzazione esplicita, una sola volta all'avvio, del subscriber `tracing`.
//!
//! ## Output:
//! - **stdout**: formato `tracing_subscriber::fmt` standard
//! - **file**: `<log_dir>/image-compressor.log.<data>`, rotazione settimanale,
//!   al massimo 12 file conservati, con file e riga di origine
//!
//! ## Livello:
//! - `RUST_LOG` se impostata
//! - altrimenti DEBUG con il flag debug, INFO senza
//!
//! Il `WorkerGuard` restituito va tenuto in vita fino alla fine del processo,
//! altrimenti le ultime righe del file di log vanno perse.

use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Prefix of the rotating log files
pub const LOG_FILE_PREFIX: &str = "image-compressor.log";

/// Weekly files kept before the oldest is removed
pub const MAX_LOG_FILES: usize = 12;

/// Default filter directive for the given debug flag
pub fn default_directive(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "info"
    }
}

/// Install the global subscriber. Call once, at process start.
pub fn init(debug: bool, log_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::WEEKLY)
        .filename_prefix(LOG_FILE_PREFIX)
        .max_log_files(MAX_LOG_FILES)
        .build(log_dir)
        .context("Failed to create rolling log file")?;
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(
            fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true),
        )
        .try_init()
        .context("Failed to install global tracing subscriber")?;

    Ok(guard)
}
