//! # Configuration Management Module
//!
//! Questo modulo gestisce la configurazione del watcher.
//!
//! ## Parametri di configurazione:
//! - `directory`: Directory osservata (default: ".")
//! - `quality`: Qualità dopo la compressione (0-100, default: 100)
//! - `optimize`: Compressione PNG più aggressiva (default: true)
//! - `debug`: Logging a livello DEBUG (default: false)
//! - `interval_secs`: Secondi tra un passaggio e il successivo (default: 180)
//! - `ignore_extension_case`: Accetta `.JPG`/`.PNG` (default: false)
//! - `run_once`: Un solo passaggio e poi uscita (default: false)
//! - `log_dir`: Directory dei file di log (default: ".")
//! - `retry`: Backoff per passaggi falliti
//!
//! ## Normalizzazione input CLI:
//! - Qualità fuori da 0-100 => 100
//! - Debug vero per "true", "1", "yes" (case-insensitive)
//!
//! ## Esempio:
//! ```rust,ignore
//! let config = Config {
//!     directory: PathBuf::from("/photos"),
//!     quality: clamp_quality(85),
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use crate::retry::RetryConfig;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Quality used when the requested one is out of range
pub const DEFAULT_QUALITY: u8 = 100;

/// Default seconds between two scan passes
pub const DEFAULT_INTERVAL_SECS: u64 = 180;

/// Map a user supplied quality onto 0-100; out of range values become 100.
pub fn clamp_quality(quality: i64) -> u8 {
    if (0..=100).contains(&quality) {
        quality as u8
    } else {
        DEFAULT_QUALITY
    }
}

/// Interpret a boolean-ish flag value.
pub fn parse_debug_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

/// Configuration for the directory watcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory whose immediate children are compressed
    pub directory: PathBuf,
    /// Image quality after compression (0 = low, 100 = high)
    pub quality: u8,
    /// Spend more time for smaller PNG output
    pub optimize: bool,
    /// Debug logging
    pub debug: bool,
    /// Seconds to sleep between scan passes
    pub interval_secs: u64,
    /// Accept extensions regardless of case
    pub ignore_extension_case: bool,
    /// Run one pass and exit
    pub run_once: bool,
    /// Where the rotating log files go
    pub log_dir: PathBuf,
    /// Backoff for failed passes
    pub retry: RetryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            quality: DEFAULT_QUALITY,
            optimize: true,
            debug: false,
            interval_secs: DEFAULT_INTERVAL_SECS,
            ignore_extension_case: false,
            run_once: false,
            log_dir: PathBuf::from("."),
            retry: RetryConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.quality > 100 {
            return Err(anyhow::anyhow!("Quality must be between 0 and 100"));
        }

        if !self.directory.exists() {
            return Err(anyhow::anyhow!(
                "Directory to watch does not exist: {}",
                self.directory.display()
            ));
        }
        if !self.directory.is_dir() {
            return Err(anyhow::anyhow!(
                "Path to watch is not a directory: {}",
                self.directory.display()
            ));
        }

        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}
