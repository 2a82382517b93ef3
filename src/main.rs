//! # Image Compressor - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Normalizzazione degli input (qualità fuori range, flag debug testuale)
//! - Inizializzazione del sistema di logging con `tracing`
//! - Avvio del driver che ripete la scansione fino all'interruzione
//!
//! ## Esempio di utilizzo:
//! ```bash
//! image-compressor --directory /srv/uploads --quality 80 --interval 60 --debug yes
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info};

use image_compressor::config::{clamp_quality, parse_debug_flag};
use image_compressor::retry::RetryConfig;
use image_compressor::{logging, shutdown, Config, Driver};

#[derive(Parser, Debug)]
#[command(name = "image-compressor")]
#[command(about = "Watch a directory and compress images")]
struct Args {
    /// Directory to be watched
    #[arg(short, long, default_value = ".")]
    directory: PathBuf,

    /// Quality of the image after compression. 0 = low, 100 = high
    #[arg(short, long, default_value_t = 100, allow_hyphen_values = true)]
    quality: i64,

    /// Enable debug logging (true, 1, yes)
    #[arg(short = 'D', long, default_value = "False")]
    debug: String,

    /// Interval in seconds between each directory lookup
    #[arg(short = 'I', long, default_value_t = 180)]
    interval: u64,

    /// Accept upper/mixed case extensions such as .JPG
    #[arg(long)]
    ignore_case: bool,

    /// Use the default PNG compression level instead of the best one
    #[arg(long)]
    no_optimize: bool,

    /// Run a single pass and exit
    #[arg(long)]
    once: bool,

    /// Consecutive failed passes tolerated before exiting
    #[arg(long, default_value_t = 3)]
    max_retries: u32,

    /// Base delay in seconds before retrying a failed pass
    #[arg(long, default_value_t = 5)]
    retry_base_delay: u64,

    /// Upper bound in seconds for the retry delay
    #[arg(long, default_value_t = 300)]
    retry_max_delay: u64,

    /// Directory for the rotating log files
    #[arg(long, default_value = ".")]
    log_dir: PathBuf,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Config {
            directory: args.directory,
            quality: clamp_quality(args.quality),
            optimize: !args.no_optimize,
            debug: parse_debug_flag(&args.debug),
            interval_secs: args.interval,
            ignore_extension_case: args.ignore_case,
            run_once: args.once,
            log_dir: args.log_dir,
            retry: RetryConfig {
                max_retries: args.max_retries,
                base_delay_secs: args.retry_base_delay,
                max_delay_secs: args.retry_max_delay,
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::from(args);

    let _log_guard = logging::init(config.debug, &config.log_dir)?;

    info!("application has started and configured");
    info!("DEBUG MODE: {}", config.debug);
    info!("lookup interval: {} seconds", config.interval_secs);
    debug!("configuration: {}", serde_json::to_string(&config)?);

    config.validate()?;

    let stop_receiver = shutdown::install_interrupt_handler();
    let mut driver = Driver::new(config, stop_receiver);
    driver.run().await?;

    info!("application has terminated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from(Args::parse_from(["image-compressor"]));
        assert_eq!(config.directory, PathBuf::from("."));
        assert_eq!(config.quality, 100);
        assert!(!config.debug);
        assert_eq!(config.interval_secs, 180);
        assert!(config.optimize);
        assert!(!config.run_once);
    }

    #[test]
    fn test_short_flags_and_normalization() {
        let config = Config::from(Args::parse_from([
            "image-compressor",
            "-d",
            "/srv/photos",
            "-q",
            "250",
            "-D",
            "yes",
            "-I",
            "30",
        ]));
        assert_eq!(config.directory, PathBuf::from("/srv/photos"));
        assert_eq!(config.quality, 100);
        assert!(config.debug);
        assert_eq!(config.interval_secs, 30);
    }

    #[test]
    fn test_negative_quality_falls_back() {
        let config = Config::from(Args::parse_from(["image-compressor", "--quality", "-3"]));
        assert_eq!(config.quality, 100);
    }

    #[test]
    fn test_extra_flags() {
        let config = Config::from(Args::parse_from([
            "image-compressor",
            "--ignore-case",
            "--no-optimize",
            "--once",
            "--max-retries",
            "7",
        ]));
        assert!(config.ignore_extension_case);
        assert!(!config.optimize);
        assert!(config.run_once);
        assert_eq!(config.retry.max_retries, 7);
    }
}
