//! # Directory Watcher Module
//!
//! Un singolo passaggio di scansione sulla directory osservata.
//!
//! ## Flusso per ogni entry (non ricorsivo, ordine per nome):
//! 1. Directory => ignorata
//! 2. `ImageHandler::open`; file sparito => warning e si passa al prossimo
//! 3. Estensione `json` => ignorata (include il control file)
//! 4. Estensione non accettata => warning di validazione, qualunque cosa dica il control file
//! 5. Entry nel control file con dimensione registrata >= dimensione attuale => già compressa
//! 6. Ri-codifica in memoria; errori per-file loggati, il passaggio continua sempre
//! 7. Aggiornamento del control file, poi sovrascrittura dell'immagine e log riepilogativo
//!
//! Solo il fallimento del listing della directory fa fallire il passaggio.

use crate::{
    config::Config,
    error::CompressError,
    file_manager::{DirectoryEntry, FileManager},
    image_handler::{ImageHandler, ACCEPTED_EXTENSIONS},
    state::StateManager,
    stats::ScanStats,
};
use anyhow::{Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Why an entry was left alone without being an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Json,
    AlreadyCompressed { current_size: u64, recorded_size: u64 },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Json => write!(f, "json files are never compressed"),
            SkipReason::AlreadyCompressed {
                current_size,
                recorded_size,
            } => write!(
                f,
                "size {} is less or equal to last recorded size {}",
                current_size, recorded_size
            ),
        }
    }
}

/// Result of handling one file
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    Compressed {
        original_size: u64,
        compressed_size: u64,
        ratio: f64,
    },
    Skipped(SkipReason),
}

/// Scans one directory and compresses what has not been compressed yet
pub struct Watcher {
    directory: PathBuf,
    quality: u8,
    optimize: bool,
    ignore_extension_case: bool,
    state: StateManager,
}

impl Watcher {
    pub fn new(config: &Config) -> Self {
        info!("directory to watch: {}", config.directory.display());
        info!("image quality after compression defined to {}", config.quality);

        Self {
            directory: config.directory.clone(),
            quality: config.quality,
            optimize: config.optimize,
            ignore_extension_case: config.ignore_extension_case,
            state: StateManager::new(&config.directory),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn state(&self) -> &StateManager {
        &self.state
    }

    /// Run one full pass over the directory's immediate children
    pub async fn run(&self) -> Result<ScanStats> {
        let entries = FileManager::list_directory(&self.directory)
            .await
            .with_context(|| format!("Failed to list directory {}", self.directory.display()))?;

        let mut stats = ScanStats::new();

        for entry in entries {
            debug!("working on file {} in {}", entry.file_name, self.directory.display());

            if entry.is_dir {
                debug!("{} is not a file", entry.path.display());
                continue;
            }

            match self.process_entry(&entry).await {
                Ok(FileOutcome::Compressed {
                    original_size,
                    compressed_size,
                    ratio,
                }) => {
                    stats.add_compressed(original_size, compressed_size);
                    info!(
                        "[{}] has been compressed. from {} bytes to {} bytes. Reduce of {:.2}%",
                        entry.path.display(),
                        original_size,
                        compressed_size,
                        ratio * 100.0
                    );
                }
                Ok(FileOutcome::Skipped(reason)) => {
                    stats.add_skipped();
                    debug!("Skipping {}: {}", entry.path.display(), reason);
                }
                Err(e) if e.is_expected() => {
                    stats.add_rejected();
                    warn!("error to compress file [{}]: {}", entry.path.display(), e);
                    info!("skip and move to the next file");
                }
                Err(e) => {
                    stats.add_error();
                    error!("error to compress file [{}]: {:?}", entry.path.display(), e);
                    info!("skip it and move to the next file");
                }
            }
        }

        Ok(stats)
    }

    async fn process_entry(&self, entry: &DirectoryEntry) -> Result<FileOutcome, CompressError> {
        let mut handler = ImageHandler::open(&entry.path)
            .await?
            .ignore_extension_case(self.ignore_extension_case);

        if handler.extension() == "json" {
            return Ok(FileOutcome::Skipped(SkipReason::Json));
        }

        if !handler.is_acceptable() {
            return Err(CompressError::Validation {
                extension: handler.extension().to_string(),
                accepted: ACCEPTED_EXTENSIONS,
            });
        }

        if let Some(recorded_size) = self.state.recorded_size(&entry.file_name).await? {
            if handler.original_size() <= recorded_size {
                return Ok(FileOutcome::Skipped(SkipReason::AlreadyCompressed {
                    current_size: handler.original_size(),
                    recorded_size,
                }));
            }
        }

        handler.encode(self.optimize, self.quality).await?;

        // record before overwriting: if the control file cannot be written
        // the image still holds its original bytes
        self.state
            .record(&entry.file_name, handler.compressed_size(), handler.extension())
            .await?;

        if let Err(e) = handler.commit().await {
            warn!(
                "{} is recorded with {} bytes but still holds its original {} bytes; it will be compressed again on the next pass",
                entry.path.display(),
                handler.compressed_size(),
                handler.original_size()
            );
            return Err(e);
        }

        Ok(FileOutcome::Compressed {
            original_size: handler.original_size(),
            compressed_size: handler.compressed_size(),
            ratio: handler.compression_ratio(),
        })
    }
}
