//! # State Management Module
//!
//! Questo modulo gestisce il file di controllo che evita di ricomprimere le immagini.
//!
//! ## Responsabilità:
//! - Traccia quali file sono già stati compressi e con quale dimensione finale
//! - Persiste lo stato in `.compressed.json` dentro la directory osservata
//! - Ricarica l'intero stato ad ogni lookup e lo riscrive per intero ad ogni update
//!
//! ## Strategia di persistence:
//! - Chiave = nome del file (non il path completo)
//! - File mancante => stato vuoto (nessun errore)
//! - File malformato => warning, stato vuoto, sovrascritto al prossimo update
//! - Entry con forma sbagliata => ignorate e scartate alla prossima riscrittura
//! - Le entry di file cancellati non vengono mai rimosse
//!
//! ## Esempio struttura control file:
//! ```json
//! {
//!   "photo.png": {
//!     "path": "/watched/photo.png",
//!     "size": 400000,
//!     "extension": "png"
//!   }
//! }
//! ```

use crate::error::CompressError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Name of the control file inside the watched directory
pub const CONTROL_FILE_NAME: &str = ".compressed.json";

/// Last known post-compression data for one file
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TrackedFile {
    pub path: String,
    pub size: u64,
    pub extension: String,
}

/// File name -> tracked record, serialized as a plain JSON object
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct ControlState {
    pub files: BTreeMap<String, TrackedFile>,
}

impl ControlState {
    pub fn get(&self, file_name: &str) -> Option<&TrackedFile> {
        self.files.get(file_name)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Parse control file content, keeping only well-formed entries.
    ///
    /// Returns `None` when the content is not a JSON object at all.
    fn parse(content: &str) -> Option<Self> {
        let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(content).ok()?;
        let mut files = BTreeMap::new();

        for (name, value) in raw {
            match serde_json::from_value::<TrackedFile>(value) {
                Ok(record) => {
                    files.insert(name, record);
                }
                Err(e) => debug!("Ignoring malformed control entry {}: {}", name, e),
            }
        }

        Some(Self { files })
    }
}

/// Reads and rewrites the control file of one directory
#[derive(Debug, Clone)]
pub struct StateManager {
    directory: PathBuf,
    control_file: PathBuf,
}

impl StateManager {
    pub fn new(directory: &Path) -> Self {
        Self {
            directory: directory.to_path_buf(),
            control_file: directory.join(CONTROL_FILE_NAME),
        }
    }

    pub fn control_file(&self) -> &Path {
        &self.control_file
    }

    /// Load the whole control state from disk
    pub async fn load(&self) -> Result<ControlState, CompressError> {
        let content = match fs::read_to_string(&self.control_file).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No control file at {}", self.control_file.display());
                return Ok(ControlState::default());
            }
            Err(e) => return Err(e.into()),
        };

        match ControlState::parse(&content) {
            Some(state) => Ok(state),
            None => {
                warn!(
                    "Control file {} is malformed, treating it as empty; it will be rewritten on the next compression",
                    self.control_file.display()
                );
                Ok(ControlState::default())
            }
        }
    }

    /// Size recorded after the last compression of `file_name`, if any
    pub async fn recorded_size(&self, file_name: &str) -> Result<Option<u64>, CompressError> {
        let state = self.load().await?;
        Ok(state.get(file_name).map(|record| record.size))
    }

    /// Insert or update one entry, rewriting the whole control file
    pub async fn record(&self, file_name: &str, size: u64, extension: &str) -> Result<(), CompressError> {
        let mut state = self.load().await?;

        state.files.insert(
            file_name.to_string(),
            TrackedFile {
                path: self.directory.join(file_name).to_string_lossy().into_owned(),
                size,
                extension: extension.to_string(),
            },
        );

        let content = serde_json::to_string_pretty(&state)?;
        fs::write(&self.control_file, content).await?;
        Ok(())
    }
}
