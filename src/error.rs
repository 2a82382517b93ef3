//! # Error Types Module
//!
//! Questo modulo definisce i tipi di errore per la compressione di un singolo file.
//!
//! ## Categorie di errori:
//! - `NotFound`: Il file è sparito tra il listing e l'apertura
//! - `Validation`: Estensione non accettata (jpeg, jpg, png)
//! - `Decode`: Contenuto non riconosciuto o corrotto
//! - `Io` / `Image` / `Json` / `Task`: Errori inattesi durante l'elaborazione
//!
//! Il watcher usa queste categorie per decidere come loggare e se continuare:
//! nessun errore per-file interrompe il passaggio di scansione.
//!
//! ## Esempio:
//! ```rust,ignore
//! if !handler.is_acceptable() {
//!     return Err(CompressError::Validation { extension, accepted });
//! }
//! ```

use std::path::PathBuf;

/// Errors raised while handling one file of a scan pass
#[derive(thiserror::Error, Debug)]
pub enum CompressError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("extension **{extension}** is not in the accepted list: {accepted:?}")]
    Validation {
        extension: String,
        accepted: &'static [&'static str],
    },

    #[error("Cannot decode image {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("State file error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl CompressError {
    /// Per-file problems the watcher reports as warnings rather than errors
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            CompressError::NotFound(_) | CompressError::Validation { .. } | CompressError::Decode { .. }
        )
    }
}
