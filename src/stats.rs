//! # Scan Statistics Module
//!
//! Contatori di un singolo passaggio di scansione, loggati alla fine del passaggio.
//!
//! ## Statistiche tracciate:
//! - **files_seen**: Entry non-directory incontrate
//! - **files_compressed**: File ricompressi e registrati nel control file
//! - **files_skipped**: File json o già compressi (dimensione <= registrata)
//! - **files_rejected**: Estensione non accettata, immagine illeggibile o file sparito
//! - **errors**: Errori inattesi per-file
//! - **total_bytes_saved** / **total_original_size**: Solo sui file compressi

use crate::file_manager::FileManager;

/// Statistics tracker for one scan pass
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ScanStats {
    pub files_seen: usize,
    pub files_compressed: usize,
    pub files_skipped: usize,
    pub files_rejected: usize,
    pub errors: usize,
    pub total_bytes_saved: u64,
    pub total_original_size: u64,
}

impl ScanStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_compressed(&mut self, original_size: u64, new_size: u64) {
        self.files_seen += 1;
        self.files_compressed += 1;
        self.total_original_size += original_size;
        self.total_bytes_saved += original_size.saturating_sub(new_size);
    }

    pub fn add_skipped(&mut self) {
        self.files_seen += 1;
        self.files_skipped += 1;
    }

    pub fn add_rejected(&mut self) {
        self.files_seen += 1;
        self.files_rejected += 1;
    }

    pub fn add_error(&mut self) {
        self.files_seen += 1;
        self.errors += 1;
    }

    pub fn overall_reduction_percent(&self) -> f64 {
        if self.total_original_size > 0 {
            (self.total_bytes_saved as f64 / self.total_original_size as f64) * 100.0
        } else {
            0.0
        }
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Seen: {} files | Compressed: {} | Skipped: {} | Rejected: {} | Errors: {} | Total saved: {} ({:.2}%)",
            self.files_seen,
            self.files_compressed,
            self.files_skipped,
            self.files_rejected,
            self.errors,
            FileManager::format_size(self.total_bytes_saved),
            self.overall_reduction_percent()
        )
    }
}
