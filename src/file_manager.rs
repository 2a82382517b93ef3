//! # File Management Module
//!
//! Questo modulo raccoglie le operazioni sui file usate dal watcher.
//!
//! ## Responsabilità:
//! - Listing non ricorsivo della directory osservata
//! - Estrazione dell'estensione dal nome file (case preservato)
//! - Formattazione human-readable delle dimensioni
//!
//! ## Esempio:
//! ```rust,ignore
//! for entry in FileManager::list_directory(&dir).await? {
//!     if entry.is_dir {
//!         continue;
//!     }
//!     // process entry.path
//! }
//! ```

use std::path::{Path, PathBuf};
use tokio::fs;

/// One immediate child of the watched directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub file_name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

/// Manages file operations and discovery
pub struct FileManager;

impl FileManager {
    /// List the immediate children of `dir`, sorted by file name.
    ///
    /// Symlinks are followed when deciding `is_dir`; an entry whose metadata
    /// cannot be read is reported as a file so the caller can deal with it.
    pub async fn list_directory(dir: &Path) -> std::io::Result<Vec<DirectoryEntry>> {
        let mut read_dir = fs::read_dir(dir).await?;
        let mut entries = Vec::new();

        while let Some(entry) = read_dir.next_entry().await? {
            let path = entry.path();
            let is_dir = fs::metadata(&path)
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false);

            entries.push(DirectoryEntry {
                file_name: entry.file_name().to_string_lossy().into_owned(),
                path,
                is_dir,
            });
        }

        entries.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(entries)
    }

    /// Substring of the file name after the last `.`, case preserved.
    ///
    /// A name without any dot yields the whole name.
    pub fn file_extension(path: &Path) -> String {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());

        match name.rsplit_once('.') {
            Some((_, ext)) => ext.to_string(),
            None => name,
        }
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }
}
