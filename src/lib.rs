//! # Image Compressor Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs
//!
//! ## Architettura dei moduli:
//! - `config`: Configurazione e normalizzazione parametri CLI
//! - `error`: Errori per-file della compressione
//! - `file_manager`: Listing non ricorsivo e utilità sui file
//! - `image_handler`: Compressione in-place di una singola immagine
//! - `state`: Control file `.compressed.json`
//! - `stats`: Statistiche di un passaggio di scansione
//! - `watcher`: Un passaggio di scansione completo
//! - `retry`: Backoff per passaggi falliti
//! - `driver`: Loop a intervallo fisso fino all'interruzione
//! - `shutdown`: Gestione segnali di interruzione
//! - `logging`: Inizializzazione del logging
//!
//! ## Utilizzo:
//! ```rust,ignore
//! use image_compressor::{Config, Driver};
//!
//! let stop = image_compressor::shutdown::install_interrupt_handler();
//! let mut driver = Driver::new(Config::default(), stop);
//! driver.run().await?;
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod file_manager;
pub mod image_handler;
pub mod logging;
pub mod retry;
pub mod shutdown;
pub mod state;
pub mod stats;
pub mod watcher;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use driver::Driver;
pub use error::CompressError;
pub use image_handler::ImageHandler;
pub use state::{ControlState, StateManager, TrackedFile};
pub use watcher::Watcher;
