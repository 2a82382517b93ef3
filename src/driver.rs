//! # Driver Module
//!
//! Ripete il passaggio di scansione ad intervallo fisso fino all'interruzione.
//!
//! ## Comportamento:
//! - Interruzione (Ctrl+C / SIGTERM) ricevuta su un canale `broadcast`:
//!   il passaggio in corso termina, poi il loop si ferma
//! - L'attesa tra due passaggi è interrompibile
//! - Passaggio fallito => retry con backoff esponenziale (`RetryConfig`);
//!   oltre `max_retries` fallimenti consecutivi l'errore viene propagato
//! - `run_once` => un solo passaggio riuscito e poi uscita

use crate::{
    config::Config,
    retry::RetryAction,
    watcher::Watcher,
};
use anyhow::Result;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio::time::{sleep_until, Instant};
use tracing::{error, info, warn};

/// Runs scan passes until interrupted
pub struct Driver {
    config: Config,
    stop_receiver: broadcast::Receiver<()>,
}

impl Driver {
    pub fn new(config: Config, stop_receiver: broadcast::Receiver<()>) -> Self {
        Self {
            config,
            stop_receiver,
        }
    }

    /// Checks if a stop signal has been received.
    fn should_stop(&mut self) -> bool {
        match self.stop_receiver.try_recv() {
            Ok(_) => true,
            Err(TryRecvError::Empty) => false,
            // Signal was sent but we missed it, treat as stop
            Err(TryRecvError::Lagged(_)) => true,
            // Sender was dropped, nobody can interrupt us anymore
            Err(TryRecvError::Closed) => false,
        }
    }

    /// Sleep for `duration`; returns true if interrupted meanwhile.
    async fn wait(&mut self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;

        tokio::select! {
            _ = sleep_until(deadline) => false,
            received = self.stop_receiver.recv() => match received {
                Err(RecvError::Closed) => {
                    sleep_until(deadline).await;
                    false
                }
                Ok(()) | Err(RecvError::Lagged(_)) => true,
            },
        }
    }

    /// Run until interrupted (or after one pass with `run_once`).
    ///
    /// # Errors
    /// Returns the last pass error once more than `retry.max_retries`
    /// consecutive passes have failed.
    pub async fn run(&mut self) -> Result<()> {
        let watcher = Watcher::new(&self.config);
        let interval = self.config.interval();
        let mut consecutive_failures: u32 = 0;

        loop {
            match watcher.run().await {
                Ok(stats) => {
                    consecutive_failures = 0;
                    info!("Scan of {} done: {}", watcher.directory().display(), stats.format_summary());
                }
                Err(e) => {
                    consecutive_failures += 1;
                    match self.config.retry.next_action(consecutive_failures) {
                        RetryAction::Retry(delay) => {
                            warn!(
                                "Scan pass failed (attempt {}/{}), retrying in {}s: {:#}",
                                consecutive_failures,
                                self.config.retry.max_retries + 1,
                                delay.as_secs(),
                                e
                            );
                            if self.wait(delay).await {
                                warn!("Keyboard has interrupted the watcher");
                                break;
                            }
                            continue;
                        }
                        RetryAction::GiveUp => {
                            error!(
                                "Scan pass failed {} times in a row, giving up: {:#}",
                                consecutive_failures, e
                            );
                            return Err(e.context("an error occurred during the watcher execution"));
                        }
                    }
                }
            }

            if self.config.run_once {
                break;
            }

            if self.should_stop() {
                warn!("Keyboard has interrupted the watcher");
                break;
            }

            info!("waiting next lookup interval in {} seconds", interval.as_secs());
            if self.wait(interval).await {
                warn!("Keyboard has interrupted the watcher");
                break;
            }
            info!("looking up again");
        }

        Ok(())
    }
}
