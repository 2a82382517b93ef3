//! Interrupt handling.
//!
//! Listens for SIGINT (Ctrl+C) and SIGTERM and publishes a stop message on a
//! [`tokio::sync::broadcast`] channel. The driver finishes the current scan
//! pass before stopping. A second signal force-exits.

use tokio::sync::broadcast;
use tracing::{error, info, warn};

async fn wait_for_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result,
            _ = sigterm.recv() => Ok(()),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await
    }
}

/// Spawn the signal listener and return the receiving side of the stop channel.
pub fn install_interrupt_handler() -> broadcast::Receiver<()> {
    let (sender, receiver) = broadcast::channel(1);

    tokio::spawn(async move {
        let mut received = 0u32;
        loop {
            if let Err(e) = wait_for_signal().await {
                error!("Failed to listen for interrupt signals: {}", e);
                return;
            }

            received += 1;
            if received == 1 {
                info!("Received interrupt, stopping after the current scan pass");
                info!("Press Ctrl+C again to force exit");
                let _ = sender.send(());
            } else {
                warn!("Force exit requested");
                std::process::exit(130);
            }
        }
    });

    receiver
}
