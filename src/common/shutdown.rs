//! Ctrl+C handling for the bench binary
//!
//! # Design Principles (KISS)
//! - Single function to setup Ctrl+C handler with broadcast channel
//! - Producers poll the receiver between pushes and stop early

use tokio::signal;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Shutdown signal type (unit type, just signals "shutdown now")
pub type ShutdownSignal = ();

/// Shutdown channel sender
pub type ShutdownSender = broadcast::Sender<ShutdownSignal>;

/// Shutdown channel receiver
pub type ShutdownReceiver = broadcast::Receiver<ShutdownSignal>;

/// Setup shutdown handling with Ctrl+C signal
///
/// Creates a broadcast channel and spawns a task that sends on Ctrl+C.
/// Must be called from within a tokio runtime.
///
/// # Example
/// ```ignore
/// let (shutdown_tx, _rx) = setup_shutdown();
/// let mut rx = shutdown_tx.subscribe();
/// ```
pub fn setup_shutdown() -> (ShutdownSender, ShutdownReceiver) {
    let (tx, rx) = broadcast::channel::<ShutdownSignal>(1);

    let tx_clone = tx.clone();
    tokio::spawn(async move {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            return;
        }
        info!("Ctrl+C received, initiating shutdown");
        let _ = tx_clone.send(());
    });

    (tx, rx)
}

/// Non-blocking check for a pending shutdown signal
pub fn shutdown_requested(rx: &mut ShutdownReceiver) -> bool {
    !matches!(rx.try_recv(), Err(broadcast::error::TryRecvError::Empty))
}
