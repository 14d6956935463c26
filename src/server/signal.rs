// Signal handling module
//
// Supported signals:
// - SIGINT:  Shutdown (Ctrl+C)
// - SIGTERM: Shutdown (Unix only)

use tokio_util::sync::CancellationToken;

use crate::logger;

/// Wait for the first shutdown signal and return its name
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            logger::log_warning(&format!("Failed to register SIGTERM handler: {e}"));
            return wait_for_ctrl_c().await;
        }
    };

    tokio::select! {
        name = wait_for_ctrl_c() => name,
        _ = sigterm.recv() => "SIGTERM",
    }
}

/// Windows fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> &'static str {
    wait_for_ctrl_c().await
}

async fn wait_for_ctrl_c() -> &'static str {
    if let Err(e) = tokio::signal::ctrl_c().await {
        logger::log_error(&format!("Failed to listen for Ctrl+C: {e}"));
        // Without a working handler the process can only be killed
        std::future::pending::<()>().await;
    }
    "SIGINT"
}

/// Cancel `shutdown` when a shutdown signal arrives.
///
/// Spawns a background task; must be called from within a Tokio runtime.
pub fn start_signal_handler(shutdown: CancellationToken) {
    tokio::spawn(async move {
        let name = wait_for_shutdown_signal().await;
        logger::log_shutdown_requested(name);
        shutdown.cancel();
    });
}
