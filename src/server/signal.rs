// Signal handling module
//
// Supported signals:
// - SIGTERM: Graceful shutdown
// - SIGINT:  Graceful shutdown (Ctrl+C)
// - SIGUSR1: Reopen log files

use std::sync::Arc;

use crate::config::AppState;
use crate::logger;

/// Start signal handlers (Unix)
///
/// | Signal  | Action            |
/// |---------|-------------------|
/// | SIGTERM | Graceful shutdown |
/// | SIGINT  | Graceful shutdown |
/// | SIGUSR1 | Reopen log files  |
#[cfg(unix)]
pub fn start_signal_handler(state: Arc<AppState>) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigusr1 = signal(SignalKind::user_defined1())?;

    logger::log_debug(&format!(
        "[Signal] Handlers registered (SIGTERM, SIGINT, SIGUSR1), pid {}",
        std::process::id()
    ));

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    logger::log_info("[Signal] SIGTERM received, shutting down");
                    state.request_shutdown();
                    break;
                }
                _ = sigint.recv() => {
                    logger::log_info("[Signal] SIGINT received, shutting down");
                    state.request_shutdown();
                    break;
                }
                _ = sigusr1.recv() => {
                    logger::log_info("[Signal] SIGUSR1 received, reopening log files");
                    if let Some(writer) = logger::writer::get() {
                        if let Err(e) = writer.reopen() {
                            logger::log_error(&format!("Failed to reopen log files: {e}"));
                        }
                    }
                }
            }
        }
    });
    Ok(())
}

/// Non-Unix fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub fn start_signal_handler(state: Arc<AppState>) -> std::io::Result<()> {
    tokio::spawn(async move {
        if let Ok(()) = tokio::signal::ctrl_c().await {
            logger::log_info("[Signal] Ctrl+C received, shutting down");
            state.request_shutdown();
        }
    });
    Ok(())
}
