// Server loop module
// Accepts connections until shutdown, then waits for in-flight work

use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Interval at which the drain phase re-checks the connection counter
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Accept connections until `state.shutdown` fires, then drain.
pub async fn start_server_loop(listener: TcpListener, state: Arc<AppState>) {
    let notify = Arc::clone(&state.shutdown);
    let shutdown = notify.notified();
    tokio::pin!(shutdown);
    // Register before the first check so a shutdown in between is not lost
    let notified_early = shutdown.as_mut().enable();

    if !notified_early && !state.is_shutting_down() {
        loop {
            tokio::select! {
                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((stream, peer_addr)) => accept_connection(stream, peer_addr, &state),
                        Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                    }
                }
                () = &mut shutdown => break,
            }
        }
    }

    // Stop accepting before waiting on connections
    drop(listener);
    logger::log_shutdown_started(state.connection_count());

    let timeout = Duration::from_secs(state.config.performance.shutdown_timeout);
    let remaining = drain_connections(&state, timeout).await;
    logger::log_shutdown_complete(remaining);
}

/// Wait until no connections are active or `timeout` elapses.
/// Returns the number of connections still open.
pub async fn drain_connections(state: &AppState, timeout: Duration) -> usize {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let active = state.connection_count();
        if active == 0 || tokio::time::Instant::now() >= deadline {
            return active;
        }
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::sync::atomic::Ordering;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn test_state(root: &std::path::Path) -> Arc<AppState> {
        let mut config = Config::from_defaults().unwrap();
        config.feeds.root_dir = root.to_path_buf();
        config.logging.access_log = false;
        config.performance.shutdown_timeout = 1;
        Arc::new(AppState::new(config))
    }

    #[tokio::test]
    async fn test_drain_returns_immediately_when_idle() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        assert_eq!(drain_connections(&state, Duration::from_secs(5)).await, 0);
    }

    #[tokio::test]
    async fn test_drain_times_out_with_open_connection() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        state.active_connections.fetch_add(1, Ordering::SeqCst);
        assert_eq!(drain_connections(&state, Duration::from_millis(100)).await, 1);
    }

    #[tokio::test]
    async fn test_serves_news_then_shuts_down() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let listener =
            super::super::create_reusable_listener("127.0.0.1:0".parse().unwrap(), 16).unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(start_server_loop(listener, Arc::clone(&state)));

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /news?buildNumber=1 HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.ends_with(r#"{"error":"No lastCheckTime specified"}"#));

        state.request_shutdown();
        tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .unwrap()
            .unwrap();
    }
}
