// Server module entry
// Accept loop, connection handling and graceful shutdown

pub mod connection;
pub mod listener;
pub mod signal;

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use crate::config::AppState;
use crate::logger;

pub use listener::create_listener;

/// Poll interval while draining connections on shutdown
const DRAIN_POLL: Duration = Duration::from_millis(50);

/// Bind the configured address and serve until a shutdown signal arrives
pub async fn run(state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = state
        .config
        .get_socket_addr()
        .map_err(anyhow::Error::msg)?;
    let listener = create_listener(addr)?;
    logger::log_server_start(&addr, &state.config, &state.handler.store().describe());

    serve(listener, state, signal::shutdown_signal()).await;
    Ok(())
}

/// Accept connections on `listener` until `shutdown` resolves, then wait for
/// in-flight connections to finish (bounded by the write timeout).
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F)
where
    F: Future<Output = ()>,
{
    let active_connections = Arc::new(AtomicUsize::new(0));
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        connection::accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }
            () = &mut shutdown => break,
        }
    }

    // Stop accepting before draining
    drop(listener);
    logger::log_shutdown_requested(active_connections.load(Ordering::SeqCst));

    let grace = Duration::from_secs(state.config.performance.write_timeout);
    let drained = tokio::time::timeout(grace, async {
        while active_connections.load(Ordering::SeqCst) > 0 {
            tokio::time::sleep(DRAIN_POLL).await;
        }
    })
    .await;
    if drained.is_err() {
        logger::log_warning(&format!(
            "{} connection(s) still open after {}s, exiting anyway",
            active_connections.load(Ordering::SeqCst),
            grace.as_secs()
        ));
    }
    logger::log_shutdown_complete();
}
