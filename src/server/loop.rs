// Server loop module
// Accepts connections until the shutdown future resolves, then drains

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// How long in-flight connections get to finish after shutdown starts
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Accept and serve connections until `shutdown` completes.
///
/// The listener is closed first so no new connections arrive, then open
/// connections are asked to finish their current request and close.
pub async fn start_server_loop<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F)
where
    F: Future<Output = ()>,
{
    let graceful = GracefulShutdown::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &graceful);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = &mut shutdown => break,
        }
    }

    drop(listener);
    logger::log_shutdown(state.connection_count());

    tokio::select! {
        () = graceful.shutdown() => tracing::info!("All connections closed"),
        () = tokio::time::sleep(SHUTDOWN_GRACE) => {
            logger::log_warning(&format!(
                "Gave up waiting for {} connection(s) after {}s",
                state.connection_count(),
                SHUTDOWN_GRACE.as_secs()
            ));
        }
    }
}
