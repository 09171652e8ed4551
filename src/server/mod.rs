//! Server bootstrap: listener creation and the accept loop.

mod connection;
mod listener;

pub use listener::create_listener;

use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::AppState;
use crate::logger;

/// Accept connections until ctrl-c.
///
/// Each connection is served in its own task. There is no drain logic on
/// shutdown: in-flight tasks finish naturally and the store handle closes
/// when the process exits.
pub async fn run(listener: TcpListener, state: Arc<AppState>) -> crate::Result<()> {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, _peer_addr)) => {
                        connection::handle_connection(stream, Arc::clone(&state));
                    }
                    Err(e) => {
                        logger::log_error(&format!("failed to accept connection: {e}"));
                    }
                }
            }

            _ = tokio::signal::ctrl_c() => {
                logger::log_shutdown();
                return Ok(());
            }
        }
    }
}
