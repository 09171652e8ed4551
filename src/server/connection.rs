//! Per-connection HTTP serving.

use std::error::Error as StdError;
use std::sync::Arc;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;

use crate::config::AppState;
use crate::error::Error;
use crate::handler;
use crate::logger;

/// Serve one connection in a spawned task.
///
/// Keep-alive is disabled: every response carries `Connection: close` and
/// the connection ends after a single exchange.
pub fn handle_connection(stream: TcpStream, state: Arc<AppState>) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let conn = http1::Builder::new().keep_alive(false).serve_connection(
            io,
            service_fn(move |req| {
                let state = Arc::clone(&state);
                async move { handler::handle_request(req, state).await }
            }),
        );

        if let Err(err) = conn.await {
            if !is_silent_drop(&err) {
                logger::log_connection_error(&err);
            }
        }
    });
}

/// A request without a `Host` header is answered with silence: the handler
/// fails the service call, hyper tears the connection down without writing a
/// response, and nothing is logged.
fn is_silent_drop(err: &hyper::Error) -> bool {
    err.source()
        .and_then(|source| source.downcast_ref::<Error>())
        .is_some_and(|e| matches!(e, Error::MissingHost))
}
