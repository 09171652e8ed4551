//! Request handling: the hyper service entry point.

use std::sync::Arc;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::HOST;
use hyper::{Request, Response};

use crate::config::AppState;
use crate::error::{Error, Result};
use crate::logger::{self, AccessLogEntry};
use crate::response;

/// Handle one request.
///
/// A request without a `Host` header yields `Err(Error::MissingHost)`: hyper
/// surfaces that as a connection error and nothing is written on the wire.
/// For resolved requests the access log line is emitted before the response
/// is handed back to hyper.
///
/// Generic over the request body — it is never read.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>> {
    let host = req.headers().get(HOST).map(hyper::header::HeaderValue::as_bytes);

    let Some(descriptor) = state.resolver.resolve(host) else {
        return Err(Error::MissingHost);
    };

    let hostname = String::from_utf8_lossy(host.unwrap_or(b"")).into_owned();
    logger::log_access(
        state.verbose,
        &AccessLogEntry::new(hostname, descriptor.status, descriptor.location.clone()),
    );

    Ok(response::render(&descriptor))
}
