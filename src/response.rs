//! HTTP response construction.
//!
//! Turns a response descriptor into a `hyper::Response`, decoupled from the
//! resolution logic.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

use crate::logger;
use crate::resolver::ResponseDescriptor;

/// `Server` header value sent on every response.
pub const SERVER_NAME: &str = concat!("Redirector/", env!("CARGO_PKG_VERSION"));

/// Render a response descriptor into an HTTP response.
///
/// Every response carries `Server` and `Connection: close`; the descriptor
/// decides `Location` and the body. The payload is empty when the descriptor
/// has no body.
pub fn render(descriptor: &ResponseDescriptor) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(descriptor.status)
        .header("Server", SERVER_NAME)
        .header("Connection", "close");

    if let Some(location) = &descriptor.location {
        builder = builder.header("Location", location);
    }
    if descriptor.body.is_some() {
        builder = builder.header("Content-Type", "text/plain");
    }

    let body = descriptor
        .body
        .map_or_else(Bytes::new, |text| Bytes::from_static(text.as_bytes()));

    builder.body(Full::new(body)).unwrap_or_else(|e| {
        logger::log_error(&format!(
            "failed to build {} response: {e}",
            descriptor.status
        ));
        Response::new(Full::new(Bytes::new()))
    })
}
