//! Error types for the redirector.
//!
//! One crate-wide error enum; request-level outcomes (404, 500) are not
//! errors here — they are response descriptors. The only request-level
//! variant is `MissingHost`, which signals the silent-drop path.

use thiserror::Error;

/// Result type alias using the crate error.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Invalid option values (bad port, missing store file). Startup-fatal.
    #[error("{0}")]
    Options(String),

    /// Store corruption or format violations, distinct from plain I/O.
    #[error("store error: {0}")]
    Store(String),

    /// The request carried no `Host` header. The connection is dropped
    /// without writing a response.
    #[error("request has no Host header")]
    MissingHost,
}
