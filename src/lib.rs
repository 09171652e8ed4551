//! Host-header HTTP redirect resolver.
//!
//! Looks up the `Host` header of each incoming request in a read-only keyed
//! store and answers with an HTTP redirect, a 404, or a 500. The store is
//! populated out-of-band with `redirector-mkstore` and opened once at
//! startup.

pub mod config;
pub mod error;
pub mod handler;
pub mod logger;
pub mod record;
pub mod resolver;
pub mod response;
pub mod server;
pub mod store;

pub use error::{Error, Result};
