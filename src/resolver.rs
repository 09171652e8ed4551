//! Request resolution: hostname to response descriptor.
//!
//! The resolver classifies each request exactly once — hit, miss, store
//! failure, or unusable record — and never retries: the store is a local
//! read-only file, so its errors are not transient.

use std::sync::Arc;

use crate::logger;
use crate::record::{self, DecodeError};
use crate::store::Store;

pub const NOT_FOUND_BODY: &str = "404. Redirect not found";
pub const SERVER_ERROR_BODY: &str = "500. Internal server error";

/// Ephemeral description of the HTTP reply for one request.
///
/// Exactly one of `location` or `body` is present, except for the
/// unusable-record case which carries neither.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseDescriptor {
    pub status: u16,
    /// Explanation text for logging and classification; hyper puts the
    /// canonical reason phrase on the wire.
    pub explanation: &'static str,
    pub location: Option<String>,
    pub body: Option<&'static str>,
}

impl ResponseDescriptor {
    fn redirect(status: u16, location: String) -> Self {
        Self {
            status,
            explanation: "Redirect",
            location: Some(location),
            body: None,
        }
    }

    fn not_found() -> Self {
        Self {
            status: 404,
            explanation: "Not found",
            location: None,
            body: Some(NOT_FOUND_BODY),
        }
    }

    fn server_error() -> Self {
        Self {
            status: 500,
            explanation: "Internal server error",
            location: None,
            body: Some(SERVER_ERROR_BODY),
        }
    }

    /// A present key whose value does not decode. Surfaced as a 500 with no
    /// `Location` and no body: the stored record is unusable.
    fn unusable_record() -> Self {
        Self {
            status: 500,
            explanation: "Internal server error",
            location: None,
            body: None,
        }
    }
}

/// Maps hostnames to response descriptors via the store.
pub struct Resolver {
    store: Arc<Store>,
}

impl Resolver {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Resolve a request's `Host` header into a response descriptor.
    ///
    /// `None` in means the request had no `Host` header; `None` out means
    /// the caller must not send any reply and should let the connection
    /// close. The key is matched byte-exact: no case normalization, no
    /// port stripping.
    ///
    /// The store lookup is a blocking read performed inline; it is a single
    /// positioned read against a local file.
    pub fn resolve(&self, host: Option<&[u8]>) -> Option<ResponseDescriptor> {
        let host = host?;

        let descriptor = match self.store.lookup(host) {
            Ok(Some(value)) => match record::decode(&value) {
                Ok(rec) => ResponseDescriptor::redirect(rec.status, rec.location),
                Err(e) => {
                    log_decode_failure(host, &e);
                    ResponseDescriptor::unusable_record()
                }
            },
            Ok(None) => ResponseDescriptor::not_found(),
            Err(e) => {
                logger::log_error(&format!("store lookup failed: {e}"));
                ResponseDescriptor::server_error()
            }
        };

        Some(descriptor)
    }
}

fn log_decode_failure(host: &[u8], err: &DecodeError) {
    logger::log_error(&format!(
        "unusable record for {}: {err}",
        String::from_utf8_lossy(host)
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record;
    use crate::store::StoreBuilder;
    use tempfile::TempDir;

    fn resolver_with(entries: &[(&[u8], &[u8])]) -> (TempDir, Resolver, std::path::PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.store");
        let mut builder = StoreBuilder::create(&path).unwrap();
        for (k, v) in entries {
            builder.add(k, v).unwrap();
        }
        builder.finish().unwrap();
        let store = Arc::new(Store::open(&path).unwrap());
        (dir, Resolver::new(store), path)
    }

    #[test]
    fn hit_produces_redirect_descriptor() {
        let value = record::encode(301, "http://example.com").unwrap();
        let (_dir, resolver, _path) = resolver_with(&[(b"go.example.com", &value)]);

        let desc = resolver.resolve(Some(b"go.example.com")).unwrap();
        assert_eq!(desc.status, 301);
        assert_eq!(desc.explanation, "Redirect");
        assert_eq!(desc.location.as_deref(), Some("http://example.com"));
        assert_eq!(desc.body, None);
    }

    #[test]
    fn miss_produces_404_with_fixed_body() {
        let (_dir, resolver, _path) = resolver_with(&[]);

        let desc = resolver.resolve(Some(b"unknown.example.com")).unwrap();
        assert_eq!(desc.status, 404);
        assert_eq!(desc.explanation, "Not found");
        assert_eq!(desc.location, None);
        assert_eq!(desc.body, Some(NOT_FOUND_BODY));
        assert!(!NOT_FOUND_BODY.is_empty());
    }

    #[test]
    fn missing_host_yields_no_descriptor() {
        let (_dir, resolver, _path) = resolver_with(&[]);
        assert_eq!(resolver.resolve(None), None);
    }

    #[test]
    fn lookup_is_byte_exact() {
        let value = record::encode(301, "/x").unwrap();
        let (_dir, resolver, _path) = resolver_with(&[(b"example.com", &value)]);

        assert_eq!(resolver.resolve(Some(b"Example.com")).unwrap().status, 404);
        assert_eq!(
            resolver.resolve(Some(b"example.com:8080")).unwrap().status,
            404
        );
    }

    #[test]
    fn undecodable_record_maps_to_500_without_location_or_body() {
        let (_dir, resolver, _path) = resolver_with(&[
            (b"short.example.com", b"xx"),
            (b"digits.example.com", b"30a http://x"),
        ]);

        for host in [b"short.example.com".as_slice(), b"digits.example.com"] {
            let desc = resolver.resolve(Some(host)).unwrap();
            assert_eq!(desc.status, 500);
            assert_eq!(desc.location, None);
            assert_eq!(desc.body, None);
        }
    }

    #[test]
    fn store_failure_maps_to_500_with_body() {
        let value = record::encode(301, "/x").unwrap();
        let (_dir, resolver, path) = resolver_with(&[(b"example.com", &value)]);

        // Truncate the backing file out from under the open handle so the
        // positional read of the value fails with an I/O error.
        let file = std::fs::OpenOptions::new().write(true).open(&path).unwrap();
        file.set_len(4).unwrap();

        let desc = resolver.resolve(Some(b"example.com")).unwrap();
        assert_eq!(desc.status, 500);
        assert_eq!(desc.explanation, "Internal server error");
        assert_eq!(desc.location, None);
        assert_eq!(desc.body, Some(SERVER_ERROR_BODY));
    }
}
