//! Logger module.
//!
//! Access lines go to stdout or a configured access log file; diagnostics go
//! to stderr or a configured error log file. Access logging is gated on the
//! configured verbosity: silent at 0, one line per resolved request at 1 and
//! above. Silently-dropped requests (no `Host` header) never log.

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use std::net::SocketAddr;

use crate::config::Config;

/// Initialize the logger. Called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

fn write_info(message: &str) {
    if writer::is_initialized() {
        writer::get().write_info(message);
    } else {
        println!("{message}");
    }
}

fn write_error(message: &str) {
    if writer::is_initialized() {
        writer::get().write_error(message);
    } else {
        eprintln!("{message}");
    }
}

fn write_access(message: &str) {
    if writer::is_initialized() {
        writer::get().write_access(message);
    } else {
        println!("{message}");
    }
}

/// Emit one access log line for a resolved request, before the reply is
/// sent. Suppressed entirely at verbosity 0.
pub fn log_access(verbose: u8, entry: &AccessLogEntry) {
    if let Some(line) = access_line(verbose, entry) {
        write_access(&line);
    }
}

/// The line `log_access` would emit, or `None` when suppressed.
fn access_line(verbose: u8, entry: &AccessLogEntry) -> Option<String> {
    (verbose >= 1).then(|| entry.format())
}

pub fn log_server_start(addr: &SocketAddr, config: &Config, records: usize) {
    write_info(&format!("Redirector listening on http://{addr}"));
    write_info(&format!(
        "Store: {} ({records} records)",
        config.store.file.as_deref().unwrap_or("-")
    ));
    if config.logging.verbose > 0 {
        write_info(&format!("Verbosity: {}", config.logging.verbose));
    }
}

pub fn log_shutdown() {
    write_info("Shutting down");
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_lines_are_suppressed_at_verbosity_zero() {
        let entry = AccessLogEntry::new("example.com".to_string(), 301, Some("/x".to_string()));
        assert_eq!(access_line(0, &entry), None);
    }

    #[test]
    fn access_lines_emit_at_verbosity_one_and_above() {
        let entry = AccessLogEntry::new("example.com".to_string(), 404, None);
        assert!(access_line(1, &entry).is_some());
        assert!(access_line(3, &entry).is_some());
    }
}
