//! Log writer module.
//!
//! Thread-safe writing to stdout/stderr or configured log files. Access
//! lines go to the access target, diagnostics to the error target.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock};

/// Global log writer instance.
static LOG_WRITER: OnceLock<LogWriter> = OnceLock::new();

/// Log output target.
enum LogTarget {
    Stdout,
    Stderr,
    File(Mutex<File>),
}

/// Thread-safe log writer.
pub struct LogWriter {
    access: LogTarget,
    error: LogTarget,
}

impl LogWriter {
    fn new(access_log_file: Option<&str>, error_log_file: Option<&str>) -> io::Result<Self> {
        let access = match access_log_file {
            Some(path) => LogTarget::File(Mutex::new(open_log_file(path)?)),
            None => LogTarget::Stdout,
        };

        let error = match error_log_file {
            Some(path) => LogTarget::File(Mutex::new(open_log_file(path)?)),
            None => LogTarget::Stderr,
        };

        Ok(Self { access, error })
    }

    pub fn write_access(&self, message: &str) {
        write_to_target(&self.access, message);
    }

    pub fn write_error(&self, message: &str) {
        write_to_target(&self.error, message);
    }

    /// Info messages share the access target.
    pub fn write_info(&self, message: &str) {
        write_to_target(&self.access, message);
    }
}

/// Open or create a log file for appending.
fn open_log_file(path: &str) -> io::Result<File> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

fn write_to_target(target: &LogTarget, message: &str) {
    match target {
        LogTarget::Stdout => println!("{message}"),
        LogTarget::Stderr => eprintln!("{message}"),
        LogTarget::File(file) => {
            if let Ok(mut f) = file.lock() {
                let _ = writeln!(f, "{message}");
            }
        }
    }
}

/// Initialize the global log writer. Called once at startup.
pub fn init(access_log_file: Option<&str>, error_log_file: Option<&str>) -> io::Result<()> {
    let writer = LogWriter::new(access_log_file, error_log_file)?;
    LOG_WRITER.set(writer).map_err(|_| {
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            "Log writer already initialized",
        )
    })
}

/// Get the global log writer.
///
/// Panics if `init()` has not been called; callers go through
/// `is_initialized()` first.
pub fn get() -> &'static LogWriter {
    LOG_WRITER
        .get()
        .expect("Log writer not initialized. Call logger::init() first.")
}

pub fn is_initialized() -> bool {
    LOG_WRITER.get().is_some()
}
