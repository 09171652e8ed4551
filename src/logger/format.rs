//! Access log line formatting.

use chrono::{DateTime, Local};

/// One resolved request, as it appears in the access log.
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    pub time: DateTime<Local>,
    pub host: String,
    pub status: u16,
    pub location: Option<String>,
}

impl AccessLogEntry {
    /// Create an entry with the current timestamp.
    pub fn new(host: String, status: u16, location: Option<String>) -> Self {
        Self {
            time: Local::now(),
            host,
            status,
            location,
        }
    }

    /// Tab-separated line: timestamp, hostname, status, location or "-".
    pub fn format(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}",
            self.time.format("%Y-%m-%d %H:%M:%S"),
            self.host,
            self.status,
            self.location.as_deref().unwrap_or("-"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry_at_noon(host: &str, status: u16, location: Option<&str>) -> AccessLogEntry {
        AccessLogEntry {
            time: Local.with_ymd_and_hms(2024, 5, 1, 12, 30, 9).unwrap(),
            host: host.to_string(),
            status,
            location: location.map(ToString::to_string),
        }
    }

    #[test]
    fn redirect_line_fields_in_order() {
        let entry = entry_at_noon("go.example.com", 301, Some("http://example.com"));
        assert_eq!(
            entry.format(),
            "2024-05-01 12:30:09\tgo.example.com\t301\thttp://example.com"
        );
    }

    #[test]
    fn missing_location_renders_as_dash() {
        let entry = entry_at_noon("unknown.example.com", 404, None);
        assert_eq!(
            entry.format(),
            "2024-05-01 12:30:09\tunknown.example.com\t404\t-"
        );
    }
}
