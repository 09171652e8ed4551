//! Configuration and shared application state.
//!
//! Configuration is layered: file, then `REDIRECTOR_*` environment, then
//! command-line overrides. There is no ambient global — the `Config` is
//! built once at startup, validated, and moved into `AppState`.

use std::net::SocketAddr;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::resolver::Resolver;
use crate::store::Store;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub ip: String,
    pub port: u16,
    /// Tokio worker threads; defaults to the CPU count when unset.
    #[serde(default)]
    pub workers: Option<usize>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StoreConfig {
    /// Path to the store file. Required; may come from the config file, the
    /// environment, or `--file`.
    #[serde(default)]
    pub file: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// 0 is silent; 1 and above emit one access log line per request.
    pub verbose: u8,
    /// Access log file path (stdout if not set).
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (stderr if not set).
    #[serde(default)]
    pub error_log_file: Option<String>,
}

impl Config {
    /// Load configuration from the given file path (without extension),
    /// overlaid with `REDIRECTOR_*` environment variables. The file is
    /// optional; defaults cover everything except the store path.
    ///
    /// Environment keys use `__` between nesting levels so leaf names may
    /// themselves contain underscores: `REDIRECTOR_STORE__FILE`,
    /// `REDIRECTOR_LOGGING__ACCESS_LOG_FILE`.
    pub fn load_from(config_path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("REDIRECTOR")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.ip", "0.0.0.0")?
            .set_default("server.port", 80)?
            .set_default("logging.verbose", 0)?
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Apply command-line overrides; flags win over file and environment.
    pub fn apply_overrides(
        &mut self,
        file: Option<String>,
        ip: Option<String>,
        port: Option<u16>,
        verbose: u8,
    ) {
        if let Some(file) = file {
            self.store.file = Some(file);
        }
        if let Some(ip) = ip {
            self.server.ip = ip;
        }
        if let Some(port) = port {
            self.server.port = port;
        }
        if verbose > 0 {
            self.logging.verbose = verbose;
        }
    }

    /// Validate values serde cannot reject on its own.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::Options(
                "port must be between 1 and 65535".to_string(),
            ));
        }
        Ok(())
    }

    /// The store file path, required before serving can start.
    pub fn store_file(&self) -> Result<&str> {
        self.store.file.as_deref().ok_or_else(|| {
            Error::Options(
                "store file is not set (use --file, REDIRECTOR_STORE__FILE, \
                 or store.file in the config file)"
                    .to_string(),
            )
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.ip, self.server.port)
            .parse()
            .map_err(|e| Error::Options(format!("invalid bind address: {e}")))
    }
}

/// Shared per-process state, built once at startup and handed to every
/// connection behind an `Arc`. Never mutated after construction.
pub struct AppState {
    pub resolver: Resolver,
    pub verbose: u8,
}

impl AppState {
    pub fn new(config: &Config, store: Arc<Store>) -> Self {
        Self {
            resolver: Resolver::new(store),
            verbose: config.logging.verbose,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            server: ServerConfig {
                ip: "0.0.0.0".to_string(),
                port: 80,
                workers: None,
            },
            store: StoreConfig { file: None },
            logging: LoggingConfig {
                verbose: 0,
                access_log_file: None,
                error_log_file: None,
            },
        }
    }

    // Defaults and the environment layer share one test: the environment is
    // process-global, so the set/load/remove sequence must not interleave
    // with a parallel load asserting defaults.
    #[test]
    fn defaults_match_original_surface_and_env_layer_reaches_all_keys() {
        let cfg = Config::load_from("definitely-missing-config-file").unwrap();
        assert_eq!(cfg.server.ip, "0.0.0.0");
        assert_eq!(cfg.server.port, 80);
        assert_eq!(cfg.logging.verbose, 0);
        assert!(cfg.store.file.is_none());

        std::env::set_var("REDIRECTOR_STORE__FILE", "env.store");
        std::env::set_var("REDIRECTOR_LOGGING__ACCESS_LOG_FILE", "/tmp/access.log");
        let cfg = Config::load_from("definitely-missing-config-file").unwrap();
        std::env::remove_var("REDIRECTOR_STORE__FILE");
        std::env::remove_var("REDIRECTOR_LOGGING__ACCESS_LOG_FILE");

        assert_eq!(cfg.store.file.as_deref(), Some("env.store"));
        // Leaf names with underscores must survive the nesting separator.
        assert_eq!(cfg.logging.access_log_file.as_deref(), Some("/tmp/access.log"));
    }

    #[test]
    fn cli_overrides_win() {
        let mut cfg = base_config();
        cfg.apply_overrides(
            Some("records.store".to_string()),
            Some("127.0.0.1".to_string()),
            Some(8080),
            2,
        );
        assert_eq!(cfg.store.file.as_deref(), Some("records.store"));
        assert_eq!(cfg.server.ip, "127.0.0.1");
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.logging.verbose, 2);
    }

    #[test]
    fn absent_overrides_keep_existing_values() {
        let mut cfg = base_config();
        cfg.store.file = Some("from-file.store".to_string());
        cfg.logging.verbose = 1;
        cfg.apply_overrides(None, None, None, 0);
        assert_eq!(cfg.store.file.as_deref(), Some("from-file.store"));
        assert_eq!(cfg.logging.verbose, 1);
    }

    #[test]
    fn port_zero_is_rejected() {
        let mut cfg = base_config();
        cfg.server.port = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn missing_store_file_is_an_options_error() {
        let cfg = base_config();
        let err = cfg.store_file().unwrap_err();
        assert!(err.to_string().contains("store file"), "{err}");
    }

    #[test]
    fn socket_addr_assembles_ip_and_port() {
        let mut cfg = base_config();
        cfg.server.ip = "127.0.0.1".to_string();
        cfg.server.port = 8080;
        assert_eq!(
            cfg.socket_addr().unwrap(),
            "127.0.0.1:8080".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn bad_ip_is_an_options_error() {
        let mut cfg = base_config();
        cfg.server.ip = "not-an-ip".to_string();
        assert!(cfg.socket_addr().is_err());
    }
}
