//! Configuration module for the BizDesk backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::errors::AppError;

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Human readable or JSON log lines
    pub log_format: LogFormat,
    /// Enforce the role permission table on the API, not only in the UI
    pub enforce_permissions: bool,
    /// Lifetime of a login session in seconds
    pub session_ttl_secs: i64,
    /// Secret mixed into every PIN hash
    pub pin_pepper: String,
    /// PIN for the bootstrap admin, used only while no user exists
    pub admin_pin: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./data/bizdesk.sqlite"),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            enforce_permissions: true,
            session_ttl_secs: 12 * 60 * 60,
            pin_pepper: String::new(),
            admin_pin: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables (and a `.env` file, if any).
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let db_path = lookup("BIZ_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let bind_addr = match lookup("BIZ_BIND_ADDR") {
            Some(raw) => raw
                .parse()
                .map_err(|_| invalid("BIZ_BIND_ADDR", &raw))?,
            None => defaults.bind_addr,
        };

        let log_level = lookup("BIZ_LOG_LEVEL").unwrap_or(defaults.log_level);

        let log_format = match lookup("BIZ_LOG_FORMAT").as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => return Err(invalid("BIZ_LOG_FORMAT", other)),
        };

        let enforce_permissions = match lookup("BIZ_ENFORCE_PERMISSIONS") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| invalid("BIZ_ENFORCE_PERMISSIONS", &raw))?,
            None => defaults.enforce_permissions,
        };

        let session_ttl_secs = match lookup("BIZ_SESSION_TTL_SECS") {
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|ttl| *ttl > 0)
                .ok_or_else(|| invalid("BIZ_SESSION_TTL_SECS", &raw))?,
            None => defaults.session_ttl_secs,
        };

        let pin_pepper = lookup("BIZ_PIN_PEPPER").unwrap_or_default();
        let admin_pin = lookup("BIZ_ADMIN_PIN").filter(|pin| !pin.trim().is_empty());

        Ok(Self {
            db_path,
            bind_addr,
            log_level,
            log_format,
            enforce_permissions,
            session_ttl_secs,
            pin_pepper,
            admin_pin,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn invalid(key: &str, value: &str) -> AppError {
    AppError::Validation(format!("Invalid {} value: {:?}", key, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::from_lookup(|_| None).unwrap();

        assert_eq!(config.db_path, PathBuf::from("./data/bizdesk.sqlite"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(config.enforce_permissions);
        assert_eq!(config.session_ttl_secs, 43_200);
        assert!(config.admin_pin.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("BIZ_DB_PATH", "/tmp/biz.sqlite"),
            ("BIZ_BIND_ADDR", "0.0.0.0:9000"),
            ("BIZ_LOG_FORMAT", "json"),
            ("BIZ_ENFORCE_PERMISSIONS", "off"),
            ("BIZ_SESSION_TTL_SECS", "60"),
            ("BIZ_ADMIN_PIN", "4321"),
        ]))
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/tmp/biz.sqlite"));
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(!config.enforce_permissions);
        assert_eq!(config.session_ttl_secs, 60);
        assert_eq!(config.admin_pin.as_deref(), Some("4321"));
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(Config::from_lookup(lookup_from(&[("BIZ_BIND_ADDR", "nope")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("BIZ_SESSION_TTL_SECS", "-5")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("BIZ_ENFORCE_PERMISSIONS", "maybe")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("BIZ_LOG_FORMAT", "xml")])).is_err());
    }

    #[test]
    fn test_blank_admin_pin_is_ignored() {
        let config = Config::from_lookup(lookup_from(&[("BIZ_ADMIN_PIN", "  ")])).unwrap();
        assert!(config.admin_pin.is_none());
    }
}
