//! Configuration module for the Diploma Pro backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Number of notices kept after each notice insert.
pub const DEFAULT_NOTICE_RETENTION: usize = 10;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key guarding the admin publishing routes
    pub admin_key: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON lines instead of the human readable format
    pub log_json: bool,
    /// Maximum number of notices kept in the store
    pub notice_retention: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();

        let admin_key = env::var("DIPLOMA_ADMIN_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let db_path = env::var("DIPLOMA_DB_PATH")
            .unwrap_or_else(|_| "./data/diploma.sqlite".to_string())
            .into();

        let bind_addr = env::var("DIPLOMA_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .map_err(|e| format!("Invalid DIPLOMA_BIND_ADDR format: {}", e))?;

        let log_level = env::var("DIPLOMA_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_json = env::var("DIPLOMA_LOG_JSON")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let notice_retention = match env::var("DIPLOMA_NOTICE_RETENTION") {
            Ok(raw) => raw
                .parse::<usize>()
                .map_err(|e| format!("Invalid DIPLOMA_NOTICE_RETENTION: {}", e))?,
            Err(_) => DEFAULT_NOTICE_RETENTION,
        };
        // The notice just published must survive its own prune.
        if notice_retention == 0 {
            return Err("DIPLOMA_NOTICE_RETENTION must be at least 1".to_string());
        }

        Ok(Self {
            admin_key,
            db_path,
            bind_addr,
            log_level,
            log_json,
            notice_retention,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Both cases live in one test: env vars are process wide.
    #[test]
    fn test_config_from_env() {
        env::remove_var("DIPLOMA_ADMIN_KEY");
        env::remove_var("DIPLOMA_DB_PATH");
        env::remove_var("DIPLOMA_BIND_ADDR");
        env::remove_var("DIPLOMA_LOG_LEVEL");
        env::remove_var("DIPLOMA_LOG_JSON");
        env::remove_var("DIPLOMA_NOTICE_RETENTION");

        let config = Config::from_env().unwrap();

        assert!(config.admin_key.is_none());
        assert_eq!(config.db_path, PathBuf::from("./data/diploma.sqlite"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert!(!config.log_json);
        assert_eq!(config.notice_retention, DEFAULT_NOTICE_RETENTION);

        env::set_var("DIPLOMA_NOTICE_RETENTION", "many");
        assert!(Config::from_env().is_err());

        env::set_var("DIPLOMA_NOTICE_RETENTION", "0");
        assert!(Config::from_env()
            .unwrap_err()
            .contains("DIPLOMA_NOTICE_RETENTION must be at least 1"));

        env::set_var("DIPLOMA_NOTICE_RETENTION", "3");
        env::set_var("DIPLOMA_ADMIN_KEY", "   ");
        let config = Config::from_env().unwrap();
        assert_eq!(config.notice_retention, 3);
        assert!(config.admin_key.is_none());

        env::remove_var("DIPLOMA_NOTICE_RETENTION");
        env::remove_var("DIPLOMA_ADMIN_KEY");
    }
}
