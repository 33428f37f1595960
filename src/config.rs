// Runtime configuration (environment + CLI overrides)
//
// Per-user intake preferences live in the database (see db::settings); this
// only covers where the database is and how the process runs.

use std::path::PathBuf;

use crate::error::{IntakeError, Result};

pub const DB_PATH_VAR: &str = "REPORTES_DB_PATH";
pub const MAX_CONNECTIONS_VAR: &str = "REPORTES_MAX_CONNECTIONS";
pub const REPORT_TYPE_VAR: &str = "REPORTES_REPORT_TYPE";

/// Default log filter handed to env_logger when RUST_LOG is unset
pub const DEFAULT_LOG_FILTER: &str = "reportes=info,reportes_lib=info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub max_connections: u32,
    /// Report type used when a request does not name one
    pub default_report_type: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("reportes.db"),
            max_connections: 5,
            default_report_type: "Boletín".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key lookup; unset or blank keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = AppConfig::default();

        if let Some(path) = get(DB_PATH_VAR) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(raw) = get(MAX_CONNECTIONS_VAR) {
            config.max_connections = raw
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    IntakeError::Config(format!(
                        "{} must be a positive integer, got '{}'",
                        MAX_CONNECTIONS_VAR, raw
                    ))
                })?;
        }
        if let Some(report_type) = get(REPORT_TYPE_VAR) {
            config.default_report_type = report_type;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            (DB_PATH_VAR, "/var/lib/reportes/club.db"),
            (MAX_CONNECTIONS_VAR, "2"),
            (REPORT_TYPE_VAR, "Retransmisión"),
        ]))
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/var/lib/reportes/club.db"));
        assert_eq!(config.max_connections, 2);
        assert_eq!(config.default_report_type, "Retransmisión");
    }

    #[test]
    fn test_bad_connection_count() {
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[(MAX_CONNECTIONS_VAR, "zero")])),
            Err(IntakeError::Config(_))
        ));
        assert!(AppConfig::from_lookup(lookup(&[(MAX_CONNECTIONS_VAR, "0")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[(DB_PATH_VAR, "  ")])).is_ok());
    }
}
