//! Configuration du service, lue depuis l'environnement (et un éventuel `.env`).
//!
//! | Variable            | Défaut      |
//! |---------------------|-------------|
//! | `FILMORATE_HOST`    | `127.0.0.1` |
//! | `FILMORATE_PORT`    | `8080`      |
//! | `FILMORATE_STORAGE` | `memory`    |
//! | `DATABASE_URL`      | obligatoire si `FILMORATE_STORAGE=database` |

use std::env;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set in .env file")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Memory,
    Database,
}

impl StorageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKind::Memory => "memory",
            StorageKind::Database => "database",
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageKind::Memory),
            "database" | "db" => Ok(StorageKind::Database),
            _ => Err(ConfigError::Invalid {
                name: "FILMORATE_STORAGE",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage: StorageKind,
    pub database_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("FILMORATE_HOST").unwrap_or_else(|| "127.0.0.1".to_string());

        let port = match lookup("FILMORATE_PORT") {
            Some(value) => value.parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "FILMORATE_PORT",
                value,
            })?,
            None => 8080,
        };

        let storage = match lookup("FILMORATE_STORAGE") {
            Some(value) => value.parse()?,
            None => StorageKind::Memory,
        };

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        if storage == StorageKind::Database && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        Ok(AppConfig {
            host,
            port,
            storage,
            database_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_in_memory_storage() {
        let config = load(&[]).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.storage, StorageKind::Memory);
        assert_eq!(config.database_url, None);
    }

    #[test]
    fn database_storage_requires_an_url() {
        assert_eq!(
            load(&[("FILMORATE_STORAGE", "database")]).unwrap_err(),
            ConfigError::Missing("DATABASE_URL")
        );

        let config = load(&[
            ("FILMORATE_STORAGE", "Database"),
            ("DATABASE_URL", "sqlite://filmorate.db?mode=rwc"),
        ])
        .unwrap();
        assert_eq!(config.storage, StorageKind::Database);
    }

    #[test]
    fn rejects_bad_port_and_unknown_storage() {
        assert!(matches!(
            load(&[("FILMORATE_PORT", "eighty")]),
            Err(ConfigError::Invalid { name: "FILMORATE_PORT", .. })
        ));
        assert!(matches!(
            load(&[("FILMORATE_STORAGE", "redis")]),
            Err(ConfigError::Invalid { name: "FILMORATE_STORAGE", .. })
        ));
    }
}
