use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::sync::check_windows;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub sqlite: SqliteConfig,

    pub mongodb: MongoConfig,

    pub sync: SyncConfig,

    pub security: SecurityConfig,

    /// File the config was read from. `None` when running on defaults.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            worker_threads: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SqliteConfig {
    /// SeaORM connection URL, e.g. `sqlite:stockhub.db`
    pub database_path: String,

    /// Maximum database connections (default: 5)
    pub max_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_connections: u32,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:stockhub.db".to_string(),
            max_connections: 5,
            min_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MongoConfig {
    pub url: String,

    pub database: String,

    /// Reported to the server in the connection handshake.
    pub app_name: String,

    /// Applies to both connecting and server selection.
    pub connect_timeout_seconds: u64,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            url: "mongodb://localhost:27017".to_string(),
            database: "stockhub".to_string(),
            app_name: "stockhub-sync".to_string(),
            connect_timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Window for `maintain` activity sync, in hours.
    pub recent_activity_hours: u32,

    /// Window for `maintain` application backup, in days.
    pub application_backup_days: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            recent_activity_hours: 24,
            application_backup_days: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (default: 1)
    pub argon2_parallelism: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        let mut config = match paths.iter().find(|path| path.exists()) {
            Some(path) => Self::load_from_path(path)?,
            None => Self::default(),
        };

        config.apply_env_with(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.source = Some(path.to_path_buf());

        Ok(config)
    }

    /// Applies `STOCKHUB_*` overrides. `lookup` is `std::env::var` outside tests.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("STOCKHUB_DATABASE_PATH") {
            self.sqlite.database_path = v;
        }
        if let Some(v) = lookup("STOCKHUB_MONGODB_URL") {
            self.mongodb.url = v;
        }
        if let Some(v) = lookup("STOCKHUB_MONGODB_DATABASE") {
            self.mongodb.database = v;
        }
        if let Some(v) = lookup("STOCKHUB_LOG_LEVEL") {
            self.general.log_level = v;
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("stockhub").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".stockhub").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.sqlite.database_path.trim().is_empty() {
            anyhow::bail!("SQLite database path cannot be empty");
        }

        if self.sqlite.min_connections > self.sqlite.max_connections {
            anyhow::bail!(
                "SQLite min_connections ({}) cannot exceed max_connections ({})",
                self.sqlite.min_connections,
                self.sqlite.max_connections
            );
        }

        if self.mongodb.url.trim().is_empty() {
            anyhow::bail!("MongoDB URL cannot be empty");
        }

        if self.mongodb.database.trim().is_empty() {
            anyhow::bail!("MongoDB database name cannot be empty");
        }

        check_windows(
            self.sync.recent_activity_hours,
            self.sync.application_backup_days,
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.sqlite.database_path, "sqlite:stockhub.db");
        assert_eq!(config.mongodb.database, "stockhub");
        assert_eq!(config.sync.recent_activity_hours, 24);
        assert_eq!(config.sync.application_backup_days, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[sqlite]"));
        assert!(toml_str.contains("[mongodb]"));
        assert!(toml_str.contains("[sync]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [mongodb]
            url = "mongodb://db.internal:27017"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.mongodb.url, "mongodb://db.internal:27017");

        assert_eq!(config.mongodb.database, "stockhub");
        assert_eq!(config.sqlite.max_connections, 5);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("STOCKHUB_DATABASE_PATH", "sqlite:/var/lib/stockhub/app.db"),
            ("STOCKHUB_MONGODB_DATABASE", "stockhub_staging"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env_with(|key| env.get(key).map(ToString::to_string));

        assert_eq!(config.sqlite.database_path, "sqlite:/var/lib/stockhub/app.db");
        assert_eq!(config.mongodb.database, "stockhub_staging");
        assert_eq!(config.mongodb.url, "mongodb://localhost:27017");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.mongodb.url = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.sync.recent_activity_hours = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.sync.recent_activity_hours = u32::MAX;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.sync.application_backup_days = 4_000;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.sqlite.min_connections = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = std::env::temp_dir().join(format!(
            "stockhub-config-{}/config.toml",
            uuid::Uuid::new_v4()
        ));

        let mut config = Config::default();
        config.sync.recent_activity_hours = 6;
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.sync.recent_activity_hours, 6);
        assert_eq!(loaded.source.as_deref(), Some(path.as_path()));
        assert!(Config::default().source.is_none());
        assert!(!toml::to_string(&loaded).unwrap().contains("source"));

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }
}
