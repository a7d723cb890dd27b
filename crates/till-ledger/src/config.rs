//! # Till Configuration
//!
//! Where the till database lives and who is operating the terminal.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TILL_DB_PATH=/var/lib/till/till.db                                 │
//! │     TILL_OPERATOR_ID=cashier-7                                         │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/pos/till.toml (Linux)                                    │
//! │     ~/Library/Application Support/com.till.pos/till.toml (macOS)       │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     till.db in the platform data directory, operator "operator"       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # till.toml
//! [database]
//! path = "/var/lib/till/till.db"
//! max_connections = 5
//! run_migrations = true
//!
//! [till]
//! operator_id = "cashier-7"
//! default_warehouse_id = "b6c1..."
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{TillError, TillResult};
use till_core::OperatorId;
use till_db::DbConfig;

// =============================================================================
// Database Settings
// =============================================================================

/// Store location and pool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file path. Created on first connect.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    /// Maximum pool size.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Apply embedded migrations on connect.
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

fn default_db_path() -> PathBuf {
    directories::ProjectDirs::from("com", "till", "pos")
        .map(|dirs| dirs.data_dir().join("till.db"))
        .unwrap_or_else(|| PathBuf::from("till.db"))
}

fn default_max_connections() -> u32 {
    5
}

fn default_true() -> bool {
    true
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
            max_connections: default_max_connections(),
            run_migrations: true,
        }
    }
}

// =============================================================================
// Terminal Settings
// =============================================================================

/// Settings for the terminal running the till.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminalSettings {
    /// Operator recorded on register and ledger writes.
    #[serde(default = "default_operator_id")]
    pub operator_id: String,

    /// Warehouse refunded goods are returned to when none is given.
    #[serde(default)]
    pub default_warehouse_id: Option<String>,
}

fn default_operator_id() -> String {
    "operator".to_string()
}

impl Default for TerminalSettings {
    fn default() -> Self {
        TerminalSettings {
            operator_id: default_operator_id(),
            default_warehouse_id: None,
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete till configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TillConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub till: TerminalSettings,
}

impl TillConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (till.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> TillResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading till config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load till config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> TillResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| TillError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| TillError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| TillError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Till config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> TillResult<()> {
        if self.till.operator_id.trim().is_empty() {
            return Err(TillError::InvalidConfig("operator_id must not be empty".into()));
        }

        if let Some(ref warehouse) = self.till.default_warehouse_id {
            if warehouse.trim().is_empty() {
                return Err(TillError::InvalidConfig(
                    "default_warehouse_id must not be empty when set".into(),
                ));
            }
        }

        if self.database.max_connections == 0 {
            return Err(TillError::InvalidConfig(
                "max_connections must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("TILL_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Ok(max) = std::env::var("TILL_DB_MAX_CONNECTIONS") {
            match max.parse::<u32>() {
                Ok(n) => self.database.max_connections = n,
                Err(_) => warn!(value = %max, "Ignoring invalid TILL_DB_MAX_CONNECTIONS"),
            }
        }

        if let Ok(operator) = std::env::var("TILL_OPERATOR_ID") {
            debug!(operator = %operator, "Overriding operator from environment");
            self.till.operator_id = operator;
        }

        if let Ok(warehouse) = std::env::var("TILL_WAREHOUSE_ID") {
            self.till.default_warehouse_id = Some(warehouse);
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "till", "pos")
            .map(|dirs| dirs.config_dir().join("till.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Returns the configured operator as a validated id.
    pub fn operator(&self) -> TillResult<OperatorId> {
        Ok(OperatorId::new(self.till.operator_id.clone())?)
    }

    /// Returns the default refund warehouse, if configured.
    pub fn default_warehouse_id(&self) -> Option<&str> {
        self.till.default_warehouse_id.as_deref()
    }

    /// Builds the store configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database.path)
            .max_connections(self.database.max_connections)
            .run_migrations(self.database.run_migrations)
    }
}
