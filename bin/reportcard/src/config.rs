//! Figment-based configuration loading.
//!
//! Configuration priority (highest wins):
//! 1. CLI arguments (applied after Figment load)
//! 2. Config file (TOML)
//! 3. Environment variables (`REPORTCARD_` prefix, `__` between sections)
//! 4. Defaults

use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::{Result, WrapErr};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::cli::DatabaseArgs;

/// Default database file.
const DEFAULT_DB_PATH: &str = "reportcard.redb";

/// Default wait for the database file or its write lock.
const DEFAULT_TIMEOUT_MS: u64 = 1000;

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ReportcardConfig {
    /// Database configuration.
    pub(crate) database: DatabaseConfig,
}

/// Database configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct DatabaseConfig {
    /// Database file path.
    pub(crate) path: PathBuf,
    /// Maximum wait in milliseconds for the database or its write lock.
    pub(crate) timeout_ms: u64,
    /// Use an in-memory database.
    pub(crate) memory: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DB_PATH),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            memory: false,
        }
    }
}

impl DatabaseConfig {
    /// The configured timeout.
    pub(crate) fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl ReportcardConfig {
    /// Load configuration from defaults, environment, and config file.
    /// CLI overrides should be applied separately after loading.
    pub(crate) fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(ReportcardConfig::default()))
            .merge(Env::prefixed("REPORTCARD_").split("__"));

        if let Some(path) = config_path {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }

        figment.extract().wrap_err("Failed to load configuration")
    }

    /// Apply command-line overrides.
    pub(crate) fn apply_args(&mut self, args: &DatabaseArgs) {
        if let Some(path) = &args.path {
            self.database.path = path.clone();
        }
        if let Some(timeout_ms) = args.timeout_ms {
            self.database.timeout_ms = timeout_ms;
        }
        if args.memory {
            self.database.memory = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ReportcardConfig::default();
        assert_eq!(config.database.path, PathBuf::from("reportcard.redb"));
        assert_eq!(config.database.timeout(), Duration::from_secs(1));
        assert!(!config.database.memory);
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        fs::write(
            &config_path,
            r#"
[database]
path = "/var/lib/reportcard/meta.redb"
timeout_ms = 250
"#,
        )
        .unwrap();

        let config = ReportcardConfig::load(Some(&config_path)).unwrap();
        assert_eq!(config.database.path, PathBuf::from("/var/lib/reportcard/meta.redb"));
        assert_eq!(config.database.timeout_ms, 250);
        assert!(!config.database.memory);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        let config = ReportcardConfig::load(Some(&config_path)).unwrap();
        assert_eq!(config, ReportcardConfig::default());
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut config = ReportcardConfig::default();
        config.apply_args(&DatabaseArgs {
            path: Some(PathBuf::from("override.redb")),
            timeout_ms: None,
            memory: true,
        });

        assert_eq!(config.database.path, PathBuf::from("override.redb"));
        assert_eq!(config.database.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert!(config.database.memory);
    }

    #[test]
    fn test_parsed_flags_override_loaded_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(
            &config_path,
            r#"
[database]
path = "file.redb"
timeout_ms = 250
"#,
        )
        .unwrap();

        let cli = Cli::try_parse_from(["reportcard", "--db.timeout", "50", "lookup", "repo"])
            .unwrap();

        let mut config = ReportcardConfig::load(Some(&config_path)).unwrap();
        config.apply_args(&cli.database);

        assert_eq!(config.database.path, PathBuf::from("file.redb"));
        assert_eq!(config.database.timeout_ms, 50);
        assert!(!config.database.memory);
    }
}
