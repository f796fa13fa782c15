pub mod env;
pub mod validation;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use directories::ProjectDirs;
use tracing::{debug, warn};

use crate::config::env::{EnvParser, EnvVars};
use crate::config::validation::ConfigValidator;
use crate::core::lookup::LookupOptions;
use crate::core::providers::ProviderKind;
use crate::error::{LexGetError, Result};

fn default_database_path() -> PathBuf {
    let data_path = match ProjectDirs::from("", "", "lexget") {
        Some(project_dirs) => project_dirs.data_dir().to_path_buf(),
        None => {
            warn!("ProjectDirs unavailable; falling back to current directory for data path");
            PathBuf::from(".")
        }
    };
    data_path.join("lexget.db")
}

fn default_dict() -> String {
    ProviderKind::Yahoo.as_str().to_string()
}

fn default_query_timeout_seconds() -> f64 {
    5.0
}

fn default_use_cache() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Cache database file path
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Dictionary used when none is given on the command line
    #[serde(default = "default_dict")]
    pub default_dict: String,

    /// Per-word query timeout (seconds)
    #[serde(default = "default_query_timeout_seconds")]
    pub query_timeout_seconds: f64,

    /// Read cached results before querying the network
    #[serde(default = "default_use_cache")]
    pub use_cache: bool,

    /// Print the dictionary name before each entry
    #[serde(default)]
    pub show_provider: bool,

    /// Print the queried URL before each entry
    #[serde(default)]
    pub show_url: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            default_dict: default_dict(),
            query_timeout_seconds: default_query_timeout_seconds(),
            use_cache: default_use_cache(),
            show_provider: false,
            show_url: false,
        }
    }
}

impl Config {
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        // Pick up a .env file when there is one (development setups)
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        let config_file = match config_path {
            Some(path) => path.to_path_buf(),
            None => Self::default_config_path()?,
        };

        if config_file.exists() {
            let content = fs::read_to_string(&config_file)?;
            config = toml::from_str(&content)?;
            debug!("Loaded configuration from {}", config_file.display());
        } else if let Err(e) = config.save(&config_file) {
            // Defaults only; env overrides are applied afterwards
            warn!("Could not write default config to {}: {}", config_file.display(), e);
        }

        // Environment variables win over the file
        config.load_from_env()?;
        config.validate()?;

        Ok(config)
    }

    fn load_from_env(&mut self) -> Result<()> {
        if let Some(path) = EnvParser::parse_path(EnvVars::DATABASE_PATH)? {
            self.database_path = path;
        }

        if let Some(dict) = EnvParser::parse_string(EnvVars::DICT, Some(ConfigValidator::validate_dict))? {
            self.default_dict = dict;
        }

        if let Some(timeout) = EnvParser::parse_f64(
            EnvVars::QUERY_TIMEOUT,
            ConfigValidator::MIN_TIMEOUT_SECONDS,
            ConfigValidator::MAX_TIMEOUT_SECONDS,
        )? {
            self.query_timeout_seconds = timeout;
        }

        if let Some(value) = EnvParser::parse_bool(EnvVars::USE_CACHE)? {
            self.use_cache = value;
        }

        if let Some(value) = EnvParser::parse_bool(EnvVars::SHOW_PROVIDER)? {
            self.show_provider = value;
        }

        if let Some(value) = EnvParser::parse_bool(EnvVars::SHOW_URL)? {
            self.show_url = value;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        ConfigValidator::validate_db_path(&self.database_path)?;
        ConfigValidator::validate_dict(&self.default_dict)?;
        ConfigValidator::validate_timeout(self.query_timeout_seconds)?;
        Ok(())
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).context("serializing configuration")?;
        fs::write(path, content)?;
        Ok(())
    }

    fn default_config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("", "", "lexget").ok_or_else(|| {
            LexGetError::Internal(anyhow::anyhow!("Failed to determine project directories"))
        })?;

        Ok(project_dirs.config_dir().join("config.toml"))
    }

    pub fn dict(&self) -> Result<ProviderKind> {
        Ok(self.default_dict.parse()?)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.query_timeout_seconds)
    }

    /// Lookup options before command-line flags are applied
    pub fn lookup_options(&self) -> LookupOptions {
        LookupOptions {
            use_cache: self.use_cache,
            timeout: self.query_timeout(),
            verbose: false,
            show_provider: self.show_provider,
            show_url: self.show_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_lookup_defaults() {
        let config = Config::default();
        assert_eq!(config.default_dict, "yahoo");
        assert_eq!(config.lookup_options(), LookupOptions::default());
        assert!(config.database_path.ends_with("lexget.db"));
    }

    #[test]
    fn test_load_reads_file_and_fills_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let config_file = dir.path().join("config.toml");
        let db_path = dir.path().join("cache.db");
        fs::write(
            &config_file,
            format!(
                "database_path = {:?}\ndefault_dict = \"urban\"\nquery_timeout_seconds = 2.5\n",
                db_path.to_string_lossy()
            ),
        )
        .unwrap();

        let config = Config::load(Some(&config_file)).unwrap();

        assert_eq!(config.database_path, db_path);
        assert_eq!(config.dict().unwrap(), ProviderKind::Urban);
        assert_eq!(config.query_timeout(), Duration::from_millis(2500));
        assert!(config.use_cache);
        assert!(!config.show_url);
    }

    #[test]
    fn test_load_writes_default_file_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let config_file = dir.path().join("nested").join("config.toml");

        Config::load(Some(&config_file)).unwrap();

        assert!(config_file.exists());
        let written: Config = toml::from_str(&fs::read_to_string(&config_file).unwrap()).unwrap();
        assert_eq!(written.query_timeout_seconds, 5.0);
    }

    #[test]
    fn test_env_overrides_are_not_written_to_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_file = dir.path().join("config.toml");

        std::env::set_var(EnvVars::SHOW_PROVIDER, "true");
        let loaded = Config::load(Some(&config_file));
        std::env::remove_var(EnvVars::SHOW_PROVIDER);

        assert!(loaded.unwrap().show_provider);
        let written: Config = toml::from_str(&fs::read_to_string(&config_file).unwrap()).unwrap();
        assert!(!written.show_provider);
    }

    #[test]
    fn test_validate_rejects_unknown_dictionary() {
        let config = Config {
            default_dict: "webster".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
