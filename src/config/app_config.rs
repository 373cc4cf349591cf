use std::{collections::HashMap, path::PathBuf, time::Duration};

use config::Config;
use error_stack::{report, Report, ResultExt};
use thiserror::Error;

use super::exchange_config::{ExchangeEntry, SymbolCorrection};
use crate::{adapters::cache::DEFAULT_CACHE_FILE, application::engine::EngineSettings};

pub const DEFAULT_CONFIG_PATH: &str = "Config";
pub const CONFIG_PATH_ENV: &str = "CONFIG_PATH";
pub const ENV_PREFIX: &str = "CRYPTO_TALLY";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration")]
    Load,
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    #[error("No exchanges configured")]
    NoExchanges,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub exchanges: Vec<ExchangeEntry>,
    #[serde(default)]
    pub symbol_transform: Vec<SymbolCorrection>,
    #[serde(default)]
    pub required_rows: Vec<String>,
    #[serde(default = "default_cache_file")]
    pub cache_file: PathBuf,
    #[serde(default = "default_total_column")]
    pub total_column: String,
    #[serde(default = "default_true")]
    pub exclude_zeros: bool,
    #[serde(default = "default_true")]
    pub parallel: bool,
    #[serde(default)]
    pub fetch_timeout_secs: Option<u64>,
    /// Enables USD valuation through CoinMarketCap.
    #[serde(default)]
    pub coinmarketcap_key: Option<Box<str>>,
}

fn default_cache_file() -> PathBuf {
    PathBuf::from(DEFAULT_CACHE_FILE)
}

fn default_total_column() -> String {
    "Total".to_string()
}

fn default_true() -> bool {
    true
}

impl AppConfig {
    /// Path of the config file: `$CONFIG_PATH`, or `Config` with any extension
    /// the `config` crate understands.
    pub fn default_path() -> String {
        std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
    }

    /// Reads the config file at `path`, overlaid with `CRYPTO_TALLY_*` environment variables.
    pub fn load(path: &str) -> error_stack::Result<Self, ConfigError> {
        let environment = config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true);

        Self::from_sources(
            Config::builder()
                .add_source(config::File::with_name(path))
                .add_source(environment),
        )
        .attach_printable_lazy(|| format!("config file: {path}"))
    }

    /// Parses a TOML document. Handy for tests and embedded defaults.
    pub fn from_toml_str(toml: &str) -> error_stack::Result<Self, ConfigError> {
        Self::from_sources(
            Config::builder().add_source(config::File::from_str(toml, config::FileFormat::Toml)),
        )
    }

    fn from_sources(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> error_stack::Result<Self, ConfigError> {
        let config = builder
            .build()
            .map_err(Report::from)
            .change_context(ConfigError::Load)?
            .try_deserialize::<AppConfig>()
            .map_err(Report::from)
            .change_context(ConfigError::Load)?;

        config.validate()?;
        Ok(config)
    }

    /// Checks what serde can't: unique short codes, usable labels and credentials.
    pub fn validate(&self) -> error_stack::Result<(), ConfigError> {
        if self.total_column.trim().is_empty() {
            return Err(report!(ConfigError::Invalid(
                "total_column must not be empty".to_string()
            )));
        }

        for (index, entry) in self.exchanges.iter().enumerate() {
            if entry.short_code.is_empty() {
                return Err(report!(ConfigError::Invalid(format!(
                    "exchanges[{index}] has an empty short_code"
                ))));
            }

            if let Some(previous) = self.exchanges[..index]
                .iter()
                .find(|other| other.short_code == entry.short_code)
            {
                return Err(report!(ConfigError::Invalid(format!(
                    "short_code '{}' is used by both '{}' and '{}'",
                    entry.short_code,
                    previous.display_name(),
                    entry.display_name()
                ))));
            }

            if self.exchanges[..index]
                .iter()
                .any(|other| other.display_name() == entry.display_name())
            {
                return Err(report!(ConfigError::Invalid(format!(
                    "exchange name '{}' is used more than once, set `name` to tell them apart",
                    entry.display_name()
                ))));
            }

            if entry.display_name() == self.total_column {
                return Err(report!(ConfigError::Invalid(format!(
                    "exchange name '{}' clashes with the total column",
                    entry.display_name()
                ))));
            }

            if entry.kind.needs_credentials() && entry.credentials().is_none() {
                return Err(report!(ConfigError::Invalid(format!(
                    "{} exchange '{}' needs both api_key and secret_key",
                    entry.kind, entry.short_code
                ))));
            }
        }

        Ok(())
    }

    /// The CoinMarketCap key, unless it is missing or blank.
    pub fn pricing_key(&self) -> Option<Box<str>> {
        self.coinmarketcap_key
            .as_ref()
            .filter(|key| !key.trim().is_empty())
            .cloned()
    }

    pub fn symbol_map(&self) -> HashMap<String, String> {
        self.symbol_transform
            .iter()
            .map(|correction| (correction.from.clone(), correction.to.clone()))
            .collect()
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            symbol_transform: self.symbol_map(),
            required_rows: self.required_rows.clone(),
            total_column: self.total_column.clone(),
            exclude_zeros: self.exclude_zeros,
            parallel: self.parallel,
            fetch_timeout: self.fetch_timeout_secs.map(Duration::from_secs),
        }
    }
}
