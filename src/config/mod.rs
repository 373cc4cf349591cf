pub mod app_config;
pub mod exchange_config;

pub use app_config::{AppConfig, ConfigError};
pub use exchange_config::{
    ExchangeCredentials, ExchangeEntry, ExchangeKind, StaticBalance, SymbolCorrection,
};
