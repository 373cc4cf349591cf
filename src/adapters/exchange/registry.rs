use std::sync::Arc;

use error_stack::{report, ResultExt};

use super::{
    binance_use_cases::BinanceUseCases, poloniex_use_cases::PoloniexUseCases,
    static_use_cases::StaticUseCases,
};
use crate::{
    config::{
        app_config::ConfigError,
        exchange_config::{ExchangeCredentials, ExchangeEntry, ExchangeKind},
    },
    ports::exchange::{ExchangeConfig, ExchangeUseCases},
};

/// Builds the adapter of every configured exchange, keeping configuration order.
pub fn build_exchanges(
    entries: &[ExchangeEntry],
) -> error_stack::Result<Vec<ExchangeConfig>, ConfigError> {
    entries
        .iter()
        .map(|entry| -> error_stack::Result<ExchangeConfig, ConfigError> {
            let adapter = build_adapter(entry)?;
            tracing::debug!(
                "Registered {} exchange '{}' as {}",
                entry.kind,
                entry.short_code,
                entry.display_name()
            );
            Ok(ExchangeConfig::new(
                entry.display_name(),
                entry.short_code.clone(),
                adapter,
            ))
        })
        .collect()
}

fn build_adapter(
    entry: &ExchangeEntry,
) -> error_stack::Result<Arc<dyn ExchangeUseCases>, ConfigError> {
    let name = entry.display_name();

    let adapter: Arc<dyn ExchangeUseCases> = match entry.kind {
        ExchangeKind::Binance => Arc::new(BinanceUseCases::new(name, credentials(entry)?)),
        ExchangeKind::Poloniex => Arc::new(
            PoloniexUseCases::new(name, credentials(entry)?)
                .change_context(ConfigError::Invalid(format!(
                    "cannot set up exchange '{}'",
                    entry.short_code
                )))?,
        ),
        ExchangeKind::Static => Arc::new(StaticUseCases::new(name, &entry.balances)),
    };

    Ok(adapter)
}

fn credentials(entry: &ExchangeEntry) -> error_stack::Result<ExchangeCredentials, ConfigError> {
    entry.credentials().ok_or_else(|| {
        report!(ConfigError::Invalid(format!(
            "{} exchange '{}' needs both api_key and secret_key",
            entry.kind, entry.short_code
        )))
    })
}
