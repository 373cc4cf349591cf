use std::{path::PathBuf, sync::Arc};

use error_stack::ResultExt;

use crate::{
    adapters::{cache::JsonFileCache, exchange::build_exchanges, price::CoinMarketCapQuotes},
    application::{engine::AggregationEngine, pricing::PricingService, service::TallyService},
    config::app_config::{AppConfig, ConfigError},
};

pub struct TallyServiceFactory;

impl TallyServiceFactory {
    /// Wires the configured exchanges, the engine and the JSON cache together.
    ///
    /// `cache_file` takes precedence over the path in the configuration.
    pub fn create(
        config: &AppConfig,
        cache_file: Option<PathBuf>,
    ) -> error_stack::Result<TallyService, ConfigError> {
        let exchanges = build_exchanges(&config.exchanges)?;
        if exchanges.is_empty() {
            tracing::warn!("⚠️  {}", ConfigError::NoExchanges);
        }

        let cache_file = cache_file.unwrap_or_else(|| config.cache_file.clone());
        tracing::debug!("Using cache file '{}'", cache_file.display());

        let service = TallyService::new(
            exchanges,
            AggregationEngine::new(config.engine_settings()),
            Box::new(JsonFileCache::new(cache_file)),
        );

        match Self::pricing(config)? {
            Some(pricing) => Ok(service.with_pricing(pricing)),
            None => Ok(service),
        }
    }

    /// USD valuation is only set up when a CoinMarketCap key is configured.
    fn pricing(config: &AppConfig) -> error_stack::Result<Option<PricingService>, ConfigError> {
        let Some(api_key) = config.pricing_key() else {
            tracing::debug!("No coinmarketcap_key configured, skipping USD valuation");
            return Ok(None);
        };

        let quotes = CoinMarketCapQuotes::new(api_key).change_context(ConfigError::Invalid(
            "cannot set up CoinMarketCap quotes".to_string(),
        ))?;
        Ok(Some(PricingService::new(Arc::new(quotes))))
    }
}
