use std::fmt;

use tracing::instrument;

use crate::{
    application::{
        engine::{AggregationEngine, AggregationOutcome},
        pricing::PricingService,
    },
    domain::{selector::OverrideSelector, valuation::Valuation},
    ports::{balance_cache::BalanceCache, exchange::ExchangeConfig},
};

/// Result of a full run: the aggregation, whether the cache could be written
/// and the dollar value when pricing is configured.
#[derive(Debug)]
pub struct TallyRun {
    pub outcome: AggregationOutcome,
    pub cache_persisted: bool,
    pub valuation: Option<Valuation>,
}

/// Loads the cache, runs the engine and writes the updated cache back.
pub struct TallyService {
    exchanges: Vec<ExchangeConfig>,
    engine: AggregationEngine,
    cache: Box<dyn BalanceCache>,
    pricing: Option<PricingService>,
}

impl fmt::Debug for TallyService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TallyService")
            .field("exchanges", &self.exchanges)
            .field("engine", &self.engine)
            .field("pricing", &self.pricing)
            .finish()
    }
}

impl TallyService {
    pub fn new(
        exchanges: Vec<ExchangeConfig>,
        engine: AggregationEngine,
        cache: Box<dyn BalanceCache>,
    ) -> Self {
        Self {
            exchanges,
            engine,
            cache,
            pricing: None,
        }
    }

    pub fn with_pricing(mut self, pricing: PricingService) -> Self {
        self.pricing = Some(pricing);
        self
    }

    pub fn exchanges(&self) -> &[ExchangeConfig] {
        &self.exchanges
    }

    #[instrument(skip(self), name = "TallyService::run")]
    pub async fn run(&self, selector: &OverrideSelector) -> TallyRun {
        let cached = self.cache.load().await;
        tracing::debug!("Loaded cache with {} exchanges", cached.len());

        let outcome = self
            .engine
            .run(&self.exchanges, selector, cached.clone())
            .await;

        let cache_persisted = if outcome.cache == cached {
            tracing::debug!("Cache unchanged, not writing it back");
            true
        } else {
            match self.cache.save(&outcome.cache).await {
                Ok(()) => true,
                Err(report) => {
                    tracing::error!("❌ Failed to persist balances cache: {report:?}");
                    false
                }
            }
        };

        let valuation = match &self.pricing {
            Some(pricing) => pricing.value(&outcome.table).await,
            None => None,
        };

        TallyRun {
            outcome,
            cache_persisted,
            valuation,
        }
    }
}
