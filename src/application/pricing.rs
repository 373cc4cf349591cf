use std::{fmt, sync::Arc};

use tracing::instrument;

use crate::{
    domain::{table::AggregateTable, valuation::Valuation},
    ports::price_quotes::PriceQuotes,
};

const USD: &str = "USD";

/// Values an aggregate table in dollars using a [`PriceQuotes`] provider.
pub struct PricingService {
    quotes: Arc<dyn PriceQuotes>,
}

impl fmt::Debug for PricingService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PricingService")
            .field("quotes", &self.quotes.provider_name())
            .finish()
    }
}

impl PricingService {
    pub fn new(quotes: Arc<dyn PriceQuotes>) -> Self {
        Self { quotes }
    }

    /// Returns `None` when there is nothing to value or the quotes could not
    /// be fetched. Currencies without a quote are valued at 0.
    #[instrument(skip_all, fields(provider = self.quotes.provider_name()))]
    pub async fn value(&self, table: &AggregateTable) -> Option<Valuation> {
        if table.is_empty() {
            return None;
        }

        let symbols: Vec<String> = table
            .rows()
            .iter()
            .map(|row| row.currency.clone())
            .filter(|symbol| symbol != USD)
            .collect();

        let mut quotes = match self.quotes.usd_quotes(&symbols).await {
            Ok(quotes) => quotes,
            Err(report) => {
                tracing::error!("❌ Could not fetch USD quotes: {report:?}");
                return None;
            }
        };
        quotes.entry(USD.to_string()).or_insert(1.0);

        let valuation = Valuation::compute(table, &quotes);
        if !valuation.unpriced().is_empty() {
            tracing::warn!(
                "⚠️  {} returned no quote for: {}. They are valued at 0",
                self.quotes.provider_name(),
                valuation.unpriced().join(", ")
            );
        }
        Some(valuation)
    }
}
