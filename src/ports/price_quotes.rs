use std::collections::HashMap;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PriceQuotesError {
    #[error("Failed to fetch quotes from {0}")]
    FetchQuotesError(String),
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Source of current USD prices.
#[async_trait::async_trait]
pub trait PriceQuotes: Send + Sync {
    fn provider_name(&self) -> &str;

    /// USD price per unit of each symbol. Symbols the provider does not know
    /// are left out of the map.
    async fn usd_quotes(
        &self,
        symbols: &[String],
    ) -> error_stack::Result<HashMap<String, f64>, PriceQuotesError>;
}
