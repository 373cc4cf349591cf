use std::{collections::HashMap, fmt, sync::Arc, time::Duration};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExchangeUseCasesError {
    #[error("Failed to fetch balances from {0}")]
    FetchBalancesError(String),
    #[error("{0} did not answer within {1:?}")]
    Timeout(String, Duration),
    #[error("Internal error: {0}")]
    /// This error is used to wrap any internal errors that may occur in the exchange use cases.
    /// Some libs didn't implement the error trait, so we can't use them directly.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use error_stack::report;
    /// use crypto_tally::ports::exchange::ExchangeUseCasesError;
    /// # let error: Result<(), std::io::Error> = Err(std::io::Error::new(std::io::ErrorKind::Other, "test"));
    /// let internal_error = error
    ///     .map_err(|e| { report!(ExchangeUseCasesError::InternalError(format!("{e:?}"))) });
    /// ```
    InternalError(String),
}

/// Capability every exchange module provides: a name and a way to query balances.
///
/// Zero balances may be returned or omitted, both mean the same thing.
#[async_trait::async_trait]
pub trait ExchangeUseCases: Send + Sync {
    fn exchange_name(&self) -> &str;

    async fn fetch_balances(
        &self,
    ) -> error_stack::Result<HashMap<String, f64>, ExchangeUseCasesError>;
}

/// One configured exchange, as seen by the aggregation engine.
#[derive(Clone)]
pub struct ExchangeConfig {
    /// Display name, used as the table column.
    pub name: String,
    /// Identifier used for override matching and as the cache key.
    pub short_code: String,
    pub adapter: Arc<dyn ExchangeUseCases>,
}

impl ExchangeConfig {
    pub fn new(
        name: impl Into<String>,
        short_code: impl Into<String>,
        adapter: Arc<dyn ExchangeUseCases>,
    ) -> Self {
        Self {
            name: name.into(),
            short_code: short_code.into(),
            adapter,
        }
    }
}

impl fmt::Debug for ExchangeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExchangeConfig")
            .field("name", &self.name)
            .field("short_code", &self.short_code)
            .field("adapter", &self.adapter.exchange_name())
            .finish()
    }
}
