pub mod balance_cache;
pub mod exchange;
pub mod price_quotes;

pub use balance_cache::{BalanceCache, CacheError};
pub use exchange::{ExchangeConfig, ExchangeUseCases, ExchangeUseCasesError};
pub use price_quotes::{PriceQuotes, PriceQuotesError};
