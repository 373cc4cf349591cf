pub mod coinmarketcap;

pub use coinmarketcap::{CoinMarketCapQuotes, COINMARKETCAP_BASE_URL};
