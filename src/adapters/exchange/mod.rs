pub mod binance_use_cases;
pub mod poloniex_use_cases;
pub mod registry;
pub mod static_use_cases;

pub use registry::build_exchanges;
