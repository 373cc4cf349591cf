pub mod balance;
pub mod selector;
pub mod table;
pub mod valuation;

pub use balance::{BalanceSnapshot, CacheRecord};
pub use selector::{OverrideSelector, SelectorParseError};
pub use table::{AggregateTable, TableRow, TableSummary};
pub use valuation::{TokenValue, Valuation, ValueTier};
