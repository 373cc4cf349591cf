use std::collections::HashMap;

use crate::domain::balance::BalanceSnapshot;

/// Returns the corrected spelling of `raw_symbol`, or the symbol itself when
/// the mapping has no entry for it.
pub fn normalize<'a>(raw_symbol: &'a str, mapping: &'a HashMap<String, String>) -> &'a str {
    mapping
        .get(raw_symbol)
        .map(String::as_str)
        .unwrap_or(raw_symbol)
}

/// Applies the configured symbol corrections to balances coming from an exchange.
#[derive(Debug, Clone, Default)]
pub struct SymbolNormalizer {
    mapping: HashMap<String, String>,
}

impl SymbolNormalizer {
    pub fn new(mapping: HashMap<String, String>) -> Self {
        Self { mapping }
    }

    pub fn normalize<'a>(&'a self, raw_symbol: &'a str) -> &'a str {
        normalize(raw_symbol, &self.mapping)
    }

    /// Builds a snapshot out of raw balances.
    ///
    /// Amounts of symbols that normalize to the same spelling are added up.
    /// Negative and non-finite amounts are dropped.
    pub fn ingest<S: AsRef<str>>(
        &self,
        exchange: &str,
        balances: impl IntoIterator<Item = (S, f64)>,
    ) -> BalanceSnapshot {
        let mut snapshot = BalanceSnapshot::new();
        for (raw_symbol, amount) in balances {
            let raw_symbol = raw_symbol.as_ref();
            if !amount.is_finite() || amount < 0.0 {
                tracing::warn!(
                    "{exchange}: dropping invalid amount {amount} for symbol '{raw_symbol}'"
                );
                continue;
            }
            snapshot.add(self.normalize(raw_symbol), amount);
        }
        snapshot
    }
}
