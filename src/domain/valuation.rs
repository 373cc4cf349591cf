use std::collections::HashMap;

use strum::{Display, EnumIter};

use super::table::AggregateTable;

/// Holdings worth at least this many dollars are high value.
pub const HIGH_VALUE_USD: f64 = 500.0;
/// Holdings worth at least this many dollars (and under [`HIGH_VALUE_USD`]) are mid value.
pub const MID_VALUE_USD: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
#[strum(serialize_all = "UPPERCASE")]
pub enum ValueTier {
    High,
    Mid,
    Low,
}

impl ValueTier {
    pub fn of(usd: f64) -> Self {
        if usd >= HIGH_VALUE_USD {
            ValueTier::High
        } else if usd >= MID_VALUE_USD {
            ValueTier::Mid
        } else {
            ValueTier::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenValue {
    pub currency: String,
    pub amount: f64,
    pub usd: f64,
}

impl TokenValue {
    pub fn tier(&self) -> ValueTier {
        ValueTier::of(self.usd)
    }
}

/// Dollar value of an [`AggregateTable`], per currency and per exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct Valuation {
    tokens: Vec<TokenValue>,
    by_exchange: Vec<(String, f64)>,
    unpriced: Vec<String>,
}

impl Valuation {
    /// Prices every row of `table` with `quotes` (USD per unit).
    ///
    /// A currency without a quote is worth 0 and listed in [`Valuation::unpriced`].
    pub fn compute(table: &AggregateTable, quotes: &HashMap<String, f64>) -> Self {
        let mut by_exchange: Vec<(String, f64)> = table
            .exchange_columns()
            .iter()
            .map(|name| (name.clone(), 0.0))
            .collect();
        let mut tokens = Vec::with_capacity(table.len());
        let mut unpriced = Vec::new();

        for row in table.rows() {
            let price = match quotes.get(&row.currency) {
                Some(price) => *price,
                None => {
                    unpriced.push(row.currency.clone());
                    0.0
                }
            };

            for ((_, usd), amount) in by_exchange.iter_mut().zip(&row.amounts) {
                *usd += amount * price;
            }

            tokens.push(TokenValue {
                currency: row.currency.clone(),
                amount: row.total,
                usd: row.total * price,
            });
        }

        Self {
            tokens,
            by_exchange,
            unpriced,
        }
    }

    /// Every currency, sorted by symbol.
    pub fn tokens(&self) -> &[TokenValue] {
        &self.tokens
    }

    pub fn tokens_in(&self, tier: ValueTier) -> impl Iterator<Item = &TokenValue> {
        self.tokens.iter().filter(move |token| token.tier() == tier)
    }

    /// USD held on each exchange, in column order.
    pub fn by_exchange(&self) -> &[(String, f64)] {
        &self.by_exchange
    }

    pub fn total(&self) -> f64 {
        self.by_exchange.iter().map(|(_, usd)| usd).sum()
    }

    /// Currencies that had no quote and were valued at 0.
    pub fn unpriced(&self) -> &[String] {
        &self.unpriced
    }
}
