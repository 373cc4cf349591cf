use std::collections::HashMap;

use crate::{
    config::exchange_config::StaticBalance,
    ports::exchange::{ExchangeUseCases, ExchangeUseCasesError},
};

/// Balances declared in the configuration instead of queried from an API.
pub struct StaticUseCases {
    name: String,
    balances: HashMap<String, f64>,
}

impl StaticUseCases {
    pub fn new(name: impl Into<String>, balances: &[StaticBalance]) -> Self {
        let balances = balances
            .iter()
            .fold(HashMap::new(), |mut acc, entry| {
                *acc.entry(entry.symbol.clone()).or_insert(0.0) += entry.amount;
                acc
            });

        Self {
            name: name.into(),
            balances,
        }
    }
}

#[async_trait::async_trait]
impl ExchangeUseCases for StaticUseCases {
    fn exchange_name(&self) -> &str {
        &self.name
    }

    async fn fetch_balances(
        &self,
    ) -> error_stack::Result<HashMap<String, f64>, ExchangeUseCasesError> {
        Ok(self.balances.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_balances_are_summed_per_symbol() {
        let exchange = StaticUseCases::new(
            "Ledger",
            &[
                StaticBalance {
                    symbol: "BTC".to_string(),
                    amount: 0.5,
                },
                StaticBalance {
                    symbol: "BTC".to_string(),
                    amount: 0.25,
                },
            ],
        );

        let balances = exchange.fetch_balances().await.unwrap();

        assert_eq!(exchange.exchange_name(), "Ledger");
        assert_eq!(balances.get("BTC"), Some(&0.75));
    }
}
