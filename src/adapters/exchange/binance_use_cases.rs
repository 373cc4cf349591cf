use std::collections::HashMap;

use ::binance::{account::Account, api::Binance, config::Config};
use error_stack::{Report, ResultExt};

use crate::{
    config::exchange_config::ExchangeCredentials,
    ports::exchange::{ExchangeUseCases, ExchangeUseCasesError},
};

const RECV_WINDOW_MS: u64 = 50_000;

/// Spot balances of a Binance account.
pub struct BinanceUseCases {
    name: String,
    credentials: ExchangeCredentials,
    config: Config,
}

impl BinanceUseCases {
    pub fn new(name: impl Into<String>, credentials: ExchangeCredentials) -> Self {
        Self::with_config(
            name,
            credentials,
            Config::default().set_recv_window(RECV_WINDOW_MS),
        )
    }

    /// Talks to `base_url` instead of the production REST endpoint.
    pub fn with_base_url(
        name: impl Into<String>,
        credentials: ExchangeCredentials,
        base_url: impl Into<String>,
    ) -> Self {
        Self::with_config(
            name,
            credentials,
            Config::default()
                .set_rest_api_endpoint(base_url)
                .set_recv_window(RECV_WINDOW_MS),
        )
    }

    pub fn with_config(
        name: impl Into<String>,
        credentials: ExchangeCredentials,
        config: Config,
    ) -> Self {
        Self {
            name: name.into(),
            credentials,
            config,
        }
    }

    fn account(&self) -> Account {
        Binance::new_with_config(
            Some(self.credentials.api_key.to_string()),
            Some(self.credentials.secret_key.to_string()),
            &self.config,
        )
    }
}

#[async_trait::async_trait]
impl ExchangeUseCases for BinanceUseCases {
    fn exchange_name(&self) -> &str {
        &self.name
    }

    async fn fetch_balances(
        &self,
    ) -> error_stack::Result<HashMap<String, f64>, ExchangeUseCasesError> {
        let balances = self
            .account()
            .get_account()
            .await
            .map_err(Report::from)
            .change_context(ExchangeUseCasesError::FetchBalancesError(self.name.clone()))?
            .balances
            .into_iter()
            // Locked funds (open orders) still belong to the account
            .map(|token| (token.asset, token.free + token.locked))
            .filter(|(_, amount)| *amount > 0.0)
            .collect::<HashMap<_, _>>();

        Ok(balances)
    }
}
