use std::{collections::HashMap, time::Duration};

use error_stack::{report, Report, ResultExt};
use hmac::{Hmac, Mac};
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use sha2::Sha512;

use crate::{
    config::exchange_config::ExchangeCredentials,
    ports::exchange::{ExchangeUseCases, ExchangeUseCasesError},
};

type HmacSha512 = Hmac<Sha512>;

pub const POLONIEX_BASE_URL: &str = "https://poloniex.com";
const TRADING_API_PATH: &str = "/tradingApi";

/// Balances from the Poloniex trading API (`returnBalances`).
pub struct PoloniexUseCases {
    name: String,
    credentials: ExchangeCredentials,
    base_url: String,
    client: reqwest::Client,
}

impl PoloniexUseCases {
    pub fn new(
        name: impl Into<String>,
        credentials: ExchangeCredentials,
    ) -> error_stack::Result<Self, ExchangeUseCasesError> {
        Self::with_base_url(name, credentials, POLONIEX_BASE_URL)
    }

    pub fn with_base_url(
        name: impl Into<String>,
        credentials: ExchangeCredentials,
        base_url: impl Into<String>,
    ) -> error_stack::Result<Self, ExchangeUseCasesError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::new(30, 0))
            .build()
            .map_err(|e| report!(ExchangeUseCasesError::InternalError(format!("{e:?}"))))?;

        Ok(Self {
            name: name.into(),
            credentials,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn sign(&self, body: &str) -> error_stack::Result<String, ExchangeUseCasesError> {
        let mut mac = HmacSha512::new_from_slice(self.credentials.secret_key.as_bytes())
            .map_err(|e| report!(ExchangeUseCasesError::InternalError(format!("{e:?}"))))?;
        mac.update(body.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

/// Turns the `returnBalances` payload into amounts. Poloniex sends amounts as strings.
fn parse_balances(
    exchange: &str,
    response: Value,
) -> error_stack::Result<HashMap<String, f64>, ExchangeUseCasesError> {
    let fetch_error = || ExchangeUseCasesError::FetchBalancesError(exchange.to_string());

    let entries = match response {
        Value::Object(entries) => entries,
        other => {
            return Err(report!(fetch_error()).attach_printable(format!("unexpected payload: {other}")))
        }
    };

    if let Some(error) = entries.get("error") {
        return Err(report!(fetch_error()).attach_printable(format!("exchange error: {error}")));
    }

    entries
        .into_iter()
        .map(|(symbol, amount)| {
            let parsed = match &amount {
                Value::String(text) => text.parse::<f64>().ok(),
                Value::Number(number) => number.as_f64(),
                _ => None,
            };
            parsed
                .map(|parsed| (symbol.clone(), parsed))
                .ok_or_else(|| report!(fetch_error()))
                .attach_printable_lazy(|| {
                    format!("Failed to convert amount '{amount}' for symbol '{symbol}' to f64")
                })
        })
        .collect()
}

#[async_trait::async_trait]
impl ExchangeUseCases for PoloniexUseCases {
    fn exchange_name(&self) -> &str {
        &self.name
    }

    async fn fetch_balances(
        &self,
    ) -> error_stack::Result<HashMap<String, f64>, ExchangeUseCasesError> {
        let nonce = chrono::Utc::now().timestamp_millis();
        let body = format!("command=returnBalances&nonce={nonce}");
        let signature = self.sign(&body)?;

        let response = self
            .client
            .post(format!("{}{}", self.base_url, TRADING_API_PATH))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header("Key", &*self.credentials.api_key)
            .header("Sign", signature)
            .body(body)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(Report::from)
            .change_context(ExchangeUseCasesError::FetchBalancesError(self.name.clone()))?
            .json::<Value>()
            .await
            .map_err(Report::from)
            .change_context(ExchangeUseCasesError::FetchBalancesError(self.name.clone()))?;

        parse_balances(&self.name, response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_signature_is_lowercase_hex_hmac_sha512() {
        let exchange = PoloniexUseCases::new(
            "Poloniex",
            ExchangeCredentials {
                api_key: "key".into(),
                secret_key: "secret".into(),
            },
        )
        .unwrap();

        let signature = exchange.sign("command=returnBalances&nonce=1").unwrap();

        assert_eq!(signature.len(), 128);
        assert!(signature
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        assert_eq!(
            signature,
            exchange.sign("command=returnBalances&nonce=1").unwrap()
        );
        assert_ne!(
            signature,
            exchange.sign("command=returnBalances&nonce=2").unwrap()
        );
    }

    #[test]
    fn test_parse_string_and_number_amounts() {
        let balances =
            parse_balances("Poloniex", json!({ "BTC": "0.50000000", "ETH": 2.5, "STR": "0" }))
                .unwrap();
        assert_eq!(balances.get("BTC"), Some(&0.5));
        assert_eq!(balances.get("ETH"), Some(&2.5));
        assert_eq!(balances.get("STR"), Some(&0.0));
    }

    #[test]
    fn test_parse_error_payload() {
        let report =
            parse_balances("Poloniex", json!({ "error": "Invalid API key/secret pair." }))
                .unwrap_err();
        assert!(matches!(
            report.current_context(),
            ExchangeUseCasesError::FetchBalancesError(_)
        ));
    }

    #[test]
    fn test_parse_rejects_garbage_amount() {
        assert!(parse_balances("Poloniex", json!({ "BTC": "lots" })).is_err());
        assert!(parse_balances("Poloniex", json!(["BTC"])).is_err());
    }
}
