use std::{collections::HashMap, time::Duration};

use error_stack::{report, Report, ResultExt};
use reqwest::header::ACCEPT;

use crate::ports::price_quotes::{PriceQuotes, PriceQuotesError};

pub const COINMARKETCAP_BASE_URL: &str = "https://pro-api.coinmarketcap.com";
const QUOTES_PATH: &str = "/v1/cryptocurrency/quotes/latest";
const API_KEY_HEADER: &str = "X-CMC_PRO_API_KEY";
const INVALID_SYMBOLS_PREFIX: &str = "Invalid values for \"symbol\": ";
const PROVIDER: &str = "CoinMarketCap";

#[derive(Debug, serde::Deserialize)]
pub struct QuotesResponse {
    pub status: Status,
    #[serde(default)]
    pub data: Option<HashMap<String, QuoteData>>,
}

#[derive(Debug, serde::Deserialize)]
pub struct Status {
    pub error_message: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
pub struct QuoteData {
    pub quote: HashMap<String, Quote>,
}

#[derive(Debug, serde::Deserialize)]
pub struct Quote {
    pub price: Option<f64>,
}

/// Latest USD quotes from the CoinMarketCap pro API.
pub struct CoinMarketCapQuotes {
    api_key: Box<str>,
    base_url: String,
    client: reqwest::Client,
}

impl CoinMarketCapQuotes {
    pub fn new(api_key: Box<str>) -> error_stack::Result<Self, PriceQuotesError> {
        Self::with_base_url(api_key, COINMARKETCAP_BASE_URL)
    }

    pub fn with_base_url(
        api_key: Box<str>,
        base_url: impl Into<String>,
    ) -> error_stack::Result<Self, PriceQuotesError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::new(30, 0))
            .build()
            .map_err(|e| report!(PriceQuotesError::InternalError(format!("{e:?}"))))?;

        Ok(Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn request(
        &self,
        symbols: &[String],
    ) -> error_stack::Result<QuotesResponse, PriceQuotesError> {
        let fetch_error = || PriceQuotesError::FetchQuotesError(PROVIDER.to_string());

        let response = self
            .client
            .get(format!("{}{}", self.base_url, QUOTES_PATH))
            .header(ACCEPT, "application/json")
            .header(API_KEY_HEADER, &*self.api_key)
            .query(&[("convert", "USD"), ("symbol", symbols.join(",").as_str())])
            .send()
            .await
            .map_err(Report::from)
            .change_context_lazy(fetch_error)?;

        // Errors such as unknown symbols come back as a JSON body with a 4xx status
        let status = response.status();
        response
            .json::<QuotesResponse>()
            .await
            .map_err(Report::from)
            .change_context_lazy(fetch_error)
            .attach_printable_lazy(|| format!("HTTP status: {status}"))
    }
}

/// Symbols listed in an "Invalid values for "symbol"" error message.
fn invalid_symbols(message: &str) -> Option<Vec<String>> {
    let list = message.strip_prefix(INVALID_SYMBOLS_PREFIX)?.trim().trim_matches('"');
    let symbols: Vec<String> = list
        .split(',')
        .filter(|symbol| !symbol.is_empty())
        .map(str::to_string)
        .collect();
    (!symbols.is_empty()).then_some(symbols)
}

fn usd_prices(data: HashMap<String, QuoteData>) -> HashMap<String, f64> {
    data.into_iter()
        .filter_map(|(symbol, entry)| {
            let price = entry.quote.get("USD")?.price?;
            Some((symbol, price))
        })
        .collect()
}

#[async_trait::async_trait]
impl PriceQuotes for CoinMarketCapQuotes {
    fn provider_name(&self) -> &str {
        PROVIDER
    }

    async fn usd_quotes(
        &self,
        symbols: &[String],
    ) -> error_stack::Result<HashMap<String, f64>, PriceQuotesError> {
        if symbols.is_empty() {
            return Ok(HashMap::new());
        }

        tracing::info!("☁️  Requesting {} quotes from {PROVIDER}", symbols.len());
        let mut response = self.request(symbols).await?;

        if let Some(message) = response.status.error_message.take() {
            let Some(invalid) = invalid_symbols(&message) else {
                return Err(report!(PriceQuotesError::FetchQuotesError(
                    PROVIDER.to_string()
                ))
                .attach_printable(message));
            };

            tracing::warn!(
                "⚠️  {PROVIDER} does not recognize the following symbols: {}",
                invalid.join(", ")
            );
            let remaining: Vec<String> = symbols
                .iter()
                .filter(|symbol| !invalid.contains(symbol))
                .cloned()
                .collect();
            if remaining.is_empty() {
                return Ok(HashMap::new());
            }

            response = self.request(&remaining).await?;
            if let Some(message) = response.status.error_message {
                return Err(report!(PriceQuotesError::FetchQuotesError(
                    PROVIDER.to_string()
                ))
                .attach_printable(message));
            }
        }

        Ok(usd_prices(response.data.unwrap_or_default()))
    }
}
