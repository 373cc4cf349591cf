#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use crypto_tally::{
    BalanceCache, BalanceSnapshot, CacheError, CacheRecord, ExchangeConfig, ExchangeUseCases,
    ExchangeUseCasesError, PriceQuotes, PriceQuotesError,
};
use error_stack::report;

/// Exchange double that counts how often it was asked for balances.
pub struct MockExchange {
    name: String,
    balances: Option<HashMap<String, f64>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockExchange {
    pub fn ok(name: &str, balances: &[(&str, f64)]) -> Self {
        Self {
            name: name.to_string(),
            balances: Some(
                balances
                    .iter()
                    .map(|(symbol, amount)| (symbol.to_string(), *amount))
                    .collect(),
            ),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(name: &str) -> Self {
        Self {
            name: name.to_string(),
            balances: None,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ExchangeUseCases for MockExchange {
    fn exchange_name(&self) -> &str {
        &self.name
    }

    async fn fetch_balances(
        &self,
    ) -> error_stack::Result<HashMap<String, f64>, ExchangeUseCasesError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.balances.clone().ok_or_else(|| {
            report!(ExchangeUseCasesError::FetchBalancesError(self.name.clone()))
                .attach_printable("connection refused")
        })
    }
}

pub fn exchange(short_code: &str, mock: &Arc<MockExchange>) -> ExchangeConfig {
    ExchangeConfig::new(mock.exchange_name(), short_code, mock.clone())
}

pub fn snapshot(entries: &[(&str, f64)]) -> BalanceSnapshot {
    entries.iter().copied().collect()
}

/// Cache kept in memory, optionally refusing to save. Clones share the same state.
#[derive(Clone, Default)]
pub struct MemoryCache {
    state: Arc<MemoryCacheState>,
}

#[derive(Default)]
struct MemoryCacheState {
    record: Mutex<CacheRecord>,
    saves: AtomicUsize,
    fail_saves: bool,
}

impl MemoryCache {
    pub fn with_record(record: CacheRecord) -> Self {
        Self {
            state: Arc::new(MemoryCacheState {
                record: Mutex::new(record),
                ..MemoryCacheState::default()
            }),
        }
    }

    pub fn failing_saves(record: CacheRecord) -> Self {
        Self {
            state: Arc::new(MemoryCacheState {
                record: Mutex::new(record),
                saves: AtomicUsize::new(0),
                fail_saves: true,
            }),
        }
    }

    pub fn saves(&self) -> usize {
        self.state.saves.load(Ordering::SeqCst)
    }

    pub fn record(&self) -> CacheRecord {
        self.state.record.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl BalanceCache for MemoryCache {
    async fn try_load(&self) -> error_stack::Result<CacheRecord, CacheError> {
        Ok(self.record())
    }

    async fn save(&self, record: &CacheRecord) -> error_stack::Result<(), CacheError> {
        if self.state.fail_saves {
            return Err(report!(CacheError::Write));
        }
        self.state.saves.fetch_add(1, Ordering::SeqCst);
        *self.state.record.lock().unwrap() = record.clone();
        Ok(())
    }
}

/// Fixed USD prices; remembers which symbols were asked for.
pub struct MockQuotes {
    prices: HashMap<String, f64>,
    requested: Mutex<Vec<Vec<String>>>,
}

impl MockQuotes {
    pub fn new(prices: &[(&str, f64)]) -> Self {
        Self {
            prices: prices
                .iter()
                .map(|(symbol, price)| (symbol.to_string(), *price))
                .collect(),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn requested(&self) -> Vec<Vec<String>> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl PriceQuotes for MockQuotes {
    fn provider_name(&self) -> &str {
        "MockQuotes"
    }

    async fn usd_quotes(
        &self,
        symbols: &[String],
    ) -> error_stack::Result<HashMap<String, f64>, PriceQuotesError> {
        self.requested.lock().unwrap().push(symbols.to_vec());
        Ok(symbols
            .iter()
            .filter_map(|symbol| Some((symbol.clone(), *self.prices.get(symbol)?)))
            .collect())
    }
}
