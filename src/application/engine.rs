use std::{collections::HashMap, fmt, time::Duration};

use error_stack::{report, Report, ResultExt};
use tracing::{instrument, Instrument};

use crate::{
    application::normalizer::SymbolNormalizer,
    domain::{
        balance::{BalanceSnapshot, CacheRecord},
        selector::OverrideSelector,
        table::AggregateTable,
    },
    ports::exchange::{ExchangeConfig, ExchangeUseCasesError},
};

/// Knobs of the aggregation engine, fixed for the whole run.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub symbol_transform: HashMap<String, String>,
    pub required_rows: Vec<String>,
    pub total_column: String,
    pub exclude_zeros: bool,
    pub parallel: bool,
    pub fetch_timeout: Option<Duration>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            symbol_transform: HashMap::new(),
            required_rows: Vec::new(),
            total_column: "Total".to_string(),
            exclude_zeros: true,
            parallel: true,
            fetch_timeout: None,
        }
    }
}

/// Where the balances of an exchange came from in this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSource {
    Fetched,
    Cached,
    /// The fetch failed and the previous snapshot was used instead.
    CacheAfterFailure,
    /// The fetch failed and there was nothing cached.
    EmptyAfterFailure,
}

impl fmt::Display for SnapshotSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SnapshotSource::Fetched => "fetched",
            SnapshotSource::Cached => "cached",
            SnapshotSource::CacheAfterFailure => "cached (fetch failed)",
            SnapshotSource::EmptyAfterFailure => "empty (fetch failed)",
        };
        f.write_str(label)
    }
}

#[derive(Debug)]
pub struct ExchangeFailure {
    pub name: String,
    pub short_code: String,
    pub report: Report<ExchangeUseCasesError>,
}

#[derive(Debug)]
pub struct AggregationOutcome {
    pub table: AggregateTable,
    /// Cache record to persist: the input record with every successful fetch applied.
    pub cache: CacheRecord,
    /// Source of each exchange, in configuration order.
    pub sources: Vec<(String, SnapshotSource)>,
    pub failures: Vec<ExchangeFailure>,
}

pub struct AggregationEngine {
    settings: EngineSettings,
    normalizer: SymbolNormalizer,
}

impl fmt::Debug for AggregationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AggregationEngine")
            .field("settings", &self.settings)
            .finish()
    }
}

impl AggregationEngine {
    pub fn new(settings: EngineSettings) -> Self {
        let normalizer = SymbolNormalizer::new(settings.symbol_transform.clone());
        Self {
            settings,
            normalizer,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Decides for each exchange between its cached snapshot and a fresh fetch,
    /// then merges everything into one table.
    ///
    /// A failed fetch never aborts the run: the exchange falls back to its
    /// cached snapshot, or to an empty one, and its cache entry is left alone.
    #[instrument(skip_all, fields(exchanges = configs.len()))]
    pub async fn run(
        &self,
        configs: &[ExchangeConfig],
        selector: &OverrideSelector,
        cache: CacheRecord,
    ) -> AggregationOutcome {
        if configs.is_empty() {
            tracing::warn!("No exchanges configured, nothing to do");
            return AggregationOutcome {
                table: self.merge(&[]),
                cache,
                sources: Vec::new(),
                failures: Vec::new(),
            };
        }

        for code in selector.codes() {
            if !configs
                .iter()
                .any(|config| config.short_code == code || config.name == code)
            {
                tracing::warn!("⚠️  '{code}' does not match any configured exchange");
            }
        }

        let to_refresh: Vec<&ExchangeConfig> = configs
            .iter()
            .filter(|config| self.needs_refresh(config, selector, &cache))
            .collect();

        let mut fetched = self.fetch_all(&to_refresh).await;

        let mut updated = cache.clone();
        let mut snapshots = Vec::with_capacity(configs.len());
        let mut sources = Vec::with_capacity(configs.len());
        let mut failures = Vec::new();

        for config in configs {
            let cached = cache.get(&config.short_code);
            let (snapshot, source) = match fetched.remove(&config.short_code) {
                Some(Ok(snapshot)) => {
                    updated.insert(config.short_code.clone(), snapshot.clone());
                    (snapshot, SnapshotSource::Fetched)
                }
                Some(Err(report)) => {
                    tracing::error!("❌ {}: {:?}", config.name, report);
                    failures.push(ExchangeFailure {
                        name: config.name.clone(),
                        short_code: config.short_code.clone(),
                        report,
                    });
                    match cached {
                        Some(snapshot) => {
                            tracing::warn!("{}: falling back to cached balances", config.name);
                            (snapshot.clone(), SnapshotSource::CacheAfterFailure)
                        }
                        None => {
                            tracing::warn!(
                                "{}: no cached balances, contributing nothing",
                                config.name
                            );
                            (BalanceSnapshot::new(), SnapshotSource::EmptyAfterFailure)
                        }
                    }
                }
                None => {
                    tracing::info!("📦 Using cached data for exchange {}", config.name);
                    let snapshot = cached.cloned().unwrap_or_default();
                    (snapshot, SnapshotSource::Cached)
                }
            };
            snapshots.push((config.name.as_str(), snapshot));
            sources.push((config.name.clone(), source));
        }

        let columns: Vec<(&str, &BalanceSnapshot)> = snapshots
            .iter()
            .map(|(name, snapshot)| (*name, snapshot))
            .collect();
        let table = self.merge(&columns);

        tracing::debug!(
            "Merged {} exchanges into {} rows ({} failed)",
            configs.len(),
            table.len(),
            failures.len()
        );

        AggregationOutcome {
            table,
            cache: updated,
            sources,
            failures,
        }
    }

    fn needs_refresh(
        &self,
        config: &ExchangeConfig,
        selector: &OverrideSelector,
        cache: &CacheRecord,
    ) -> bool {
        selector.forces(&config.short_code, &config.name) || !cache.contains(&config.short_code)
    }

    /// Fetches every exchange in `configs`, keyed by short code.
    async fn fetch_all(
        &self,
        configs: &[&ExchangeConfig],
    ) -> HashMap<String, error_stack::Result<BalanceSnapshot, ExchangeUseCasesError>> {
        let fetches = configs.iter().enumerate().map(|(index, config)| {
            self.fetch(config).instrument(tracing::span!(
                tracing::Level::INFO,
                "fetch",
                exchange = config.name.as_str(),
                index = index,
                len = configs.len()
            ))
        });

        let results = if self.settings.parallel {
            futures::future::join_all(fetches).await
        } else {
            let mut results = Vec::with_capacity(configs.len());
            for fetch in fetches {
                results.push(fetch.await);
            }
            results
        };

        configs
            .iter()
            .map(|config| config.short_code.clone())
            .zip(results)
            .collect()
    }

    async fn fetch(
        &self,
        config: &ExchangeConfig,
    ) -> error_stack::Result<BalanceSnapshot, ExchangeUseCasesError> {
        tracing::info!("☁️  Making request to {} API", config.name);

        let request = config.adapter.fetch_balances();
        let balances = match self.settings.fetch_timeout {
            Some(timeout) => tokio::time::timeout(timeout, request)
                .await
                .map_err(|_| {
                    report!(ExchangeUseCasesError::Timeout(config.name.clone(), timeout))
                })?,
            None => request.await,
        }
        .change_context_lazy(|| ExchangeUseCasesError::FetchBalancesError(config.name.clone()))?;

        let snapshot = self.normalizer.ingest(&config.name, balances);
        tracing::info!("✅ {}: {} currencies", config.name, snapshot.len());
        Ok(snapshot)
    }

    fn merge(&self, columns: &[(&str, &BalanceSnapshot)]) -> AggregateTable {
        AggregateTable::merge(
            columns,
            &self.settings.total_column,
            &self.settings.required_rows,
            self.settings.exclude_zeros,
        )
    }
}
