use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Balances held on a single exchange, keyed by currency symbol.
///
/// A currency missing from the snapshot is the same as a zero balance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BalanceSnapshot(BTreeMap<String, f64>);

impl BalanceSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn amount(&self, symbol: &str) -> f64 {
        self.0.get(symbol).copied().unwrap_or(0.0)
    }

    /// Adds `amount` to the balance of `symbol`, creating the entry when needed.
    pub fn add(&mut self, symbol: impl Into<String>, amount: f64) {
        *self.0.entry(symbol.into()).or_insert(0.0) += amount;
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.0.contains_key(symbol)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(symbol, amount)| (symbol.as_str(), *amount))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for BalanceSnapshot {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(BalanceSnapshot::new(), |mut snapshot, (symbol, amount)| {
                snapshot.add(symbol, amount);
                snapshot
            })
    }
}

/// Last known snapshot of every exchange, keyed by the exchange short code.
///
/// This is the unit that gets persisted between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheRecord(BTreeMap<String, BalanceSnapshot>);

impl CacheRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&BalanceSnapshot> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, snapshot: BalanceSnapshot) {
        self.0.insert(key.into(), snapshot);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Drops entries whose key is not in `keep` and returns the removed keys.
    pub fn prune<'k>(&mut self, keep: impl IntoIterator<Item = &'k str>) -> Vec<String> {
        let keep: Vec<&str> = keep.into_iter().collect();
        let stale: Vec<String> = self
            .0
            .keys()
            .filter(|key| !keep.contains(&key.as_str()))
            .cloned()
            .collect();
        for key in &stale {
            self.0.remove(key);
        }
        stale
    }
}

impl<K: Into<String>> FromIterator<(K, BalanceSnapshot)> for CacheRecord {
    fn from_iter<I: IntoIterator<Item = (K, BalanceSnapshot)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(key, snapshot)| (key.into(), snapshot)).collect())
    }
}
