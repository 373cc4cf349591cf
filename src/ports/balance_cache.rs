use thiserror::Error;

use crate::domain::balance::CacheRecord;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache contents are corrupt")]
    Corrupt,
    #[error("Failed to read the cache")]
    Read,
    #[error("Failed to write the cache")]
    Write,
    #[error("Failed to serialize the cache record")]
    Serialize,
}

#[async_trait::async_trait]
pub trait BalanceCache: Send + Sync {
    /// Reads the whole record. A cache that does not exist yet is an empty record.
    async fn try_load(&self) -> error_stack::Result<CacheRecord, CacheError>;

    /// Replaces the persisted record with `record`.
    async fn save(&self, record: &CacheRecord) -> error_stack::Result<(), CacheError>;

    /// Like [`BalanceCache::try_load`], but an unreadable cache counts as empty.
    async fn load(&self) -> CacheRecord {
        match self.try_load().await {
            Ok(record) => record,
            Err(report) => {
                tracing::warn!("⚠️  Ignoring unusable cache, every exchange will be fetched: {report:?}");
                CacheRecord::new()
            }
        }
    }
}
