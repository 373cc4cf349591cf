use std::{
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use error_stack::{Report, ResultExt};
use tempfile::NamedTempFile;
use tokio::fs;

use crate::{
    domain::balance::CacheRecord,
    ports::balance_cache::{BalanceCache, CacheError},
};

pub const DEFAULT_CACHE_FILE: &str = "balances.json";

/// Cache record stored as a single pretty-printed JSON document.
#[derive(Debug, Clone)]
pub struct JsonFileCache {
    path: PathBuf,
}

impl JsonFileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for JsonFileCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_FILE)
    }
}

#[async_trait::async_trait]
impl BalanceCache for JsonFileCache {
    async fn try_load(&self) -> error_stack::Result<CacheRecord, CacheError> {
        let content = match fs::read(&self.path).await {
            Ok(content) => content,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                tracing::info!(
                    "No cache at '{}' yet, starting from scratch",
                    self.path.display()
                );
                return Ok(CacheRecord::new());
            }
            Err(error) => {
                return Err(Report::new(error)
                    .change_context(CacheError::Read)
                    .attach_printable(format!("path: {}", self.path.display())))
            }
        };

        serde_json::from_slice(&content)
            .map_err(Report::from)
            .change_context(CacheError::Corrupt)
            .attach_printable_lazy(|| format!("path: {}", self.path.display()))
    }

    async fn save(&self, record: &CacheRecord) -> error_stack::Result<(), CacheError> {
        let content = serde_json::to_vec_pretty(record)
            .map_err(Report::from)
            .change_context(CacheError::Serialize)?;

        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomically(&path, &content))
            .await
            .map_err(Report::from)
            .change_context(CacheError::Write)??;

        tracing::debug!(
            "Saved {} exchanges to '{}'",
            record.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Writes `content` to a uniquely named file in the target directory, then
/// renames it over `path`. The temporary file is removed if anything fails.
fn write_atomically(path: &Path, content: &[u8]) -> error_stack::Result<(), CacheError> {
    let directory = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    std::fs::create_dir_all(directory)
        .map_err(Report::from)
        .change_context(CacheError::Write)
        .attach_printable_lazy(|| format!("directory: {}", directory.display()))?;

    let mut temporary = NamedTempFile::new_in(directory)
        .map_err(Report::from)
        .change_context(CacheError::Write)
        .attach_printable_lazy(|| format!("directory: {}", directory.display()))?;

    temporary
        .write_all(content)
        .and_then(|()| temporary.as_file().sync_all())
        .map_err(Report::from)
        .change_context(CacheError::Write)
        .attach_printable_lazy(|| format!("path: {}", temporary.path().display()))?;

    temporary
        .persist(path)
        .map_err(|error| Report::new(error.error))
        .change_context(CacheError::Write)
        .attach_printable_lazy(|| format!("path: {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_path() {
        assert_eq!(JsonFileCache::default().path(), Path::new("balances.json"));
    }
}
