//! Mapping from partitions to storage-unit paths.

use barcache_types::Partition;
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::{CacheError, Result};

/// Token replaced by the process temp directory.
pub const TMP_TOKEN: &str = "${TMP}";

/// Token replaced by the platform user cache directory.
pub const CACHE_TOKEN: &str = "${CACHE}";

/// Default raw cache directory.
pub const DEFAULT_CACHE_DIR: &str = "${TMP}/cache";

/// Default provider namespace.
pub const DEFAULT_PROVIDER: &str = "yf";

/// File name of a partition's storage unit.
pub const UNIT_FILE_NAME: &str = "db.sql";

/// Raw cache base directory as configured.
///
/// The value may contain [`TMP_TOKEN`] or [`CACHE_TOKEN`]. Tokens are
/// resolved by [`CacheDir::resolve`] each time a path is needed, so one
/// configured value works across hosts and process runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheDir(String);

impl CacheDir {
    /// Creates a raw cache directory value.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the raw, unresolved value.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.0
    }

    /// Resolves placeholder tokens into a concrete path.
    ///
    /// - `${TMP}` becomes [`std::env::temp_dir`]
    /// - `${CACHE}` becomes the platform cache directory, e.g.
    ///   `~/.cache/barcache` on Linux or `~/Library/Caches/barcache` on macOS
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::NoCacheDir`] if `${CACHE}` is used but no home
    /// directory can be determined.
    pub fn resolve(&self) -> Result<PathBuf> {
        let mut resolved = self.0.clone();

        if resolved.contains(TMP_TOKEN) {
            let tmp = std::env::temp_dir();
            resolved = resolved.replace(TMP_TOKEN, &tmp.to_string_lossy());
        }

        if resolved.contains(CACHE_TOKEN) {
            let dirs = ProjectDirs::from("", "", "barcache").ok_or(CacheError::NoCacheDir)?;
            resolved = resolved.replace(CACHE_TOKEN, &dirs.cache_dir().to_string_lossy());
        }

        Ok(PathBuf::from(resolved))
    }
}

impl Default for CacheDir {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_DIR)
    }
}

impl From<&str> for CacheDir {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for CacheDir {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<PathBuf> for CacheDir {
    fn from(path: PathBuf) -> Self {
        Self(path.to_string_lossy().into_owned())
    }
}

impl From<&Path> for CacheDir {
    fn from(path: &Path) -> Self {
        Self(path.to_string_lossy().into_owned())
    }
}

impl std::fmt::Display for CacheDir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Computes storage-unit paths under `base / provider / symbol / interval`.
///
/// The locator creates directories but never the storage unit itself.
#[derive(Debug, Clone)]
pub struct CacheLocator {
    base: CacheDir,
    provider: String,
}

impl CacheLocator {
    /// Creates a locator for the default provider namespace.
    #[must_use]
    pub fn new(base: impl Into<CacheDir>) -> Self {
        Self {
            base: base.into(),
            provider: DEFAULT_PROVIDER.to_string(),
        }
    }

    /// Sets the provider namespace (first path level under the base).
    #[must_use]
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    /// Returns the raw base directory.
    #[must_use]
    pub const fn base(&self) -> &CacheDir {
        &self.base
    }

    /// Returns the provider namespace.
    #[must_use]
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Returns the resolved provider directory, without creating it.
    ///
    /// # Errors
    ///
    /// Returns an error if the base directory cannot be resolved.
    pub fn provider_dir(&self) -> Result<PathBuf> {
        Ok(self.base.resolve()?.join(&self.provider))
    }

    /// Returns the directory holding a partition's storage unit, without
    /// creating it.
    ///
    /// # Errors
    ///
    /// Returns an error if the base directory cannot be resolved.
    pub fn partition_dir(&self, partition: &Partition) -> Result<PathBuf> {
        Ok(self
            .provider_dir()?
            .join(partition.symbol())
            .join(partition.interval()))
    }

    /// Returns the storage-unit path for a partition, creating its directory
    /// tree if absent.
    ///
    /// Safe to call concurrently for the same partition.
    ///
    /// # Errors
    ///
    /// Returns an error if the base cannot be resolved or the directories
    /// cannot be created.
    pub fn locate(&self, partition: &Partition) -> Result<PathBuf> {
        let dir = self.partition_dir(partition)?;
        fs::create_dir_all(&dir).map_err(|source| CacheError::CreateDir {
            path: dir.clone(),
            source,
        })?;

        let path = dir.join(UNIT_FILE_NAME);
        debug!(%partition, path = %path.display(), "located storage unit");
        Ok(path)
    }

    /// Returns true if the partition's storage unit exists.
    ///
    /// Only the path is tested. An empty or corrupt file counts as existing.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage-unit path cannot be located.
    pub fn exists(&self, partition: &Partition) -> Result<bool> {
        Ok(self.locate(partition)?.exists())
    }

    /// Lists partitions with a storage unit under this provider namespace.
    ///
    /// Returns partitions sorted by symbol, then interval. A missing provider
    /// directory yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the base cannot be resolved.
    pub fn partitions(&self) -> Result<Vec<Partition>> {
        let provider_dir = self.provider_dir()?;
        let mut found = Vec::new();

        for symbol_dir in subdirectories(&provider_dir) {
            for interval_dir in subdirectories(&symbol_dir) {
                if !interval_dir.join(UNIT_FILE_NAME).exists() {
                    continue;
                }
                let (Some(symbol), Some(interval)) = (file_name(&symbol_dir), file_name(&interval_dir))
                else {
                    continue;
                };
                if let Ok(partition) = Partition::new(symbol, interval) {
                    found.push(partition);
                }
            }
        }

        found.sort();
        Ok(found)
    }
}

impl Default for CacheLocator {
    fn default() -> Self {
        Self::new(CacheDir::default())
    }
}

fn subdirectories(dir: &Path) -> Vec<PathBuf> {
    fs::read_dir(dir)
        .map(|entries| {
            entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| path.is_dir())
                .collect()
        })
        .unwrap_or_default()
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|name| name.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn partition() -> Partition {
        Partition::new("AAPL", "1d").unwrap()
    }

    #[test]
    fn test_resolve_tmp_token() {
        let resolved = CacheDir::default().resolve().unwrap();
        assert_eq!(resolved, std::env::temp_dir().join("cache"));
    }

    #[test]
    fn test_resolve_plain_path() {
        let resolved = CacheDir::new("/var/lib/candles").resolve().unwrap();
        assert_eq!(resolved, PathBuf::from("/var/lib/candles"));
    }

    #[test]
    fn test_locate_layout() {
        let temp_dir = TempDir::new().unwrap();
        let locator = CacheLocator::new(temp_dir.path());
        let path = locator.locate(&partition()).unwrap();

        assert_eq!(path, temp_dir.path().join("yf").join("AAPL").join("1d").join("db.sql"));
        assert!(path.parent().unwrap().is_dir());
        assert!(!path.exists());
    }

    #[test]
    fn test_provider_namespace() {
        let temp_dir = TempDir::new().unwrap();
        let locator = CacheLocator::new(temp_dir.path()).with_provider("cb");
        let path = locator.locate(&partition()).unwrap();

        assert!(path.starts_with(temp_dir.path().join("cb")));
        assert_eq!(locator.provider(), "cb");
    }

    #[test]
    fn test_exists_does_not_create_unit() {
        let temp_dir = TempDir::new().unwrap();
        let locator = CacheLocator::new(temp_dir.path());

        assert!(!locator.exists(&partition()).unwrap());
        assert!(!locator.locate(&partition()).unwrap().exists());
    }

    #[test]
    fn test_exists_ignores_contents() {
        let temp_dir = TempDir::new().unwrap();
        let locator = CacheLocator::new(temp_dir.path());
        let path = locator.locate(&partition()).unwrap();
        fs::write(&path, b"").unwrap();

        assert!(locator.exists(&partition()).unwrap());
    }

    #[test]
    fn test_create_dir_failure() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("file");
        fs::write(&blocker, b"x").unwrap();
        let locator = CacheLocator::new(blocker.as_path());

        assert!(matches!(
            locator.locate(&partition()),
            Err(CacheError::CreateDir { .. })
        ));
    }

    #[test]
    fn test_partitions_lists_only_units() {
        let temp_dir = TempDir::new().unwrap();
        let locator = CacheLocator::new(temp_dir.path());

        let msft = Partition::new("MSFT", "1h").unwrap();
        fs::write(locator.locate(&msft).unwrap(), b"").unwrap();
        fs::write(locator.locate(&partition()).unwrap(), b"").unwrap();
        locator.locate(&Partition::new("TSLA", "1d").unwrap()).unwrap();

        let listed = locator.partitions().unwrap();
        assert_eq!(listed, vec![partition(), msft]);
    }

    #[test]
    fn test_partitions_missing_provider_dir() {
        let temp_dir = TempDir::new().unwrap();
        let locator = CacheLocator::new(temp_dir.path()).with_provider("none");
        assert!(locator.partitions().unwrap().is_empty());
    }
}
