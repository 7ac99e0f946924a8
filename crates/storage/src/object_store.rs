//! Object store access for RTMA files (anonymous S3 or any `ObjectStore`).

use async_trait::async_trait;
use object_store::{aws::AmazonS3Builder, path::Path as ObjectPath, ObjectStore};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument, warn};

use crate::error::{StorageError, StorageResult};
use crate::locator::FileLister;

/// Configuration for the remote bucket connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectSourceConfig {
    /// Bucket name
    pub bucket: String,
    /// AWS region
    pub region: String,
    /// Custom endpoint (S3 compatible mirrors)
    pub endpoint: Option<String>,
    /// Directory downloaded objects are stored under
    pub cache_dir: PathBuf,
}

impl Default for ObjectSourceConfig {
    fn default() -> Self {
        Self {
            bucket: "noaa-rtma-pds".to_string(),
            region: "us-east-1".to_string(),
            endpoint: None,
            cache_dir: std::env::temp_dir().join("climate-pipe"),
        }
    }
}

/// Session over a bucket with an explicit directory listing cache.
///
/// Listings are cached per directory until [`ObjectSource::invalidate_cache`]
/// is called.
pub struct ObjectSource {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    cache_dir: PathBuf,
    listings: Mutex<HashMap<String, Vec<String>>>,
}

impl ObjectSource {
    /// Anonymous (unsigned) S3 access, as the public NOAA buckets allow.
    pub fn anonymous_s3(config: &ObjectSourceConfig) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(&config.bucket)
            .with_region(&config.region)
            .with_skip_signature(true);

        if let Some(endpoint) = &config.endpoint {
            builder = builder.with_endpoint(endpoint).with_allow_http(true);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::Config(format!("Failed to create S3 client: {}", e)))?;

        Ok(Self::from_store(
            Arc::new(store),
            &config.bucket,
            config.cache_dir.clone(),
        ))
    }

    pub fn from_store(
        store: Arc<dyn ObjectStore>,
        bucket: &str,
        cache_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            bucket: bucket.to_string(),
            cache_dir: cache_dir.into(),
            listings: Mutex::new(HashMap::new()),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Number of directories with a cached listing.
    pub fn cached_listings(&self) -> usize {
        self.listings.lock().map(|l| l.len()).unwrap_or(0)
    }

    /// Drop every cached directory listing.
    pub fn invalidate_cache(&self) {
        match self.listings.lock() {
            Ok(mut listings) => {
                debug!(directories = listings.len(), "Invalidating listing cache");
                listings.clear();
            }
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }

    /// Keys directly under `dir`, from the cache when present.
    async fn list_directory(&self, dir: &str) -> StorageResult<Vec<String>> {
        if let Ok(listings) = self.listings.lock() {
            if let Some(keys) = listings.get(dir) {
                return Ok(keys.clone());
            }
        }

        let prefix = ObjectPath::from(dir);
        let prefix = if dir.is_empty() { None } else { Some(&prefix) };
        let result = self.store.list_with_delimiter(prefix).await?;
        let keys: Vec<String> = result
            .objects
            .into_iter()
            .map(|meta| meta.location.to_string())
            .collect();

        debug!(dir = %dir, count = keys.len(), "Listed directory");
        if let Ok(mut listings) = self.listings.lock() {
            listings.insert(dir.to_string(), keys.clone());
        }
        Ok(keys)
    }

    /// Download `key` into the local cache directory and return its path.
    ///
    /// A non-empty local copy from an earlier fetch is reused.
    #[instrument(skip(self), fields(bucket = %self.bucket, key = %key))]
    pub async fn fetch(&self, key: &str) -> StorageResult<PathBuf> {
        let local = self.cache_dir.join(key);
        if let Ok(meta) = tokio::fs::metadata(&local).await {
            if meta.is_file() && meta.len() > 0 {
                debug!(path = %local.display(), "Reusing cached file");
                return Ok(local);
            }
        }

        let bytes = self
            .store
            .get(&ObjectPath::from(key))
            .await?
            .bytes()
            .await?;

        if let Some(parent) = local.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let partial = partial_path(&local);
        tokio::fs::write(&partial, &bytes).await?;
        tokio::fs::rename(&partial, &local).await?;

        info!(size = bytes.len(), path = %local.display(), "Downloaded object");
        Ok(local)
    }
}

/// `local` with `.part` appended to the whole file name.
fn partial_path(local: &Path) -> PathBuf {
    let mut name = local.as_os_str().to_os_string();
    name.push(".part");
    PathBuf::from(name)
}

#[async_trait]
impl FileLister for ObjectSource {
    /// Keys whose full path equals `prefix`; every failure yields an empty list.
    #[instrument(skip(self), fields(bucket = %self.bucket))]
    async fn list_files(&self, prefix: &str) -> Vec<String> {
        let (dir, _) = prefix.rsplit_once('/').unwrap_or(("", prefix));
        match self.list_directory(dir).await {
            Ok(keys) => keys.into_iter().filter(|k| k == prefix).collect(),
            Err(e) => {
                warn!(error = %e, prefix = %prefix, "Listing failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use object_store::memory::InMemory;

    async fn source_with(keys: &[&str], cache_dir: &Path) -> (Arc<InMemory>, ObjectSource) {
        let store = Arc::new(InMemory::new());
        for key in keys {
            store
                .put(&ObjectPath::from(*key), Bytes::from_static(b"GRIB").into())
                .await
                .unwrap();
        }
        let source = ObjectSource::from_store(store.clone(), "test-bucket", cache_dir);
        (store, source)
    }

    #[tokio::test]
    async fn test_list_files_exact_match() {
        let dir = tempfile::tempdir().unwrap();
        let (_, source) = source_with(
            &[
                "rtma2p5.20240115/rtma2p5.t07z.2dvaranl_ndfd.grb2_wexp",
                "rtma2p5.20240115/rtma2p5.t07z.2dvarges_ndfd.grb2_wexp",
            ],
            dir.path(),
        )
        .await;

        assert!(source
            .list_files("rtma2p5.20240115/rtma2p5.t07z.2dvaranl_ndfd.grb2")
            .await
            .is_empty());
        assert_eq!(
            source
                .list_files("rtma2p5.20240115/rtma2p5.t07z.2dvaranl_ndfd.grb2_wexp")
                .await,
            vec!["rtma2p5.20240115/rtma2p5.t07z.2dvaranl_ndfd.grb2_wexp"]
        );
        assert_eq!(source.cached_listings(), 1);
    }

    #[tokio::test]
    async fn test_cache_serves_stale_listing_until_invalidated() {
        let dir = tempfile::tempdir().unwrap();
        let key = "rtma2p5.20240115/rtma2p5.t08z.2dvaranl_ndfd.grb2";
        let (store, source) = source_with(&[], dir.path()).await;

        assert!(source.list_files(key).await.is_empty());
        store
            .put(&ObjectPath::from(key), Bytes::from_static(b"GRIB").into())
            .await
            .unwrap();
        assert!(source.list_files(key).await.is_empty());

        source.invalidate_cache();
        assert_eq!(source.cached_listings(), 0);
        assert_eq!(source.list_files(key).await, vec![key]);
    }

    #[tokio::test]
    async fn test_fetch_downloads_and_reuses() {
        let dir = tempfile::tempdir().unwrap();
        let key = "rtma2p5.20240115/rtma2p5.t07z.2dvaranl_ndfd.grb2";
        let (store, source) = source_with(&[key], dir.path()).await;

        let path = source.fetch(key).await.unwrap();
        assert_eq!(path, dir.path().join(key));
        assert_eq!(std::fs::read(&path).unwrap(), b"GRIB");

        store.delete(&ObjectPath::from(key)).await.unwrap();
        assert_eq!(source.fetch(key).await.unwrap(), path);
    }

    #[test]
    fn test_partial_path_keeps_variant_suffix() {
        let dir = Path::new("/cache/rtma2p5.20240115");
        let plain = partial_path(&dir.join("rtma2p5.t07z.2dvaranl_ndfd.grb2"));
        let wexp = partial_path(&dir.join("rtma2p5.t07z.2dvaranl_ndfd.grb2_wexp"));
        assert_ne!(plain, wexp);
        assert_eq!(plain, dir.join("rtma2p5.t07z.2dvaranl_ndfd.grb2.part"));
    }

    #[tokio::test]
    async fn test_fetch_variants_side_by_side() {
        let dir = tempfile::tempdir().unwrap();
        let plain = "rtma2p5.20240115/rtma2p5.t07z.2dvaranl_ndfd.grb2";
        let wexp = "rtma2p5.20240115/rtma2p5.t07z.2dvaranl_ndfd.grb2_wexp";
        let (store, source) = source_with(&[plain], dir.path()).await;
        store
            .put(&ObjectPath::from(wexp), Bytes::from_static(b"GRIB_WEXP").into())
            .await
            .unwrap();

        let (a, b) = tokio::join!(source.fetch(plain), source.fetch(wexp));
        assert_eq!(std::fs::read(a.unwrap()).unwrap(), b"GRIB");
        assert_eq!(std::fs::read(b.unwrap()).unwrap(), b"GRIB_WEXP");

        let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("rtma2p5.20240115"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "part"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_missing_object() {
        let dir = tempfile::tempdir().unwrap();
        let (_, source) = source_with(&[], dir.path()).await;
        let err = source.fetch("rtma2p5.20240115/nothing.grb2").await.unwrap_err();
        assert!(matches!(err, StorageError::Store(_)));
    }
}
