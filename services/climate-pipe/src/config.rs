//! Pipeline configuration.
//!
//! Every setting has a default and can be overridden through `CLIMATE_*`
//! environment variables (a `.env` file is honoured by the binary) and then
//! by command line flags.

use climate_common::BoundingBox;
use renderer::{Colormap, Normalize};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use storage::{ObjectSourceConfig, RTMA_DATASET};
use thiserror::Error;

use crate::style::StyleTable;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },

    #[error("style file: {0}")]
    StyleFile(String),

    #[error("{0}")]
    Invalid(String),
}

impl From<ConfigError> for climate_common::PipeError {
    fn from(err: ConfigError) -> Self {
        climate_common::PipeError::Config(err.to_string())
    }
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipeConfig {
    /// Remote bucket holding RTMA files
    pub source: ObjectSourceConfig,

    /// Dataset prefix of RTMA object keys
    pub dataset: String,

    /// Local sensor archive
    pub sensor_archive: PathBuf,

    /// Threads in the regridding worker pool
    pub workers: usize,

    /// Window every RTMA field is cropped to
    pub crop: BoundingBox,

    /// Render settings per variable
    pub styles: StyleTable,
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            source: ObjectSourceConfig::default(),
            dataset: RTMA_DATASET.to_string(),
            sensor_archive: PathBuf::from("combined.nc"),
            workers: default_workers(),
            crop: BoundingBox::rtma_window(),
            styles: StyleTable::default(),
        }
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

impl PipeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup, `CLIMATE_*` names.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(bucket) = lookup("CLIMATE_BUCKET") {
            config.source.bucket = bucket;
        }
        if let Some(region) = lookup("CLIMATE_REGION") {
            config.source.region = region;
        }
        if let Some(endpoint) = lookup("CLIMATE_ENDPOINT").filter(|s| !s.is_empty()) {
            config.source.endpoint = Some(endpoint);
        }
        if let Some(dir) = lookup("CLIMATE_CACHE_DIR") {
            config.source.cache_dir = PathBuf::from(dir);
        }
        if let Some(dataset) = lookup("CLIMATE_DATASET") {
            config.dataset = dataset;
        }
        if let Some(path) = lookup("CLIMATE_SENSOR_ARCHIVE") {
            config.sensor_archive = PathBuf::from(path);
        }
        if let Some(workers) = lookup("CLIMATE_WORKERS") {
            config.workers = workers.parse().map_err(|_| ConfigError::InvalidValue {
                key: "CLIMATE_WORKERS",
                reason: format!("'{}' is not a thread count", workers),
            })?;
        }
        if let Some(crop) = lookup("CLIMATE_CROP") {
            config.crop = crop.parse().map_err(|e| ConfigError::InvalidValue {
                key: "CLIMATE_CROP",
                reason: format!("{}", e),
            })?;
        }
        if let Some(path) = lookup("CLIMATE_STYLE_FILE") {
            config.styles = StyleTable::from_yaml_file(&PathBuf::from(path))?;
        }
        if let Some(colormap) = lookup("CLIMATE_COLORMAP") {
            config.styles = config.styles.with_colormap(&colormap);
        }

        Ok(config)
    }

    /// Reject settings no request could succeed with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::Invalid("workers must be at least 1".into()));
        }
        if !self.crop.is_valid() {
            return Err(ConfigError::Invalid(format!(
                "crop window {:?} is empty or inverted",
                self.crop.to_array()
            )));
        }
        if self.dataset.is_empty() {
            return Err(ConfigError::Invalid("dataset prefix is empty".into()));
        }
        for (id, style) in self.styles.iter() {
            Normalize::new(style.vmin, style.vmax)
                .map_err(|e| ConfigError::Invalid(format!("{}: {}", id, e)))?;
            Colormap::by_name(&style.colormap)
                .map_err(|e| ConfigError::Invalid(format!("{}: {}", id, e)))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = PipeConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.source.bucket, "noaa-rtma-pds");
        assert_eq!(config.source.region, "us-east-1");
        assert_eq!(config.dataset, "rtma2p5");
        assert_eq!(config.crop, BoundingBox::rtma_window());
        assert_eq!(config.sensor_archive, PathBuf::from("combined.nc"));
        assert!(config.workers >= 1);
        config.validate().unwrap();
    }

    #[test]
    fn test_overrides() {
        let config = PipeConfig::from_lookup(lookup(&[
            ("CLIMATE_BUCKET", "mirror"),
            ("CLIMATE_WORKERS", "3"),
            ("CLIMATE_CROP", "-120,30,-110,40"),
            ("CLIMATE_COLORMAP", "viridis"),
        ]))
        .unwrap();
        assert_eq!(config.source.bucket, "mirror");
        assert_eq!(config.workers, 3);
        assert_eq!(config.crop, BoundingBox::new(-120.0, 30.0, -110.0, 40.0));
        assert_eq!(config.styles.get("2t").unwrap().colormap, "viridis");
        config.validate().unwrap();
    }

    #[test]
    fn test_bad_values() {
        assert!(PipeConfig::from_lookup(lookup(&[("CLIMATE_WORKERS", "many")])).is_err());
        assert!(PipeConfig::from_lookup(lookup(&[("CLIMATE_CROP", "-110,30,-120,40")])).is_err());
        assert!(PipeConfig::from_lookup(lookup(&[("CLIMATE_STYLE_FILE", "/nonexistent.yaml")])).is_err());
    }

    #[test]
    fn test_validate_rejects() {
        let mut config = PipeConfig::default();
        config.workers = 0;
        assert!(config.validate().is_err());

        let mut styles = StyleTable::default();
        styles.merge_yaml("2t:\n  vmin: 50\n  vmax: 10\n").unwrap();
        let config = PipeConfig {
            styles,
            ..PipeConfig::default()
        };
        assert!(config.validate().is_err());

        let config = PipeConfig {
            styles: StyleTable::default().with_colormap("rainbow"),
            ..PipeConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
