//! RTMA file name patterns and the fallback search over them.

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, info, instrument};

use crate::error::{StorageError, StorageResult};

pub const RTMA_DATASET: &str = "rtma2p5";

/// Anything that can list files under a prefix.
///
/// Listing never fails: an unknown prefix, a missing directory or a
/// transport error all produce an empty list.
#[async_trait]
pub trait FileLister: Send + Sync {
    async fn list_files(&self, prefix: &str) -> Vec<String>;
}

/// RTMA product variants, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RtmaProduct {
    /// Hourly analysis
    Analysis,
    /// Analysis with experimental fields
    AnalysisExperimental,
    /// First guess (forecast background) with experimental fields
    GuessExperimental,
}

impl RtmaProduct {
    pub const FALLBACK_ORDER: [RtmaProduct; 3] = [
        RtmaProduct::Analysis,
        RtmaProduct::AnalysisExperimental,
        RtmaProduct::GuessExperimental,
    ];

    fn suffix(&self) -> &'static str {
        match self {
            RtmaProduct::Analysis => "2dvaranl_ndfd.grb2",
            RtmaProduct::AnalysisExperimental => "2dvaranl_ndfd.grb2_wexp",
            RtmaProduct::GuessExperimental => "2dvarges_ndfd.grb2_wexp",
        }
    }

    /// Object key for this product at `date` and `hour`.
    pub fn key(&self, dataset: &str, date: NaiveDate, hour: u32) -> String {
        format!(
            "{dataset}.{}/{dataset}.t{:02}z.{}",
            date.format("%Y%m%d"),
            hour,
            self.suffix(),
        )
    }
}

/// The three candidate keys in fallback order.
pub fn rtma_keys(dataset: &str, date: NaiveDate, hour: u32) -> Vec<String> {
    RtmaProduct::FALLBACK_ORDER
        .iter()
        .map(|p| p.key(dataset, date, hour))
        .collect()
}

/// Files for the first product variant that exists.
#[instrument(skip(lister))]
pub async fn locate_rtma<L>(
    lister: &L,
    dataset: &str,
    date: NaiveDate,
    hour: u32,
) -> StorageResult<Vec<String>>
where
    L: FileLister + ?Sized,
{
    for product in RtmaProduct::FALLBACK_ORDER {
        let key = product.key(dataset, date, hour);
        let files = lister.list_files(&key).await;
        if !files.is_empty() {
            info!(?product, files = files.len(), "Located RTMA files");
            return Ok(files);
        }
        debug!(key = %key, "No RTMA file for pattern");
    }
    Err(StorageError::NoData(format!(
        "RTMA {} {:02}z",
        date.format("%Y-%m-%d"),
        hour
    )))
}
