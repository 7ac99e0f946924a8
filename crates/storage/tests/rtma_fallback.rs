//! RTMA file name fallback against an in-memory bucket.

use bytes::Bytes;
use chrono::NaiveDate;
use climate_common::PipeError;
use object_store::{memory::InMemory, path::Path, ObjectStore};
use std::sync::Arc;
use storage::{locate_rtma, rtma_keys, ObjectSource, RTMA_DATASET};

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
}

async fn bucket_with(variants: &[usize]) -> (tempfile::TempDir, ObjectSource) {
    let store = Arc::new(InMemory::new());
    let keys = rtma_keys(RTMA_DATASET, date(), 7);
    for &i in variants {
        store
            .put(&Path::from(keys[i].as_str()), Bytes::from_static(b"GRIB").into())
            .await
            .unwrap();
    }
    let dir = tempfile::tempdir().unwrap();
    let source = ObjectSource::from_store(store, "noaa-rtma-pds", dir.path());
    (dir, source)
}

#[tokio::test]
async fn prefers_the_ordinary_analysis() {
    let (_dir, source) = bucket_with(&[0, 1, 2]).await;
    let files = locate_rtma(&source, RTMA_DATASET, date(), 7).await.unwrap();
    assert_eq!(files, vec![rtma_keys(RTMA_DATASET, date(), 7)[0].clone()]);
}

#[tokio::test]
async fn falls_through_to_experimental_analysis() {
    let (_dir, source) = bucket_with(&[1, 2]).await;
    let files = locate_rtma(&source, RTMA_DATASET, date(), 7).await.unwrap();
    assert!(files[0].ends_with("2dvaranl_ndfd.grb2_wexp"));
}

#[tokio::test]
async fn falls_through_to_first_guess() {
    let (_dir, source) = bucket_with(&[2]).await;
    let files = locate_rtma(&source, RTMA_DATASET, date(), 7).await.unwrap();
    assert!(files[0].ends_with("2dvarges_ndfd.grb2_wexp"));
}

#[tokio::test]
async fn nothing_found_is_no_data() {
    let (_dir, source) = bucket_with(&[]).await;
    let err = locate_rtma(&source, RTMA_DATASET, date(), 7)
        .await
        .unwrap_err();
    let err: PipeError = err.into();
    assert!(matches!(err, PipeError::NoData(_)));
}

#[tokio::test]
async fn other_hours_do_not_match() {
    let (_dir, source) = bucket_with(&[0]).await;
    assert!(locate_rtma(&source, RTMA_DATASET, date(), 8).await.is_err());
}
