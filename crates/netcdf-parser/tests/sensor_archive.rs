//! Reading synthetic sensor archives.

use chrono::NaiveDateTime;
use netcdf_parser::{NetCdfError, SensorArchive};
use test_utils::SensorArchiveBuilder;

fn dt(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
}

fn write_archive(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("combined.nc");
    SensorArchiveBuilder::new()
        .with_variable_fn("td2m", "K", |t, j, i| 270.0 + t as f32 + j as f32 * 0.1 + i as f32 * 0.01)
        .with_variable_fn("rh2m", "%", |_, j, i| if (j, i) == (1, 1) { -999.0 } else { 50.0 })
        .with_fill_value(-999.0)
        .write(&path)
        .unwrap();
    path
}

#[test]
fn test_axes_and_times() {
    let dir = tempfile::tempdir().unwrap();
    let archive = SensorArchive::open(write_archive(&dir)).unwrap();

    assert_eq!(archive.lon().len(), 5);
    assert_eq!(archive.lat().len(), 4);
    assert_eq!(archive.times().len(), 6);
    assert_eq!(archive.times()[0], dt("2020-03-01 00:00"));
    assert_eq!(archive.times()[5], dt("2020-03-01 05:00"));

    let mut names = archive.variable_names();
    names.sort();
    assert_eq!(names, vec!["rh2m", "td2m"]);
    assert!(archive.has_variable("td2m"));
    assert!(!archive.has_variable("2t"));
}

#[test]
fn test_read_field_slab() {
    let dir = tempfile::tempdir().unwrap();
    let archive = SensorArchive::open(write_archive(&dir)).unwrap();

    let field = archive.read_field("td2m", 2).unwrap();
    assert_eq!((field.width(), field.height()), (5, 4));
    let v = field.get(3, 4).unwrap();
    assert!((v - (272.0 + 0.3 + 0.04)).abs() < 1e-4);
}

#[test]
fn test_fill_value_becomes_nan() {
    let dir = tempfile::tempdir().unwrap();
    let archive = SensorArchive::open(write_archive(&dir)).unwrap();

    let field = archive.read_field("rh2m", 0).unwrap();
    assert!(field.get(1, 1).unwrap().is_nan());
    assert_eq!(field.get(0, 0), Some(50.0));
}

#[test]
fn test_nearest_time_and_point() {
    let dir = tempfile::tempdir().unwrap();
    let archive = SensorArchive::open(write_archive(&dir)).unwrap();

    assert_eq!(archive.nearest_time(dt("2020-03-01 02:20")), Some(2));
    assert_eq!(archive.nearest_time(dt("2021-01-01 00:00")), Some(5));
    assert_eq!(archive.nearest_point(-117.4, 33.9), Some((1, 3)));
}

#[test]
fn test_closed_time_range_and_series() {
    let dir = tempfile::tempdir().unwrap();
    let archive = SensorArchive::open(write_archive(&dir)).unwrap();

    let range = archive.time_range(dt("2020-03-01 01:00"), dt("2020-03-01 03:00"));
    assert_eq!(range, 1..4);

    let series = archive.read_point_series("td2m", range, 0, 0).unwrap();
    assert_eq!(series.len(), 3);
    assert!((series[0] - 271.0).abs() < 1e-4);
    assert!((series[2] - 273.0).abs() < 1e-4);

    let empty = archive.time_range(dt("2019-01-01 00:00"), dt("2019-02-01 00:00"));
    assert!(empty.is_empty());
    assert!(archive
        .read_point_series("td2m", empty, 0, 0)
        .unwrap()
        .is_empty());
}

#[test]
fn test_unknown_variable() {
    let dir = tempfile::tempdir().unwrap();
    let archive = SensorArchive::open(write_archive(&dir)).unwrap();
    assert!(matches!(
        archive.read_field("nope", 0),
        Err(NetCdfError::UnknownVariable(_))
    ));
}

#[test]
fn test_missing_archive() {
    let dir = tempfile::tempdir().unwrap();
    let err = SensorArchive::open(dir.path().join("absent.nc")).unwrap_err();
    assert!(matches!(err, NetCdfError::IoError(_)));
}
