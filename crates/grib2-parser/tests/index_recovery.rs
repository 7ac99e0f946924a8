//! Side-car index reuse and stale index recovery.

use grib2_parser::{Grib2File, Grib2Index, MessageFilter};
use test_utils::{write_grib2, Grib2Builder};

fn write_two_messages(path: &std::path::Path) {
    let messages = vec![
        Grib2Builder::new_lambert().u_wind_10m().build(),
        Grib2Builder::new_lambert().temperature_2m().build(),
    ];
    write_grib2(path, &messages).unwrap();
}

#[test]
fn test_first_open_writes_index() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.grb2");
    write_two_messages(&path);

    let idx = Grib2Index::sidecar_path(&path);
    assert!(!idx.exists());
    Grib2File::open(&path).unwrap();
    assert!(idx.exists());

    let index = Grib2Index::read(&idx).unwrap();
    assert_eq!(index.messages.len(), 2);
    assert_eq!(index.file_length, std::fs::metadata(&path).unwrap().len());
}

#[test]
fn test_valid_index_is_reused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.grb2");
    write_two_messages(&path);
    let first = Grib2File::open(&path).unwrap();

    let second = Grib2File::open(&path).unwrap();
    assert_eq!(first.index(), second.index());
}

#[test]
fn test_corrupt_index_is_rebuilt() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.grb2");
    write_two_messages(&path);
    let idx = Grib2Index::sidecar_path(&path);
    std::fs::write(&idx, b"{not json").unwrap();

    let file = Grib2File::open(&path).unwrap();
    assert_eq!(file.messages().len(), 2);
    assert!(Grib2Index::read(&idx).is_ok());
}

#[test]
fn test_index_for_replaced_file_is_rebuilt() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.grb2");
    write_two_messages(&path);
    Grib2File::open(&path).unwrap();

    // Same name, different content: the old offsets no longer apply
    let messages = vec![
        Grib2Builder::new_lambert().v_wind_10m().build(),
        Grib2Builder::new_lambert().u_wind_10m().build(),
        Grib2Builder::new_lambert().temperature_2m().build(),
    ];
    write_grib2(&path, &messages).unwrap();

    let file = Grib2File::open(&path).unwrap();
    assert_eq!(file.messages().len(), 3);
    assert!(file
        .read_first(&MessageFilter::wind_v_10m())
        .unwrap()
        .is_some());
}

#[test]
fn test_non_grib_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("junk.grb2");
    std::fs::write(&path, b"this is not a GRIB2 file").unwrap();
    assert!(Grib2File::open(&path).is_err());
}
