//! Reading RTMA-style multi-message files.
//!
//! Run with: cargo test --package grib2-parser --test rtma_fields -- --nocapture

use grib2_parser::{Grib2File, GridDefinition, MessageFilter};
use test_utils::{
    assert_approx_eq, create_temperature_grid, create_u_wind_grid, create_v_wind_grid,
    require_test_file, write_grib2, Grib2Builder,
};

const NX: usize = 24;
const NY: usize = 18;

fn rtma_messages() -> Vec<Vec<u8>> {
    vec![
        Grib2Builder::new_lambert()
            .u_wind_10m()
            .with_data(create_u_wind_grid(NX, NY))
            .build(),
        Grib2Builder::new_lambert()
            .v_wind_10m()
            .with_data(create_v_wind_grid(NX, NY))
            .build(),
        Grib2Builder::new_lambert()
            .temperature_2m()
            .with_data(create_temperature_grid(NX, NY))
            .build(),
        // Dew point shares the level but must not satisfy the temperature filter
        Grib2Builder::new_lambert()
            .with_parameter(0, 6)
            .with_level(103, 2)
            .with_constant_value(275.0)
            .build(),
    ]
}

#[test]
fn test_index_lists_every_message() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rtma2p5.t12z.2dvaranl_ndfd.grb2");
    write_grib2(&path, &rtma_messages()).unwrap();

    let file = Grib2File::open(&path).unwrap();
    let names: Vec<&str> = file.messages().iter().map(|m| m.short_name.as_str()).collect();
    assert_eq!(names, vec!["10u", "10v", "2t", "2d"]);
    assert!(file.messages().iter().all(|m| m.grid_template == 30));
    assert_eq!(file.messages()[0].surface_value, Some(10.0));
    assert_eq!(file.messages()[2].type_of_level, "heightAboveGround");
}

#[test]
fn test_filters_select_one_message_each() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rtma.grb2");
    write_grib2(&path, &rtma_messages()).unwrap();
    let file = Grib2File::open(&path).unwrap();

    for filter in MessageFilter::rtma_defaults() {
        assert_eq!(file.select(&filter).count(), 1, "filter {}", filter);
    }
    assert!(file
        .read_first(&MessageFilter::by_short_name("gust"))
        .unwrap()
        .is_none());
}

#[test]
fn test_decoded_values_match_input() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rtma.grb2");
    write_grib2(&path, &rtma_messages()).unwrap();
    let file = Grib2File::open(&path).unwrap();

    let t = file
        .read_first(&MessageFilter::temperature_2m())
        .unwrap()
        .unwrap();
    let expected = create_temperature_grid(NX, NY);
    assert_eq!(t.values.len(), expected.len());
    for (got, want) in t.values.iter().zip(&expected) {
        assert_approx_eq!(*got, *want, 0.01);
    }

    let u = file
        .read_first(&MessageFilter::wind_u_10m())
        .unwrap()
        .unwrap();
    assert_approx_eq!(u.values[0], -20.0, 0.01);
    assert_approx_eq!(u.values[NX - 1], 20.0, 0.01);
}

#[test]
fn test_lambert_coordinates_cover_southern_california() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rtma.grb2");
    write_grib2(&path, &rtma_messages()).unwrap();
    let file = Grib2File::open(&path).unwrap();

    let field = file
        .read_first(&MessageFilter::temperature_2m())
        .unwrap()
        .unwrap();
    assert!(matches!(field.grid, GridDefinition::Lambert { .. }));

    let field = field.into_curvilinear().unwrap();
    assert_eq!((field.nx, field.ny), (NX, NY));
    assert_approx_eq!(field.lat[0], 31.0, 1e-6);
    assert_approx_eq!(field.lon[0], -120.0, 1e-6);

    // South-to-north scanning: last row is the northern edge
    let ne = NX * NY - 1;
    assert_approx_eq!(field.lat[ne], 35.569, 0.01);
    assert_approx_eq!(field.lon[ne], -114.705, 0.01);
    assert!(field.lon.iter().all(|l| (-180.0..180.0).contains(l)));
}

#[test]
fn test_bitmap_points_decode_as_nan() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("masked.grb2");
    let values = test_utils::with_missing(create_temperature_grid(NX, NY), 7);
    let message = Grib2Builder::new_lambert()
        .temperature_2m()
        .with_data(values.clone())
        .build();
    write_grib2(&path, &[message]).unwrap();

    let field = Grib2File::open(&path)
        .unwrap()
        .read_first(&MessageFilter::temperature_2m())
        .unwrap()
        .unwrap();
    for (got, want) in field.values.iter().zip(&values) {
        if want.is_nan() {
            assert!(got.is_nan());
        } else {
            assert_approx_eq!(*got, *want, 0.01);
        }
    }
}

#[test]
fn test_latlon_grid_north_to_south() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("latlon.grb2");
    let message = Grib2Builder::new_latlon()
        .temperature_2m()
        .with_data(create_temperature_grid(10, 10))
        .build();
    write_grib2(&path, &[message]).unwrap();

    let field = Grib2File::open(&path)
        .unwrap()
        .read_first(&MessageFilter::temperature_2m())
        .unwrap()
        .unwrap()
        .into_curvilinear()
        .unwrap();
    assert_approx_eq!(field.lat[0], 45.0, 1e-9);
    assert_approx_eq!(field.lat[99], 36.0, 1e-9);
    assert_approx_eq!(field.lon[0], -130.0, 1e-9);
    assert_approx_eq!(field.lon[9], -121.0, 1e-9);
}

#[test]
fn test_real_rtma_file() {
    let path = require_test_file!("rtma2p5.t12z.2dvaranl_ndfd.grb2");
    let file = Grib2File::open(&path).unwrap();
    let t = file
        .read_first(&MessageFilter::temperature_2m())
        .unwrap()
        .expect("RTMA analysis carries 2 m temperature");
    assert_eq!(t.grid.dimensions(), (2345, 1597));
}
