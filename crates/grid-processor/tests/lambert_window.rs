//! Regrid a Lambert conformal patch and crop it to the RTMA window.

use climate_common::{BoundingBox, CurvilinearField};
use grid_processor::{regrid_nearest, CropWindow, Regridder, WorkerPool};
use projection::{coordinate_arrays, LambertConformal, ScanMode};
use test_utils::{create_temperature_grid, create_u_wind_grid};

const NX: usize = 24;
const NY: usize = 18;

fn socal_field(name: &str, values: Vec<f32>) -> CurvilinearField {
    let proj = LambertConformal::from_grib2(31.0, 240.0, 265.0, 25.0, 25.0, 25_000.0, 25_000.0, NX, NY);
    let (lon, lat) = coordinate_arrays(&proj, ScanMode(ScanMode::J_POSITIVE));
    CurvilinearField::new(name, NX, NY, lon, lat, values).unwrap()
}

#[test]
fn test_cropped_bounds_inside_window() {
    let field = socal_field("2t", create_temperature_grid(NX, NY));
    let regular = regrid_nearest(&field).unwrap();
    assert_eq!((regular.width(), regular.height()), (NX, NY));

    let window = CropWindow::new(BoundingBox::rtma_window());
    let cropped = window.crop(&regular).unwrap();
    let bounds = cropped.bounds().unwrap();
    assert!(bounds.min_lon > -118.5 && bounds.max_lon < -114.5);
    assert!(bounds.min_lat > 32.2 && bounds.max_lat < 35.0);
    assert!(bounds.min_lon < bounds.max_lon && bounds.min_lat < bounds.max_lat);
    assert_eq!(
        cropped.values.len(),
        cropped.width() * cropped.height()
    );
}

#[test]
fn test_shared_regridder_matches_per_field() {
    let t = socal_field("2t", create_temperature_grid(NX, NY));
    let u = socal_field("10u", create_u_wind_grid(NX, NY));
    let regridder = Regridder::for_field(&t).unwrap();

    assert_eq!(regridder.regrid(&u).unwrap(), regrid_nearest(&u).unwrap());
    assert!(regridder
        .regrid(&t)
        .unwrap()
        .same_axes(&regridder.regrid(&u).unwrap()));
}

#[test]
fn test_pool_regrid_is_deterministic() {
    let pool = WorkerPool::new(3).unwrap();
    let fields = vec![
        socal_field("10u", create_u_wind_grid(NX, NY)),
        socal_field("2t", create_temperature_grid(NX, NY)),
        socal_field("10u", create_u_wind_grid(NX, NY)),
    ];

    let first = pool
        .try_map_ordered(fields.clone(), |f| regrid_nearest(&f))
        .unwrap();
    let second = pool
        .try_map_ordered(fields, |f| regrid_nearest(&f))
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(first[1].name, "2t");
    assert_eq!(first[0], first[2]);
}
