//! Synthetic field generators with predictable values.
//!
//! All grids are row-major with row 0 first.

/// Temperatures in Kelvin from 270 K (row 0, col 0) rising to ~310 K.
///
/// ```
/// use test_utils::create_temperature_grid;
///
/// let grid = create_temperature_grid(10, 5);
/// assert_eq!(grid.len(), 50);
/// assert_eq!(grid[0], 270.0);
/// assert!(grid[1] > grid[0]);
/// ```
pub fn create_temperature_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let x = col as f32 / width.max(1) as f32;
            let y = row as f32 / height.max(1) as f32;
            data.push(270.0 + x * 25.0 + y * 15.0);
        }
    }
    data
}

/// Eastward wind in m/s, varying smoothly with column between -20 and 20.
pub fn create_u_wind_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for _row in 0..height {
        for col in 0..width {
            let t = col as f32 / (width.max(2) - 1) as f32;
            data.push(-20.0 + 40.0 * t);
        }
    }
    data
}

/// Northward wind in m/s, varying smoothly with row between -10 and 10.
pub fn create_v_wind_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        let t = row as f32 / (height.max(2) - 1) as f32;
        for _col in 0..width {
            data.push(-10.0 + 20.0 * t);
        }
    }
    data
}

/// Replace every `every`-th value (starting at index 0) with NaN.
pub fn with_missing(mut values: Vec<f32>, every: usize) -> Vec<f32> {
    if every == 0 {
        return values;
    }
    for v in values.iter_mut().step_by(every) {
        *v = f32::NAN;
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_range() {
        let grid = create_temperature_grid(20, 10);
        assert!(grid.iter().all(|&t| (270.0..=310.0).contains(&t)));
        assert_eq!(grid[0], 270.0);
    }

    #[test]
    fn test_wind_extremes() {
        let u = create_u_wind_grid(5, 3);
        assert_eq!(u[0], -20.0);
        assert_eq!(u[4], 20.0);
        let v = create_v_wind_grid(5, 3);
        assert_eq!(v[0], -10.0);
        assert_eq!(v[14], 10.0);
    }

    #[test]
    fn test_with_missing() {
        let values = with_missing(vec![1.0; 6], 3);
        assert!(values[0].is_nan() && values[3].is_nan());
        assert_eq!(values[1], 1.0);
    }
}
