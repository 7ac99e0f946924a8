//! Scalar field rasters and their numeric side channel.
//!
//! Field rows are stored south to north; image rows run top to bottom, so
//! both the pixels and the values are emitted with the row order reversed.

use climate_common::{is_missing, RegularField};
use rayon::prelude::*;

use crate::colormap::{Colormap, Normalize};
use crate::error::Result;

/// RGBA pixels plus the rounded values they were drawn from.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarRaster {
    pub width: usize,
    pub height: usize,
    /// `width * height * 4` bytes, top row first
    pub rgba: Vec<u8>,
    /// `width * height` values rounded to 2 decimals, top row first;
    /// `None` where the field is missing
    pub values: Vec<Option<f64>>,
}

impl ScalarRaster {
    /// Alpha byte of pixel `i`.
    pub fn alpha(&self, i: usize) -> u8 {
        self.rgba[i * 4 + 3]
    }
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Flattened values with rows reversed, rounded, missing as `None`.
pub fn flip_values(field: &RegularField) -> Vec<Option<f64>> {
    let width = field.width();
    if width == 0 {
        return Vec::new();
    }
    field
        .values
        .chunks(width)
        .rev()
        .flatten()
        .map(|&v| {
            if is_missing(v) {
                None
            } else {
                Some(round2(v as f64))
            }
        })
        .collect()
}

/// Color every cell of `field` through `cmap` over `norm`.
pub fn render_scalar(field: &RegularField, cmap: &Colormap, norm: Normalize) -> Result<ScalarRaster> {
    let (width, height) = (field.width(), field.height());
    let mut rgba = vec![0u8; width * height * 4];

    if width > 0 {
        rgba.par_chunks_mut(width * 4)
            .zip(field.values.par_chunks(width).rev())
            .for_each(|(out, row)| {
                for (px, &v) in out.chunks_exact_mut(4).zip(row) {
                    let color = if is_missing(v) {
                        cmap.rgba(f64::NAN)
                    } else {
                        cmap.rgba(norm.apply(v as f64))
                    };
                    px.copy_from_slice(&color);
                }
            });
    }

    Ok(ScalarRaster {
        width,
        height,
        rgba,
        values: flip_values(field),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(values: Vec<f32>) -> RegularField {
        RegularField::new("t", vec![0.0, 1.0], vec![0.0, 1.0], values).unwrap()
    }

    #[test]
    fn test_rows_reversed() {
        let f = field(vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(
            flip_values(&f),
            vec![Some(3.0), Some(4.0), Some(1.0), Some(2.0)]
        );
    }

    #[test]
    fn test_values_rounded() {
        let f = field(vec![1.234, 2.345_6, -0.005_1, f32::NAN]);
        let values = flip_values(&f);
        assert_eq!(values[0], Some(-0.01));
        assert_eq!(values[1], None);
        assert_eq!(values[2], Some(1.23));
        assert_eq!(values[3], Some(2.35));
    }

    #[test]
    fn test_alpha_follows_missing() {
        let f = field(vec![0.0, f32::NAN, 60.0, 120.0]);
        let raster = render_scalar(&f, &Colormap::turbo(), Normalize::new(0.0, 120.0).unwrap()).unwrap();
        assert_eq!(raster.rgba.len(), 16);
        for i in 0..4 {
            let expect = if raster.values[i].is_none() { 0 } else { 255 };
            assert_eq!(raster.alpha(i), expect);
        }
        // Bottom-right input cell (NaN) ends up in the bottom row
        assert_eq!(raster.alpha(3), 0);
    }

    #[test]
    fn test_deterministic() {
        let f = field(vec![10.0, 20.0, 30.0, 40.0]);
        let cmap = Colormap::turbo();
        let norm = Normalize::new(0.0, 120.0).unwrap();
        assert_eq!(
            render_scalar(&f, &cmap, norm).unwrap(),
            render_scalar(&f, &cmap, norm).unwrap()
        );
    }
}
