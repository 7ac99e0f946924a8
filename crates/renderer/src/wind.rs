//! Wind component raster.
//!
//! Each component is shifted from [-128, 127] into a byte with
//! `round((c + 128) / 255 * 255)`, clamped to 0..=255; missing components
//! encode as 0. Red carries the eastward component; green and blue both
//! carry the northward component. Alpha is always 255.

use climate_common::RegularField;

use crate::error::{RenderError, Result};

pub fn encode_component(c: f32) -> u8 {
    if c.is_nan() {
        return 0;
    }
    let scaled = ((c as f64 + 128.0) / 255.0 * 255.0).round();
    scaled.clamp(0.0, 255.0) as u8
}

/// RGBA bytes for the (`u`, `v`) pair, rows reversed like the scalar raster.
pub fn render_wind(u: &RegularField, v: &RegularField) -> Result<Vec<u8>> {
    if !u.same_axes(v) {
        return Err(RenderError::Dimensions(format!(
            "{} is {}x{}, {} is {}x{}",
            u.name,
            u.height(),
            u.width(),
            v.name,
            v.height(),
            v.width()
        )));
    }
    let width = u.width();
    let mut rgba = Vec::with_capacity(u.values.len() * 4);
    if width == 0 {
        return Ok(rgba);
    }
    for (u_row, v_row) in u.values.chunks(width).rev().zip(v.values.chunks(width).rev()) {
        for (&east, &north) in u_row.iter().zip(v_row) {
            let g = encode_component(north);
            rgba.extend_from_slice(&[encode_component(east), g, g, 255]);
        }
    }
    Ok(rgba)
}
