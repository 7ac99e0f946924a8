//! Open-window cropping of regular fields.

use climate_common::{BoundingBox, RegularField};
use tracing::debug;

use crate::error::{GridProcessorError, Result};

/// Rows and columns of a mesh that lie strictly inside a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CropMask {
    pub cols: Vec<usize>,
    pub rows: Vec<usize>,
}

impl CropMask {
    pub fn width(&self) -> usize {
        self.cols.len()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cols.is_empty() || self.rows.is_empty()
    }

    /// Keep only the masked rows and columns of `field`.
    pub fn apply(&self, field: &RegularField) -> Result<RegularField> {
        let width = field.width();
        let out_of_range = self.cols.iter().any(|&c| c >= width)
            || self.rows.iter().any(|&r| r >= field.height());
        if out_of_range {
            return Err(GridProcessorError::mismatch(format!(
                "{}: mask exceeds a {}x{} mesh",
                field.name,
                field.height(),
                width
            )));
        }

        let lon = self.cols.iter().map(|&c| field.lon[c]).collect();
        let lat = self.rows.iter().map(|&r| field.lat[r]).collect();
        let mut values = Vec::with_capacity(self.width() * self.height());
        for &r in &self.rows {
            let row = &field.values[r * width..(r + 1) * width];
            values.extend(self.cols.iter().map(|&c| row[c]));
        }

        RegularField::new(field.name.clone(), lon, lat, values)
            .map_err(|e| GridProcessorError::mismatch(e.to_string()))
    }
}

/// A fixed geographic window with exclusive edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropWindow {
    pub bbox: BoundingBox,
}

impl CropWindow {
    pub fn new(bbox: BoundingBox) -> Self {
        Self { bbox }
    }

    /// Mask for a mesh with the given axes.
    pub fn mask(&self, lon: &[f64], lat: &[f64]) -> CropMask {
        CropMask {
            cols: indices_inside(lon, |x| self.bbox.contains_lon(x)),
            rows: indices_inside(lat, |y| self.bbox.contains_lat(y)),
        }
    }

    pub fn crop(&self, field: &RegularField) -> Result<RegularField> {
        let mask = self.mask(&field.lon, &field.lat);
        if mask.is_empty() {
            return Err(GridProcessorError::EmptyCrop(self.describe()));
        }
        mask.apply(field)
    }

    /// Crop every field with the mask of the first one.
    ///
    /// All fields must sit on exactly the same mesh as the first.
    pub fn crop_all(&self, fields: &[RegularField]) -> Result<Vec<RegularField>> {
        let Some(first) = fields.first() else {
            return Ok(Vec::new());
        };
        let mask = self.mask(&first.lon, &first.lat);
        if mask.is_empty() {
            return Err(GridProcessorError::EmptyCrop(self.describe()));
        }

        let cropped = fields
            .iter()
            .map(|field| {
                if !field.same_axes(first) {
                    return Err(GridProcessorError::mismatch(format!(
                        "{} is not on the same mesh as {}",
                        field.name, first.name
                    )));
                }
                mask.apply(field)
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            fields = cropped.len(),
            width = mask.width(),
            height = mask.height(),
            "Cropped fields to window"
        );
        Ok(cropped)
    }

    fn describe(&self) -> String {
        let [a, b, c, d] = self.bbox.to_array();
        format!("({}, {}) x ({}, {})", a, c, b, d)
    }
}

fn indices_inside(axis: &[f64], inside: impl Fn(f64) -> bool) -> Vec<usize> {
    axis.iter()
        .enumerate()
        .filter(|&(_, &v)| inside(v))
        .map(|(i, _)| i)
        .collect()
}
