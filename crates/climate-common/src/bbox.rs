//! Bounding box types and operations.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A geographic bounding box in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Southern California window the RTMA deployment crops to.
    pub fn rtma_window() -> Self {
        Self::new(-118.5, 32.2, -114.5, 35.0)
    }

    /// Bounding box of a pair of coordinate arrays, ignoring NaN entries.
    ///
    /// Returns `None` when either array has no finite value.
    pub fn from_coords(lon: &[f64], lat: &[f64]) -> Option<Self> {
        let (min_lon, max_lon) = finite_range(lon)?;
        let (min_lat, max_lat) = finite_range(lat)?;
        Some(Self::new(min_lon, min_lat, max_lon, max_lat))
    }

    /// Width of the bounding box in degrees.
    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Height of the bounding box in degrees.
    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// A box is valid when both extents are strictly positive.
    pub fn is_valid(&self) -> bool {
        self.min_lon < self.max_lon && self.min_lat < self.max_lat
    }

    /// Strict (open interval) longitude test.
    pub fn contains_lon(&self, lon: f64) -> bool {
        lon > self.min_lon && lon < self.max_lon
    }

    /// Strict (open interval) latitude test.
    pub fn contains_lat(&self, lat: f64) -> bool {
        lat > self.min_lat && lat < self.max_lat
    }

    /// Point lies strictly inside the box. Points on an edge are outside.
    pub fn contains_open(&self, lon: f64, lat: f64) -> bool {
        self.contains_lon(lon) && self.contains_lat(lat)
    }

    /// `[min_lon, min_lat, max_lon, max_lat]`, the order clients expect.
    pub fn to_array(&self) -> [f64; 4] {
        [self.min_lon, self.min_lat, self.max_lon, self.max_lat]
    }
}

impl FromStr for BoundingBox {
    type Err = BboxParseError;

    /// Parse `"min_lon,min_lat,max_lon,max_lat"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(BboxParseError::InvalidFormat(s.to_string()));
        }

        let mut nums = [0.0f64; 4];
        for (slot, part) in nums.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| BboxParseError::InvalidNumber(part.to_string()))?;
        }

        let bbox = Self::new(nums[0], nums[1], nums[2], nums[3]);
        if !bbox.is_valid() {
            return Err(BboxParseError::Inverted(s.to_string()));
        }
        Ok(bbox)
    }
}

fn finite_range(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

#[derive(Debug, thiserror::Error)]
pub enum BboxParseError {
    #[error("Invalid bounding box format: {0}. Expected 'min_lon,min_lat,max_lon,max_lat'")]
    InvalidFormat(String),

    #[error("Invalid number in bounding box: {0}")]
    InvalidNumber(String),

    #[error("Bounding box has min >= max: {0}")]
    Inverted(String),
}
