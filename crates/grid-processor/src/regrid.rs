//! Nearest-neighbor regridding from curvilinear to regular grids.
//!
//! The target mesh spans the bounding box of the source coordinates with
//! the same number of columns and rows as the source, so resolution is
//! preserved rather than resampled. Each mesh point takes the value of the
//! closest source point by Euclidean distance in degrees; ties go to the
//! lowest source index. Source points with non-finite coordinates are
//! ignored, but points whose value is missing still participate, so missing
//! regions stay missing.

use climate_common::{linspace, BoundingBox, CurvilinearField, RegularField};
use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::error::{GridProcessorError, Result};

/// A regular lon/lat mesh, rows ascending in latitude.
#[derive(Debug, Clone, PartialEq)]
pub struct RegularMesh {
    pub lon: Vec<f64>,
    pub lat: Vec<f64>,
}

impl RegularMesh {
    /// `nx` columns and `ny` rows evenly spaced over `bounds`, both ends included.
    pub fn spanning(bounds: &BoundingBox, nx: usize, ny: usize) -> Self {
        Self {
            lon: linspace(bounds.min_lon, bounds.max_lon, nx),
            lat: linspace(bounds.min_lat, bounds.max_lat, ny),
        }
    }

    pub fn width(&self) -> usize {
        self.lon.len()
    }

    pub fn height(&self) -> usize {
        self.lat.len()
    }
}

/// Precomputed source index for every mesh point.
///
/// Fields on the same source grid can share one regridder; applying it is a
/// gather.
#[derive(Debug, Clone)]
pub struct Regridder {
    mesh: RegularMesh,
    source_len: usize,
    nearest: Vec<u32>,
}

impl Regridder {
    /// Build a regridder for the coordinates of `field`.
    pub fn for_field(field: &CurvilinearField) -> Result<Self> {
        Self::new(&field.lon, &field.lat, field.nx, field.ny)
    }

    #[instrument(skip(lon, lat))]
    pub fn new(lon: &[f64], lat: &[f64], nx: usize, ny: usize) -> Result<Self> {
        if lon.len() != lat.len() || lon.len() != nx * ny {
            return Err(GridProcessorError::mismatch(format!(
                "{} longitudes and {} latitudes for a {}x{} grid",
                lon.len(),
                lat.len(),
                nx,
                ny
            )));
        }
        if lon.len() > u32::MAX as usize {
            return Err(GridProcessorError::invalid_grid("grid too large"));
        }
        let bounds = BoundingBox::from_coords(lon, lat)
            .ok_or_else(|| GridProcessorError::invalid_grid("no finite coordinates"))?;

        let mesh = RegularMesh::spanning(&bounds, nx, ny);
        let hash = SpatialHash::build(lon, lat, &bounds, nx, ny);

        let width = mesh.width();
        let mut nearest = vec![0u32; width * mesh.height()];
        nearest
            .par_chunks_mut(width.max(1))
            .zip(mesh.lat.par_iter())
            .for_each(|(row, &y)| {
                for (slot, &x) in row.iter_mut().zip(&mesh.lon) {
                    // from_coords succeeded, so at least one finite point exists
                    *slot = hash.nearest(lon, lat, x, y).unwrap_or(0) as u32;
                }
            });

        debug!(
            width,
            height = mesh.height(),
            "Built nearest-neighbor regridder"
        );
        Ok(Self {
            mesh,
            source_len: lon.len(),
            nearest,
        })
    }

    pub fn mesh(&self) -> &RegularMesh {
        &self.mesh
    }

    /// Source index feeding mesh point (`row`, `col`).
    pub fn source_index(&self, row: usize, col: usize) -> usize {
        self.nearest[row * self.mesh.width() + col] as usize
    }

    /// Gather `values` (source storage order) onto the mesh.
    pub fn apply(&self, values: &[f32]) -> Result<Vec<f32>> {
        if values.len() != self.source_len {
            return Err(GridProcessorError::mismatch(format!(
                "{} values for a grid of {} points",
                values.len(),
                self.source_len
            )));
        }
        Ok(self.nearest.iter().map(|&k| values[k as usize]).collect())
    }

    /// Regrid a field whose coordinates match this regridder's source.
    pub fn regrid(&self, field: &CurvilinearField) -> Result<RegularField> {
        let values = self.apply(&field.values)?;
        RegularField::new(
            field.name.clone(),
            self.mesh.lon.clone(),
            self.mesh.lat.clone(),
            values,
        )
        .map_err(|e| GridProcessorError::mismatch(e.to_string()))
    }
}

/// Regrid one field onto a mesh spanning its own bounds.
pub fn regrid_nearest(field: &CurvilinearField) -> Result<RegularField> {
    Regridder::for_field(field)?.regrid(field)
}

/// Uniform bucket grid over the source bounds.
struct SpatialHash {
    min_lon: f64,
    min_lat: f64,
    cell_w: f64,
    cell_h: f64,
    cols: usize,
    rows: usize,
    /// Source indices per bucket, ascending
    buckets: Vec<Vec<u32>>,
}

impl SpatialHash {
    fn build(lon: &[f64], lat: &[f64], bounds: &BoundingBox, nx: usize, ny: usize) -> Self {
        // About one source point per bucket
        let cols = nx.max(1);
        let rows = ny.max(1);
        let cell_w = (bounds.width() / cols as f64).max(f64::EPSILON);
        let cell_h = (bounds.height() / rows as f64).max(f64::EPSILON);

        let mut hash = Self {
            min_lon: bounds.min_lon,
            min_lat: bounds.min_lat,
            cell_w,
            cell_h,
            cols,
            rows,
            buckets: vec![Vec::new(); cols * rows],
        };
        for (k, (&x, &y)) in lon.iter().zip(lat).enumerate() {
            if x.is_finite() && y.is_finite() {
                let (c, r) = hash.cell(x, y);
                hash.buckets[r * cols + c].push(k as u32);
            }
        }
        hash
    }

    fn cell(&self, x: f64, y: f64) -> (usize, usize) {
        let c = ((x - self.min_lon) / self.cell_w).floor();
        let r = ((y - self.min_lat) / self.cell_h).floor();
        (
            (c.max(0.0) as usize).min(self.cols - 1),
            (r.max(0.0) as usize).min(self.rows - 1),
        )
    }

    /// Search rings of buckets outward until no unvisited bucket can hold
    /// a closer point.
    fn nearest(&self, lon: &[f64], lat: &[f64], x: f64, y: f64) -> Option<usize> {
        let (c0, r0) = self.cell(x, y);
        let step = self.cell_w.min(self.cell_h);
        let max_ring = self.cols.max(self.rows);
        let mut best: Option<(f64, u32)> = None;

        for ring in 0..=max_ring {
            if let Some((d2, _)) = best {
                // Points beyond this ring are at least (ring - 1) cells away
                let reach = (ring as f64 - 1.0).max(0.0) * step;
                if reach * reach > d2 {
                    break;
                }
            }
            for (c, r) in ring_cells(c0, r0, ring, self.cols, self.rows) {
                for &k in &self.buckets[r * self.cols + c] {
                    let dx = lon[k as usize] - x;
                    let dy = lat[k as usize] - y;
                    let d2 = dx * dx + dy * dy;
                    let better = match best {
                        None => true,
                        Some((bd, bk)) => d2 < bd || (d2 == bd && k < bk),
                    };
                    if better {
                        best = Some((d2, k));
                    }
                }
            }
        }
        best.map(|(_, k)| k as usize)
    }
}

/// Bucket coordinates at Chebyshev distance `ring` from (`c0`, `r0`),
/// clipped to the grid.
fn ring_cells(
    c0: usize,
    r0: usize,
    ring: usize,
    cols: usize,
    rows: usize,
) -> impl Iterator<Item = (usize, usize)> {
    let ring = ring as isize;
    let (c0, r0) = (c0 as isize, r0 as isize);
    let (cols, rows) = (cols as isize, rows as isize);
    (r0 - ring..=r0 + ring)
        .flat_map(move |r| (c0 - ring..=c0 + ring).map(move |c| (c, r)))
        .filter(move |&(c, r)| (c - c0).abs() == ring || (r - r0).abs() == ring)
        .filter(move |&(c, r)| c >= 0 && r >= 0 && c < cols && r < rows)
        .map(|(c, r)| (c as usize, r as usize))
}
