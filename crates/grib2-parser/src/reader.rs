//! Opening GRIB2 files and decoding selected messages.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use climate_common::{CurvilinearField, PipeResult};
use tracing::{debug, instrument, warn};

use crate::error::{Grib2Error, Result};
use crate::filter::MessageFilter;
use crate::index::{entry_bytes, Grib2Index, IndexEntry};
use crate::sections::GridDefinition;
use crate::tables::Grib2Tables;

/// A decoded message with its grid.
#[derive(Debug, Clone)]
pub struct Grib2Field {
    pub short_name: String,
    pub type_of_level: String,
    pub level: Option<f64>,
    pub grid: GridDefinition,
    /// Values in storage order; NaN where the bitmap marks a point missing
    pub values: Vec<f32>,
}

impl Grib2Field {
    /// Attach 2D longitude/latitude arrays to the values.
    pub fn into_curvilinear(self) -> PipeResult<CurvilinearField> {
        let (nx, ny) = self.grid.dimensions();
        let (lon, lat) = self.grid.coordinates();
        CurvilinearField::new(self.short_name, nx, ny, lon, lat, self.values)
    }
}

/// An opened GRIB2 file with a validated index.
#[derive(Debug)]
pub struct Grib2File {
    path: PathBuf,
    data: Bytes,
    index: Grib2Index,
}

impl Grib2File {
    /// Open with the surface-analysis short name tables.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_tables(path, &Grib2Tables::surface_analysis())
    }

    /// Open a file, reusing its side-car index when valid.
    ///
    /// A stale index is deleted and rebuilt exactly once; if the rebuild also
    /// fails, that error is returned.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open_with_tables(path: impl AsRef<Path>, tables: &Grib2Tables) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = Bytes::from(std::fs::read(&path)?);
        let index_path = Grib2Index::sidecar_path(&path);

        let index = match Self::load_index(&index_path, &data, tables) {
            Ok(index) => index,
            Err(Grib2Error::StaleIndex { reason, .. }) => {
                warn!(
                    index = %index_path.display(),
                    reason = %reason,
                    "Discarding stale GRIB2 index"
                );
                std::fs::remove_file(&index_path)?;
                Self::rebuild_index(&index_path, &data, tables)?
            }
            Err(e) => return Err(e),
        };

        debug!(messages = index.messages.len(), "Opened GRIB2 file");
        Ok(Self { path, data, index })
    }

    fn load_index(index_path: &Path, data: &[u8], tables: &Grib2Tables) -> Result<Grib2Index> {
        if !index_path.exists() {
            return Self::rebuild_index(index_path, data, tables);
        }
        let index = Grib2Index::read(index_path)?;
        index.validate(index_path, data)?;
        Ok(index)
    }

    fn rebuild_index(index_path: &Path, data: &[u8], tables: &Grib2Tables) -> Result<Grib2Index> {
        let index = Grib2Index::build(data, tables)?;
        if let Err(e) = index.write(index_path) {
            // Read-only cache directories still work, just without reuse.
            warn!(index = %index_path.display(), error = %e, "Could not write GRIB2 index");
        }
        Ok(index)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn index(&self) -> &Grib2Index {
        &self.index
    }

    pub fn messages(&self) -> &[IndexEntry] {
        &self.index.messages
    }

    /// Messages matching `filter`, in file order.
    pub fn select<'a>(&'a self, filter: &'a MessageFilter) -> impl Iterator<Item = &'a IndexEntry> {
        self.index.messages.iter().filter(move |e| filter.matches(e))
    }

    /// Decode the first message matching `filter`.
    pub fn read_first(&self, filter: &MessageFilter) -> Result<Option<Grib2Field>> {
        match self.select(filter).next() {
            Some(entry) => self.read(entry).map(Some),
            None => Ok(None),
        }
    }

    /// Decode one indexed message.
    pub fn read(&self, entry: &IndexEntry) -> Result<Grib2Field> {
        let grid = Grib2Index::grid_definition(entry, &self.data)?;
        let values = decode_values(entry_bytes(entry, &self.data)?)?;

        let (nx, ny) = grid.dimensions();
        if values.len() != nx * ny {
            return Err(Grib2Error::Decode(format!(
                "{} decoded {} values for a {}x{} grid",
                entry.short_name,
                values.len(),
                nx,
                ny
            )));
        }

        Ok(Grib2Field {
            short_name: entry.short_name.clone(),
            type_of_level: entry.type_of_level.clone(),
            level: entry.surface_value,
            grid,
            values,
        })
    }
}

/// Decode the data values of a single message.
fn decode_values(message: &[u8]) -> Result<Vec<f32>> {
    let grib2 = grib::from_reader(Cursor::new(message))
        .map_err(|e| Grib2Error::Decode(e.to_string()))?;
    let (_, submsg) = grib2
        .iter()
        .next()
        .ok_or_else(|| Grib2Error::Decode("message has no submessage".to_string()))?;
    let decoder = grib::Grib2SubmessageDecoder::from(submsg)
        .map_err(|e| Grib2Error::Decode(e.to_string()))?;
    let values = decoder
        .dispatch()
        .map_err(|e| Grib2Error::Decode(e.to_string()))?;
    Ok(values.collect())
}
