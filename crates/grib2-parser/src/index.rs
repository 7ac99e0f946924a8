//! Side-car message index.
//!
//! The index is a small JSON document stored next to the GRIB2 file
//! (`<file>.idx`). It records where every message starts and what it holds,
//! so reopening a file only needs to validate offsets rather than walk every
//! section again. An index that cannot be parsed, was written for a file of a
//! different length, or points at bytes that are not a message start is
//! reported as [`Grib2Error::StaleIndex`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Grib2Error, Result};
use crate::sections::{self, GridDefinition, MAGIC};
use crate::tables::Grib2Tables;

pub const INDEX_VERSION: u32 = 1;

/// One message in the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub offset: u64,
    pub length: u64,
    pub discipline: u8,
    pub category: u8,
    pub number: u8,
    pub surface_type: u8,
    pub surface_value: Option<f64>,
    pub grid_template: u16,
    pub short_name: String,
    pub type_of_level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grib2Index {
    pub version: u32,
    pub file_length: u64,
    pub messages: Vec<IndexEntry>,
}

impl Grib2Index {
    /// Index path for a data file: the file name with `.idx` appended.
    pub fn sidecar_path(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_owned();
        name.push(".idx");
        PathBuf::from(name)
    }

    /// Walk every message in `data`.
    pub fn build(data: &[u8], tables: &Grib2Tables) -> Result<Self> {
        let spans = sections::scan_messages(data)?;
        if spans.is_empty() {
            return Err(Grib2Error::invalid_format("no GRIB2 messages found"));
        }

        let mut messages = Vec::with_capacity(spans.len());
        for span in spans {
            let message = &data[span.offset..span.offset + span.length];
            let layout = sections::split_sections(message)?;
            let product = sections::parse_product_definition(sections::section(
                message, &layout, 4,
            )?)?;
            let grid_sec = sections::section(message, &layout, 3)?;
            let grid_template = if grid_sec.len() >= 14 {
                sections::read_u16(grid_sec, 12)
            } else {
                return Err(Grib2Error::section(3, "too short for a template number"));
            };

            let key = (span.discipline, product.category, product.number);
            messages.push(IndexEntry {
                offset: span.offset as u64,
                length: span.length as u64,
                discipline: span.discipline,
                category: product.category,
                number: product.number,
                surface_type: product.surface_type,
                surface_value: product.surface_value,
                grid_template,
                short_name: tables.short_name(key, product.surface_type, product.surface_value),
                type_of_level: tables.level_name(product.surface_type),
            });
        }

        debug!(messages = messages.len(), "Built GRIB2 index");
        Ok(Self {
            version: INDEX_VERSION,
            file_length: data.len() as u64,
            messages,
        })
    }

    /// Read an index file. Parse failures are reported as stale.
    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let index: Grib2Index = serde_json::from_str(&text)
            .map_err(|e| Grib2Error::stale(path, format!("unreadable index: {}", e)))?;
        if index.version != INDEX_VERSION {
            return Err(Grib2Error::stale(
                path,
                format!("index version {} != {}", index.version, INDEX_VERSION),
            ));
        }
        Ok(index)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string(self)
            .map_err(|e| Grib2Error::invalid_format(format!("index serialization: {}", e)))?;
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Check that this index still describes `data`.
    pub fn validate(&self, path: &Path, data: &[u8]) -> Result<()> {
        if self.file_length != data.len() as u64 {
            return Err(Grib2Error::stale(
                path,
                format!(
                    "indexed {} bytes, file has {}",
                    self.file_length,
                    data.len()
                ),
            ));
        }
        if self.messages.is_empty() {
            return Err(Grib2Error::stale(path, "index lists no messages"));
        }
        for entry in &self.messages {
            let start = entry.offset as usize;
            let end = start.saturating_add(entry.length as usize);
            let ok = end <= data.len()
                && data[start..].starts_with(MAGIC)
                && data[..end].ends_with(sections::END_MARKER);
            if !ok {
                return Err(Grib2Error::stale(
                    path,
                    format!("no message at offset {} (+{})", entry.offset, entry.length),
                ));
            }
        }
        Ok(())
    }

    /// Decode the grid definition of `entry`.
    pub fn grid_definition(entry: &IndexEntry, data: &[u8]) -> Result<GridDefinition> {
        let message = entry_bytes(entry, data)?;
        let layout = sections::split_sections(message)?;
        GridDefinition::parse(sections::section(message, &layout, 3)?)
    }
}

/// Bytes of the message described by `entry`.
pub(crate) fn entry_bytes<'a>(entry: &IndexEntry, data: &'a [u8]) -> Result<&'a [u8]> {
    let start = entry.offset as usize;
    let end = start.saturating_add(entry.length as usize);
    data.get(start..end).ok_or_else(|| {
        Grib2Error::invalid_format(format!(
            "message at offset {} runs past end of file",
            entry.offset
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sidecar_path() {
        let path = Grib2Index::sidecar_path(Path::new("/tmp/rtma2p5.t12z.2dvaranl_ndfd.grb2"));
        assert_eq!(path, PathBuf::from("/tmp/rtma2p5.t12z.2dvaranl_ndfd.grb2.idx"));
    }

    #[test]
    fn test_validate_rejects_length_change() {
        let index = Grib2Index {
            version: INDEX_VERSION,
            file_length: 10,
            messages: vec![],
        };
        let err = index.validate(Path::new("x.idx"), &[0u8; 12]).unwrap_err();
        assert!(matches!(err, Grib2Error::StaleIndex { .. }));
    }
}
