//! PNG encoding for RGBA rasters.
//!
//! Rasters travel as flat byte lists in the payload; PNG output is only used
//! to dump them for inspection.

use std::io::Write;

use tracing::debug;

use crate::error::{RenderError, Result};

const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Encode `pixels` (4 bytes per pixel, top row first) as an RGBA PNG.
pub fn encode_rgba(pixels: &[u8], width: usize, height: usize) -> Result<Vec<u8>> {
    if pixels.len() != width * height * 4 {
        return Err(RenderError::Dimensions(format!(
            "{} bytes for a {}x{} RGBA image",
            pixels.len(),
            width,
            height
        )));
    }

    let mut png = Vec::new();
    png.extend_from_slice(&SIGNATURE);

    // IHDR chunk
    let mut ihdr_data = Vec::with_capacity(13);
    ihdr_data.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr_data.extend_from_slice(&(height as u32).to_be_bytes());
    ihdr_data.push(8); // bit depth
    ihdr_data.push(6); // color type (RGBA)
    ihdr_data.push(0); // compression method
    ihdr_data.push(0); // filter method
    ihdr_data.push(0); // interlace method
    write_chunk(&mut png, b"IHDR", &ihdr_data);

    let idat_data = deflate_idat_rgba(pixels, width, height)
        .map_err(|e| RenderError::Encode(format!("IDAT compression failed: {}", e)))?;
    write_chunk(&mut png, b"IDAT", &idat_data);

    write_chunk(&mut png, b"IEND", &[]);

    debug!(width, height, size = png.len(), "Encoded PNG");
    Ok(png)
}

/// Length, type, data, CRC over type + data.
fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

/// Prefix every scanline with filter type 0 and zlib-compress.
fn deflate_idat_rgba(pixels: &[u8], width: usize, height: usize) -> std::io::Result<Vec<u8>> {
    let stride = width * 4;
    let mut uncompressed = Vec::with_capacity(height * (1 + stride));
    for row in pixels.chunks(stride.max(1)).take(height) {
        uncompressed.push(0);
        uncompressed.extend_from_slice(row);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder.write_all(&uncompressed)?;
    encoder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_png_structure() {
        let pixels = vec![255u8; 3 * 2 * 4];
        let png = encode_rgba(&pixels, 3, 2).unwrap();
        assert_eq!(&png[..8], &SIGNATURE);
        assert_eq!(&png[12..16], b"IHDR");
        assert_eq!(u32::from_be_bytes(png[16..20].try_into().unwrap()), 3);
        assert_eq!(u32::from_be_bytes(png[20..24].try_into().unwrap()), 2);
        assert_eq!(&png[png.len() - 8..png.len() - 4], b"IEND");
    }

    #[test]
    fn test_idat_inflates_to_filtered_rows() {
        let pixels: Vec<u8> = (0..16).collect();
        let idat = deflate_idat_rgba(&pixels, 2, 2).unwrap();
        let mut out = Vec::new();
        flate2::read::ZlibDecoder::new(&idat[..])
            .read_to_end(&mut out)
            .unwrap();
        assert_eq!(out.len(), 2 * (1 + 8));
        assert_eq!(out[0], 0);
        assert_eq!(&out[1..9], &pixels[..8]);
        assert_eq!(out[9], 0);
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert!(matches!(
            encode_rgba(&[0u8; 5], 1, 1),
            Err(RenderError::Dimensions(_))
        ));
    }

    #[test]
    fn test_decodes_with_image_crate() {
        let pixels = vec![10, 20, 30, 255, 40, 50, 60, 0];
        let png = encode_rgba(&pixels, 2, 1).unwrap();
        let img = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(img.into_raw(), pixels);
    }
}
