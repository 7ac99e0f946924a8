//! Synthetic GRIB2 messages.
//!
//! Messages use simple packing (template 5.0, 16 bits) and carry a bitmap
//! when any value is NaN, so missing points survive the round trip.

use std::path::Path;

/// Grid definition template to emit in section 3.
#[derive(Debug, Clone)]
pub enum GridTemplate {
    /// Template 3.0, coordinates in microdegrees
    LatLon {
        la1: i32,
        lo1: i32,
        la2: i32,
        lo2: i32,
        di: u32,
        dj: u32,
    },
    /// Template 3.30, angles in microdegrees, spacing in millimeters
    Lambert {
        la1: i32,
        lo1: i32,
        lov: i32,
        latin1: i32,
        latin2: i32,
        dx: u32,
        dy: u32,
    },
}

/// Builds one GRIB2 message.
#[derive(Debug, Clone)]
pub struct Grib2Builder {
    discipline: u8,
    center: u16,
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    ni: u32,
    nj: u32,
    grid: GridTemplate,
    scanning_mode: u8,
    param_category: u8,
    param_number: u8,
    level_type: u8,
    level_value: u32,
    data_values: Vec<f32>,
}

impl Grib2Builder {
    /// 24x18 Lambert conformal grid (25 km) over southern California,
    /// RTMA projection parameters, south-to-north scanning.
    pub fn new_lambert() -> Self {
        let (ni, nj) = (24, 18);
        Self {
            discipline: 0,
            center: 7,
            year: 2024,
            month: 1,
            day: 15,
            hour: 12,
            ni,
            nj,
            grid: GridTemplate::Lambert {
                la1: 31_000_000,
                lo1: 240_000_000,
                lov: 265_000_000,
                latin1: 25_000_000,
                latin2: 25_000_000,
                dx: 25_000_000,
                dy: 25_000_000,
            },
            scanning_mode: 0x40,
            param_category: 0,
            param_number: 0,
            level_type: 103,
            level_value: 2,
            data_values: vec![288.15; (ni * nj) as usize],
        }
    }

    /// 10x10 one-degree lat/lon grid from 45N 130W, north-to-south scanning.
    pub fn new_latlon() -> Self {
        let (ni, nj) = (10, 10);
        Self {
            discipline: 0,
            center: 7,
            year: 2024,
            month: 1,
            day: 15,
            hour: 12,
            ni,
            nj,
            grid: GridTemplate::LatLon {
                la1: 45_000_000,
                lo1: 230_000_000,
                la2: 36_000_000,
                lo2: 239_000_000,
                di: 1_000_000,
                dj: 1_000_000,
            },
            scanning_mode: 0x00,
            param_category: 0,
            param_number: 0,
            level_type: 103,
            level_value: 2,
            data_values: vec![288.15; (ni * nj) as usize],
        }
    }

    /// 10 m eastward wind on the current grid.
    pub fn u_wind_10m(self) -> Self {
        self.with_parameter(2, 2).with_level(103, 10)
    }

    /// 10 m northward wind on the current grid.
    pub fn v_wind_10m(self) -> Self {
        self.with_parameter(2, 3).with_level(103, 10)
    }

    /// 2 m temperature on the current grid.
    pub fn temperature_2m(self) -> Self {
        self.with_parameter(0, 0).with_level(103, 2)
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.ni as usize, self.nj as usize)
    }

    pub fn with_reference_time(mut self, year: u16, month: u8, day: u8, hour: u8) -> Self {
        self.year = year;
        self.month = month;
        self.day = day;
        self.hour = hour;
        self
    }

    pub fn with_grid(mut self, ni: u32, nj: u32) -> Self {
        self.ni = ni;
        self.nj = nj;
        self.data_values = vec![0.0; (ni * nj) as usize];
        self
    }

    pub fn with_scanning_mode(mut self, mode: u8) -> Self {
        self.scanning_mode = mode;
        self
    }

    pub fn with_parameter(mut self, category: u8, number: u8) -> Self {
        self.param_category = category;
        self.param_number = number;
        self
    }

    pub fn with_level(mut self, level_type: u8, level_value: u32) -> Self {
        self.level_type = level_type;
        self.level_value = level_value;
        self
    }

    pub fn with_constant_value(mut self, value: f32) -> Self {
        self.data_values = vec![value; (self.ni * self.nj) as usize];
        self
    }

    pub fn with_data(mut self, data: Vec<f32>) -> Self {
        assert_eq!(data.len(), (self.ni * self.nj) as usize, "data length must match grid");
        self.data_values = data;
        self
    }

    /// Complete message bytes.
    pub fn build(&self) -> Vec<u8> {
        let sections = [
            self.build_section1(),
            self.build_section3(),
            self.build_section4(),
            self.build_section5(),
            self.build_section6(),
            self.build_section7(),
        ];
        let body_len: usize = sections.iter().map(Vec::len).sum();
        let message_length = 16 + body_len + 4;

        let mut message = Vec::with_capacity(message_length);
        message.extend_from_slice(b"GRIB");
        message.extend_from_slice(&[0, 0]);
        message.push(self.discipline);
        message.push(2);
        message.extend_from_slice(&(message_length as u64).to_be_bytes());
        for section in &sections {
            message.extend_from_slice(section);
        }
        message.extend_from_slice(b"7777");
        message
    }

    fn present_values(&self) -> Vec<f32> {
        self.data_values.iter().copied().filter(|v| !v.is_nan()).collect()
    }

    fn build_section1(&self) -> Vec<u8> {
        let mut section = Vec::with_capacity(21);
        section.extend_from_slice(&21u32.to_be_bytes());
        section.push(1);
        section.extend_from_slice(&self.center.to_be_bytes());
        section.extend_from_slice(&0u16.to_be_bytes()); // Sub-center
        section.push(2); // Master table version
        section.push(1); // Local table version
        section.push(0); // Significance of reference time (analysis)
        section.extend_from_slice(&self.year.to_be_bytes());
        section.push(self.month);
        section.push(self.day);
        section.push(self.hour);
        section.push(0); // Minute
        section.push(0); // Second
        section.push(0); // Production status (operational)
        section.push(0); // Type of data (analysis)
        section
    }

    fn build_section3(&self) -> Vec<u8> {
        let mut body = Vec::new();
        body.push(0); // Source of grid definition
        body.extend_from_slice(&(self.ni * self.nj).to_be_bytes());
        body.push(0); // Octets for optional list
        body.push(0); // Interpretation of optional list

        let template: u16 = match self.grid {
            GridTemplate::LatLon { .. } => 0,
            GridTemplate::Lambert { .. } => 30,
        };
        body.extend_from_slice(&template.to_be_bytes());

        // Shape of the earth: spherical, radius 6371229 m
        body.push(6);
        body.push(0);
        body.extend_from_slice(&0u32.to_be_bytes());
        body.push(0);
        body.extend_from_slice(&0u32.to_be_bytes());
        body.push(0);
        body.extend_from_slice(&0u32.to_be_bytes());

        body.extend_from_slice(&self.ni.to_be_bytes());
        body.extend_from_slice(&self.nj.to_be_bytes());

        match self.grid {
            GridTemplate::LatLon {
                la1,
                lo1,
                la2,
                lo2,
                di,
                dj,
            } => {
                body.extend_from_slice(&0u32.to_be_bytes()); // Basic angle
                body.extend_from_slice(&0xFFFF_FFFFu32.to_be_bytes()); // Subdivisions
                body.extend_from_slice(&sign_magnitude_i32(la1));
                body.extend_from_slice(&sign_magnitude_i32(lo1));
                body.push(48); // Resolution and component flags
                body.extend_from_slice(&sign_magnitude_i32(la2));
                body.extend_from_slice(&sign_magnitude_i32(lo2));
                body.extend_from_slice(&di.to_be_bytes());
                body.extend_from_slice(&dj.to_be_bytes());
                body.push(self.scanning_mode);
            }
            GridTemplate::Lambert {
                la1,
                lo1,
                lov,
                latin1,
                latin2,
                dx,
                dy,
            } => {
                body.extend_from_slice(&sign_magnitude_i32(la1));
                body.extend_from_slice(&sign_magnitude_i32(lo1));
                body.push(8); // Resolution and component flags
                body.extend_from_slice(&sign_magnitude_i32(latin1)); // LaD
                body.extend_from_slice(&sign_magnitude_i32(lov));
                body.extend_from_slice(&dx.to_be_bytes());
                body.extend_from_slice(&dy.to_be_bytes());
                body.push(0); // Projection centre flag
                body.push(self.scanning_mode);
                body.extend_from_slice(&sign_magnitude_i32(latin1));
                body.extend_from_slice(&sign_magnitude_i32(latin2));
                body.extend_from_slice(&sign_magnitude_i32(-90_000_000)); // South pole lat
                body.extend_from_slice(&0u32.to_be_bytes()); // South pole lon
            }
        }

        with_header(3, body)
    }

    fn build_section4(&self) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&0u16.to_be_bytes()); // Coordinate values
        body.extend_from_slice(&0u16.to_be_bytes()); // Template 4.0
        body.push(self.param_category);
        body.push(self.param_number);
        body.push(0); // Type of generating process (analysis)
        body.push(0); // Background generating process
        body.push(0); // Analysis or forecast process
        body.extend_from_slice(&0u16.to_be_bytes()); // Hours of cutoff
        body.push(0); // Minutes of cutoff
        body.push(1); // Time range unit (hours)
        body.extend_from_slice(&0u32.to_be_bytes()); // Forecast time
        body.push(self.level_type);
        body.push(0); // Scale factor
        body.extend_from_slice(&self.level_value.to_be_bytes());
        body.push(255); // Second surface (none)
        body.push(0);
        body.extend_from_slice(&0u32.to_be_bytes());
        with_header(4, body)
    }

    fn packing(&self) -> (f32, i16, u8) {
        let present = self.present_values();
        let (min_val, max_val) = present.iter().fold(
            (f32::INFINITY, f32::NEG_INFINITY),
            |(min, max), &v| (min.min(v), max.max(v)),
        );
        if present.is_empty() {
            return (0.0, 0, 0);
        }
        let range = max_val - min_val;
        if range == 0.0 {
            return (min_val, 0, 0);
        }
        // value = R + X * 2^E with X < 2^16
        let e = (range / 65535.0).log2().ceil() as i16;
        (min_val, e, 16)
    }

    fn build_section5(&self) -> Vec<u8> {
        let (reference, e, bits) = self.packing();
        let mut body = Vec::new();
        body.extend_from_slice(&(self.present_values().len() as u32).to_be_bytes());
        body.extend_from_slice(&0u16.to_be_bytes()); // Template 5.0
        body.extend_from_slice(&reference.to_be_bytes());
        body.extend_from_slice(&sign_magnitude_i16(e));
        body.extend_from_slice(&sign_magnitude_i16(0)); // Decimal scale factor
        body.push(bits);
        body.push(0); // Original field type (floating point)
        with_header(5, body)
    }

    fn build_section6(&self) -> Vec<u8> {
        if !self.data_values.iter().any(|v| v.is_nan()) {
            return with_header(6, vec![255]);
        }
        let mut body = vec![0u8]; // Bitmap follows
        let mut bitmap = vec![0u8; self.data_values.len().div_ceil(8)];
        for (i, v) in self.data_values.iter().enumerate() {
            if !v.is_nan() {
                bitmap[i / 8] |= 0x80 >> (i % 8);
            }
        }
        body.extend_from_slice(&bitmap);
        with_header(6, body)
    }

    fn build_section7(&self) -> Vec<u8> {
        let (reference, e, bits) = self.packing();
        let mut packed = Vec::new();
        if bits > 0 {
            let scale = 2f32.powi(e as i32);
            for v in self.present_values() {
                let x = ((v - reference) / scale).round().clamp(0.0, 65535.0) as u16;
                packed.extend_from_slice(&x.to_be_bytes());
            }
        }
        with_header(7, packed)
    }
}

/// Write several messages back to back into one file.
pub fn write_grib2(path: &Path, messages: &[Vec<u8>]) -> std::io::Result<()> {
    std::fs::write(path, messages.concat())
}

fn with_header(number: u8, body: Vec<u8>) -> Vec<u8> {
    let mut section = Vec::with_capacity(body.len() + 5);
    section.extend_from_slice(&((body.len() + 5) as u32).to_be_bytes());
    section.push(number);
    section.extend_from_slice(&body);
    section
}

fn sign_magnitude_i32(v: i32) -> [u8; 4] {
    let magnitude = v.unsigned_abs() & 0x7fff_ffff;
    let raw = if v < 0 { magnitude | 0x8000_0000 } else { magnitude };
    raw.to_be_bytes()
}

fn sign_magnitude_i16(v: i16) -> [u8; 2] {
    let magnitude = v.unsigned_abs() & 0x7fff;
    let raw = if v < 0 { magnitude | 0x8000 } else { magnitude };
    raw.to_be_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_lambert_message() {
        let data = Grib2Builder::new_lambert().build();
        assert_eq!(&data[0..4], b"GRIB");
        assert_eq!(data[7], 2);
        assert_eq!(&data[data.len() - 4..], b"7777");
        let len = u64::from_be_bytes(data[8..16].try_into().unwrap());
        assert_eq!(len as usize, data.len());
        // Section 3 follows the 21 byte section 1 and is 81 bytes long
        assert_eq!(&data[37..41], &81u32.to_be_bytes());
        assert_eq!(data[41], 3);
    }

    #[test]
    fn test_sign_magnitude() {
        assert_eq!(sign_magnitude_i16(-10), [0x80, 0x0a]);
        assert_eq!(sign_magnitude_i32(-90_000_000)[0] & 0x80, 0x80);
    }

    #[test]
    fn test_bitmap_marks_missing() {
        let mut values = vec![1.0f32; 24 * 18];
        values[1] = f32::NAN;
        let builder = Grib2Builder::new_lambert().with_data(values);
        let section6 = builder.build_section6();
        assert_eq!(section6[5], 0);
        assert_eq!(section6[6], 0b1011_1111);
    }
}
