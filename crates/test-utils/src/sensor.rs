//! Synthetic sensor archives.
//!
//! Layout matches the local sensor model output: dimensions `time`,
//! `south_north` and `west_east`, 1D coordinate variables of the same
//! names, and data variables shaped `(time, south_north, west_east)`.

use std::path::Path;

/// A data variable to write, values in `(time, south_north, west_east)` order.
#[derive(Debug, Clone)]
struct DataVariable {
    name: String,
    units: String,
    values: Vec<f32>,
    fill_value: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct SensorArchiveBuilder {
    time_units: String,
    times: Vec<f64>,
    lon: Vec<f64>,
    lat: Vec<f64>,
    variables: Vec<DataVariable>,
}

impl Default for SensorArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorArchiveBuilder {
    /// Six hourly steps from 2020-03-01 00:00 on a 5x4 grid over southern
    /// California, with no data variables.
    pub fn new() -> Self {
        Self {
            time_units: "hours since 2020-03-01 00:00:00".to_string(),
            times: (0..6).map(f64::from).collect(),
            lon: vec![-118.0, -117.5, -117.0, -116.5, -116.0],
            lat: vec![32.5, 33.0, 33.5, 34.0],
            variables: Vec::new(),
        }
    }

    pub fn with_times(mut self, units: &str, times: Vec<f64>) -> Self {
        self.time_units = units.to_string();
        self.times = times;
        self
    }

    pub fn with_axes(mut self, lon: Vec<f64>, lat: Vec<f64>) -> Self {
        self.lon = lon;
        self.lat = lat;
        self
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        (self.times.len(), self.lat.len(), self.lon.len())
    }

    /// Add a variable filled by `f(t, j, i)`.
    pub fn with_variable_fn(
        self,
        name: &str,
        units: &str,
        f: impl Fn(usize, usize, usize) -> f32,
    ) -> Self {
        let (nt, ny, nx) = self.shape();
        let mut values = Vec::with_capacity(nt * ny * nx);
        for t in 0..nt {
            for j in 0..ny {
                for i in 0..nx {
                    values.push(f(t, j, i));
                }
            }
        }
        self.with_variable(name, units, values)
    }

    pub fn with_variable(mut self, name: &str, units: &str, values: Vec<f32>) -> Self {
        let (nt, ny, nx) = self.shape();
        assert_eq!(values.len(), nt * ny * nx, "values must cover time x lat x lon");
        self.variables.push(DataVariable {
            name: name.to_string(),
            units: units.to_string(),
            values,
            fill_value: None,
        });
        self
    }

    /// Declare a `_FillValue` on the most recently added variable.
    pub fn with_fill_value(mut self, fill: f32) -> Self {
        if let Some(var) = self.variables.last_mut() {
            var.fill_value = Some(fill);
        }
        self
    }

    pub fn write(&self, path: &Path) -> Result<(), netcdf::Error> {
        let mut file = netcdf::create(path)?;
        file.add_dimension("time", self.times.len())?;
        file.add_dimension("south_north", self.lat.len())?;
        file.add_dimension("west_east", self.lon.len())?;

        {
            let mut time = file.add_variable::<f64>("time", &["time"])?;
            time.put_attribute("units", self.time_units.as_str())?;
            time.put_attribute("calendar", "standard")?;
            time.put_values(&self.times, ..)?;
        }
        {
            let mut lat = file.add_variable::<f64>("south_north", &["south_north"])?;
            lat.put_attribute("units", "degrees_north")?;
            lat.put_values(&self.lat, ..)?;
        }
        {
            let mut lon = file.add_variable::<f64>("west_east", &["west_east"])?;
            lon.put_attribute("units", "degrees_east")?;
            lon.put_values(&self.lon, ..)?;
        }

        for data in &self.variables {
            let mut var =
                file.add_variable::<f32>(&data.name, &["time", "south_north", "west_east"])?;
            var.put_attribute("units", data.units.as_str())?;
            if let Some(fill) = data.fill_value {
                var.put_attribute("_FillValue", fill)?;
            }
            var.put_values(&data.values, ..)?;
        }
        Ok(())
    }
}
