//! Variable table and physical unit conversions.
//!
//! Each known variable names its conversion and the pipeline stage at which
//! that conversion runs. Sensor dewpoint is converted as soon as it is read,
//! so its raw values are reported in Fahrenheit. RTMA temperature is
//! converted only when it is rasterized.

use serde::{Deserialize, Serialize};

/// A conversion from the source unit to the display unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitConversion {
    Identity,
    KelvinToFahrenheit,
}

impl UnitConversion {
    #[inline]
    pub fn apply(&self, value: f32) -> f32 {
        match self {
            UnitConversion::Identity => value,
            UnitConversion::KelvinToFahrenheit => {
                ((value as f64 - 273.15) * 9.0 / 5.0 + 32.0) as f32
            }
        }
    }

    /// Convert a whole buffer in place. NaN stays NaN.
    pub fn apply_all(&self, values: &mut [f32]) {
        if *self == UnitConversion::Identity {
            return;
        }
        for v in values.iter_mut() {
            *v = self.apply(*v);
        }
    }
}

/// Where in the pipeline a variable's conversion is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionStage {
    /// Immediately after the variable is selected from its source.
    OnLoad,
    /// Immediately before normalization into the color ramp.
    OnRender,
}

/// Static description of a known variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariableSpec {
    pub id: &'static str,
    pub description: &'static str,
    /// Units after conversion
    pub units: &'static str,
    pub conversion: UnitConversion,
    pub stage: ConversionStage,
}

pub const VARIABLES: &[VariableSpec] = &[
    VariableSpec {
        id: "10u",
        description: "10 metre U wind component",
        units: "m s-1",
        conversion: UnitConversion::Identity,
        stage: ConversionStage::OnLoad,
    },
    VariableSpec {
        id: "10v",
        description: "10 metre V wind component",
        units: "m s-1",
        conversion: UnitConversion::Identity,
        stage: ConversionStage::OnLoad,
    },
    VariableSpec {
        id: "2t",
        description: "2 metre temperature",
        units: "°F",
        conversion: UnitConversion::KelvinToFahrenheit,
        stage: ConversionStage::OnRender,
    },
    VariableSpec {
        id: "td2m",
        description: "2 metre dewpoint temperature",
        units: "°F",
        conversion: UnitConversion::KelvinToFahrenheit,
        stage: ConversionStage::OnLoad,
    },
    VariableSpec {
        id: "rh2m",
        description: "2 metre relative humidity",
        units: "%",
        conversion: UnitConversion::Identity,
        stage: ConversionStage::OnLoad,
    },
];

impl VariableSpec {
    pub fn lookup(id: &str) -> Option<&'static VariableSpec> {
        VARIABLES.iter().find(|v| v.id == id)
    }

    /// Conversion to run for `id` at `stage`. Unknown ids pass through.
    pub fn conversion_at(id: &str, stage: ConversionStage) -> UnitConversion {
        match Self::lookup(id) {
            Some(spec) if spec.stage == stage => spec.conversion,
            _ => UnitConversion::Identity,
        }
    }
}
