//! GRIB2 parameter and level lookup tables.
//!
//! Translates numeric product keys into the short names the filters use
//! (`10u`, `2t`, ...). A short name can depend on the level: temperature at
//! 2 m above ground is `2t`, elsewhere it is `t`.

use std::collections::HashMap;

/// Lookup key for parameter: (discipline, category, number)
pub type ParamKey = (u8, u8, u8);

/// Fixed surface type 103: specified height above ground (m).
pub const HEIGHT_ABOVE_GROUND: u8 = 103;

#[derive(Debug, Clone)]
struct LevelRule {
    surface_type: u8,
    value: f64,
    name: String,
}

/// Parameter and level tables.
#[derive(Debug, Clone, Default)]
pub struct Grib2Tables {
    parameters: HashMap<ParamKey, String>,
    level_rules: HashMap<ParamKey, Vec<LevelRule>>,
    levels: HashMap<u8, String>,
}

impl Grib2Tables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Short names for the surface analysis fields RTMA carries.
    pub fn surface_analysis() -> Self {
        let mut tables = Self::new();

        tables.add_parameter(0, 0, 0, "t");
        tables.add_parameter(0, 0, 6, "dpt");
        tables.add_parameter(0, 1, 1, "r");
        tables.add_parameter(0, 2, 0, "wdir");
        tables.add_parameter(0, 2, 1, "ws");
        tables.add_parameter(0, 2, 2, "u");
        tables.add_parameter(0, 2, 3, "v");
        tables.add_parameter(0, 2, 22, "gust");
        tables.add_parameter(0, 3, 0, "sp");
        tables.add_parameter(0, 6, 1, "tcc");
        tables.add_parameter(0, 19, 0, "vis");

        tables.add_level_parameter(0, 0, 0, HEIGHT_ABOVE_GROUND, 2.0, "2t");
        tables.add_level_parameter(0, 0, 6, HEIGHT_ABOVE_GROUND, 2.0, "2d");
        tables.add_level_parameter(0, 1, 1, HEIGHT_ABOVE_GROUND, 2.0, "2r");
        tables.add_level_parameter(0, 2, 0, HEIGHT_ABOVE_GROUND, 10.0, "10wdir");
        tables.add_level_parameter(0, 2, 1, HEIGHT_ABOVE_GROUND, 10.0, "10si");
        tables.add_level_parameter(0, 2, 2, HEIGHT_ABOVE_GROUND, 10.0, "10u");
        tables.add_level_parameter(0, 2, 3, HEIGHT_ABOVE_GROUND, 10.0, "10v");
        tables.add_level_parameter(0, 2, 22, HEIGHT_ABOVE_GROUND, 10.0, "10fg");

        tables.add_level(1, "surface");
        tables.add_level(HEIGHT_ABOVE_GROUND, "heightAboveGround");
        tables.add_level(101, "meanSea");

        tables
    }

    pub fn add_parameter(&mut self, discipline: u8, category: u8, number: u8, name: &str) {
        self.parameters
            .insert((discipline, category, number), name.to_string());
    }

    /// Register a name that applies only at one specific level.
    pub fn add_level_parameter(
        &mut self,
        discipline: u8,
        category: u8,
        number: u8,
        surface_type: u8,
        value: f64,
        name: &str,
    ) {
        self.level_rules
            .entry((discipline, category, number))
            .or_default()
            .push(LevelRule {
                surface_type,
                value,
                name: name.to_string(),
            });
    }

    pub fn add_level(&mut self, surface_type: u8, name: &str) {
        self.levels.insert(surface_type, name.to_string());
    }

    /// Short name for a product key.
    ///
    /// Level-specific names win over generic ones; unknown keys become
    /// `"P{discipline}_{category}_{number}"`.
    pub fn short_name(
        &self,
        key: ParamKey,
        surface_type: u8,
        surface_value: Option<f64>,
    ) -> String {
        let level_match = self.level_rules.get(&key).and_then(|rules| {
            rules.iter().find(|r| {
                r.surface_type == surface_type
                    && surface_value.is_some_and(|v| (v - r.value).abs() < 1e-6)
            })
        });
        if let Some(rule) = level_match {
            return rule.name.clone();
        }

        self.parameters
            .get(&key)
            .cloned()
            .unwrap_or_else(|| format!("P{}_{}_{}", key.0, key.1, key.2))
    }

    /// Level type name, e.g. `heightAboveGround`.
    pub fn level_name(&self, surface_type: u8) -> String {
        self.levels
            .get(&surface_type)
            .cloned()
            .unwrap_or_else(|| format!("level{}", surface_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_specific_names() {
        let tables = Grib2Tables::surface_analysis();
        assert_eq!(tables.short_name((0, 2, 2), 103, Some(10.0)), "10u");
        assert_eq!(tables.short_name((0, 2, 3), 103, Some(10.0)), "10v");
        assert_eq!(tables.short_name((0, 0, 0), 103, Some(2.0)), "2t");
    }

    #[test]
    fn test_generic_fallback() {
        let tables = Grib2Tables::surface_analysis();
        assert_eq!(tables.short_name((0, 0, 0), 1, None), "t");
        assert_eq!(tables.short_name((0, 2, 2), 103, Some(80.0)), "u");
        assert_eq!(tables.short_name((9, 9, 9), 1, None), "P9_9_9");
    }

    #[test]
    fn test_level_names() {
        let tables = Grib2Tables::surface_analysis();
        assert_eq!(tables.level_name(103), "heightAboveGround");
        assert_eq!(tables.level_name(200), "level200");
    }
}
