//! Message filters: the keys used to pick one variable out of a
//! multi-message GRIB2 file.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::index::IndexEntry;
use crate::tables::HEIGHT_ABOVE_GROUND;

/// Every populated key must match. Unset keys match anything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageFilter {
    pub short_name: Option<String>,
    pub discipline: Option<u8>,
    pub category: Option<u8>,
    pub number: Option<u8>,
    pub surface_type: Option<u8>,
    pub level: Option<f64>,
}

impl MessageFilter {
    pub fn by_short_name(name: &str) -> Self {
        Self {
            short_name: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn at_height(mut self, meters: f64) -> Self {
        self.surface_type = Some(HEIGHT_ABOVE_GROUND);
        self.level = Some(meters);
        self
    }

    /// 10 m eastward wind component.
    pub fn wind_u_10m() -> Self {
        Self::by_short_name("10u").at_height(10.0)
    }

    /// 10 m northward wind component.
    pub fn wind_v_10m() -> Self {
        Self::by_short_name("10v").at_height(10.0)
    }

    /// 2 m temperature.
    pub fn temperature_2m() -> Self {
        Self::by_short_name("2t")
    }

    /// The three RTMA filters, in the order their fields are consumed.
    pub fn rtma_defaults() -> Vec<Self> {
        vec![
            Self::wind_u_10m(),
            Self::wind_v_10m(),
            Self::temperature_2m(),
        ]
    }

    pub fn matches(&self, entry: &IndexEntry) -> bool {
        self.short_name
            .as_deref()
            .map_or(true, |n| n == entry.short_name)
            && self.discipline.map_or(true, |d| d == entry.discipline)
            && self.category.map_or(true, |c| c == entry.category)
            && self.number.map_or(true, |n| n == entry.number)
            && self.surface_type.map_or(true, |t| t == entry.surface_type)
            && self.level.map_or(true, |l| {
                entry
                    .surface_value
                    .is_some_and(|v| (v - l).abs() < 1e-6)
            })
    }

    /// Name for the field produced by this filter.
    pub fn field_name(&self) -> String {
        self.short_name.clone().unwrap_or_else(|| self.to_string())
    }
}

impl fmt::Display for MessageFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(n) = &self.short_name {
            parts.push(format!("shortName={}", n));
        }
        if let Some(d) = self.discipline {
            parts.push(format!("discipline={}", d));
        }
        if let Some(c) = self.category {
            parts.push(format!("category={}", c));
        }
        if let Some(n) = self.number {
            parts.push(format!("number={}", n));
        }
        if let Some(t) = self.surface_type {
            parts.push(format!("typeOfLevel={}", t));
        }
        if let Some(l) = self.level {
            parts.push(format!("level={}", l));
        }
        if parts.is_empty() {
            write!(f, "*")
        } else {
            write!(f, "{}", parts.join(","))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(short_name: &str, category: u8, number: u8, level: Option<f64>) -> IndexEntry {
        IndexEntry {
            offset: 0,
            length: 0,
            discipline: 0,
            category,
            number,
            surface_type: 103,
            surface_value: level,
            grid_template: 30,
            short_name: short_name.to_string(),
            type_of_level: "heightAboveGround".to_string(),
        }
    }

    #[test]
    fn test_wind_filters_require_level() {
        let u = MessageFilter::wind_u_10m();
        assert!(u.matches(&entry("10u", 2, 2, Some(10.0))));
        assert!(!u.matches(&entry("10u", 2, 2, None)));
        assert!(!u.matches(&entry("10v", 2, 3, Some(10.0))));
    }

    #[test]
    fn test_temperature_matches_by_name_only() {
        let t = MessageFilter::temperature_2m();
        assert!(t.matches(&entry("2t", 0, 0, Some(2.0))));
        assert!(!t.matches(&entry("2d", 0, 6, Some(2.0))));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            MessageFilter::wind_v_10m().to_string(),
            "shortName=10v,typeOfLevel=103,level=10"
        );
        assert_eq!(MessageFilter::default().to_string(), "*");
    }
}
