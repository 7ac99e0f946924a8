//! Per-variable render settings.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

use crate::config::ConfigError;

/// How one variable is drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderStyle {
    pub vmin: f64,
    pub vmax: f64,
    #[serde(default = "default_colormap")]
    pub colormap: String,
    #[serde(default)]
    pub title: String,
}

fn default_colormap() -> String {
    "turbo".to_string()
}

impl RenderStyle {
    pub fn new(vmin: f64, vmax: f64, title: &str) -> Self {
        Self {
            vmin,
            vmax,
            colormap: default_colormap(),
            title: title.to_string(),
        }
    }
}

/// Style lookup keyed by variable id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleTable {
    styles: HashMap<String, RenderStyle>,
}

impl Default for StyleTable {
    fn default() -> Self {
        let styles = [
            ("2t", RenderStyle::new(0.0, 120.0, "TEMPERATURE (°F)")),
            ("td2m", RenderStyle::new(0.0, 120.0, "DEW POINT (°F)")),
            ("rh2m", RenderStyle::new(0.0, 100.0, "RELATIVE HUMIDITY (%)")),
        ]
        .into_iter()
        .map(|(id, style)| (id.to_string(), style))
        .collect();
        Self { styles }
    }
}

impl StyleTable {
    /// Built-in styles overridden by the entries of a YAML file:
    ///
    /// ```yaml
    /// 2t:
    ///   vmin: 20
    ///   vmax: 110
    ///   colormap: viridis
    ///   title: TEMPERATURE (°F)
    /// ```
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::StyleFile(format!("{}: {}", path.display(), e)))?;
        let mut table = Self::default();
        table.merge_yaml(&text)?;
        info!(path = %path.display(), styles = table.styles.len(), "Loaded style file");
        Ok(table)
    }

    pub fn merge_yaml(&mut self, text: &str) -> Result<(), ConfigError> {
        let overrides: HashMap<String, RenderStyle> = serde_yaml::from_str(text)
            .map_err(|e| ConfigError::StyleFile(e.to_string()))?;
        self.styles.extend(overrides);
        Ok(())
    }

    pub fn get(&self, variable: &str) -> Option<&RenderStyle> {
        self.styles.get(variable)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RenderStyle)> {
        self.styles.iter()
    }

    /// Replace the colormap of every style.
    pub fn with_colormap(mut self, colormap: &str) -> Self {
        for style in self.styles.values_mut() {
            style.colormap = colormap.to_string();
        }
        self
    }
}
