//! Tunable heuristics used while resolving and drawing edits.

use serde::{Deserialize, Serialize};

/// Heuristic constants of the editor, overridable from configuration files.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Minimum `|normal.y|` of a surface hit for smart stacking to apply.
    pub stacking_normal_threshold: f32,
    /// Half-width of the band accepted around circle tool radii.
    pub circle_band: f32,
    /// Distance a surface hit is pushed into the hit tile before lookup.
    pub surface_nudge: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            stacking_normal_threshold: 0.7,
            circle_band: gridforge_system_shapes::DEFAULT_RING_BAND,
            surface_nudge: 0.001,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: EditorConfig =
            toml::from_str("circle_band = 0.25").expect("partial config parses");
        assert_eq!(config.circle_band, 0.25);
        assert_eq!(config.stacking_normal_threshold, 0.7);
        assert_eq!(config.surface_nudge, 0.001);
    }
}
