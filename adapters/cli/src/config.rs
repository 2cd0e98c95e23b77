use std::{fs, path::Path};

use anyhow::{Context, Result};
use glam::Vec3;
use gridforge_core::{GridCoord, GridDimensions, GridSettings};
use gridforge_system_editor::EditorConfig;
use serde::Deserialize;

/// Configuration file picked up from the working directory when `--config` is absent.
pub(crate) const DEFAULT_CONFIG_FILE: &str = "gridforge.toml";

/// Settings read from `gridforge.toml`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
    /// Editing heuristics shared with interactive hosts.
    pub(crate) editor: EditorConfig,
    /// Geometry used by `new` unless overridden on the command line.
    pub(crate) grid: GridDefaults,
}

/// Default geometry for newly created maps.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GridDefaults {
    pub(crate) size: [i32; 3],
    pub(crate) cell_size: f32,
    pub(crate) offset: [f32; 3],
}

impl Default for GridDefaults {
    fn default() -> Self {
        let settings = GridSettings::default();
        let dimensions = settings.dimensions();
        Self {
            size: [dimensions.x(), dimensions.y(), dimensions.z()],
            cell_size: settings.cell_size(),
            offset: settings.offset().to_array(),
        }
    }
}

impl GridDefaults {
    /// Geometry for a new map, preferring explicit overrides.
    pub(crate) fn settings(&self, size: Option<GridCoord>, cell_size: Option<f32>) -> GridSettings {
        let [x, y, z] = self.size;
        let size = size.unwrap_or(GridCoord::new(x, y, z));
        GridSettings::new(
            GridDimensions::new(size.x, size.y, size.z),
            cell_size.unwrap_or(self.cell_size),
            Vec3::from_array(self.offset),
        )
    }
}

impl Config {
    /// Loads the explicit configuration file, or the default one when it exists.
    pub(crate) fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration at {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("invalid configuration in {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse configuration toml contents")
    }
}
