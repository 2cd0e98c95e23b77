use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use gridforge_core::{MapSnapshot, Palette};
use gridforge_world::{
    snapshot::{self, ImportSummary, MapMetadata},
    World,
};
use tracing::info;

/// Timestamp layout written into `creationTime`.
pub(crate) const CREATION_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Map loaded from or destined for a JSON map file.
#[derive(Debug)]
pub(crate) struct MapDocument {
    pub(crate) name: String,
    pub(crate) world: World,
}

impl MapDocument {
    pub(crate) fn new(name: impl Into<String>, world: World) -> Self {
        Self {
            name: name.into(),
            world,
        }
    }

    /// Reads and imports a map file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read map file at {}", path.display()))?;
        let snapshot: MapSnapshot = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse map file {}", path.display()))?;
        let (document, summary) = Self::from_snapshot(snapshot)
            .with_context(|| format!("failed to load map file {}", path.display()))?;
        info!(
            path = %path.display(),
            imported = summary.imported,
            skipped = summary.skipped,
            "map loaded"
        );
        Ok(document)
    }

    /// Builds a document from an already decoded snapshot.
    pub(crate) fn from_snapshot(snapshot: MapSnapshot) -> Result<(Self, ImportSummary)> {
        let name = snapshot.map_name.clone();
        let mut world = World::new();
        let summary = snapshot::import(&mut world, snapshot, &mut Vec::new())
            .context("map contents could not be imported")?;
        Ok((Self::new(name, world), summary))
    }

    /// Exports the document, stamping the current local time.
    pub(crate) fn snapshot(&self) -> MapSnapshot {
        snapshot::export(
            &self.world,
            MapMetadata {
                map_name: self.name.clone(),
                creation_time: chrono::Local::now().format(CREATION_TIME_FORMAT).to_string(),
            },
        )
    }

    /// Writes the document as pretty-printed JSON.
    pub(crate) fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.snapshot()).context("failed to serialise map")?;
        fs::write(path, json)
            .with_context(|| format!("failed to write map file at {}", path.display()))?;
        info!(path = %path.display(), "map saved");
        Ok(())
    }
}

/// Reads a palette stored as JSON.
pub(crate) fn load_palette(path: &Path) -> Result<Palette> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read palette at {}", path.display()))?;
    let palette: Palette = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse palette {}", path.display()))?;
    if palette.stable_id().is_empty() {
        bail!("palette {} has no stable identifier", path.display());
    }
    Ok(palette)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;
    use gridforge_core::{AssetRef, BoundsPolicy, Command};
    use gridforge_world::{self as world, query};

    #[test]
    fn saved_documents_load_back() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("crypt.json");

        let mut document = MapDocument::new("Crypt", World::new());
        world::apply(
            &mut document.world,
            Command::PlaceTile {
                position: gridforge_core::GridCoord::new(4, 0, 2),
                asset: AssetRef::new("floor"),
                rotation: Quat::IDENTITY,
                palette_index: 0,
                bounds: BoundsPolicy::Strict,
            },
            &mut Vec::new(),
        );
        document.save(&path).expect("map saves");

        let loaded = MapDocument::load(&path).expect("map loads");
        assert_eq!(loaded.name, "Crypt");
        assert_eq!(query::tile_count(&loaded.world), 1);

        let written = fs::read_to_string(&path).expect("file readable");
        assert!(written.contains("\"mapName\": \"Crypt\""));
        assert!(written.contains("\"creationTime\""));
    }

    #[test]
    fn creation_time_uses_second_precision() {
        let snapshot = MapDocument::new("Stamp", World::new()).snapshot();
        assert!(
            chrono::NaiveDateTime::parse_from_str(&snapshot.creation_time, CREATION_TIME_FORMAT)
                .is_ok(),
            "unexpected timestamp {}",
            snapshot.creation_time
        );
    }

    #[test]
    fn palettes_without_identifier_are_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("palette.json");
        fs::write(&path, r#"{"name":"Loose","stable_id":"","entries":["floor"]}"#)
            .expect("palette written");

        let error = load_palette(&path).expect_err("palette rejected");
        assert!(error.to_string().contains("no stable identifier"));
    }

    #[test]
    fn missing_map_reports_the_path() {
        let error = MapDocument::load(Path::new("/nonexistent/map.json")).expect_err("load fails");
        assert!(format!("{error:#}").contains("/nonexistent/map.json"));
    }
}
