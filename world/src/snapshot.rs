//! Export and import of whole maps through [`MapSnapshot`].

use glam::Vec3;
use gridforge_core::{
    Event, GridCoord, GridDimensions, GridSettings, MapSnapshot, PaletteRef, SnapshotTile,
    TileRecord, SNAPSHOT_FORMAT_VERSION,
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::World;

const SUPPORTED_MAJOR_VERSION: &str = "1";

/// Descriptive fields written alongside the tile data on export.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MapMetadata {
    /// Human readable map name.
    pub map_name: String,
    /// Timestamp recorded in the snapshot.
    pub creation_time: String,
}

/// Outcome of a successful import.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Tiles present in the spatial index after the import.
    pub imported: usize,
    /// Snapshot tiles dropped because they referenced no asset.
    pub skipped: usize,
}

/// Reasons a snapshot cannot be imported. The world is untouched in every case.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// The snapshot was written by an incompatible format revision.
    #[error("unsupported map format version `{0}`")]
    UnsupportedVersion(String),
    /// The cell size or grid offset is not a finite number.
    #[error("grid geometry contains non-finite values")]
    NonFiniteSettings,
}

/// Captures the world as a snapshot containing only valid, unshadowed tiles.
#[must_use]
pub fn export(world: &World, metadata: MapMetadata) -> MapSnapshot {
    let (palette_name, palette_stable_id) = world
        .palette
        .as_ref()
        .map(|palette| (palette.name.clone(), palette.stable_id.clone()))
        .unwrap_or_default();
    let dimensions = world.settings.dimensions();

    MapSnapshot {
        map_name: metadata.map_name,
        grid_size: GridCoord::new(dimensions.x(), dimensions.y(), dimensions.z()),
        cell_size: world.settings.cell_size(),
        grid_offset: world.settings.offset().into(),
        palette_name,
        palette_stable_id,
        tiles: world
            .live_records()
            .into_iter()
            .map(SnapshotTile::from)
            .collect(),
        creation_time: metadata.creation_time,
        version: SNAPSHOT_FORMAT_VERSION.to_owned(),
    }
}

/// Replaces the world contents with the snapshot.
///
/// The snapshot is checked before anything is mutated. Tiles without an asset
/// are skipped; later tiles win over earlier ones at the same position.
pub fn import(
    world: &mut World,
    snapshot: MapSnapshot,
    out_events: &mut Vec<Event>,
) -> Result<ImportSummary, ImportError> {
    let major = snapshot.version.split('.').next().unwrap_or_default();
    if major != SUPPORTED_MAJOR_VERSION {
        return Err(ImportError::UnsupportedVersion(snapshot.version));
    }

    let offset = Vec3::from(snapshot.grid_offset);
    if !snapshot.cell_size.is_finite() || !offset.is_finite() {
        return Err(ImportError::NonFiniteSettings);
    }

    world.clear_all(out_events);

    let size = snapshot.grid_size;
    let settings = GridSettings::new(
        GridDimensions::new(size.x, size.y, size.z),
        snapshot.cell_size,
        offset,
    );
    world.set_settings(settings);
    out_events.push(Event::GridConfigured { settings });

    let palette = (!snapshot.palette_stable_id.is_empty())
        .then(|| PaletteRef::new(snapshot.palette_name, snapshot.palette_stable_id));
    world.set_palette(palette.clone());
    out_events.push(Event::PaletteChanged { palette });

    let mut skipped = 0;
    let mut records = Vec::with_capacity(snapshot.tiles.len());
    for tile in snapshot.tiles {
        if !tile.is_valid() {
            warn!(position = ?tile.position, "skipping snapshot tile without asset");
            skipped += 1;
            continue;
        }
        records.push(TileRecord::from(tile));
    }

    let shadowed = world.replace_records(records);
    let imported = crate::query::tile_count(world);
    debug!(imported, skipped, shadowed, map = %snapshot.map_name, "map imported");
    out_events.push(Event::MapLoaded { tiles: imported });

    Ok(ImportSummary { imported, skipped })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridforge_core::{AssetRef, BoundsPolicy, SnapshotQuaternion, SnapshotVector};

    fn snapshot_with(tiles: Vec<SnapshotTile>) -> MapSnapshot {
        MapSnapshot {
            map_name: "Test".to_owned(),
            grid_size: GridCoord::new(8, 2, 8),
            cell_size: 1.0,
            grid_offset: SnapshotVector::default(),
            palette_name: String::new(),
            palette_stable_id: String::new(),
            tiles,
            creation_time: String::new(),
            version: "1.0".to_owned(),
        }
    }

    fn tile(x: i32, z: i32, asset: &str) -> SnapshotTile {
        SnapshotTile {
            position: GridCoord::new(x, 0, z),
            asset_stable_id: asset.to_owned(),
            rotation: SnapshotQuaternion::default(),
            palette_index: -1,
        }
    }

    #[test]
    fn unsupported_version_leaves_world_untouched() {
        let mut world = World::new();
        let mut events = Vec::new();
        assert!(world.place_tile(
            TileRecord::unrotated(GridCoord::new(1, 0, 1), AssetRef::new("keep")),
            BoundsPolicy::Strict,
            &mut events,
        ));
        events.clear();

        let mut snapshot = snapshot_with(vec![tile(0, 0, "new")]);
        snapshot.version = "2.0".to_owned();

        assert_eq!(
            import(&mut world, snapshot, &mut events),
            Err(ImportError::UnsupportedVersion("2.0".to_owned()))
        );
        assert!(events.is_empty());
        assert_eq!(crate::query::tile_count(&world), 1);
    }

    #[test]
    fn non_finite_cell_size_is_rejected() {
        let mut world = World::new();
        let mut snapshot = snapshot_with(Vec::new());
        snapshot.cell_size = f32::NAN;

        assert_eq!(
            import(&mut world, snapshot, &mut Vec::new()),
            Err(ImportError::NonFiniteSettings)
        );
    }

    #[test]
    fn import_counts_skipped_and_shadowed_tiles() {
        let mut world = World::new();
        let summary = import(
            &mut world,
            snapshot_with(vec![tile(0, 0, "a"), tile(1, 0, ""), tile(0, 0, "b")]),
            &mut Vec::new(),
        )
        .expect("import succeeds");

        assert_eq!(summary, ImportSummary { imported: 1, skipped: 1 });
        assert_eq!(
            crate::query::tile_at(&world, GridCoord::new(0, 0, 0)).map(|r| r.asset.as_str()),
            Some("b")
        );
    }
}
