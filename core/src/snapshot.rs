//! Flat, persistence-friendly representation of a whole grid map.
//!
//! The snapshot is pure data. Field names follow the map interchange format
//! (`mapName`, `gridSize`, `tiles`, ...) so files written by other tools load
//! without translation.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::{AssetRef, GridCoord, TileRecord};

/// Format version written into every exported snapshot.
pub const SNAPSHOT_FORMAT_VERSION: &str = "1.0";

/// Complete export of a grid map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapSnapshot {
    /// Human readable map name.
    pub map_name: String,
    /// Grid extent in cells along each axis.
    pub grid_size: GridCoord,
    /// World-space edge length of a cell.
    pub cell_size: f32,
    /// World-space origin of cell `(0, 0, 0)`.
    pub grid_offset: SnapshotVector,
    /// Display name of the palette governing the map.
    pub palette_name: String,
    /// Stable identifier of the palette governing the map.
    pub palette_stable_id: String,
    /// Every tile placed on the map.
    pub tiles: Vec<SnapshotTile>,
    /// Timestamp recorded when the snapshot was written.
    pub creation_time: String,
    /// Format version of the snapshot.
    pub version: String,
}

/// Tile entry stored within a [`MapSnapshot`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotTile {
    /// Cell occupied by the tile.
    pub position: GridCoord,
    /// Stable identifier of the placed asset.
    pub asset_stable_id: String,
    /// Orientation of the placed instance.
    pub rotation: SnapshotQuaternion,
    /// Cached palette slot, `-1` when unknown.
    pub palette_index: i32,
}

impl SnapshotTile {
    /// Mirrors the record validity rule: the asset identifier must be non-empty.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.asset_stable_id.is_empty()
    }
}

impl From<&TileRecord> for SnapshotTile {
    fn from(record: &TileRecord) -> Self {
        Self {
            position: record.position,
            asset_stable_id: record.asset.as_str().to_owned(),
            rotation: record.rotation.into(),
            palette_index: record.palette_index,
        }
    }
}

impl From<SnapshotTile> for TileRecord {
    fn from(tile: SnapshotTile) -> Self {
        TileRecord::new(
            tile.position,
            AssetRef::new(tile.asset_stable_id),
            tile.rotation.into(),
            tile.palette_index,
        )
    }
}

/// Three component vector serialised as `{ "x", "y", "z" }`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotVector {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
    /// Z component.
    pub z: f32,
}

impl From<Vec3> for SnapshotVector {
    fn from(value: Vec3) -> Self {
        Self {
            x: value.x,
            y: value.y,
            z: value.z,
        }
    }
}

impl From<SnapshotVector> for Vec3 {
    fn from(value: SnapshotVector) -> Self {
        Vec3::new(value.x, value.y, value.z)
    }
}

/// Quaternion serialised as `{ "x", "y", "z", "w" }`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnapshotQuaternion {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
    /// Z component.
    pub z: f32,
    /// Scalar component.
    pub w: f32,
}

impl Default for SnapshotQuaternion {
    fn default() -> Self {
        Quat::IDENTITY.into()
    }
}

impl From<Quat> for SnapshotQuaternion {
    fn from(value: Quat) -> Self {
        Self {
            x: value.x,
            y: value.y,
            z: value.z,
            w: value.w,
        }
    }
}

impl From<SnapshotQuaternion> for Quat {
    fn from(value: SnapshotQuaternion) -> Self {
        Quat::from_xyzw(value.x, value.y, value.z, value.w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_conversion_preserves_record_fields() {
        let record = TileRecord::new(
            GridCoord::new(3, 1, -2),
            AssetRef::new("wall-corner"),
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            4,
        );

        let tile = SnapshotTile::from(&record);
        assert_eq!(tile.asset_stable_id, "wall-corner");
        assert_eq!(tile.palette_index, 4);
        assert!(tile.is_valid());

        assert_eq!(TileRecord::from(tile), record);
    }

    #[test]
    fn tile_without_asset_is_invalid() {
        let tile = SnapshotTile {
            position: GridCoord::default(),
            asset_stable_id: String::new(),
            rotation: SnapshotQuaternion::default(),
            palette_index: -1,
        };
        assert!(!tile.is_valid());
        assert!(!TileRecord::from(tile).is_valid());
    }
}
