//! Placed tile records and the stable asset identifiers they reference.

use std::fmt;

use glam::Quat;
use serde::{Deserialize, Serialize};

use crate::GridCoord;

/// Palette index recorded when the owning palette slot is unknown.
pub const NO_PALETTE_INDEX: i32 = -1;

/// Stable external identifier of a placeable asset.
///
/// The identifier is opaque to the core. An empty identifier never refers to
/// an asset and marks any record carrying it as invalid.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetRef(String);

impl AssetRef {
    /// Wraps the provided stable identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrowed view of the stable identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reports whether the identifier is empty and therefore refers to nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// One placed prefab instance on the grid.
///
/// Records are never edited in place; placing at an occupied position replaces
/// the occupant with a freshly constructed record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileRecord {
    /// Cell occupied by the tile. Unique within a grid store.
    pub position: GridCoord,
    /// Asset this tile instance represents.
    pub asset: AssetRef,
    /// Orientation applied to the placed instance.
    pub rotation: Quat,
    /// Cached palette slot of the asset, or [`NO_PALETTE_INDEX`]. Advisory only.
    pub palette_index: i32,
}

impl TileRecord {
    /// Creates a record with an explicit rotation and palette index.
    #[must_use]
    pub fn new(position: GridCoord, asset: AssetRef, rotation: Quat, palette_index: i32) -> Self {
        Self {
            position,
            asset,
            rotation,
            palette_index,
        }
    }

    /// Creates an unrotated record with no cached palette index.
    #[must_use]
    pub fn unrotated(position: GridCoord, asset: AssetRef) -> Self {
        Self::new(position, asset, Quat::IDENTITY, NO_PALETTE_INDEX)
    }

    /// A record is valid iff it references a non-empty asset identifier.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.asset.is_empty()
    }
}
