#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Gridforge level editor.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Systems and adapters submit
//! [`Command`] values describing desired grid mutations, the world executes
//! those commands via its `apply` entry point, and then broadcasts [`Event`]
//! values. Adapters that own visual instances react to those events; hosts
//! that keep an undo history record them and replay [`Event::inverse`].

mod coords;
mod palette;
mod snapshot;
mod tile;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

pub use coords::{
    grid_to_world, world_to_grid, BoundsPolicy, GridCoord, GridDimensions, GridSettings,
    MIN_CELL_SIZE,
};
pub use palette::{Palette, PaletteRef};
pub use snapshot::{
    MapSnapshot, SnapshotQuaternion, SnapshotTile, SnapshotVector, SNAPSHOT_FORMAT_VERSION,
};
pub use tile::{AssetRef, TileRecord, NO_PALETTE_INDEX};

/// Commands that express all permissible grid mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the grid geometry. Existing tiles are kept.
    ConfigureGrid {
        /// New extent of the grid.
        dimensions: GridDimensions,
        /// New cell edge length; clamped to [`MIN_CELL_SIZE`].
        cell_size: f32,
        /// New world-space origin.
        offset: Vec3,
    },
    /// Requests placement of a tile, replacing any occupant of the cell.
    PlaceTile {
        /// Cell that should receive the tile.
        position: GridCoord,
        /// Asset the tile represents.
        asset: AssetRef,
        /// Orientation of the placed instance.
        rotation: Quat,
        /// Cached palette slot of the asset.
        palette_index: i32,
        /// Legality rules used to validate `position`.
        bounds: BoundsPolicy,
    },
    /// Requests removal of the tile occupying a cell.
    RemoveTile {
        /// Cell whose occupant should be removed.
        position: GridCoord,
    },
    /// Removes every tile from the map.
    ClearAll,
    /// Recomputes the spatial index from the flat record list.
    RebuildIndex,
    /// Purges invalid and shadowed records from the flat list, then rebuilds the index.
    Validate,
    /// Rebinds the palette governing the map.
    SetPalette {
        /// Reference to the new palette, or `None` to unbind.
        palette: Option<PaletteRef>,
    },
}

impl Command {
    /// Builds a placement command that reinstates the provided record.
    ///
    /// The stacking policy is used so records that were legally stacked above
    /// the strict layer bound can be restored.
    #[must_use]
    pub fn restore(record: TileRecord) -> Self {
        Self::PlaceTile {
            position: record.position,
            asset: record.asset,
            rotation: record.rotation,
            palette_index: record.palette_index,
            bounds: BoundsPolicy::Stacking,
        }
    }
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that the grid geometry changed.
    GridConfigured {
        /// Geometry in effect after the change.
        settings: GridSettings,
    },
    /// Confirms that a tile was placed. Signals creation of its visual instance.
    TilePlaced {
        /// Record stored for the placed tile.
        record: TileRecord,
        /// Cell center in world space where the instance belongs.
        world_position: Vec3,
        /// Occupant that was replaced by this placement, if any.
        replaced: Option<TileRecord>,
    },
    /// Confirms that a tile was removed. Signals destruction of its visual instance.
    TileRemoved {
        /// Record that was removed.
        record: TileRecord,
    },
    /// Reports that a placement request was rejected without side effects.
    TilePlacementRejected {
        /// Cell provided in the placement request.
        position: GridCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Reports that a removal request was rejected without side effects.
    TileRemovalRejected {
        /// Cell provided in the removal request.
        position: GridCoord,
        /// Specific reason the removal failed.
        reason: RemovalError,
    },
    /// Announces that every tile was removed.
    MapCleared {
        /// Number of tiles that were removed.
        removed: usize,
    },
    /// Announces that the spatial index was recomputed from the flat list.
    IndexRebuilt {
        /// Flat-list entries that did not make it into the index.
        discarded: usize,
    },
    /// Announces that invalid and shadowed records were purged from the flat list.
    MapValidated {
        /// Number of flat-list entries removed.
        purged: usize,
    },
    /// Announces that the map contents were replaced wholesale.
    ///
    /// Adapters holding visual instances should resynchronise from the flat list.
    MapLoaded {
        /// Number of tiles present after the load.
        tiles: usize,
    },
    /// Announces that the palette governing the map changed.
    PaletteChanged {
        /// Reference to the palette now in effect.
        palette: Option<PaletteRef>,
    },
}

impl Event {
    /// Returns the command that undoes the mutation described by this event.
    ///
    /// Replaying the inverses of a batch of events in reverse order restores
    /// the tile layout observed before the batch.
    #[must_use]
    pub fn inverse(&self) -> Option<Command> {
        match self {
            Self::TilePlaced {
                record, replaced, ..
            } => Some(match replaced {
                Some(previous) => Command::restore(previous.clone()),
                None => Command::RemoveTile {
                    position: record.position,
                },
            }),
            Self::TileRemoved { record } => Some(Command::restore(record.clone())),
            _ => None,
        }
    }
}

/// Reasons a placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The request did not reference an asset.
    MissingAsset,
    /// The requested cell fails the selected bounds policy.
    OutOfBounds,
}

/// Reasons a removal request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemovalError {
    /// No tile occupies the requested cell.
    Unoccupied,
}
