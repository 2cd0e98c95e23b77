#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative grid store for Gridforge maps.
//!
//! The [`World`] owns every placed [`TileRecord`] twice: once in a flat list
//! that mirrors what a host scene persists, and once in a spatial index keyed
//! by [`GridCoord`] for constant-time lookups. All mutation flows through
//! [`apply`], which reports its outcome as [`Event`] values.

mod assets;
pub mod snapshot;

use std::collections::HashMap;

use gridforge_core::{
    BoundsPolicy, Command, Event, GridCoord, GridSettings, PaletteRef, PlacementError,
    RemovalError, TileRecord,
};
use tracing::debug;

use crate::assets::AssetIndex;

/// Represents the authoritative state of a grid map.
#[derive(Clone, Debug, Default)]
pub struct World {
    settings: GridSettings,
    palette: Option<PaletteRef>,
    records: Vec<TileRecord>,
    index: HashMap<GridCoord, TileRecord>,
    assets: AssetIndex,
}

impl World {
    /// Creates an empty map using the default grid geometry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty map with the provided grid geometry.
    #[must_use]
    pub fn with_settings(settings: GridSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Restores a map from a flat record list exactly as a host persisted it.
    ///
    /// Invalid and shadowed records are kept in the list; the index only
    /// contains the valid winners.
    #[must_use]
    pub fn from_records(settings: GridSettings, records: Vec<TileRecord>) -> Self {
        let mut world = Self {
            settings,
            records,
            ..Self::default()
        };
        let _ = world.rebuild_index();
        world
    }

    /// Places a tile, replacing any occupant of its cell.
    ///
    /// Returns `false` without side effects when the record carries no asset
    /// or its position fails `bounds`.
    pub fn place_tile(
        &mut self,
        record: TileRecord,
        bounds: BoundsPolicy,
        out_events: &mut Vec<Event>,
    ) -> bool {
        let position = record.position;
        if !record.is_valid() {
            debug!(?position, "placement rejected: missing asset");
            out_events.push(Event::TilePlacementRejected {
                position,
                reason: PlacementError::MissingAsset,
            });
            return false;
        }

        if !self.settings.dimensions().contains(position, bounds) {
            debug!(?position, ?bounds, "placement rejected: out of bounds");
            out_events.push(Event::TilePlacementRejected {
                position,
                reason: PlacementError::OutOfBounds,
            });
            return false;
        }

        let replaced = self.detach(position);
        self.records.push(record.clone());
        self.assets.insert(&record.asset, position);
        let _ = self.index.insert(position, record.clone());

        debug!(?position, asset = %record.asset, replaced = replaced.is_some(), "tile placed");
        out_events.push(Event::TilePlaced {
            world_position: self.settings.grid_to_world(position),
            record,
            replaced,
        });
        true
    }

    /// Removes the tile occupying `position`.
    ///
    /// Returns `false` when the cell is unoccupied.
    pub fn remove_tile(&mut self, position: GridCoord, out_events: &mut Vec<Event>) -> bool {
        if !self.index.contains_key(&position) {
            out_events.push(Event::TileRemovalRejected {
                position,
                reason: RemovalError::Unoccupied,
            });
            return false;
        }
        let Some(record) = self.detach(position) else {
            return false;
        };

        debug!(?position, asset = %record.asset, "tile removed");
        out_events.push(Event::TileRemoved { record });
        true
    }

    /// Removes every tile, reporting each removal before the final summary.
    pub fn clear_all(&mut self, out_events: &mut Vec<Event>) {
        let mut removed = 0;
        for record in self.records.drain(..) {
            // The index holds one winner per cell, so each cell reports once.
            if let Some(indexed) = self.index.remove(&record.position) {
                removed += 1;
                out_events.push(Event::TileRemoved { record: indexed });
            }
        }
        self.index.clear();
        self.assets.clear();

        debug!(removed, "map cleared");
        out_events.push(Event::MapCleared { removed });
    }

    /// Recomputes the spatial index from the flat list.
    ///
    /// Invalid records are skipped and later records win over earlier ones at
    /// the same position. Returns the number of list entries left out.
    pub fn rebuild_index(&mut self) -> usize {
        self.index.clear();
        self.assets.clear();

        let mut discarded = 0;
        for record in &self.records {
            if !record.is_valid() {
                discarded += 1;
                continue;
            }
            if let Some(shadowed) = self.index.insert(record.position, record.clone()) {
                self.assets.remove(&shadowed.asset, shadowed.position);
                discarded += 1;
            }
            self.assets.insert(&record.asset, record.position);
        }
        discarded
    }

    /// Purges invalid and shadowed records from the flat list.
    ///
    /// Returns the number of list entries removed.
    pub fn validate(&mut self) -> usize {
        let _ = self.rebuild_index();
        let before = self.records.len();
        let live: Vec<TileRecord> = self.live_records().into_iter().cloned().collect();
        self.records = live;
        before - self.records.len()
    }

    /// Valid index winners in flat-list order, one per occupied cell.
    ///
    /// The winner at a cell is its last valid list entry, matching
    /// [`World::rebuild_index`].
    pub(crate) fn live_records(&self) -> Vec<&TileRecord> {
        let mut winners = HashMap::new();
        for (slot, record) in self.records.iter().enumerate() {
            if record.is_valid() {
                let _ = winners.insert(record.position, slot);
            }
        }
        self.records
            .iter()
            .enumerate()
            .filter(|(slot, record)| winners.get(&record.position) == Some(slot))
            .map(|(_, record)| record)
            .collect()
    }

    pub(crate) fn set_settings(&mut self, settings: GridSettings) {
        self.settings = settings;
    }

    pub(crate) fn set_palette(&mut self, palette: Option<PaletteRef>) {
        self.palette = palette;
    }

    pub(crate) fn replace_records(&mut self, records: Vec<TileRecord>) -> usize {
        self.records = records;
        self.rebuild_index()
    }

    /// Removes every flat-list entry at `position` and returns the indexed occupant.
    fn detach(&mut self, position: GridCoord) -> Option<TileRecord> {
        let occupant = self.index.remove(&position);
        if let Some(record) = &occupant {
            self.assets.remove(&record.asset, position);
        }
        self.records.retain(|record| record.position != position);
        occupant
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureGrid {
            dimensions,
            cell_size,
            offset,
        } => {
            world.settings = GridSettings::new(dimensions, cell_size, offset);
            debug!(?dimensions, cell_size = world.settings.cell_size(), "grid configured");
            out_events.push(Event::GridConfigured {
                settings: world.settings,
            });
        }
        Command::PlaceTile {
            position,
            asset,
            rotation,
            palette_index,
            bounds,
        } => {
            let record = TileRecord::new(position, asset, rotation, palette_index);
            let _ = world.place_tile(record, bounds, out_events);
        }
        Command::RemoveTile { position } => {
            let _ = world.remove_tile(position, out_events);
        }
        Command::ClearAll => world.clear_all(out_events),
        Command::RebuildIndex => {
            let discarded = world.rebuild_index();
            out_events.push(Event::IndexRebuilt { discarded });
        }
        Command::Validate => {
            let purged = world.validate();
            debug!(purged, "map validated");
            out_events.push(Event::MapValidated { purged });
        }
        Command::SetPalette { palette } => {
            world.palette = palette.clone();
            out_events.push(Event::PaletteChanged { palette });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use gridforge_core::{AssetRef, GridCoord, GridDimensions, GridSettings, PaletteRef, TileRecord};

    use super::World;

    /// Geometry of the grid.
    #[must_use]
    pub fn settings(world: &World) -> &GridSettings {
        &world.settings
    }

    /// Extent of the grid.
    #[must_use]
    pub fn dimensions(world: &World) -> GridDimensions {
        world.settings.dimensions()
    }

    /// Record occupying the provided cell, if any.
    #[must_use]
    pub fn tile_at(world: &World, position: GridCoord) -> Option<&TileRecord> {
        world.index.get(&position)
    }

    /// Reports whether the provided cell is occupied.
    #[must_use]
    pub fn is_occupied(world: &World, position: GridCoord) -> bool {
        world.index.contains_key(&position)
    }

    /// Flat record list, including any invalid or shadowed entries.
    #[must_use]
    pub fn tiles(world: &World) -> &[TileRecord] {
        &world.records
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn tile_count(world: &World) -> usize {
        world.index.len()
    }

    /// Reference to the palette governing the map.
    #[must_use]
    pub fn palette(world: &World) -> Option<&PaletteRef> {
        world.palette.as_ref()
    }

    /// Cells occupied by the asset in ascending coordinate order.
    #[must_use]
    pub fn positions_of(world: &World, asset: &AssetRef) -> Vec<GridCoord> {
        world.assets.positions(asset)
    }

    /// Number of occupied cells per asset, ordered by asset identifier.
    #[must_use]
    pub fn asset_usage(world: &World) -> Vec<(AssetRef, usize)> {
        world.assets.usage()
    }

    /// Occupied records on the provided layer in ascending coordinate order.
    #[must_use]
    pub fn tiles_on_layer(world: &World, layer: i32) -> Vec<&TileRecord> {
        let mut records: Vec<&TileRecord> = world
            .index
            .values()
            .filter(|record| record.position.y == layer)
            .collect();
        records.sort_by_key(|record| record.position);
        records
    }
}
