#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Visual representation contracts for Gridforge adapters.
//!
//! The grid store never touches scene objects. Hosts implement
//! [`InstanceHost`] and let an [`InstanceRegistry`] translate world events
//! into spawn and despawn calls. The registry maps each occupied
//! [`GridCoord`] to the opaque handle the host returned, so the coordinate is
//! the only link between a record and its visual instance.

use std::{collections::BTreeMap, fmt};

use glam::{Quat, Vec3};
use gridforge_core::{AssetRef, Event, GridCoord, GridSettings, TileRecord};
use tracing::{debug, warn};

/// Description of a visual instance the host should create.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnRequest<'a> {
    /// Asset the instance represents.
    pub asset: &'a AssetRef,
    /// Owning grid cell, usable for reverse lookups.
    pub position: GridCoord,
    /// Cell center in world space.
    pub world_position: Vec3,
    /// Orientation of the instance.
    pub rotation: Quat,
    /// Cached palette slot of the asset, or `-1`. Hosts may fall back to it
    /// when the asset identifier no longer resolves.
    pub palette_index: i32,
}

/// Scene backend that owns the actual visual instances.
pub trait InstanceHost {
    /// Opaque reference to a spawned instance.
    type Handle: fmt::Debug;

    /// Creates an instance, or returns `None` when the asset cannot be resolved.
    fn spawn(&mut self, request: SpawnRequest<'_>) -> Option<Self::Handle>;

    /// Destroys a previously spawned instance.
    fn despawn(&mut self, handle: Self::Handle);

    /// Shows or hides an instance without destroying it.
    fn set_visible(&mut self, handle: &Self::Handle, visible: bool);
}

/// Outcome of rebuilding every instance from a record list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResyncReport {
    /// Instances created.
    pub spawned: usize,
    /// Records skipped because they carry no asset.
    pub invalid: usize,
    /// Cells whose asset the host could not resolve.
    pub unresolved: Vec<GridCoord>,
}

/// Arena mapping occupied cells to host instance handles.
#[derive(Debug)]
pub struct InstanceRegistry<H> {
    instances: BTreeMap<GridCoord, H>,
    isolated_layer: Option<i32>,
}

impl<H> Default for InstanceRegistry<H> {
    fn default() -> Self {
        Self {
            instances: BTreeMap::new(),
            isolated_layer: None,
        }
    }
}

impl<H: fmt::Debug> InstanceRegistry<H> {
    /// Creates an empty registry with every layer visible.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Reports whether no instance is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Handle of the instance owned by `position`, if any.
    #[must_use]
    pub fn handle_at(&self, position: GridCoord) -> Option<&H> {
        self.instances.get(&position)
    }

    /// Layer currently shown in isolation.
    #[must_use]
    pub fn isolated_layer(&self) -> Option<i32> {
        self.isolated_layer
    }

    /// Mirrors world events into the host.
    ///
    /// Returns `true` when an event invalidated instances wholesale and the
    /// caller should [`resync`](Self::resync) from the world's flat list.
    pub fn handle_events<T>(&mut self, host: &mut T, events: &[Event]) -> bool
    where
        T: InstanceHost<Handle = H>,
    {
        let mut needs_resync = false;
        for event in events {
            match event {
                Event::TilePlaced {
                    record,
                    world_position,
                    ..
                } => {
                    self.despawn_at(host, record.position);
                    if !self.spawn(host, record, *world_position) {
                        warn!(
                            position = ?record.position,
                            asset = %record.asset,
                            "asset could not be resolved"
                        );
                    }
                }
                Event::TileRemoved { record } => self.despawn_at(host, record.position),
                Event::GridConfigured { .. }
                | Event::IndexRebuilt { .. }
                | Event::MapLoaded { .. } => needs_resync = true,
                _ => {}
            }
        }
        needs_resync
    }

    /// Destroys every instance and rebuilds them from `tiles`.
    ///
    /// Later records win over earlier ones at the same cell. Records the host
    /// cannot resolve are reported and left for a later resync.
    pub fn resync<'a, T, I>(
        &mut self,
        host: &mut T,
        tiles: I,
        settings: &GridSettings,
    ) -> ResyncReport
    where
        T: InstanceHost<Handle = H>,
        I: IntoIterator<Item = &'a TileRecord>,
    {
        self.clear(host);

        let mut report = ResyncReport::default();
        for record in tiles {
            if !record.is_valid() {
                report.invalid += 1;
                continue;
            }
            if self.instances.contains_key(&record.position) {
                self.despawn_at(host, record.position);
                report.spawned -= 1;
            }
            report.unresolved.retain(|position| *position != record.position);
            if self.spawn(host, record, settings.grid_to_world(record.position)) {
                report.spawned += 1;
            } else {
                warn!(position = ?record.position, asset = %record.asset, "skipping unresolved tile");
                report.unresolved.push(record.position);
            }
        }

        debug!(
            spawned = report.spawned,
            unresolved = report.unresolved.len(),
            "instances resynchronised"
        );
        report
    }

    /// Shows only instances on `layer` while `active`, or every instance otherwise.
    pub fn set_layer_isolation<T>(&mut self, host: &mut T, layer: i32, active: bool)
    where
        T: InstanceHost<Handle = H>,
    {
        self.isolated_layer = active.then_some(layer);
        for (position, handle) in &self.instances {
            host.set_visible(handle, self.is_visible(*position));
        }
    }

    /// Destroys every instance.
    pub fn clear<T>(&mut self, host: &mut T)
    where
        T: InstanceHost<Handle = H>,
    {
        for (_, handle) in std::mem::take(&mut self.instances) {
            host.despawn(handle);
        }
    }

    fn is_visible(&self, position: GridCoord) -> bool {
        self.isolated_layer.map_or(true, |layer| position.y == layer)
    }

    fn spawn<T>(&mut self, host: &mut T, record: &TileRecord, world_position: Vec3) -> bool
    where
        T: InstanceHost<Handle = H>,
    {
        let request = SpawnRequest {
            asset: &record.asset,
            position: record.position,
            world_position,
            rotation: record.rotation,
            palette_index: record.palette_index,
        };
        let Some(handle) = host.spawn(request) else {
            return false;
        };
        if !self.is_visible(record.position) {
            host.set_visible(&handle, false);
        }
        let _ = self.instances.insert(record.position, handle);
        true
    }

    fn despawn_at<T>(&mut self, host: &mut T, position: GridCoord)
    where
        T: InstanceHost<Handle = H>,
    {
        if let Some(handle) = self.instances.remove(&position) {
            host.despawn(handle);
        }
    }
}
