//! Discrete grid addressing and the world-space coordinate mapper.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Smallest edge length a grid cell may be configured with.
pub const MIN_CELL_SIZE: f32 = 0.1;

const DEFAULT_DIMENSIONS: GridDimensions = GridDimensions::new_unchecked(50, 1, 50);
const DEFAULT_CELL_SIZE: f32 = 1.0;

/// Location of a single grid cell expressed as integer column, layer and row.
///
/// Ordering is lexicographic over `x`, `y`, `z` so ordered collections of
/// coordinates iterate deterministically.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct GridCoord {
    /// Column index along the world X axis.
    pub x: i32,
    /// Layer index along the world Y axis.
    pub y: i32,
    /// Row index along the world Z axis.
    pub z: i32,
}

impl GridCoord {
    /// Creates a new grid coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Returns the coordinate displaced by the provided per-axis deltas.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(
            self.x.saturating_add(dx),
            self.y.saturating_add(dy),
            self.z.saturating_add(dz),
        )
    }

    /// Returns the coordinate moved onto the provided layer.
    #[must_use]
    pub const fn with_y(self, y: i32) -> Self {
        Self::new(self.x, y, self.z)
    }

    /// Cell directly above this one.
    #[must_use]
    pub const fn above(self) -> Self {
        self.offset(0, 1, 0)
    }

    /// Cell directly below this one.
    #[must_use]
    pub const fn below(self) -> Self {
        self.offset(0, -1, 0)
    }
}

/// Legality rules applied to a grid coordinate before mutation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoundsPolicy {
    /// Every axis must lie within `[0, dimension)`.
    #[default]
    Strict,
    /// Only the X and Z axes are checked; any layer is accepted.
    Stacking,
}

/// Extent of the grid measured in whole cells along each axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridDimensions {
    x: i32,
    y: i32,
    z: i32,
}

impl GridDimensions {
    /// Creates a new dimension descriptor, clamping each axis to at least one cell.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self {
            x: clamp_axis(x),
            y: clamp_axis(y),
            z: clamp_axis(z),
        }
    }

    const fn new_unchecked(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Number of cells along the X axis.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Number of layers along the Y axis.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Number of cells along the Z axis.
    #[must_use]
    pub const fn z(&self) -> i32 {
        self.z
    }

    /// Total number of addressable cells under the strict policy.
    #[must_use]
    pub fn cell_count(&self) -> u64 {
        // Axes are clamped positive, so the casts cannot lose sign.
        self.x as u64 * self.y as u64 * self.z as u64
    }

    /// Reports whether the coordinate is legal under the provided policy.
    #[must_use]
    pub const fn contains(&self, coord: GridCoord, policy: BoundsPolicy) -> bool {
        match policy {
            BoundsPolicy::Strict => self.contains_strict(coord),
            BoundsPolicy::Stacking => self.contains_relaxed(coord),
        }
    }

    /// Checks all three axes against `[0, dimension)`.
    #[must_use]
    pub const fn contains_strict(&self, coord: GridCoord) -> bool {
        self.contains_relaxed(coord) && coord.y >= 0 && coord.y < self.y
    }

    /// Checks only the horizontal axes; the layer is unconstrained.
    #[must_use]
    pub const fn contains_relaxed(&self, coord: GridCoord) -> bool {
        coord.x >= 0 && coord.x < self.x && coord.z >= 0 && coord.z < self.z
    }

    /// Highest layer index accepted by the strict policy.
    #[must_use]
    pub const fn top_layer(&self) -> i32 {
        self.y - 1
    }
}

impl Default for GridDimensions {
    fn default() -> Self {
        DEFAULT_DIMENSIONS
    }
}

const fn clamp_axis(value: i32) -> i32 {
    if value < 1 {
        1
    } else {
        value
    }
}

/// Geometry of a grid map: its extent, cell size and world-space origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridSettings {
    dimensions: GridDimensions,
    cell_size: f32,
    offset: Vec3,
}

impl GridSettings {
    /// Creates grid settings, clamping the cell size to [`MIN_CELL_SIZE`].
    #[must_use]
    pub fn new(dimensions: GridDimensions, cell_size: f32, offset: Vec3) -> Self {
        Self {
            dimensions,
            cell_size: clamp_cell_size(cell_size),
            offset,
        }
    }

    /// Extent of the grid.
    #[must_use]
    pub const fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }

    /// World-space edge length of a single cell.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// World-space origin of cell `(0, 0, 0)`.
    #[must_use]
    pub const fn offset(&self) -> Vec3 {
        self.offset
    }

    /// Replaces the grid extent.
    pub fn set_dimensions(&mut self, dimensions: GridDimensions) {
        self.dimensions = dimensions;
    }

    /// Replaces the cell size, clamping it to [`MIN_CELL_SIZE`].
    pub fn set_cell_size(&mut self, cell_size: f32) {
        self.cell_size = clamp_cell_size(cell_size);
    }

    /// Replaces the world-space origin.
    pub fn set_offset(&mut self, offset: Vec3) {
        self.offset = offset;
    }

    /// Converts a world-space position into the grid cell containing it.
    #[must_use]
    pub fn world_to_grid(&self, position: Vec3) -> GridCoord {
        world_to_grid(position, self.cell_size, self.offset)
    }

    /// Converts a grid cell into the world-space position of its center.
    #[must_use]
    pub fn grid_to_world(&self, coord: GridCoord) -> Vec3 {
        grid_to_world(coord, self.cell_size, self.offset)
    }

    /// World-space height of the horizontal plane at the bottom of `layer`.
    #[must_use]
    pub fn layer_height(&self, layer: i32) -> f32 {
        self.offset.y + layer as f32 * self.cell_size
    }
}

impl Default for GridSettings {
    fn default() -> Self {
        Self::new(GridDimensions::default(), DEFAULT_CELL_SIZE, Vec3::ZERO)
    }
}

fn clamp_cell_size(cell_size: f32) -> f32 {
    // `max` discards NaN in favour of the minimum.
    cell_size.max(MIN_CELL_SIZE)
}

/// Converts a world-space position into the grid cell containing it.
///
/// Each axis is computed as `floor((position - offset) / cell_size)`.
#[must_use]
pub fn world_to_grid(position: Vec3, cell_size: f32, offset: Vec3) -> GridCoord {
    let local = ((position - offset) / cell_size).floor();
    GridCoord::new(local.x as i32, local.y as i32, local.z as i32)
}

/// Converts a grid cell into the world-space position of its center.
///
/// This is the left inverse of [`world_to_grid`] only up to cell granularity.
#[must_use]
pub fn grid_to_world(coord: GridCoord, cell_size: f32, offset: Vec3) -> Vec3 {
    let cell = Vec3::new(coord.x as f32, coord.y as f32, coord.z as f32);
    (cell + Vec3::splat(0.5)) * cell_size + offset
}
