//! Resolution of pointer rays into target grid cells.
//!
//! Smart stacking targets the cell directly above or below an existing tile
//! whose top or bottom face was hit. Every other case falls back to
//! intersecting the ray with the horizontal plane of the selected layer.

use glam::Vec3;
use gridforge_core::{BoundsPolicy, GridCoord, GridSettings};

use crate::EditorConfig;

const PARALLEL_EPSILON: f32 = 1.0e-6;

/// Half-line cast from the camera through the pointer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    /// World-space start of the ray.
    pub origin: Vec3,
    /// World-space direction of the ray. Need not be normalised.
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray.
    #[must_use]
    pub const fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }
}

/// Surface of a placed tile hit by the pointer ray, as reported by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceHit {
    /// World-space point of contact.
    pub point: Vec3,
    /// Surface normal at the point of contact.
    pub normal: Vec3,
}

/// Strategy that produced a [`ResolvedTarget`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// Cell adjacent to the top or bottom face of an existing tile.
    SmartStacking,
    /// Cell on the selected layer's plane.
    ExplicitLayer,
    /// Occupied cell whose surface was hit.
    Surface,
}

/// Grid cell targeted by pointer input along with the policy to place it with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Targeted cell.
    pub position: GridCoord,
    /// Bounds policy placements at this cell must use.
    pub bounds: BoundsPolicy,
    /// Strategy that produced the target.
    pub resolution: Resolution,
}

impl ResolvedTarget {
    /// Target on an explicitly selected layer, validated strictly.
    #[must_use]
    pub const fn explicit(position: GridCoord) -> Self {
        Self {
            position,
            bounds: BoundsPolicy::Strict,
            resolution: Resolution::ExplicitLayer,
        }
    }
}

/// Resolves the cell targeted by the pointer.
///
/// `hit` should be `None` when smart stacking is disabled or the ray missed
/// every tile. `is_occupied` mirrors the world's `query::is_occupied`.
pub fn resolve_target<F>(
    ray: Ray,
    hit: Option<SurfaceHit>,
    settings: &GridSettings,
    layer: i32,
    config: &EditorConfig,
    mut is_occupied: F,
) -> Option<ResolvedTarget>
where
    F: FnMut(GridCoord) -> bool,
{
    hit.and_then(|hit| stacking_target(hit, settings, config, &mut is_occupied))
        .or_else(|| explicit_layer_target(ray, settings, layer))
}

/// Cell containing the hit surface, found by nudging the hit point inward.
#[must_use]
pub fn surface_cell(hit: SurfaceHit, settings: &GridSettings, config: &EditorConfig) -> GridCoord {
    let normal = hit.normal.normalize_or_zero();
    settings.world_to_grid(hit.point - normal * config.surface_nudge)
}

fn stacking_target<F>(
    hit: SurfaceHit,
    settings: &GridSettings,
    config: &EditorConfig,
    is_occupied: &mut F,
) -> Option<ResolvedTarget>
where
    F: FnMut(GridCoord) -> bool,
{
    let normal = hit.normal.normalize_or_zero();
    let cell = surface_cell(hit, settings, config);
    if !is_occupied(cell) {
        return None;
    }

    let position = if normal.y > config.stacking_normal_threshold {
        cell.above()
    } else if normal.y < -config.stacking_normal_threshold {
        cell.below()
    } else {
        return None;
    };

    settings
        .dimensions()
        .contains_relaxed(position)
        .then_some(ResolvedTarget {
            position,
            bounds: BoundsPolicy::Stacking,
            resolution: Resolution::SmartStacking,
        })
}

fn explicit_layer_target(ray: Ray, settings: &GridSettings, layer: i32) -> Option<ResolvedTarget> {
    if ray.direction.y.abs() < PARALLEL_EPSILON {
        return None;
    }

    let height = settings.layer_height(layer);
    let distance = (height - ray.origin.y) / ray.direction.y;
    if distance < 0.0 {
        return None;
    }

    let point = ray.origin + ray.direction * distance;
    let position = settings.world_to_grid(point).with_y(layer);
    settings
        .dimensions()
        .contains_strict(position)
        .then_some(ResolvedTarget::explicit(position))
}
