#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure shape generators that turn editing gestures into grid positions.
//!
//! Generators never touch the grid store. They return position sequences that
//! the batch applier later converts into placement or removal commands.

mod gesture;

use std::{
    collections::{BTreeSet, HashSet, VecDeque},
    ops::RangeInclusive,
};

use gridforge_core::{AssetRef, GridCoord, GridDimensions};

pub use gesture::{DragShape, GesturePhase, ShapeGesture};

/// Default half-width of the band accepted around a ring's radius.
pub const DEFAULT_RING_BAND: f32 = 0.5;

const HORIZONTAL_NEIGHBOURS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Collects the 4-connected region sharing the start cell's identity.
///
/// `identity_at` reports the asset occupying a cell, or `None` when the cell
/// is empty. Spread is horizontal only and limited to strictly in-bounds
/// cells. Nothing is generated when the start cell is out of bounds or when
/// `brush` already equals the region's identity.
pub fn flood_fill<F>(
    start: GridCoord,
    brush: Option<&AssetRef>,
    dimensions: GridDimensions,
    mut identity_at: F,
) -> BTreeSet<GridCoord>
where
    F: FnMut(GridCoord) -> Option<AssetRef>,
{
    let mut region = BTreeSet::new();
    if !dimensions.contains_strict(start) {
        return region;
    }

    let mut identity = |cell: GridCoord| identity_at(cell).filter(|asset| !asset.is_empty());
    let target = identity(start);
    if let Some(brush) = brush {
        if target.as_ref() == Some(brush) {
            return region;
        }
    }

    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    let _ = visited.insert(start);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        if identity(current) != target {
            continue;
        }
        let _ = region.insert(current);

        for (dx, dz) in HORIZONTAL_NEIGHBOURS {
            let neighbour = current.offset(dx, 0, dz);
            if dimensions.contains_strict(neighbour) && visited.insert(neighbour) {
                queue.push_back(neighbour);
            }
        }
    }

    region
}

/// Every cell of the axis-aligned rectangle spanned by two corners.
///
/// Cells lie on the start corner's layer and are ordered by `x`, then `z`.
/// Only columns inside `extent` are enumerated; layers are left to the
/// caller's bounds policy.
#[must_use]
pub fn rectangle(start: GridCoord, end: GridCoord, extent: GridDimensions) -> Vec<GridCoord> {
    let (min_x, max_x) = (start.x.min(end.x).max(0), start.x.max(end.x).min(extent.x() - 1));
    let (min_z, max_z) = (start.z.min(end.z).max(0), start.z.max(end.z).min(extent.z() - 1));

    let mut positions = Vec::new();
    for x in min_x..=max_x {
        for z in min_z..=max_z {
            positions.push(GridCoord::new(x, start.y, z));
        }
    }
    positions
}

/// Rasterises a line between two cells on the start cell's layer.
///
/// Both endpoints are included exactly once when they lie inside `extent`.
/// Cells outside the extent's columns are never generated, so the cost is
/// bounded by the grid rather than by the endpoints.
#[must_use]
pub fn line(start: GridCoord, end: GridCoord, extent: GridDimensions) -> Vec<GridCoord> {
    let (sx, sz) = (i64::from(start.x), i64::from(start.z));
    let (ex, ez) = (i64::from(end.x), i64::from(end.z));
    let x_major = (ex - sx).abs() > (ez - sz).abs();

    let (major, minor, major_limit) = if x_major {
        ((sx, ex), (sz, ez), extent.x())
    } else {
        ((sz, ez), (sx, ex), extent.z())
    };
    let run = (major.1 - major.0).abs();
    let rise = (minor.1 - minor.0).abs();
    let (major_step, minor_step) = ((major.1 - major.0).signum(), (minor.1 - minor.0).signum());
    let bias = run / 2;

    let mut positions = Vec::new();
    for step in steps_within(major.0, major_step, run, major_limit) {
        let climbs = climbs_after(step, rise, run, bias);
        let along = major.0 + major_step * step;
        let across = minor.0 + minor_step * climbs;
        let (x, z) = if x_major { (along, across) } else { (across, along) };
        if let Some(cell) = column(x, start.y, z, extent) {
            positions.push(cell);
        }
    }
    positions
}

/// Minor-axis advances after `step` Bresenham iterations.
fn climbs_after(step: i64, rise: i64, run: i64, bias: i64) -> i64 {
    if run == 0 {
        return 0;
    }
    let run = i128::from(run);
    let climbs = (i128::from(step) * i128::from(rise) - i128::from(bias) + run - 1).div_euclid(run);
    // Never exceeds `rise`.
    climbs as i64
}

/// Steps `k` in `0..=run` whose major coordinate `origin + step * k` lies in `[0, limit)`.
fn steps_within(origin: i64, step: i64, run: i64, limit: i32) -> RangeInclusive<i64> {
    let limit = i64::from(limit);
    let (low, high) = match step {
        1 => (-origin, limit - 1 - origin),
        -1 => (origin - limit + 1, origin),
        _ if (0..limit).contains(&origin) => (0, 0),
        _ => (1, 0),
    };
    low.max(0)..=high.min(run)
}

fn column(x: i64, y: i32, z: i64, extent: GridDimensions) -> Option<GridCoord> {
    let x = i32::try_from(x).ok().filter(|x| (0..extent.x()).contains(x))?;
    let z = i32::try_from(z).ok().filter(|z| (0..extent.z()).contains(z))?;
    Some(GridCoord::new(x, y, z))
}

/// Cells forming a ring of the given radius around `center`.
///
/// A cell belongs to the ring when its horizontal distance from the center
/// lies within `radius ± band`. Negative radii are treated as zero. Only
/// columns inside `extent` are examined.
#[must_use]
pub fn circle(center: GridCoord, radius: i32, band: f32, extent: GridDimensions) -> Vec<GridCoord> {
    let radius = i64::from(radius.max(0));
    let band = f64::from(band);
    let (inner, outer) = (radius as f64 - band, radius as f64 + band);
    let (cx, cz) = (i64::from(center.x), i64::from(center.z));

    let x_range = (cx - radius).max(0)..=(cx + radius).min(i64::from(extent.x()) - 1);
    let z_range = (cz - radius).max(0)..=(cz + radius).min(i64::from(extent.z()) - 1);

    let mut positions = Vec::new();
    for x in x_range {
        for z in z_range.clone() {
            let distance = ((x - cx) as f64).hypot((z - cz) as f64);
            if distance < inner || distance > outer {
                continue;
            }
            if let Some(cell) = column(x, center.y, z, extent) {
                positions.push(cell);
            }
        }
    }
    positions
}

/// Ring radius implied by dragging from `start` to `current`.
///
/// The horizontal distance is rounded half to even.
#[must_use]
pub fn circle_radius(start: GridCoord, current: GridCoord) -> i32 {
    let dx = (i64::from(current.x) - i64::from(start.x)) as f64;
    let dz = (i64::from(current.z) - i64::from(start.z)) as f64;
    round_radius(dx.hypot(dz))
}

/// Rounds a distance half to even, saturating at `i32::MAX`.
fn round_radius(distance: f64) -> i32 {
    // Float to int casts saturate.
    distance.round_ties_even() as i32
}
