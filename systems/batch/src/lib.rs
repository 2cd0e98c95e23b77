#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that converts position sequences into tile mutation commands.
//!
//! Every shape tool funnels through [`Batch::apply`]. Positions that cannot be
//! applied are skipped individually and never abort the rest of the batch.

use glam::Quat;
use gridforge_core::{AssetRef, BoundsPolicy, Command, GridCoord, GridDimensions, TileRecord};

const ROTATION_EPSILON: f32 = 1.0e-5;

/// What a batch does to each of its positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BatchIntent {
    /// Place the brush asset at every position.
    Paint,
    /// Remove the occupant of every position.
    Erase,
}

/// Asset and orientation stamped by paint batches.
#[derive(Clone, Debug, PartialEq)]
pub struct Brush {
    /// Asset placed at each position.
    pub asset: AssetRef,
    /// Orientation of each placed instance.
    pub rotation: Quat,
    /// Palette slot recorded with each placement.
    pub palette_index: i32,
}

impl Brush {
    /// Creates a new brush descriptor.
    #[must_use]
    pub fn new(asset: AssetRef, rotation: Quat, palette_index: i32) -> Self {
        Self {
            asset,
            rotation,
            palette_index,
        }
    }

    /// Reports whether painting over `record` would leave it unchanged.
    #[must_use]
    pub fn matches(&self, record: &TileRecord) -> bool {
        record.asset == self.asset
            && record.palette_index == self.palette_index
            && record.rotation.abs_diff_eq(self.rotation, ROTATION_EPSILON)
    }

    fn place(&self, position: GridCoord, bounds: BoundsPolicy) -> Command {
        Command::PlaceTile {
            position,
            asset: self.asset.clone(),
            rotation: self.rotation,
            palette_index: self.palette_index,
            bounds,
        }
    }
}

/// Aggregate outcome of applying a batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Commands appended to the output buffer.
    pub emitted: usize,
    /// Positions that produced no command.
    pub skipped: usize,
}

/// Uniform paint or erase operation over a sequence of positions.
#[derive(Clone, Debug, PartialEq)]
pub struct Batch {
    intent: BatchIntent,
    brush: Option<Brush>,
    bounds: BoundsPolicy,
}

impl Batch {
    /// Creates a batch with an explicit intent and optional brush.
    #[must_use]
    pub fn new(intent: BatchIntent, brush: Option<Brush>, bounds: BoundsPolicy) -> Self {
        Self {
            intent,
            brush,
            bounds,
        }
    }

    /// Creates a paint batch stamping the provided brush.
    #[must_use]
    pub fn paint(brush: Brush, bounds: BoundsPolicy) -> Self {
        Self::new(BatchIntent::Paint, Some(brush), bounds)
    }

    /// Creates an erase batch.
    #[must_use]
    pub fn erase(bounds: BoundsPolicy) -> Self {
        Self::new(BatchIntent::Erase, None, bounds)
    }

    /// Intent applied to every position.
    #[must_use]
    pub fn intent(&self) -> BatchIntent {
        self.intent
    }

    /// Bounds policy each position is validated against.
    #[must_use]
    pub fn bounds(&self) -> BoundsPolicy {
        self.bounds
    }

    /// Brush stamped by paint batches.
    #[must_use]
    pub fn brush(&self) -> Option<&Brush> {
        self.brush.as_ref()
    }

    /// Emits one command per applicable position, in order.
    ///
    /// `occupant_at` should mirror the world's `query::tile_at` helper. Paint
    /// skips out-of-bounds cells and cells whose occupant already matches the
    /// brush, and does nothing at all without a brush. Erase skips
    /// out-of-bounds and unoccupied cells.
    pub fn apply<'a, I, F>(
        &self,
        positions: I,
        dimensions: GridDimensions,
        mut occupant_at: F,
        out: &mut Vec<Command>,
    ) -> BatchSummary
    where
        I: IntoIterator<Item = GridCoord>,
        F: FnMut(GridCoord) -> Option<&'a TileRecord>,
    {
        let mut summary = BatchSummary::default();
        if self.intent == BatchIntent::Paint && self.brush.is_none() {
            return summary;
        }

        for position in positions {
            if !dimensions.contains(position, self.bounds) {
                summary.skipped += 1;
                continue;
            }

            let occupant = occupant_at(position);
            let command = match (&self.intent, &self.brush) {
                (BatchIntent::Paint, Some(brush)) => {
                    if occupant.is_some_and(|record| brush.matches(record)) {
                        None
                    } else {
                        Some(brush.place(position, self.bounds))
                    }
                }
                (BatchIntent::Paint, None) => None,
                (BatchIntent::Erase, _) => occupant.map(|_| Command::RemoveTile { position }),
            };

            match command {
                Some(command) => {
                    out.push(command);
                    summary.emitted += 1;
                }
                None => summary.skipped += 1,
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brush(asset: &str) -> Brush {
        Brush::new(AssetRef::new(asset), Quat::IDENTITY, 0)
    }

    #[test]
    fn brush_matching_tolerates_rotation_rounding() {
        let nearly_identity = TileRecord::new(
            GridCoord::default(),
            AssetRef::new("floor"),
            Quat::from_rotation_y(1.0e-7),
            0,
        );
        assert!(brush("floor").matches(&nearly_identity));

        let other_slot = TileRecord {
            palette_index: 4,
            ..nearly_identity.clone()
        };
        assert!(!brush("floor").matches(&other_slot));
        assert!(!brush("wall").matches(&nearly_identity));
    }

    #[test]
    fn paint_without_brush_emits_nothing() {
        let batch = Batch::new(BatchIntent::Paint, None, BoundsPolicy::Strict);
        let mut out = Vec::new();

        let summary = batch.apply(
            [GridCoord::new(0, 0, 0)],
            GridDimensions::new(2, 1, 2),
            |_| None,
            &mut out,
        );

        assert_eq!(summary, BatchSummary::default());
        assert!(out.is_empty());
    }

    #[test]
    fn erase_ignores_the_brush() {
        let batch = Batch::new(BatchIntent::Erase, Some(brush("floor")), BoundsPolicy::Strict);
        let occupant = TileRecord::unrotated(GridCoord::new(1, 0, 1), AssetRef::new("wall"));
        let mut out = Vec::new();

        let summary = batch.apply(
            [GridCoord::new(1, 0, 1)],
            GridDimensions::new(2, 1, 2),
            |_| Some(&occupant),
            &mut out,
        );

        assert_eq!(summary.emitted, 1);
        assert_eq!(
            out,
            vec![Command::RemoveTile {
                position: GridCoord::new(1, 0, 1)
            }]
        );
    }
}
