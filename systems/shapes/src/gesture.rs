//! Caller-owned state for press, drag and release shape gestures.

use std::mem;

use gridforge_core::{GridCoord, GridDimensions};

use crate::{circle, circle_radius, line, rectangle, DEFAULT_RING_BAND};

/// Shapes produced by dragging from a start cell to the cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DragShape {
    /// Filled axis-aligned rectangle between the two corners.
    Rectangle,
    /// Rasterised line between the two endpoints.
    Line,
    /// Ring centred on the start cell passing through the cursor.
    Circle,
}

impl DragShape {
    /// Positions covered by the shape spanned from `start` to `cursor`, limited
    /// to the columns of `extent`.
    #[must_use]
    pub fn positions(
        self,
        start: GridCoord,
        cursor: GridCoord,
        band: f32,
        extent: GridDimensions,
    ) -> Vec<GridCoord> {
        match self {
            Self::Rectangle => rectangle(start, cursor, extent),
            Self::Line => line(start, cursor, extent),
            Self::Circle => circle(start, circle_radius(start, cursor), band, extent),
        }
    }
}

/// Phase of the pointer gesture driving a shape tool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GesturePhase {
    /// Pointer pressed this frame.
    Press,
    /// Pointer held or dragged.
    Hold,
    /// Pointer released this frame.
    Release,
}

/// Generator state for an in-progress shape drag.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeGesture {
    start: Option<GridCoord>,
    drawing: bool,
    preview: Vec<GridCoord>,
    band: f32,
}

impl ShapeGesture {
    /// Creates idle gesture state using the provided ring band.
    #[must_use]
    pub fn new(band: f32) -> Self {
        Self {
            start: None,
            drawing: false,
            preview: Vec::new(),
            band,
        }
    }

    /// Advances the gesture by one frame.
    ///
    /// A press records the start cell and clears the preview. Held and
    /// released frames recompute the preview from the start cell; a release
    /// additionally returns the committed positions and resets the gesture.
    /// Frames without a preceding press are ignored. Previews only cover
    /// the columns of `extent`.
    pub fn update(
        &mut self,
        shape: DragShape,
        cursor: GridCoord,
        phase: GesturePhase,
        extent: GridDimensions,
    ) -> Option<Vec<GridCoord>> {
        if phase == GesturePhase::Press {
            self.start = Some(cursor);
            self.drawing = true;
            self.preview.clear();
            return None;
        }

        let start = self.start.filter(|_| self.drawing)?;
        self.preview = shape.positions(start, cursor, self.band, extent);

        if phase == GesturePhase::Release {
            let committed = mem::take(&mut self.preview);
            self.reset();
            return Some(committed);
        }
        None
    }

    /// Positions the current drag would commit.
    #[must_use]
    pub fn preview(&self) -> &[GridCoord] {
        &self.preview
    }

    /// Cell where the current drag started.
    #[must_use]
    pub fn start(&self) -> Option<GridCoord> {
        self.start
    }

    /// Reports whether a drag is in progress.
    #[must_use]
    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    /// Half-width of the band accepted around ring radii.
    #[must_use]
    pub fn band(&self) -> f32 {
        self.band
    }

    /// Abandons any in-progress drag without committing it.
    pub fn reset(&mut self) {
        self.start = None;
        self.drawing = false;
        self.preview.clear();
    }
}

impl Default for ShapeGesture {
    fn default() -> Self {
        Self::new(DEFAULT_RING_BAND)
    }
}
