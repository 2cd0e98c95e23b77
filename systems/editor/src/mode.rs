//! Tool selection state machine.

/// Basic interaction mode chosen by the user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ToolMode {
    /// No tool is active; pointer input is ignored.
    #[default]
    None,
    /// Place the selected asset.
    Paint,
    /// Remove tiles.
    Erase,
    /// Adopt the asset and rotation of a clicked tile.
    Picker,
}

/// Shape-based tool layered on top of the paint mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AdvancedTool {
    /// Plain strokes.
    #[default]
    None,
    /// Flood fill of the connected region under the cursor.
    PaintBucket,
    /// Filled rectangle dragged between two corners.
    RectangleFill,
    /// Line dragged between two endpoints.
    LineTool,
    /// Ring dragged from its center.
    CircleTool,
}

/// Current tool selection.
///
/// Advanced tools always paint, so selecting one forces [`ToolMode::Paint`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ToolState {
    mode: ToolMode,
    advanced: AdvancedTool,
}

impl ToolState {
    /// Active basic mode.
    #[must_use]
    pub const fn mode(&self) -> ToolMode {
        self.mode
    }

    /// Active advanced tool.
    #[must_use]
    pub const fn advanced(&self) -> AdvancedTool {
        self.advanced
    }

    /// Selects a basic mode, dropping any advanced tool.
    pub fn select_mode(&mut self, mode: ToolMode) {
        self.mode = mode;
        self.advanced = AdvancedTool::None;
    }

    /// Selects an advanced tool. Clearing the advanced tool returns to plain painting.
    pub fn select_advanced(&mut self, tool: AdvancedTool) {
        self.mode = ToolMode::Paint;
        self.advanced = tool;
    }

    /// Flips between painting and erasing.
    pub fn toggle_paint_erase(&mut self) {
        let next = if self.mode == ToolMode::Paint {
            ToolMode::Erase
        } else {
            ToolMode::Paint
        };
        self.select_mode(next);
    }
}
