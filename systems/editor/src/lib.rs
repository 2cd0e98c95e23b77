#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure editing system that translates pointer gestures into tile commands.
//!
//! The [`Editor`] owns tool selection, brush state, the active layer and the
//! in-progress shape gesture. Hosts resolve pointer rays through
//! [`Editor::resolve`], feed the result to [`Editor::handle`], and apply the
//! emitted commands to the world.

mod config;
mod mode;
mod resolve;

use glam::{EulerRot, Quat};
use gridforge_core::{
    AssetRef, BoundsPolicy, Command, GridCoord, GridDimensions, GridSettings, Palette, TileRecord,
    NO_PALETTE_INDEX,
};
use gridforge_system_batch::{Batch, Brush};
use gridforge_system_shapes::{flood_fill, DragShape, GesturePhase, ShapeGesture};
use tracing::warn;

pub use config::EditorConfig;
pub use mode::{AdvancedTool, ToolMode, ToolState};
pub use resolve::{resolve_target, surface_cell, Ray, Resolution, ResolvedTarget, SurfaceHit};

/// Asset chosen for painting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    /// Asset placed by paint operations.
    pub asset: AssetRef,
    /// Palette slot the asset was chosen from, if known.
    pub palette_index: Option<usize>,
}

/// Pointer input for a single frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PointerInput {
    /// Phase of the primary button gesture.
    pub phase: GesturePhase,
    /// Cell under the pointer, if any.
    pub target: Option<ResolvedTarget>,
}

impl PointerInput {
    /// Creates a new pointer input descriptor.
    #[must_use]
    pub const fn new(phase: GesturePhase, target: Option<ResolvedTarget>) -> Self {
        Self { phase, target }
    }
}

/// Read-only map context needed while handling input.
#[derive(Clone, Copy, Debug)]
pub struct EditContext<'a> {
    /// Extent of the edited grid.
    pub dimensions: GridDimensions,
    /// Palette governing the edited map, if one is loaded.
    pub palette: Option<&'a Palette>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Stroke {
    active: bool,
    last: Option<GridCoord>,
}

impl Stroke {
    fn begin(&mut self, position: GridCoord) {
        self.active = true;
        self.last = Some(position);
    }

    /// Records the position and reports whether it differs from the previous one.
    fn advance(&mut self, position: GridCoord) -> bool {
        if !self.active || self.last == Some(position) {
            return false;
        }
        self.last = Some(position);
        true
    }

    fn end(&mut self) {
        *self = Self::default();
    }
}

/// Interactive editing state.
#[derive(Clone, Debug)]
pub struct Editor {
    config: EditorConfig,
    tools: ToolState,
    gesture: ShapeGesture,
    stroke: Stroke,
    selection: Option<Selection>,
    rotation: Quat,
    layer: i32,
    layer_isolation: bool,
    smart_stacking: bool,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    /// Creates an idle editor using the provided heuristics.
    #[must_use]
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            tools: ToolState::default(),
            gesture: ShapeGesture::new(config.circle_band),
            stroke: Stroke::default(),
            selection: None,
            rotation: Quat::IDENTITY,
            layer: 0,
            layer_isolation: false,
            smart_stacking: false,
        }
    }

    /// Heuristics in effect.
    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Current tool selection.
    #[must_use]
    pub fn tools(&self) -> ToolState {
        self.tools
    }

    /// Switches to painting.
    pub fn select_paint(&mut self) {
        self.select_mode(ToolMode::Paint);
    }

    /// Switches to erasing.
    pub fn select_erase(&mut self) {
        self.select_mode(ToolMode::Erase);
    }

    /// Switches to the picker.
    pub fn select_picker(&mut self) {
        self.select_mode(ToolMode::Picker);
    }

    /// Selects an advanced tool, abandoning any in-progress gesture.
    pub fn select_advanced_tool(&mut self, tool: AdvancedTool) {
        self.tools.select_advanced(tool);
        self.cancel();
    }

    /// Flips between painting and erasing.
    pub fn toggle_paint_erase(&mut self) {
        self.tools.toggle_paint_erase();
        self.cancel();
    }

    /// Abandons the in-progress gesture and stroke without committing them.
    pub fn cancel(&mut self) {
        self.gesture.reset();
        self.stroke.end();
    }

    fn select_mode(&mut self, mode: ToolMode) {
        self.tools.select_mode(mode);
        self.cancel();
    }

    /// Current asset selection.
    #[must_use]
    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Selects the palette entry at `index` and switches to painting.
    ///
    /// Returns `false` when the slot is empty.
    pub fn select_tile(&mut self, index: usize, palette: &Palette) -> bool {
        let Some(asset) = palette.get(index) else {
            return false;
        };
        self.select_asset(asset.clone(), Some(index));
        self.select_paint();
        true
    }

    /// Selects an asset directly without switching modes.
    pub fn select_asset(&mut self, asset: AssetRef, palette_index: Option<usize>) {
        self.selection = Some(Selection {
            asset,
            palette_index,
        });
    }

    /// Brush described by the current selection and rotation.
    #[must_use]
    pub fn brush(&self) -> Option<Brush> {
        self.selection.as_ref().map(|selection| {
            let palette_index = selection
                .palette_index
                .and_then(|index| i32::try_from(index).ok())
                .unwrap_or(NO_PALETTE_INDEX);
            Brush::new(selection.asset.clone(), self.rotation, palette_index)
        })
    }

    /// Orientation applied to placed tiles.
    #[must_use]
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Replaces the orientation applied to placed tiles.
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation.normalize();
    }

    /// Turns the brush by ninety degrees about the vertical axis.
    pub fn rotate_quarter_turn(&mut self) {
        self.set_rotation(self.rotation * Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
    }

    /// Restores the unrotated orientation.
    pub fn reset_rotation(&mut self) {
        self.rotation = Quat::IDENTITY;
    }

    /// Heading of the brush in whole degrees within `[0, 360)`.
    #[must_use]
    pub fn rotation_degrees(&self) -> i32 {
        let (yaw, _, _) = self.rotation.to_euler(EulerRot::YXZ);
        (yaw.to_degrees().round() as i32).rem_euclid(360)
    }

    /// Layer explicit-layer resolution places on.
    #[must_use]
    pub fn layer(&self) -> i32 {
        self.layer
    }

    /// Selects a layer, clamped to the grid's strict layer range.
    pub fn set_layer(&mut self, layer: i32, dimensions: GridDimensions) {
        self.layer = layer.clamp(0, dimensions.top_layer());
    }

    /// Moves one layer up, staying within the grid.
    pub fn raise_layer(&mut self, dimensions: GridDimensions) {
        self.set_layer(self.layer.saturating_add(1), dimensions);
    }

    /// Moves one layer down, staying within the grid.
    pub fn lower_layer(&mut self, dimensions: GridDimensions) {
        self.set_layer(self.layer.saturating_sub(1), dimensions);
    }

    /// Re-clamps the layer after the grid was resized.
    pub fn clamp_layer(&mut self, dimensions: GridDimensions) {
        self.set_layer(self.layer, dimensions);
    }

    /// Reports whether only the selected layer should be visible.
    #[must_use]
    pub fn layer_isolation(&self) -> bool {
        self.layer_isolation
    }

    /// Enables or disables layer isolation.
    pub fn set_layer_isolation(&mut self, active: bool) {
        self.layer_isolation = active;
    }

    /// Reports whether smart stacking is attempted before explicit-layer resolution.
    #[must_use]
    pub fn smart_stacking(&self) -> bool {
        self.smart_stacking
    }

    /// Enables or disables smart stacking.
    pub fn set_smart_stacking(&mut self, enabled: bool) {
        self.smart_stacking = enabled;
    }

    /// Positions the in-progress shape gesture would commit.
    #[must_use]
    pub fn preview(&self) -> &[GridCoord] {
        self.gesture.preview()
    }

    /// Resolves the cell targeted by a pointer ray for the active tool.
    ///
    /// Picking and erasing target the hit tile itself. Painting attempts smart
    /// stacking first when enabled, then the selected layer's plane.
    pub fn resolve<F>(
        &self,
        ray: Ray,
        hit: Option<SurfaceHit>,
        settings: &GridSettings,
        mut is_occupied: F,
    ) -> Option<ResolvedTarget>
    where
        F: FnMut(GridCoord) -> bool,
    {
        let targets_surface = self.tools.advanced() == AdvancedTool::None
            && matches!(self.tools.mode(), ToolMode::Picker | ToolMode::Erase);
        if targets_surface {
            if let Some(hit) = hit {
                let cell = surface_cell(hit, settings, &self.config);
                if is_occupied(cell) {
                    return Some(ResolvedTarget {
                        position: cell,
                        bounds: BoundsPolicy::Stacking,
                        resolution: Resolution::Surface,
                    });
                }
            }
        }

        let hit = if self.smart_stacking { hit } else { None };
        resolve_target(ray, hit, settings, self.layer, &self.config, is_occupied)
    }

    /// Consumes one frame of pointer input and emits the resulting commands.
    ///
    /// The `tile_at` closure should mirror the semantics of the world's
    /// `query::tile_at` helper.
    pub fn handle<'a, F>(
        &mut self,
        input: PointerInput,
        context: EditContext<'_>,
        mut tile_at: F,
        out: &mut Vec<Command>,
    ) where
        F: FnMut(GridCoord) -> Option<&'a TileRecord>,
    {
        let Some(target) = input.target else {
            if input.phase == GesturePhase::Release {
                self.stroke.end();
                self.gesture.reset();
            }
            return;
        };

        match self.tools.advanced() {
            AdvancedTool::PaintBucket => {
                if input.phase == GesturePhase::Press {
                    self.paint_bucket(target.position, context.dimensions, &mut tile_at, out);
                }
            }
            AdvancedTool::RectangleFill => {
                self.drag_shape(DragShape::Rectangle, target, input.phase, context, &mut tile_at, out);
            }
            AdvancedTool::LineTool => {
                self.drag_shape(DragShape::Line, target, input.phase, context, &mut tile_at, out);
            }
            AdvancedTool::CircleTool => {
                self.drag_shape(DragShape::Circle, target, input.phase, context, &mut tile_at, out);
            }
            AdvancedTool::None => match self.tools.mode() {
                ToolMode::Picker => {
                    if input.phase == GesturePhase::Press {
                        let _ = self.pick(target.position, context.palette, &mut tile_at);
                    }
                }
                ToolMode::Paint | ToolMode::Erase => {
                    self.stroke_input(target, input.phase, &mut tile_at, out);
                }
                ToolMode::None => {}
            },
        }
    }

    /// Adopts the asset and rotation of the tile at `position`.
    ///
    /// Returns `true` and switches to painting when the tile's asset is found
    /// in the palette.
    pub fn pick<'a, F>(&mut self, position: GridCoord, palette: Option<&Palette>, mut tile_at: F) -> bool
    where
        F: FnMut(GridCoord) -> Option<&'a TileRecord>,
    {
        let Some(record) = tile_at(position).filter(|record| record.is_valid()) else {
            return false;
        };
        let Some(palette) = palette else {
            warn!(?position, "picker unavailable: the map has no palette");
            return false;
        };
        let Some(index) = palette.index_of(&record.asset) else {
            warn!(asset = %record.asset, "picked asset is not part of the current palette");
            return false;
        };

        self.select_asset(record.asset.clone(), Some(index));
        self.rotation = record.rotation;
        self.select_paint();
        true
    }

    fn paint_bucket<'a, F>(
        &mut self,
        start: GridCoord,
        dimensions: GridDimensions,
        tile_at: &mut F,
        out: &mut Vec<Command>,
    ) where
        F: FnMut(GridCoord) -> Option<&'a TileRecord>,
    {
        let Some(brush) = self.brush() else {
            return;
        };
        let region = flood_fill(start, Some(&brush.asset), dimensions, |cell| {
            tile_at(cell).map(|record| record.asset.clone())
        });
        let _ = Batch::paint(brush, BoundsPolicy::Strict).apply(region, dimensions, tile_at, out);
    }

    fn drag_shape<'a, F>(
        &mut self,
        shape: DragShape,
        target: ResolvedTarget,
        phase: GesturePhase,
        context: EditContext<'_>,
        tile_at: &mut F,
        out: &mut Vec<Command>,
    ) where
        F: FnMut(GridCoord) -> Option<&'a TileRecord>,
    {
        let Some(positions) = self
            .gesture
            .update(shape, target.position, phase, context.dimensions)
        else {
            return;
        };
        if let Some(brush) = self.brush() {
            let _ = Batch::paint(brush, BoundsPolicy::Strict).apply(
                positions,
                context.dimensions,
                tile_at,
                out,
            );
        }
    }

    fn stroke_input<'a, F>(
        &mut self,
        target: ResolvedTarget,
        phase: GesturePhase,
        tile_at: &mut F,
        out: &mut Vec<Command>,
    ) where
        F: FnMut(GridCoord) -> Option<&'a TileRecord>,
    {
        let position = target.position;
        let apply = match phase {
            GesturePhase::Press => {
                self.stroke.begin(position);
                true
            }
            GesturePhase::Hold => self.stroke.advance(position),
            GesturePhase::Release => {
                self.stroke.end();
                false
            }
        };
        if !apply {
            return;
        }

        let occupied = tile_at(position).is_some();
        match self.tools.mode() {
            ToolMode::Paint if !occupied => {
                if let Some(brush) = self.brush() {
                    out.push(Command::PlaceTile {
                        position,
                        asset: brush.asset,
                        rotation: brush.rotation,
                        palette_index: brush.palette_index,
                        bounds: target.bounds,
                    });
                }
            }
            ToolMode::Erase if occupied => out.push(Command::RemoveTile { position }),
            _ => {}
        }
    }
}
