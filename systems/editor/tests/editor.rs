use glam::{Quat, Vec3};
use gridforge_core::{
    AssetRef, BoundsPolicy, Command, Event, GridCoord, GridDimensions, Palette, TileRecord,
};
use gridforge_system_editor::{
    AdvancedTool, EditContext, Editor, PointerInput, Ray, Resolution, ResolvedTarget, SurfaceHit,
    ToolMode,
};
use gridforge_system_shapes::GesturePhase;
use gridforge_world::{self as world, query, World};

fn world_with_grid(x: i32, y: i32, z: i32) -> World {
    let mut world = World::new();
    world::apply(
        &mut world,
        Command::ConfigureGrid {
            dimensions: GridDimensions::new(x, y, z),
            cell_size: 1.0,
            offset: Vec3::ZERO,
        },
        &mut Vec::new(),
    );
    world
}

fn palette() -> Palette {
    let mut palette = Palette::new("Dungeon", "palette-dungeon");
    let _ = palette.add(AssetRef::new("floor"));
    let _ = palette.add(AssetRef::new("wall"));
    palette
}

fn drive(
    editor: &mut Editor,
    world: &mut World,
    palette: Option<&Palette>,
    phase: GesturePhase,
    cell: Option<GridCoord>,
) -> Vec<Event> {
    let mut commands = Vec::new();
    let current: &World = world;
    editor.handle(
        PointerInput::new(phase, cell.map(ResolvedTarget::explicit)),
        EditContext {
            dimensions: query::dimensions(current),
            palette,
        },
        |position| query::tile_at(current, position),
        &mut commands,
    );

    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

fn painting_editor(palette: &Palette) -> Editor {
    let mut editor = Editor::default();
    assert!(editor.select_tile(0, palette));
    editor
}

#[test]
fn paint_stroke_places_each_new_cell_once() {
    let mut world = world_with_grid(5, 1, 5);
    let palette = palette();
    let mut editor = painting_editor(&palette);

    let cells = [
        (GesturePhase::Press, GridCoord::new(0, 0, 0)),
        (GesturePhase::Hold, GridCoord::new(0, 0, 0)),
        (GesturePhase::Hold, GridCoord::new(1, 0, 0)),
        (GesturePhase::Hold, GridCoord::new(1, 0, 0)),
        (GesturePhase::Hold, GridCoord::new(2, 0, 0)),
    ];
    let mut placed = 0;
    for (phase, cell) in cells {
        placed += drive(&mut editor, &mut world, Some(&palette), phase, Some(cell))
            .iter()
            .filter(|event| matches!(event, Event::TilePlaced { .. }))
            .count();
    }
    let _ = drive(&mut editor, &mut world, Some(&palette), GesturePhase::Release, None);

    assert_eq!(placed, 3, "repeated cells within a stroke must not repaint");
    assert_eq!(query::tile_count(&world), 3);
    let record = query::tile_at(&world, GridCoord::new(1, 0, 0)).expect("tile painted");
    assert_eq!(record.palette_index, 0);
}

#[test]
fn paint_stroke_skips_occupied_cells() {
    let mut world = world_with_grid(3, 1, 3);
    let palette = palette();
    let mut editor = painting_editor(&palette);
    let cell = GridCoord::new(1, 0, 1);

    let _ = drive(&mut editor, &mut world, Some(&palette), GesturePhase::Press, Some(cell));
    let _ = drive(&mut editor, &mut world, Some(&palette), GesturePhase::Release, Some(cell));

    assert!(editor.select_tile(1, &palette));
    let events = drive(&mut editor, &mut world, Some(&palette), GesturePhase::Press, Some(cell));

    assert!(events.is_empty());
    let record = query::tile_at(&world, cell).expect("tile kept");
    assert_eq!(record.asset, AssetRef::new("floor"));
}

#[test]
fn hold_without_press_does_nothing() {
    let mut world = world_with_grid(3, 1, 3);
    let palette = palette();
    let mut editor = painting_editor(&palette);

    let events = drive(
        &mut editor,
        &mut world,
        Some(&palette),
        GesturePhase::Hold,
        Some(GridCoord::new(1, 0, 1)),
    );

    assert!(events.is_empty());
}

#[test]
fn erase_stroke_removes_tiles() {
    let mut world = world_with_grid(3, 1, 3);
    let palette = palette();
    let mut editor = painting_editor(&palette);
    let cell = GridCoord::new(2, 0, 2);
    let _ = drive(&mut editor, &mut world, Some(&palette), GesturePhase::Press, Some(cell));

    editor.toggle_paint_erase();
    assert_eq!(editor.tools().mode(), ToolMode::Erase);

    let events = drive(&mut editor, &mut world, Some(&palette), GesturePhase::Press, Some(cell));
    assert!(matches!(events.as_slice(), [Event::TileRemoved { .. }]));
    assert!(!query::is_occupied(&world, cell));

    let events = drive(
        &mut editor,
        &mut world,
        Some(&palette),
        GesturePhase::Hold,
        Some(GridCoord::new(0, 0, 0)),
    );
    assert!(events.is_empty(), "erasing an empty cell emits nothing");
}

#[test]
fn rectangle_tool_previews_then_commits_on_release() {
    let mut world = world_with_grid(6, 1, 6);
    let palette = palette();
    let mut editor = painting_editor(&palette);
    editor.select_advanced_tool(AdvancedTool::RectangleFill);

    let _ = drive(
        &mut editor,
        &mut world,
        Some(&palette),
        GesturePhase::Press,
        Some(GridCoord::new(1, 0, 1)),
    );
    let events = drive(
        &mut editor,
        &mut world,
        Some(&palette),
        GesturePhase::Hold,
        Some(GridCoord::new(2, 0, 3)),
    );
    assert!(events.is_empty(), "dragging only previews");
    assert_eq!(editor.preview().len(), 6);
    assert_eq!(query::tile_count(&world), 0);

    let events = drive(
        &mut editor,
        &mut world,
        Some(&palette),
        GesturePhase::Release,
        Some(GridCoord::new(3, 0, 3)),
    );

    assert_eq!(events.len(), 9);
    assert_eq!(query::tile_count(&world), 9);
    assert!(editor.preview().is_empty());
}

#[test]
fn line_tool_commits_a_connected_line() {
    let mut world = world_with_grid(8, 1, 8);
    let palette = palette();
    let mut editor = painting_editor(&palette);
    editor.select_advanced_tool(AdvancedTool::LineTool);

    let _ = drive(
        &mut editor,
        &mut world,
        Some(&palette),
        GesturePhase::Press,
        Some(GridCoord::new(0, 0, 0)),
    );
    let _ = drive(
        &mut editor,
        &mut world,
        Some(&palette),
        GesturePhase::Release,
        Some(GridCoord::new(4, 0, 0)),
    );

    let painted: Vec<_> = (0..=4)
        .map(|x| query::is_occupied(&world, GridCoord::new(x, 0, 0)))
        .collect();
    assert_eq!(painted, vec![true; 5]);
    assert_eq!(query::tile_count(&world), 5);
}

#[test]
fn releasing_off_the_grid_discards_the_drag() {
    let mut world = world_with_grid(6, 1, 6);
    let palette = palette();
    let mut editor = painting_editor(&palette);
    editor.select_advanced_tool(AdvancedTool::RectangleFill);

    let _ = drive(
        &mut editor,
        &mut world,
        Some(&palette),
        GesturePhase::Press,
        Some(GridCoord::new(0, 0, 0)),
    );
    let _ = drive(
        &mut editor,
        &mut world,
        Some(&palette),
        GesturePhase::Hold,
        Some(GridCoord::new(1, 0, 1)),
    );
    assert_eq!(editor.preview().len(), 4);

    let events = drive(&mut editor, &mut world, Some(&palette), GesturePhase::Release, None);
    assert!(events.is_empty());
    assert!(editor.preview().is_empty());

    let _ = drive(
        &mut editor,
        &mut world,
        Some(&palette),
        GesturePhase::Hold,
        Some(GridCoord::new(2, 0, 2)),
    );
    let events = drive(
        &mut editor,
        &mut world,
        Some(&palette),
        GesturePhase::Release,
        Some(GridCoord::new(2, 0, 2)),
    );
    assert!(events.is_empty(), "a release without a new press commits nothing");
    assert_eq!(query::tile_count(&world), 0);
}

#[test]
fn switching_tools_abandons_an_open_drag() {
    let mut world = world_with_grid(6, 1, 6);
    let palette = palette();
    let mut editor = painting_editor(&palette);
    editor.select_advanced_tool(AdvancedTool::CircleTool);

    let _ = drive(
        &mut editor,
        &mut world,
        Some(&palette),
        GesturePhase::Press,
        Some(GridCoord::new(3, 0, 3)),
    );
    let _ = drive(
        &mut editor,
        &mut world,
        Some(&palette),
        GesturePhase::Hold,
        Some(GridCoord::new(5, 0, 3)),
    );
    assert!(!editor.preview().is_empty());

    editor.select_advanced_tool(AdvancedTool::RectangleFill);
    let events = drive(
        &mut editor,
        &mut world,
        Some(&palette),
        GesturePhase::Release,
        Some(GridCoord::new(5, 0, 5)),
    );

    assert!(events.is_empty());
    assert!(editor.preview().is_empty());
}

#[test]
fn paint_bucket_fills_the_connected_empty_region() {
    let mut world = world_with_grid(3, 1, 3);
    let palette = palette();
    let mut editor = painting_editor(&palette);
    editor.select_advanced_tool(AdvancedTool::PaintBucket);

    let events = drive(
        &mut editor,
        &mut world,
        Some(&palette),
        GesturePhase::Press,
        Some(GridCoord::new(1, 0, 1)),
    );
    assert_eq!(events.len(), 9);

    let events = drive(
        &mut editor,
        &mut world,
        Some(&palette),
        GesturePhase::Press,
        Some(GridCoord::new(0, 0, 0)),
    );
    assert!(events.is_empty(), "filling a region with its own asset is a no-op");
}

#[test]
fn picker_adopts_asset_and_rotation() {
    let mut world = world_with_grid(3, 1, 3);
    let palette = palette();
    let turned = Quat::from_rotation_y(std::f32::consts::PI);
    let cell = GridCoord::new(1, 0, 2);
    world::apply(
        &mut world,
        Command::PlaceTile {
            position: cell,
            asset: AssetRef::new("wall"),
            rotation: turned,
            palette_index: 1,
            bounds: BoundsPolicy::Strict,
        },
        &mut Vec::new(),
    );

    let mut editor = Editor::default();
    editor.select_picker();
    let events = drive(&mut editor, &mut world, Some(&palette), GesturePhase::Press, Some(cell));

    assert!(events.is_empty(), "picking never edits the map");
    assert_eq!(editor.tools().mode(), ToolMode::Paint);
    let selection = editor.selection().expect("asset picked");
    assert_eq!(selection.asset, AssetRef::new("wall"));
    assert_eq!(selection.palette_index, Some(1));
    assert_eq!(editor.rotation_degrees(), 180);
}

#[test]
fn picker_ignores_assets_missing_from_the_palette() {
    let mut world = world_with_grid(3, 1, 3);
    let cell = GridCoord::new(0, 0, 0);
    world::apply(
        &mut world,
        Command::restore(TileRecord::unrotated(cell, AssetRef::new("statue"))),
        &mut Vec::new(),
    );

    let mut editor = Editor::default();
    editor.select_picker();
    let palette = palette();
    let _ = drive(&mut editor, &mut world, Some(&palette), GesturePhase::Press, Some(cell));
    assert_eq!(editor.tools().mode(), ToolMode::Picker);
    assert!(editor.selection().is_none());

    let _ = drive(&mut editor, &mut world, None, GesturePhase::Press, Some(cell));
    assert_eq!(editor.tools().mode(), ToolMode::Picker);
}

#[test]
fn erase_mode_resolves_the_hit_tile_itself() {
    let mut world = world_with_grid(4, 2, 4);
    let cell = GridCoord::new(2, 0, 2);
    world::apply(
        &mut world,
        Command::restore(TileRecord::unrotated(cell, AssetRef::new("floor"))),
        &mut Vec::new(),
    );
    let hit = SurfaceHit {
        point: Vec3::new(2.5, 1.0, 2.5),
        normal: Vec3::Y,
    };
    let ray = Ray::new(Vec3::new(2.5, 10.0, 2.5), Vec3::NEG_Y);
    let settings = *query::settings(&world);

    let mut editor = Editor::default();
    editor.select_erase();
    let target = editor
        .resolve(ray, Some(hit), &settings, |position| query::is_occupied(&world, position))
        .expect("hit tile resolves");
    assert_eq!(target.position, cell);
    assert_eq!(target.resolution, Resolution::Surface);

    editor.select_paint();
    editor.set_smart_stacking(true);
    let target = editor
        .resolve(ray, Some(hit), &settings, |position| query::is_occupied(&world, position))
        .expect("stacking resolves");
    assert_eq!(target.position, GridCoord::new(2, 1, 2));
    assert_eq!(target.resolution, Resolution::SmartStacking);

    editor.set_smart_stacking(false);
    let target = editor
        .resolve(ray, Some(hit), &settings, |position| query::is_occupied(&world, position))
        .expect("explicit layer resolves");
    assert_eq!(target, ResolvedTarget::explicit(GridCoord::new(2, 0, 2)));
}
