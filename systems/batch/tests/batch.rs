use glam::{Quat, Vec3};
use gridforge_core::{AssetRef, BoundsPolicy, Command, Event, GridCoord, GridDimensions};
use gridforge_system_batch::{Batch, BatchSummary, Brush};
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

fn run(world: &mut World, batch: &Batch, positions: Vec<GridCoord>) -> (BatchSummary, Vec<Event>) {
    let mut commands = Vec::new();
    let current: &World = world;
    let summary = batch.apply(
        positions,
        query::dimensions(current),
        |cell| query::tile_at(current, cell),
        &mut commands,
    );

    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    (summary, events)
}

fn floor_brush() -> Brush {
    Brush::new(AssetRef::new("floor"), Quat::IDENTITY, 0)
}

#[test]
fn paint_skips_out_of_bounds_positions_without_aborting() {
    let mut world = world_with_grid(3, 1, 3);
    let batch = Batch::paint(floor_brush(), BoundsPolicy::Strict);

    let (summary, _) = run(
        &mut world,
        &batch,
        vec![
            GridCoord::new(-1, 0, 0),
            GridCoord::new(0, 0, 0),
            GridCoord::new(5, 0, 5),
            GridCoord::new(2, 0, 2),
        ],
    );

    assert_eq!(summary, BatchSummary { emitted: 2, skipped: 2 });
    assert_eq!(query::tile_count(&world), 2);
}

#[test]
fn repainting_identical_tiles_emits_nothing() {
    let mut world = world_with_grid(3, 1, 3);
    let batch = Batch::paint(floor_brush(), BoundsPolicy::Strict);
    let cells = vec![GridCoord::new(0, 0, 0), GridCoord::new(1, 0, 0)];

    let _ = run(&mut world, &batch, cells.clone());
    let (summary, events) = run(&mut world, &batch, cells);

    assert_eq!(summary.emitted, 0, "unchanged cells should not be rewritten");
    assert!(events.is_empty());
}

#[test]
fn painting_a_different_rotation_overwrites() {
    let mut world = world_with_grid(3, 1, 3);
    let cell = GridCoord::new(1, 0, 1);
    let _ = run(&mut world, &Batch::paint(floor_brush(), BoundsPolicy::Strict), vec![cell]);

    let turned = Brush::new(
        AssetRef::new("floor"),
        Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
        0,
    );
    let (summary, events) = run(&mut world, &Batch::paint(turned, BoundsPolicy::Strict), vec![cell]);

    assert_eq!(summary.emitted, 1);
    assert!(matches!(
        events.as_slice(),
        [Event::TilePlaced {
            replaced: Some(_),
            ..
        }]
    ));
}

#[test]
fn erase_skips_unoccupied_cells() {
    let mut world = world_with_grid(4, 1, 4);
    let _ = run(
        &mut world,
        &Batch::paint(floor_brush(), BoundsPolicy::Strict),
        vec![GridCoord::new(0, 0, 0), GridCoord::new(2, 0, 0)],
    );

    let (summary, events) = run(
        &mut world,
        &Batch::erase(BoundsPolicy::Strict),
        (0..4).map(|x| GridCoord::new(x, 0, 0)).collect(),
    );

    assert_eq!(summary, BatchSummary { emitted: 2, skipped: 2 });
    assert!(
        events
            .iter()
            .all(|event| matches!(event, Event::TileRemoved { .. })),
        "erasing empty cells must not produce rejections"
    );
    assert_eq!(query::tile_count(&world), 0);
}

#[test]
fn stacking_batches_accept_cells_above_the_grid() {
    let mut world = world_with_grid(2, 1, 2);
    let batch = Batch::paint(floor_brush(), BoundsPolicy::Stacking);

    let (summary, _) = run(&mut world, &batch, vec![GridCoord::new(0, 5, 0)]);

    assert_eq!(summary.emitted, 1);
    assert!(query::is_occupied(&world, GridCoord::new(0, 5, 0)));
}

#[test]
fn empty_position_sets_do_nothing() {
    let mut world = world_with_grid(2, 1, 2);
    let (summary, events) = run(
        &mut world,
        &Batch::paint(floor_brush(), BoundsPolicy::Strict),
        Vec::new(),
    );

    assert_eq!(summary, BatchSummary::default());
    assert!(events.is_empty());
}
