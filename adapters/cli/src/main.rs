#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line host that edits Gridforge map files.
//!
//! Every editing subcommand loads a JSON map, routes the edit through the
//! shape generators and the batch applier, applies the resulting commands to
//! the world and writes the map back.

mod config;
mod instances;
mod map_file;
mod map_transfer;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use gridforge_core::{AssetRef, BoundsPolicy, Command, Event, GridCoord};
use gridforge_rendering::InstanceRegistry;
use gridforge_system_batch::{Batch, BatchSummary, Brush};
use gridforge_system_editor::Editor;
use gridforge_system_shapes::{circle, flood_fill, line, rectangle};
use gridforge_world::{self as world, query, World};
use tracing::Level;

use crate::{
    config::Config,
    instances::CatalogHost,
    map_file::{load_palette, MapDocument},
};

/// Edits Gridforge prefab grid maps.
#[derive(Debug, Parser)]
#[command(name = "gridforge", version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file. Defaults to `gridforge.toml` in the working directory.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Create an empty map file
    New {
        /// Map file to create
        map: PathBuf,
        /// Display name stored in the map
        #[arg(long)]
        name: Option<String>,
        /// Grid extent as `X,Y,Z`
        #[arg(long, value_parser = parse_coord)]
        size: Option<GridCoord>,
        /// Edge length of a cell in world units
        #[arg(long)]
        cell_size: Option<f32>,
        /// Palette file governing the map
        #[arg(long)]
        palette: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print a summary of a map
    Info {
        /// Map file to inspect
        map: PathBuf,
    },
    /// Paint a single cell
    Paint {
        /// Map file to edit
        map: PathBuf,
        /// Cell as `X,Y,Z`
        #[arg(long, value_parser = parse_coord)]
        at: GridCoord,
        /// Allow cells above the top layer
        #[arg(long)]
        stack: bool,
        #[command(flatten)]
        brush: BrushArgs,
    },
    /// Erase a cell, or every cell of a rectangle
    Erase {
        /// Map file to edit
        map: PathBuf,
        /// Cell as `X,Y,Z`
        #[arg(long, value_parser = parse_coord)]
        at: GridCoord,
        /// Opposite rectangle corner as `X,Y,Z`
        #[arg(long, value_parser = parse_coord)]
        to: Option<GridCoord>,
        /// Allow cells above the top layer
        #[arg(long)]
        stack: bool,
    },
    /// Paint a filled rectangle between two corners
    Rect {
        /// Map file to edit
        map: PathBuf,
        /// First corner as `X,Y,Z`
        #[arg(long, value_parser = parse_coord)]
        from: GridCoord,
        /// Opposite corner as `X,Y,Z`
        #[arg(long, value_parser = parse_coord)]
        to: GridCoord,
        #[command(flatten)]
        brush: BrushArgs,
    },
    /// Paint a line between two cells
    Line {
        /// Map file to edit
        map: PathBuf,
        /// Start cell as `X,Y,Z`
        #[arg(long, value_parser = parse_coord)]
        from: GridCoord,
        /// End cell as `X,Y,Z`
        #[arg(long, value_parser = parse_coord)]
        to: GridCoord,
        #[command(flatten)]
        brush: BrushArgs,
    },
    /// Paint a circle outline
    Circle {
        /// Map file to edit
        map: PathBuf,
        /// Center cell as `X,Y,Z`
        #[arg(long, value_parser = parse_coord)]
        center: GridCoord,
        /// Radius in cells
        #[arg(long)]
        radius: i32,
        #[command(flatten)]
        brush: BrushArgs,
    },
    /// Flood fill the connected region containing a cell
    Fill {
        /// Map file to edit
        map: PathBuf,
        /// Start cell as `X,Y,Z`
        #[arg(long, value_parser = parse_coord)]
        at: GridCoord,
        #[command(flatten)]
        brush: BrushArgs,
    },
    /// Purge invalid and shadowed records
    Validate {
        /// Map file to clean up
        map: PathBuf,
    },
    /// Print a share string for a map
    Share {
        /// Map file to share
        map: PathBuf,
    },
    /// Write a map file from a share string
    Unshare {
        /// Share string produced by `share`
        share: String,
        /// Map file to create
        map: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Rebuild visual instances against a palette and report unresolved tiles
    Instances {
        /// Map file to inspect
        map: PathBuf,
        /// Palette file used to resolve assets
        #[arg(long)]
        palette: PathBuf,
        /// Only show instances on this layer
        #[arg(long)]
        isolate: Option<i32>,
    },
}

#[derive(Debug, Args)]
struct BrushArgs {
    /// Stable identifier of the asset to place
    #[arg(long)]
    asset: String,
    /// Quarter turns about the vertical axis
    #[arg(long, default_value_t = 0)]
    turns: u8,
    /// Palette file used to record the asset's palette slot
    #[arg(long)]
    palette: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = Config::load(cli.config.as_deref())?;
    run(cli.command, &config)
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: CliCommand, config: &Config) -> Result<()> {
    match command {
        CliCommand::New {
            map,
            name,
            size,
            cell_size,
            palette,
            force,
        } => {
            ensure_writable(&map, force)?;
            let mut world = World::with_settings(config.grid.settings(size, cell_size));
            if let Some(path) = palette {
                let palette = load_palette(&path)?;
                world::apply(
                    &mut world,
                    Command::SetPalette {
                        palette: Some(palette.reference()),
                    },
                    &mut Vec::new(),
                );
            }
            let name = name.unwrap_or_else(|| default_map_name(&map));
            MapDocument::new(name, world).save(&map)?;
            println!("created {}", map.display());
        }
        CliCommand::Info { map } => print_info(&MapDocument::load(&map)?),
        CliCommand::Paint {
            map,
            at,
            stack,
            brush,
        } => {
            let brush = build_brush(&brush, config)?;
            edit(&map, &Batch::paint(brush, bounds_for(stack)), |_| vec![at])?;
        }
        CliCommand::Erase {
            map,
            at,
            to,
            stack,
        } => {
            edit(&map, &Batch::erase(bounds_for(stack)), |world| {
                to.map_or_else(
                    || vec![at],
                    |to| rectangle(at, to, query::dimensions(world)),
                )
            })?;
        }
        CliCommand::Rect {
            map,
            from,
            to,
            brush,
        } => {
            let brush = build_brush(&brush, config)?;
            edit(&map, &Batch::paint(brush, BoundsPolicy::Strict), |world| {
                rectangle(from, to, query::dimensions(world))
            })?;
        }
        CliCommand::Line {
            map,
            from,
            to,
            brush,
        } => {
            let brush = build_brush(&brush, config)?;
            edit(&map, &Batch::paint(brush, BoundsPolicy::Strict), |world| {
                line(from, to, query::dimensions(world))
            })?;
        }
        CliCommand::Circle {
            map,
            center,
            radius,
            brush,
        } => {
            let brush = build_brush(&brush, config)?;
            let band = config.editor.circle_band;
            edit(&map, &Batch::paint(brush, BoundsPolicy::Strict), |world| {
                circle(center, radius, band, query::dimensions(world))
            })?;
        }
        CliCommand::Fill { map, at, brush } => {
            let brush = build_brush(&brush, config)?;
            let asset = brush.asset.clone();
            edit(&map, &Batch::paint(brush, BoundsPolicy::Strict), |world| {
                flood_fill(at, Some(&asset), query::dimensions(world), |cell| {
                    query::tile_at(world, cell).map(|record| record.asset.clone())
                })
                .into_iter()
                .collect()
            })?;
        }
        CliCommand::Validate { map } => {
            let mut document = MapDocument::load(&map)?;
            let mut events = Vec::new();
            world::apply(&mut document.world, Command::Validate, &mut events);
            document.save(&map)?;
            let purged = events
                .iter()
                .find_map(|event| match event {
                    Event::MapValidated { purged } => Some(*purged),
                    _ => None,
                })
                .unwrap_or_default();
            println!("purged {purged} records");
        }
        CliCommand::Share { map } => {
            let document = MapDocument::load(&map)?;
            let encoded = map_transfer::encode(&document.snapshot())
                .context("failed to encode share string")?;
            println!("{encoded}");
        }
        CliCommand::Unshare { share, map, force } => {
            ensure_writable(&map, force)?;
            let snapshot = map_transfer::decode(&share).context("invalid share string")?;
            let (document, summary) = MapDocument::from_snapshot(snapshot)?;
            document.save(&map)?;
            println!(
                "wrote {} ({} tiles, {} skipped)",
                map.display(),
                summary.imported,
                summary.skipped
            );
        }
        CliCommand::Instances {
            map,
            palette,
            isolate,
        } => {
            let document = MapDocument::load(&map)?;
            let mut host = CatalogHost::new(load_palette(&palette)?);
            let mut registry = InstanceRegistry::new();
            let report = registry.resync(
                &mut host,
                query::tiles(&document.world),
                query::settings(&document.world),
            );
            if let Some(layer) = isolate {
                registry.set_layer_isolation(&mut host, layer, true);
            }

            println!("spawned: {}", report.spawned);
            println!("visible: {}", host.visible());
            println!("unresolved: {}", report.unresolved.len());
            for position in &report.unresolved {
                if let Some(record) = query::tile_at(&document.world, *position) {
                    println!("  {} {}", format_coord(*position), record.asset);
                }
            }
        }
    }
    Ok(())
}

fn bounds_for(stack: bool) -> BoundsPolicy {
    if stack {
        BoundsPolicy::Stacking
    } else {
        BoundsPolicy::Strict
    }
}

/// Loads a map, applies one batch computed from its current contents and saves it.
fn edit<F>(path: &Path, batch: &Batch, positions_for: F) -> Result<()>
where
    F: FnOnce(&World) -> Vec<GridCoord>,
{
    let mut document = MapDocument::load(path)?;
    let (summary, events) = apply_batch(&mut document.world, batch, positions_for);
    document.save(path)?;

    let (placed, removed, rejected) = tally(&events);
    println!(
        "placed {placed}, removed {removed}, rejected {rejected}, skipped {}",
        summary.skipped
    );
    Ok(())
}

fn apply_batch<F>(world: &mut World, batch: &Batch, positions_for: F) -> (BatchSummary, Vec<Event>)
where
    F: FnOnce(&World) -> Vec<GridCoord>,
{
    let mut commands = Vec::new();
    let current: &World = world;
    let positions = positions_for(current);
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

fn tally(events: &[Event]) -> (usize, usize, usize) {
    events.iter().fold((0, 0, 0), |(placed, removed, rejected), event| match event {
        Event::TilePlaced { .. } => (placed + 1, removed, rejected),
        Event::TileRemoved { .. } => (placed, removed + 1, rejected),
        Event::TilePlacementRejected { .. } | Event::TileRemovalRejected { .. } => {
            (placed, removed, rejected + 1)
        }
        _ => (placed, removed, rejected),
    })
}

fn build_brush(args: &BrushArgs, config: &Config) -> Result<Brush> {
    let asset = AssetRef::new(args.asset.as_str());
    if asset.is_empty() {
        bail!("asset identifier must not be empty");
    }
    let palette_index = match &args.palette {
        Some(path) => {
            let palette = load_palette(path)?;
            let index = palette.index_of(&asset).with_context(|| {
                format!("asset `{asset}` is not part of palette {}", path.display())
            })?;
            Some(index)
        }
        None => None,
    };

    let mut editor = Editor::new(config.editor);
    editor.select_asset(asset, palette_index);
    for _ in 0..args.turns % 4 {
        editor.rotate_quarter_turn();
    }
    editor.brush().context("no asset selected")
}

fn print_info(document: &MapDocument) {
    let world = &document.world;
    let settings = query::settings(world);
    let dimensions = settings.dimensions();
    let offset = settings.offset();

    println!("name: {}", document.name);
    println!(
        "grid: {}x{}x{} cells of {}",
        dimensions.x(),
        dimensions.y(),
        dimensions.z(),
        settings.cell_size()
    );
    println!("offset: {},{},{}", offset.x, offset.y, offset.z);
    match query::palette(world) {
        Some(palette) => println!("palette: {} ({})", palette.name, palette.stable_id),
        None => println!("palette: none"),
    }
    println!("tiles: {}", query::tile_count(world));
    for layer in 0..dimensions.y() {
        let count = query::tiles_on_layer(world, layer).len();
        if count > 0 {
            println!("  layer {layer}: {count}");
        }
    }
    for (asset, count) in query::asset_usage(world) {
        println!("  {asset}: {count}");
    }
}

fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (pass --force to overwrite)", path.display());
    }
    Ok(())
}

fn default_map_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Untitled".to_owned())
}

fn format_coord(coord: GridCoord) -> String {
    format!("{},{},{}", coord.x, coord.y, coord.z)
}

fn parse_coord(value: &str) -> Result<GridCoord, String> {
    let axes = value
        .split(',')
        .map(|axis| axis.trim().parse::<i32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|error| format!("invalid coordinate `{value}`: {error}"))?;
    match axes.as_slice() {
        [x, y, z] => Ok(GridCoord::new(*x, *y, *z)),
        _ => Err(format!("expected `X,Y,Z`, found `{value}`")),
    }
}
