#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that generates a Lemming Defence map, prints it and
//! plans a route across it.

mod config;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use lemming_defence_core::{
    AttackBehavior, CellCoord, Command, Event, Faction, MoverType, TileMap, TileType,
    DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH,
};
use lemming_defence_system_map_generation::{generate_seeded, GeneratedMap};
use lemming_defence_world::{self as world, query, Navigation, World};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use crate::config::FileConfig;

const TILE_LENGTH: f32 = 32.0;
const TICK: Duration = Duration::from_millis(250);
const TOWER_RANGE: u32 = 2;

/// Generates a map and plans a route from its start to its end.
#[derive(Debug, Parser)]
#[command(name = "lemming-defence", version, about, long_about = None)]
struct Args {
    /// TOML file with generator settings.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for the map generator. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Grid width in cells.
    #[arg(long)]
    width: Option<u32>,
    /// Grid height in cells.
    #[arg(long)]
    height: Option<u32>,
    /// Number of tower plots to place.
    #[arg(long)]
    towers: Option<usize>,
    /// Primary path must grow beyond this many tiles.
    #[arg(long = "min-path")]
    min_path: Option<usize>,
    /// Maps whose primary path reaches this many tiles are rejected.
    #[arg(long = "max-path")]
    max_path: Option<usize>,
    /// Plans the route for a flyer instead of a walker.
    #[arg(long)]
    flyer: bool,
    /// Spawns this many lemmings and runs the simulation until they finish.
    #[arg(long, value_name = "LEMMINGS")]
    simulate: Option<u32>,
    /// Raises the default log level to debug.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let file = match &args.config {
        Some(path) => FileConfig::load(path).context("could not load the configuration file")?,
        None => FileConfig::default(),
    };

    let mut generator = file.generator;
    if let Some(towers) = args.towers {
        generator.tower_count = towers;
    }
    if let Some(min_path) = args.min_path {
        generator.min_path_length = min_path;
    }
    if let Some(max_path) = args.max_path {
        generator.max_path_length = max_path;
    }

    let width = args.width.or(file.width).unwrap_or(DEFAULT_GRID_WIDTH);
    let height = args.height.or(file.height).unwrap_or(DEFAULT_GRID_HEIGHT);
    let seed = args.seed.or(file.seed).unwrap_or_else(rand::random);

    let map = generate_seeded(width, height, &generator, seed)
        .with_context(|| format!("could not generate a {width}x{height} map from seed {seed}"))?;
    print_report(&map, seed);

    let mover = if args.flyer {
        MoverType::Flyer
    } else {
        MoverType::Walker
    };
    let mut navigation = Navigation::from_tile_map(map.tiles(), TILE_LENGTH);
    let route = navigation
        .find_path(map.start(), map.end(), mover)
        .with_context(|| format!("no {mover:?} route from {:?} to {:?}", map.start(), map.end()))?;

    println!("{mover:?} route: {} cells", route.len());
    print!("{}", overlay(map.tiles(), &route));

    if let Some(lemmings) = args.simulate {
        simulate(map.into_tiles(), lemmings);
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn print_report(map: &GeneratedMap, seed: u64) {
    let coverage = map.quadrant_coverage();
    println!(
        "seed {seed}: {}x{} map after {} attempt(s)",
        map.tiles().width(),
        map.tiles().height(),
        map.attempts()
    );
    println!(
        "path {} tiles ({} junctions), {} towers, {} decorations, {} empty, {}/4 quadrants",
        map.path_length(),
        map.split_tile_count(),
        map.tower_count(),
        map.decoration_count(),
        map.empty_count(),
        coverage.covered()
    );
    println!();
    print!("{}", map.tiles());
    println!();
}

/// Renders the map with the route drawn over it.
fn overlay(tiles: &TileMap, route: &[CellCoord]) -> String {
    let mut rendered = String::new();
    for row in 0..tiles.height() {
        for column in 0..tiles.width() {
            let cell = CellCoord::new(column, row);
            let glyph = match tiles.get(cell) {
                Some(tile) if tile.is_endpoint() => tile.glyph(),
                _ if route.contains(&cell) => '*',
                Some(tile) => tile.glyph(),
                None => ' ',
            };
            rendered.push(glyph);
        }
        rendered.push('\n');
    }
    rendered
}

fn simulate(tiles: TileMap, lemmings: u32) {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureMap {
            tiles: tiles.clone(),
            tile_length: TILE_LENGTH,
        },
        &mut events,
    );

    for (cell, _) in tiles.cells().filter(|(_, tile)| *tile == TileType::Tower) {
        world::apply(
            &mut world,
            Command::SpawnUnit {
                faction: Faction::TowerSide,
                mover: MoverType::Stationary,
                speed: 0.0,
                attack: AttackBehavior::StopsToAttack {
                    range: TOWER_RANGE,
                },
                at: Some(cell),
            },
            &mut events,
        );
    }

    let Some(end) = query::navigation(&world).last_tile() else {
        return;
    };
    for index in 0..lemmings {
        let mut spawned = Vec::new();
        world::apply(
            &mut world,
            Command::SpawnUnit {
                faction: Faction::LemmingSide,
                mover: MoverType::Walker,
                speed: 1.0 + index as f32 * 0.25,
                attack: AttackBehavior::NeverStopsMoving { range: 1 },
                at: None,
            },
            &mut spawned,
        );
        for event in &spawned {
            if let Event::UnitSpawned { unit, .. } = event {
                world::apply(
                    &mut world,
                    Command::PathUnitTo {
                        unit: *unit,
                        destination: end,
                    },
                    &mut events,
                );
            }
        }
        events.extend(spawned);
    }

    let mut arrived = 0;
    let mut ticks = 0_u32;
    let limit = tiles.tiles().len() as u32 * 8;
    while arrived < lemmings && ticks < limit {
        events.clear();
        world::apply(&mut world, Command::Tick { dt: TICK }, &mut events);
        ticks += 1;
        for event in &events {
            match event {
                Event::DestinationReached { unit, cell } => {
                    arrived += 1;
                    info!(?unit, ?cell, "lemming reached the end");
                }
                Event::UnitHalted { unit, target } => {
                    info!(?unit, ?target, "tower engaged a lemming");
                }
                _ => {}
            }
        }
    }

    println!(
        "{arrived}/{lemmings} lemmings reached the end after {:.2}s",
        query::elapsed(&world).as_secs_f32()
    );
}
