use std::{
    collections::{hash_map::DefaultHasher, VecDeque},
    hash::{Hash, Hasher},
};

use lemming_defence_core::{CellCoord, Direction, TileMap, TileType};
use lemming_defence_system_map_generation::{
    generate_seeded, GeneratedMap, GenerationError, GeneratorConfig, MapGenerator,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn default_map(seed: u64) -> GeneratedMap {
    generate_seeded(20, 20, &GeneratorConfig::default(), seed).expect("default map generates")
}

fn fingerprint(tiles: &TileMap) -> u64 {
    let mut hasher = DefaultHasher::new();
    tiles.hash(&mut hasher);
    hasher.finish()
}

fn path_reaches(tiles: &TileMap, from: CellCoord, to: CellCoord) -> bool {
    let mut seen = vec![from];
    let mut queue = VecDeque::from([from]);

    while let Some(cell) = queue.pop_front() {
        if cell == to {
            return true;
        }
        for direction in Direction::ALL {
            let Some(next) = cell.step(direction, tiles.width(), tiles.height()) else {
                continue;
            };
            if !tiles.get(next).map_or(false, TileType::is_path) || seen.contains(&next) {
                continue;
            }
            seen.push(next);
            queue.push_back(next);
        }
    }

    false
}

fn assert_map_invariants(map: &GeneratedMap, config: &GeneratorConfig) {
    let tiles = map.tiles();

    assert_eq!(tiles.count(TileType::StartPoint), 1, "\n{tiles}");
    assert_eq!(tiles.count(TileType::EndPoint), 1, "\n{tiles}");
    assert_eq!(tiles.start(), Some(map.start()));
    assert_eq!(tiles.end(), Some(map.end()));
    assert!(map.start().is_on_border(tiles.width(), tiles.height()));
    assert!(map.end().is_on_border(tiles.width(), tiles.height()));

    assert!(map.tower_count() >= config.tower_count, "\n{tiles}");
    assert_eq!(tiles.count(TileType::CurrentPosition), 0);
    assert!(map.split_tile_count() > 0, "branch must meet the path\n{tiles}");

    for (cell, tile) in tiles.cells() {
        let Some(connections) = tile.connections() else {
            continue;
        };
        assert_eq!(
            connections,
            tiles.path_neighbors(cell),
            "{tile:?} at {cell:?} does not match its path neighbours\n{tiles}"
        );
    }

    assert!(
        path_reaches(tiles, map.start(), map.end()),
        "end is unreachable from start\n{tiles}"
    );
}

#[test]
fn default_maps_satisfy_layout_rules() {
    let config = GeneratorConfig::default();
    for seed in 0..20 {
        assert_map_invariants(&default_map(seed), &config);
    }
}

#[test]
fn decorations_cover_the_configured_share() {
    let map = default_map(7);
    let config = GeneratorConfig::default();
    let before = map.decoration_count() + map.empty_count();
    let expected = (before as f64 * config.decoration_ratio).floor() as usize;

    assert_eq!(map.decoration_count(), expected);
}

#[test]
fn same_seed_yields_identical_maps() {
    for seed in 0..100 {
        let first = default_map(seed);
        let second = default_map(seed);
        assert_eq!(
            fingerprint(first.tiles()),
            fingerprint(second.tiles()),
            "seed {seed} diverged"
        );
        assert_eq!(first, second);
    }
}

#[test]
fn different_seeds_vary_the_layout() {
    let fingerprints: Vec<u64> = (0..10).map(|seed| fingerprint(default_map(seed).tiles())).collect();
    let first = fingerprints[0];

    assert!(fingerprints.iter().any(|&other| other != first));
}

#[test]
fn injected_rng_matches_seeded_entry_point() {
    let mut generator = MapGenerator::new(GeneratorConfig::default()).expect("valid config");
    let mut rng = ChaCha8Rng::seed_from_u64(77);

    let injected = generator.generate(20, 20, &mut rng).expect("map generates");

    assert_eq!(injected, default_map(77));
}

#[test]
fn rectangular_grids_generate() {
    let config = GeneratorConfig {
        min_path_length: 30,
        max_path_length: 200,
        tower_count: 10,
        ..GeneratorConfig::default()
    };

    let map = generate_seeded(24, 12, &config, 3).expect("rectangular map");

    assert_eq!(map.tiles().width(), 24);
    assert_eq!(map.tiles().height(), 12);
    assert_map_invariants(&map, &config);
}

#[test]
fn invalid_requests_surface_errors() {
    assert!(matches!(
        generate_seeded(7, 7, &GeneratorConfig::default(), 0),
        Err(GenerationError::InvalidDimensions { .. })
    ));

    let config = GeneratorConfig {
        tower_frequency: 0,
        ..GeneratorConfig::default()
    };
    assert!(matches!(
        generate_seeded(20, 20, &config, 0),
        Err(GenerationError::InvalidConfig(_))
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn arbitrary_seeds_produce_valid_maps(seed in any::<u64>()) {
        let config = GeneratorConfig::default();
        let map = generate_seeded(20, 20, &config, seed);
        prop_assert!(map.is_ok());
        if let Ok(map) = map {
            assert_map_invariants(&map, &config);
        }
    }
}
