#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Procedural map generator producing the tile grid units navigate.
//!
//! A generation attempt carves a primary path between two border cells,
//! joins two of its interior tiles with a secondary branch, tops up the tower
//! plots beside the path and scatters decorations over part of the remaining
//! empty space. Attempts that stall or break a layout rule are discarded and
//! regenerated from scratch until the configured attempt cap is reached.

mod carving;
mod decor;
mod layout;
mod split;
mod towers;

use lemming_defence_core::{CellCoord, QuadrantCoverage, TileMap, TileType};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::layout::Layout;

/// Smallest width or height the generator accepts.
pub const MIN_DIMENSION: u32 = 8;

const MAX_SPLIT_TRIES: u32 = 64;
const TOWER_PICKS_PER_CELL: usize = 64;
const DECOR_ROUNDS_PER_CELL: usize = 16;

/// Tunable parameters of the map generator.
///
/// Every field has a default, so partial configuration files deserialize.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Primary path must grow beyond this many tiles before it may end.
    pub min_path_length: usize,
    /// Attempts whose primary path reaches this many tiles are rejected.
    pub max_path_length: usize,
    /// A diagonal tower is attempted every this many path tiles.
    pub tower_frequency: usize,
    /// Number of tower plots every map must contain.
    pub tower_count: usize,
    /// Share of the empty cells, after towers, that receive decorations.
    pub decoration_ratio: f64,
    /// Consecutive failed steps after which a carving attempt is abandoned.
    pub max_consecutive_failures: u32,
    /// Whole-grid attempts made before giving up.
    pub max_attempts: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            min_path_length: 50,
            max_path_length: 300,
            tower_frequency: 20,
            tower_count: 20,
            decoration_ratio: 0.3,
            max_consecutive_failures: 30,
            max_attempts: 50_000,
        }
    }
}

impl GeneratorConfig {
    /// Checks that the parameters describe a generator that can terminate.
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.min_path_length >= self.max_path_length {
            return Err(GenerationError::InvalidConfig(
                "minimum path length must be below the maximum",
            ));
        }
        if self.tower_frequency == 0 {
            return Err(GenerationError::InvalidConfig(
                "tower frequency must be positive",
            ));
        }
        if !(0.0..=1.0).contains(&self.decoration_ratio) {
            return Err(GenerationError::InvalidConfig(
                "decoration ratio must lie between 0 and 1",
            ));
        }
        if self.max_attempts == 0 {
            return Err(GenerationError::InvalidConfig(
                "at least one generation attempt is required",
            ));
        }
        Ok(())
    }
}

/// Failures surfaced by the map generator.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GenerationError {
    /// The requested grid is too small to hold a path.
    #[error("grid of {width}x{height} is below the {min}x{min} minimum", min = MIN_DIMENSION)]
    InvalidDimensions {
        /// Requested width in cells.
        width: u32,
        /// Requested height in cells.
        height: u32,
    },
    /// More towers were requested than the grid has cells.
    #[error("{towers} towers cannot fit on a grid of {cells} cells")]
    TooManyTowers {
        /// Configured tower count.
        towers: usize,
        /// Cells in the requested grid.
        cells: usize,
    },
    /// The generator configuration is inconsistent.
    #[error("invalid generator configuration: {0}")]
    InvalidConfig(&'static str),
    /// Every attempt was rejected; the constraints do not fit the grid.
    #[error("no valid {width}x{height} map after {attempts} attempts")]
    AttemptsExhausted {
        /// Attempts made before giving up.
        attempts: u32,
        /// Requested width in cells.
        width: u32,
        /// Requested height in cells.
        height: u32,
    },
}

/// Reason a single generation attempt was discarded.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub(crate) enum Rejection {
    #[error("walk stalled after {length} tiles")]
    Stalled { length: usize },
    #[error("path of {length} tiles reached the maximum length")]
    TooLong { length: usize },
    #[error("path tiles touch without connecting")]
    IllegalAdjacency,
    #[error("no branch could be joined to the path")]
    NoSplit,
    #[error("only {placed} of {target} towers fit beside the path")]
    TowerShortfall { placed: usize, target: usize },
}

/// A finished map together with a report on how it was produced.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedMap {
    tiles: TileMap,
    start: CellCoord,
    end: CellCoord,
    attempts: u32,
    path_length: usize,
}

impl GeneratedMap {
    /// Tile grid of the map.
    #[must_use]
    pub fn tiles(&self) -> &TileMap {
        &self.tiles
    }

    /// Consumes the report, returning the tile grid.
    #[must_use]
    pub fn into_tiles(self) -> TileMap {
        self.tiles
    }

    /// Border cell holding the start point.
    #[must_use]
    pub const fn start(&self) -> CellCoord {
        self.start
    }

    /// Border cell holding the end point.
    #[must_use]
    pub const fn end(&self) -> CellCoord {
        self.end
    }

    /// Attempts used, including the successful one.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Tiles in the primary path, start point included.
    #[must_use]
    pub const fn path_length(&self) -> usize {
        self.path_length
    }

    /// Tiles of every path shape, branch and endpoints included.
    #[must_use]
    pub fn path_tile_count(&self) -> usize {
        self.tiles.count_where(TileType::is_path)
    }

    /// Junction tiles created by the secondary branch.
    #[must_use]
    pub fn split_tile_count(&self) -> usize {
        self.tiles.count_where(TileType::is_split)
    }

    /// Tower plots on the map.
    #[must_use]
    pub fn tower_count(&self) -> usize {
        self.tiles.count(TileType::Tower)
    }

    /// Decorations of either kind on the map.
    #[must_use]
    pub fn decoration_count(&self) -> usize {
        self.tiles.count_where(TileType::is_decoration)
    }

    /// Cells left empty.
    #[must_use]
    pub fn empty_count(&self) -> usize {
        self.tiles.count(TileType::EmptySpace)
    }

    /// Quadrants of the grid interior that the path passes through.
    #[must_use]
    pub fn quadrant_coverage(&self) -> QuadrantCoverage {
        self.tiles.quadrant_coverage()
    }
}

/// Map generator holding its configuration and reusable scratch space.
#[derive(Debug)]
pub struct MapGenerator {
    config: GeneratorConfig,
    visited: Vec<bool>,
    patch_stack: Vec<CellCoord>,
}

impl MapGenerator {
    /// Creates a generator after validating the configuration.
    pub fn new(config: GeneratorConfig) -> Result<Self, GenerationError> {
        config.validate()?;
        Ok(Self {
            config,
            visited: Vec::new(),
            patch_stack: Vec::new(),
        })
    }

    /// Configuration the generator runs with.
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generates a `width`×`height` map using the supplied random source.
    pub fn generate<R>(
        &mut self,
        width: u32,
        height: u32,
        rng: &mut R,
    ) -> Result<GeneratedMap, GenerationError>
    where
        R: Rng + ?Sized,
    {
        if width < MIN_DIMENSION || height < MIN_DIMENSION {
            return Err(GenerationError::InvalidDimensions { width, height });
        }
        let cells = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(usize::MAX);
        if self.config.tower_count > cells {
            return Err(GenerationError::TooManyTowers {
                towers: self.config.tower_count,
                cells,
            });
        }

        for attempt in 1..=self.config.max_attempts {
            match self.attempt(width, height, rng) {
                Ok((layout, path)) => {
                    debug!(
                        attempt,
                        path_length = path.length,
                        "generated {width}x{height} map"
                    );
                    return Ok(GeneratedMap {
                        tiles: layout.into_tiles(),
                        start: path.start,
                        end: path.end,
                        attempts: attempt,
                        path_length: path.length,
                    });
                }
                Err(rejection) => debug!(attempt, %rejection, "discarded map attempt"),
            }
        }

        warn!(
            attempts = self.config.max_attempts,
            width, height, "map generation exhausted its attempts"
        );
        Err(GenerationError::AttemptsExhausted {
            attempts: self.config.max_attempts,
            width,
            height,
        })
    }

    fn attempt<R>(
        &mut self,
        width: u32,
        height: u32,
        rng: &mut R,
    ) -> Result<(Layout, carving::CarvedPath), Rejection>
    where
        R: Rng + ?Sized,
    {
        let mut layout = Layout::new(width, height);
        let path = carving::carve_primary_path(&mut layout, &self.config, rng, &mut self.visited)?;

        if !split::split_path(&mut layout, rng, MAX_SPLIT_TRIES) {
            return Err(Rejection::NoSplit);
        }

        let target = self.config.tower_count;
        let picks = layout.cell_count().saturating_mul(TOWER_PICKS_PER_CELL);
        if !towers::backfill_towers(&mut layout, target, rng, picks) {
            return Err(Rejection::TowerShortfall {
                placed: layout.count(TileType::Tower),
                target,
            });
        }

        let decorations = decor::decoration_target(&layout, self.config.decoration_ratio);
        let rounds = layout.cell_count().saturating_mul(DECOR_ROUNDS_PER_CELL);
        let placed = decor::decorate(
            &mut layout,
            decorations,
            rng,
            rounds,
            &mut self.patch_stack,
        );
        if placed < decorations {
            debug!(placed, target = decorations, "decoration rounds ran out");
        }

        Ok((layout, path))
    }
}

/// Generates a map from a seed, reproducibly across platforms.
pub fn generate_seeded(
    width: u32,
    height: u32,
    config: &GeneratorConfig,
    seed: u64,
) -> Result<GeneratedMap, GenerationError> {
    let mut generator = MapGenerator::new(config.clone())?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    generator.generate(width, height, &mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(GeneratorConfig::default().validate(), Ok(()));
    }

    #[test]
    fn inconsistent_configs_are_rejected() {
        let inverted = GeneratorConfig {
            min_path_length: 300,
            max_path_length: 50,
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            inverted.validate(),
            Err(GenerationError::InvalidConfig(_))
        ));

        let no_frequency = GeneratorConfig {
            tower_frequency: 0,
            ..GeneratorConfig::default()
        };
        assert!(MapGenerator::new(no_frequency).is_err());

        let overdecorated = GeneratorConfig {
            decoration_ratio: 1.5,
            ..GeneratorConfig::default()
        };
        assert!(overdecorated.validate().is_err());

        let no_attempts = GeneratorConfig {
            max_attempts: 0,
            ..GeneratorConfig::default()
        };
        assert!(no_attempts.validate().is_err());
    }

    #[test]
    fn tiny_grids_are_rejected() {
        let error = generate_seeded(4, 20, &GeneratorConfig::default(), 1)
            .expect_err("grid below the minimum");
        assert_eq!(
            error,
            GenerationError::InvalidDimensions {
                width: 4,
                height: 20
            }
        );
    }

    #[test]
    fn tower_counts_beyond_the_grid_fail_before_any_attempt() {
        let config = GeneratorConfig {
            tower_count: 1000,
            max_attempts: 500,
            ..GeneratorConfig::default()
        };

        let error = generate_seeded(20, 20, &config, 3).expect_err("towers cannot fit");
        assert_eq!(
            error,
            GenerationError::TooManyTowers {
                towers: 1000,
                cells: 400
            }
        );
        assert!(error.to_string().contains("1000 towers"));
    }

    #[test]
    fn impossible_constraints_exhaust_attempts() {
        let config = GeneratorConfig {
            min_path_length: 500,
            max_path_length: 600,
            max_attempts: 5,
            ..GeneratorConfig::default()
        };

        let error = generate_seeded(8, 8, &config, 9).expect_err("path cannot fit");
        assert_eq!(
            error,
            GenerationError::AttemptsExhausted {
                attempts: 5,
                width: 8,
                height: 8
            }
        );
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: GeneratorConfig = toml::from_str("tower_count = 12").expect("known key");
        assert_eq!(config.tower_count, 12);
        assert_eq!(config.min_path_length, 50);
        assert_eq!(config.max_attempts, 50_000);
    }

    #[test]
    fn report_counts_match_the_grid() {
        let map = generate_seeded(20, 20, &GeneratorConfig::default(), 42).expect("default map");

        let total = map.path_tile_count()
            + map.tower_count()
            + map.decoration_count()
            + map.empty_count();
        assert_eq!(total, 400);
        assert!(map.attempts() >= 1);
        assert!(map.path_length() > 50);
        assert_eq!(map.tiles().get(map.start()), Some(TileType::StartPoint));
        assert_eq!(map.tiles().get(map.end()), Some(TileType::EndPoint));
    }
}
