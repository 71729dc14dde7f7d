#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Lemming Defence navigation engine.
//!
//! This crate defines the vocabulary that connects the map generator, the
//! pathfinding engine, the authoritative world and its adapters. Adapters
//! submit [`Command`] values describing desired mutations, the world executes
//! those commands via its `apply` entry point, and then broadcasts [`Event`]
//! values describing what happened. The tile vocabulary produced by map
//! generation lives in [`TileType`] and [`TileMap`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

mod tiles;

pub use tiles::{Connections, QuadrantCoverage, TileMap, TileType};

/// Number of columns in the default navigation grid.
pub const DEFAULT_GRID_WIDTH: u32 = 20;

/// Number of rows in the default navigation grid.
pub const DEFAULT_GRID_HEIGHT: u32 = 20;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Rebuilds the navigation grid from a generated tile map.
    ConfigureMap {
        /// Tile classification for every cell of the new grid.
        tiles: TileMap,
        /// Length of each square tile measured in world units.
        tile_length: f32,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Creates a unit and places it on the grid.
    SpawnUnit {
        /// Side the unit fights for.
        faction: Faction,
        /// Traversal capability of the unit.
        mover: MoverType,
        /// Cells travelled per second while following a path.
        speed: f32,
        /// Engagement rules applied every tick.
        attack: AttackBehavior,
        /// Cell to spawn on. Defaults to the map's start tile.
        at: Option<CellCoord>,
    },
    /// Requests that a unit plan a path toward the provided destination.
    PathUnitTo {
        /// Identifier of the unit that should start moving.
        unit: UnitId,
        /// Cell the unit should travel toward.
        destination: CellCoord,
    },
    /// Adds one blocker for the mover type on the provided cell.
    AddBlocker {
        /// Cell receiving the blocker.
        cell: CellCoord,
        /// Mover type whose walkability is affected.
        mover: MoverType,
    },
    /// Removes one blocker for the mover type from the provided cell.
    RemoveBlocker {
        /// Cell losing the blocker.
        cell: CellCoord,
        /// Mover type whose walkability is affected.
        mover: MoverType,
    },
    /// Removes a unit from the world and its cell's occupant list.
    RemoveUnit {
        /// Identifier of the unit to remove.
        unit: UnitId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that the navigation grid was rebuilt from a tile map.
    MapConfigured {
        /// Number of columns in the new grid.
        width: u32,
        /// Number of rows in the new grid.
        height: u32,
        /// Start tile of the map, if the map declares one.
        start: Option<CellCoord>,
        /// End tile of the map, if the map declares one.
        end: Option<CellCoord>,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a unit was created.
    UnitSpawned {
        /// Identifier assigned to the new unit.
        unit: UnitId,
        /// Cell the unit occupies after spawning.
        cell: CellCoord,
    },
    /// Reports that a spawn request named a cell outside the grid.
    SpawnRejected {
        /// Requested spawn cell, if any was supplied.
        cell: Option<CellCoord>,
    },
    /// Confirms that a unit received a new path.
    PathAssigned {
        /// Identifier of the unit that will follow the path.
        unit: UnitId,
        /// Number of steps between the unit's cell and the end of the path.
        steps: usize,
    },
    /// Reports that no path exists toward a requested destination.
    PathNotFound {
        /// Identifier of the unit that requested the path.
        unit: UnitId,
        /// Destination that could not be reached.
        destination: CellCoord,
    },
    /// Confirms that a unit moved between two cells.
    UnitAdvanced {
        /// Identifier of the unit that moved.
        unit: UnitId,
        /// Cell the unit occupied before moving.
        from: CellCoord,
        /// Cell the unit occupies after moving.
        to: CellCoord,
    },
    /// Announces that a unit stopped moving to engage a target.
    UnitHalted {
        /// Identifier of the halted unit.
        unit: UnitId,
        /// Enemy the unit is engaging.
        target: UnitId,
    },
    /// Announces that a unit resumed moving after losing its target.
    UnitResumed {
        /// Identifier of the unit that resumed.
        unit: UnitId,
    },
    /// Confirms that a unit reached the final cell of its path.
    DestinationReached {
        /// Identifier of the unit.
        unit: UnitId,
        /// Cell the unit stands on.
        cell: CellCoord,
    },
    /// Confirms that a unit left the world.
    UnitRemoved {
        /// Identifier of the removed unit.
        unit: UnitId,
        /// Cell the unit occupied when removed.
        cell: CellCoord,
    },
    /// Reports the blocker count of a cell after it changed.
    BlockersChanged {
        /// Cell whose blockers changed.
        cell: CellCoord,
        /// Mover type whose count changed.
        mover: MoverType,
        /// Blocker count after the change.
        count: u32,
    },
}

/// Traversal capability of a unit, used as the walkability context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoverType {
    /// Ground unit restricted to path tiles.
    Walker,
    /// Airborne unit that may cross empty ground.
    Flyer,
    /// Unit that never moves, such as a tower.
    Stationary,
}

/// Side a unit belongs to in combat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    /// Towers defending the end of the path.
    TowerSide,
    /// Lemmings travelling toward the end of the path.
    LemmingSide,
    /// Units that never engage or get engaged.
    Neutral,
}

impl Faction {
    /// Reports whether units of the two factions fight each other.
    #[must_use]
    pub fn is_hostile_to(self, other: Faction) -> bool {
        self != Faction::Neutral && other != Faction::Neutral && self != other
    }
}

/// Engagement rules evaluated for a unit on every tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackBehavior {
    /// Stops moving while an enemy stands within the range.
    StopsToAttack {
        /// Chebyshev radius, in cells, scanned for enemies.
        range: u32,
    },
    /// Tracks enemies within the range without ever stopping.
    NeverStopsMoving {
        /// Chebyshev radius, in cells, scanned for enemies.
        range: u32,
    },
    /// Ignores enemies entirely.
    NeverAttacks,
}

impl AttackBehavior {
    /// Range scanned for targets, if the behavior acquires targets at all.
    #[must_use]
    pub const fn range(&self) -> Option<u32> {
        match self {
            Self::StopsToAttack { range } | Self::NeverStopsMoving { range } => Some(*range),
            Self::NeverAttacks => None,
        }
    }

    /// Reports whether holding a target prevents the unit from moving.
    #[must_use]
    pub const fn halts_on_target(&self) -> bool {
        matches!(self, Self::StopsToAttack { .. })
    }
}

/// Cardinal directions on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// All four directions in clockwise order starting at north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// Reports whether the direction runs along the vertical axis.
    #[must_use]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::North | Self::South)
    }
}

/// Unique identifier assigned to a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Computes the Chebyshev (king-move) distance between two cell coordinates.
    #[must_use]
    pub fn chebyshev_distance(self, other: CellCoord) -> u32 {
        self.column()
            .abs_diff(other.column())
            .max(self.row().abs_diff(other.row()))
    }

    /// Neighbouring cell in the provided direction, if it lies inside a
    /// `width` by `height` grid.
    #[must_use]
    pub fn step(self, direction: Direction, width: u32, height: u32) -> Option<CellCoord> {
        let (column, row) = match direction {
            Direction::North => (Some(self.column), self.row.checked_sub(1)),
            Direction::East => (self.column.checked_add(1), Some(self.row)),
            Direction::South => (Some(self.column), self.row.checked_add(1)),
            Direction::West => (self.column.checked_sub(1), Some(self.row)),
        };

        match (column, row) {
            (Some(column), Some(row)) if column < width && row < height => {
                Some(CellCoord::new(column, row))
            }
            _ => None,
        }
    }

    /// Reports whether the cell lies on the outer ring of a `width` by `height` grid.
    #[must_use]
    pub fn is_on_border(self, width: u32, height: u32) -> bool {
        self.column == 0
            || self.row == 0
            || self.column.saturating_add(1) >= width
            || self.row.saturating_add(1) >= height
    }
}
