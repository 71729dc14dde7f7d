//! Primary path carving.
//!
//! The walk starts on the top or left border and extends one tile per step,
//! choosing between continuing straight and turning either way. A turn is
//! always followed by a straight step. Every target cell must be empty and
//! still connected to the border through empty cells, which keeps the walk
//! from sealing itself into a pocket.

use lemming_defence_core::{CellCoord, Connections, Direction, TileType};
use rand::Rng;

use crate::{layout::Layout, GeneratorConfig, Rejection};

/// Endpoints and length of a successfully carved primary path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct CarvedPath {
    pub(crate) start: CellCoord,
    pub(crate) end: CellCoord,
    pub(crate) length: usize,
}

/// Carves the primary path into an empty layout.
pub(crate) fn carve_primary_path<R>(
    layout: &mut Layout,
    config: &GeneratorConfig,
    rng: &mut R,
    visited: &mut Vec<bool>,
) -> Result<CarvedPath, Rejection>
where
    R: Rng + ?Sized,
{
    let (start, mut cursor) = if rng.gen_range(0..2) == 1 {
        let column = rng.gen_range(0..layout.width());
        let start = CellCoord::new(column, 0);
        layout.set(start, TileType::StartPoint);
        let first = CellCoord::new(column, 1);
        layout.set(first, TileType::VerticalPath);
        (start, Cursor::new(first, Direction::South))
    } else {
        let row = rng.gen_range(0..layout.height());
        let start = CellCoord::new(0, row);
        layout.set(start, TileType::StartPoint);
        let first = CellCoord::new(1, row);
        layout.set(first, TileType::HorizontalPath);
        (start, Cursor::new(first, Direction::East))
    };

    let mut length = 1_usize;
    let mut failures = 0_u32;
    let mut towers = 0_usize;
    let mut tower_due = false;

    let end = loop {
        if cursor.advance(layout, rng, visited) {
            length += 1;
            if length % config.tower_frequency == 0 {
                tower_due = true;
            }
            failures = 0;
        } else {
            failures += 1;
        }

        if failures > config.max_consecutive_failures {
            return Err(Rejection::Stalled { length });
        }

        if tower_due
            && towers < config.tower_count
            && place_diagonal_tower(layout, cursor.position, rng)
        {
            towers += 1;
            tower_due = false;
        }

        if length > config.min_path_length && layout.is_on_border(cursor.position) {
            layout.set(cursor.position, TileType::EndPoint);
            break cursor.position;
        }
    };

    if length >= config.max_path_length {
        return Err(Rejection::TooLong { length });
    }

    if has_illegal_adjacency(layout) {
        return Err(Rejection::IllegalAdjacency);
    }

    Ok(CarvedPath { start, end, length })
}

/// Head of the carving walk.
#[derive(Clone, Copy, Debug)]
struct Cursor {
    position: CellCoord,
    heading: Direction,
    after_turn: bool,
}

impl Cursor {
    fn new(position: CellCoord, heading: Direction) -> Self {
        Self {
            position,
            heading,
            after_turn: false,
        }
    }

    /// Attempts to lay the tile under the cursor and step onto the next cell.
    fn advance<R>(&mut self, layout: &mut Layout, rng: &mut R, visited: &mut Vec<bool>) -> bool
    where
        R: Rng + ?Sized,
    {
        layout.set(self.position, TileType::CurrentPosition);

        let (options, straight) = turn_options(self.heading);
        let mut choice = rng.gen_range(0..options.len());
        if self.after_turn {
            choice = straight;
        }
        let direction = options[choice];

        let Some(target) = layout.step(self.position, direction) else {
            return false;
        };
        if !is_safe(layout, target, visited) {
            return false;
        }

        let entry = self.heading.opposite();
        let Some(tile) = TileType::from_connections(Connections::between(entry, direction)) else {
            return false;
        };

        layout.set(self.position, tile);
        self.after_turn = tile.is_turn();
        self.position = target;
        self.heading = direction;
        true
    }
}

/// Candidate directions for the next step and the index of the straight one.
fn turn_options(heading: Direction) -> ([Direction; 3], usize) {
    match heading {
        Direction::North => ([Direction::North, Direction::West, Direction::East], 0),
        Direction::South => ([Direction::South, Direction::West, Direction::East], 0),
        Direction::West => ([Direction::North, Direction::South, Direction::West], 2),
        Direction::East => ([Direction::North, Direction::South, Direction::East], 2),
    }
}

/// Reports whether `cell` is empty and reaches the border through empty cells.
pub(crate) fn is_safe(layout: &Layout, cell: CellCoord, visited: &mut Vec<bool>) -> bool {
    if !layout.is(cell, TileType::EmptySpace) {
        return false;
    }
    if layout.is_on_border(cell) {
        return true;
    }

    visited.clear();
    visited.resize(layout.cell_count(), false);

    let Some(origin) = layout.index(cell) else {
        return false;
    };
    visited[origin] = true;
    let mut stack = vec![cell];

    while let Some(current) = stack.pop() {
        for direction in [
            Direction::South,
            Direction::East,
            Direction::North,
            Direction::West,
        ] {
            let Some(next) = layout.step(current, direction) else {
                continue;
            };
            if !layout.is(next, TileType::EmptySpace) {
                continue;
            }
            let Some(index) = layout.index(next) else {
                continue;
            };
            if visited[index] {
                continue;
            }
            if layout.is_on_border(next) {
                return true;
            }

            visited[index] = true;
            stack.push(next);
        }
    }

    false
}

/// Reports whether any shaped tile sits beside a path tile it does not open onto.
pub(crate) fn has_illegal_adjacency(layout: &Layout) -> bool {
    layout.tiles().cells().any(|(cell, tile)| {
        tile.is_path()
            && Direction::ALL.into_iter().any(|direction| {
                layout
                    .step(cell, direction)
                    .and_then(|neighbor| layout.get(neighbor))
                    .and_then(TileType::connections)
                    .map_or(false, |connections| !connections.contains(direction.opposite()))
            })
    })
}

/// Places a tower on a random diagonal neighbour of an interior cell.
pub(crate) fn place_diagonal_tower<R>(layout: &mut Layout, position: CellCoord, rng: &mut R) -> bool
where
    R: Rng + ?Sized,
{
    if layout.is_on_border(position) {
        return false;
    }

    let (column, row) = (position.column(), position.row());
    let target = match rng.gen_range(0..4) {
        0 => CellCoord::new(column + 1, row + 1),
        1 => CellCoord::new(column - 1, row + 1),
        2 => CellCoord::new(column + 1, row - 1),
        _ => CellCoord::new(column - 1, row - 1),
    };

    if !layout.is(target, TileType::EmptySpace) {
        return false;
    }

    layout.set(target, TileType::Tower);
    true
}
