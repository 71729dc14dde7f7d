//! Secondary branch insertion.
//!
//! Two interior path tiles are joined by a greedy walk that only commits to
//! steps bringing it closer to the target. Walked cells start out as
//! four-way placeholders and are then reshaped from their path neighbours.

use lemming_defence_core::{CellCoord, Direction, TileType};
use rand::Rng;

use crate::layout::Layout;

/// Joins two interior path tiles with a branch.
///
/// Retries with fresh endpoints until at least one junction exists or
/// `max_tries` walks have been made. Returns whether a junction exists.
pub(crate) fn split_path<R>(layout: &mut Layout, rng: &mut R, max_tries: u32) -> bool
where
    R: Rng + ?Sized,
{
    for _ in 0..max_tries {
        if split_tile_count(layout) > 0 {
            return true;
        }

        let candidates = interior_path_cells(layout);
        if candidates.len() < 2 {
            return false;
        }

        let start_index = rng.gen_range(0..candidates.len());
        let mut end_index = rng.gen_range(0..candidates.len() - 1);
        if end_index >= start_index {
            end_index += 1;
        }
        let start = candidates[start_index];
        let end = candidates[end_index];

        layout.mark_split(start);
        layout.mark_split(end);
        walk_between(layout, start, end, rng);
        reshape_split_tiles(layout);
    }

    split_tile_count(layout) > 0
}

/// Path tiles at least two cells away from every border.
fn interior_path_cells(layout: &Layout) -> Vec<CellCoord> {
    let max_column = layout.width().saturating_sub(4);
    let max_row = layout.height().saturating_sub(4);

    layout
        .tiles()
        .cells()
        .filter(|(cell, tile)| {
            tile.is_path()
                && (2..=max_column).contains(&cell.column())
                && (2..=max_row).contains(&cell.row())
        })
        .map(|(cell, _)| cell)
        .collect()
}

fn walk_between<R>(layout: &mut Layout, start: CellCoord, end: CellCoord, rng: &mut R)
where
    R: Rng + ?Sized,
{
    let mut position = start;

    while position != end {
        let (column, row) = (position.column(), position.row());
        position = match rng.gen_range(0..4) {
            0 if row > end.row() => CellCoord::new(column, row - 1),
            1 if row < end.row() => CellCoord::new(column, row + 1),
            2 if column > end.column() => CellCoord::new(column - 1, row),
            3 if column < end.column() => CellCoord::new(column + 1, row),
            _ => position,
        };

        layout.set(position, TileType::SplitFourWays);
        layout.mark_split(position);
    }
}

/// Reshapes every split-flagged tile from its path neighbours.
///
/// Reshaping flags neighbouring path tiles too, so a second pass picks up
/// tiles flagged after the first pass had already visited them.
pub(crate) fn reshape_split_tiles(layout: &mut Layout) {
    for _ in 0..2 {
        for index in 0..layout.cell_count() {
            let Some(cell) = layout.cell_at(index) else {
                continue;
            };
            if !layout.is_split(cell) {
                continue;
            }

            let tile = layout.get(cell);
            if tile.map_or(true, |tile| tile.is_endpoint() || !tile.is_path()) {
                continue;
            }

            let neighbors = layout.tiles().path_neighbors(cell);
            for direction in Direction::ALL {
                if !neighbors.contains(direction) {
                    continue;
                }
                if let Some(neighbor) = layout.step(cell, direction) {
                    layout.mark_split(neighbor);
                }
            }

            if let Some(shape) = TileType::from_connections(neighbors) {
                layout.set(cell, shape);
            }
        }
    }
}

/// Number of three- and four-way junctions.
pub(crate) fn split_tile_count(layout: &Layout) -> usize {
    layout.tiles().count_where(TileType::is_split)
}
