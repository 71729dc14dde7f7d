//! Decoration scattering.
//!
//! Each round drops a patch and a single decoration on random cells. A patch
//! keeps growing from a cell in every direction where more than two empty
//! cells line up behind it.

use lemming_defence_core::{CellCoord, Direction, TileType};
use rand::Rng;

use crate::layout::Layout;

/// Empty cells that must line up in a direction before a patch grows that way.
const PATCH_RUN: usize = 2;

/// Number of decorations a layout should receive.
pub(crate) fn decoration_target(layout: &Layout, ratio: f64) -> usize {
    let empty = layout.count(TileType::EmptySpace);
    let target = (empty as f64 * ratio).floor();
    if target <= 0.0 {
        0
    } else {
        (target as usize).min(empty)
    }
}

/// Decorations of either kind currently on the layout.
pub(crate) fn decoration_count(layout: &Layout) -> usize {
    layout.tiles().count_where(TileType::is_decoration)
}

/// Scatters decorations until `target` exist or `max_rounds` rounds pass.
///
/// Returns the number of decorations on the layout afterwards.
pub(crate) fn decorate<R>(
    layout: &mut Layout,
    target: usize,
    rng: &mut R,
    max_rounds: usize,
    stack: &mut Vec<CellCoord>,
) -> usize
where
    R: Rng + ?Sized,
{
    let mut placed = decoration_count(layout);

    for _ in 0..max_rounds {
        if placed >= target {
            break;
        }

        let origin = layout.random_cell(rng);
        placed += grow_patch(layout, origin, target - placed, stack);

        let single = layout.random_cell(rng);
        if placed < target && layout.is(single, TileType::EmptySpace) {
            layout.set(single, TileType::Decor);
            placed += 1;
        }
    }

    placed
}

/// Grows a patch of [`TileType::DecorPatch`] from `origin`.
///
/// Places at most `budget` tiles and returns how many were placed.
pub(crate) fn grow_patch(
    layout: &mut Layout,
    origin: CellCoord,
    budget: usize,
    stack: &mut Vec<CellCoord>,
) -> usize {
    stack.clear();
    stack.push(origin);
    let mut placed = 0;

    while let Some(cell) = stack.pop() {
        if placed >= budget {
            break;
        }
        if !layout.is(cell, TileType::EmptySpace) {
            continue;
        }

        let growth: Vec<CellCoord> = [
            Direction::North,
            Direction::South,
            Direction::West,
            Direction::East,
        ]
        .into_iter()
        .filter(|direction| empty_run(layout, cell, *direction) > PATCH_RUN)
        .filter_map(|direction| layout.step(cell, direction))
        .collect();

        layout.set(cell, TileType::DecorPatch);
        placed += 1;

        stack.extend(growth.into_iter().rev());
    }

    stack.clear();
    placed
}

/// Consecutive empty cells beyond `cell` in `direction`.
fn empty_run(layout: &Layout, cell: CellCoord, direction: Direction) -> usize {
    let mut run = 0;
    let mut current = cell;
    while let Some(next) = layout.step(current, direction) {
        if !layout.is(next, TileType::EmptySpace) {
            break;
        }
        run += 1;
        current = next;
    }
    run
}
