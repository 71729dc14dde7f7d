#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spatial A* search over fixed-size, four-connected grids.
//!
//! [`SpatialAStar`] owns one search node per grid cell together with the
//! precomputed orthogonal neighbour lists and the open-set bookkeeping. The
//! grid itself stays with the caller: every search borrows a row-major slice
//! of nodes implementing [`Walkable`] and a context value (for example a
//! mover type) that decides which cells may be entered. A single engine is
//! reused for many sequential searches; its working arrays are reset at the
//! start of each call rather than reallocated.

use std::{cmp::Ordering, marker::PhantomData};

use lemming_defence_core::CellCoord;
use tracing::{trace, warn};

mod priority_queue;

pub use priority_queue::{IndexedObject, PriorityQueue};

/// Cell that can report whether it may be entered under a given context.
pub trait Walkable<C: ?Sized> {
    /// Reports whether a search running with `context` may step onto the cell.
    fn is_walkable(&self, context: &C) -> bool;
}

/// Estimate of the remaining cost between two cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Heuristic {
    /// Integer octile blend of the axis deltas, roughly `0.96 * max + 0.4 * min`.
    ///
    /// The weights are tuned as if diagonal steps existed. On a four-connected
    /// grid the estimate never exceeds the Manhattan distance, so routes stay
    /// shortest, but the search expands more cells than a Manhattan estimate.
    #[default]
    Octile,
    /// Sum of the axis deltas.
    Manhattan,
}

impl Heuristic {
    /// Estimated cost of travelling from `from` to `to`.
    #[must_use]
    pub fn estimate(self, from: CellCoord, to: CellCoord) -> u32 {
        let dx = u64::from(from.column().abs_diff(to.column()));
        let dy = u64::from(from.row().abs_diff(to.row()));

        let estimate = match self {
            Heuristic::Manhattan => dx + dy,
            Heuristic::Octile => {
                let (min, max) = if dx < dy { (dx, dy) } else { (dy, dx) };
                ((max << 8) + (max << 3) - (max << 4) - (max << 1) + (min << 7) - (min << 5)
                    + (min << 3)
                    - (min << 1))
                    >> 8
            }
        };

        u32::try_from(estimate).unwrap_or(u32::MAX)
    }
}

/// Reusable A* engine for a `width` by `height` grid of `N` cells searched
/// under a `C` context.
#[derive(Debug)]
pub struct SpatialAStar<N, C: ?Sized> {
    width: u32,
    height: u32,
    nodes: Vec<PathNode>,
    neighbors: Vec<[Option<usize>; 4]>,
    open: OpenNodes,
    came_from: Vec<Option<usize>>,
    queue: PriorityQueue<fn(&PathNode, &PathNode) -> Ordering>,
    heuristic: Heuristic,
    expanded: usize,
    _marker: PhantomData<fn(&N, &C)>,
}

impl<N, C> SpatialAStar<N, C>
where
    N: Walkable<C>,
    C: ?Sized,
{
    /// Builds the search nodes and neighbour lists for a grid of the provided size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let cell_count = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0);
        let mut nodes = Vec::with_capacity(cell_count);
        let mut neighbors = Vec::with_capacity(cell_count);

        for row in 0..height {
            for column in 0..width {
                let cell = CellCoord::new(column, row);
                nodes.push(PathNode::new(cell));
                neighbors.push(neighbor_indices(cell, width, height));
            }
        }

        Self {
            width,
            height,
            nodes,
            neighbors,
            open: OpenNodes::new(cell_count),
            came_from: vec![None; cell_count],
            queue: PriorityQueue::with_capacity(
                cell_count,
                compare_scores as fn(&PathNode, &PathNode) -> Ordering,
            ),
            heuristic: Heuristic::default(),
            expanded: 0,
            _marker: PhantomData,
        }
    }

    /// Replaces the heuristic used by subsequent searches.
    #[must_use]
    pub fn with_heuristic(mut self, heuristic: Heuristic) -> Self {
        self.heuristic = heuristic;
        self
    }

    /// Heuristic used by the engine.
    #[must_use]
    pub fn heuristic(&self) -> Heuristic {
        self.heuristic
    }

    /// Number of columns the engine was built for.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows the engine was built for.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of cells closed by the most recent search.
    #[must_use]
    pub fn last_expanded(&self) -> usize {
        self.expanded
    }

    /// Finds the cheapest orthogonal route from `start` to `goal`.
    ///
    /// `grid` holds the cells in row-major order. The returned route includes
    /// both endpoints. Cells that are not walkable under `context` are never
    /// entered, the goal included; the start cell is never tested. Returns
    /// `None` when the goal is unreachable or either endpoint lies outside
    /// the grid.
    pub fn search(
        &mut self,
        grid: &[N],
        start: CellCoord,
        goal: CellCoord,
        context: &C,
    ) -> Option<Vec<CellCoord>> {
        let start_index = self.index(start)?;
        let goal_index = self.index(goal)?;

        if start_index == goal_index {
            return Some(vec![start]);
        }

        self.reset();
        let reached = self.expand(start_index, goal_index, |index| {
            grid.get(index)
                .map_or(false, |cell| cell.is_walkable(context))
        });

        if !reached {
            warn!(?start, ?goal, expanded = self.expanded, "could not find a path");
            return None;
        }

        let path = self.reconstruct(start_index, goal_index);
        trace!(
            ?start,
            ?goal,
            length = path.len(),
            expanded = self.expanded,
            "path found"
        );
        Some(path)
    }

    /// Finds the first cell that blocks the shortest route from `start` to `goal`.
    ///
    /// The route is computed as if every cell were walkable. The first cell on
    /// it, starting from `start` and excluding `goal`, that is not walkable
    /// under `context` is returned. `None` means the unobstructed route is
    /// already clear.
    pub fn find_first_blocker(
        &mut self,
        grid: &[N],
        start: CellCoord,
        goal: CellCoord,
        context: &C,
    ) -> Option<CellCoord> {
        let start_index = self.index(start)?;
        let goal_index = self.index(goal)?;

        if start_index == goal_index {
            return None;
        }

        self.reset();
        if !self.expand(start_index, goal_index, |_| true) {
            return None;
        }

        let route = self.reconstruct(start_index, goal_index);
        route
            .iter()
            .take(route.len().saturating_sub(1))
            .copied()
            .find(|cell| {
                self.index(*cell)
                    .and_then(|index| grid.get(index))
                    .map_or(true, |node| !node.is_walkable(context))
            })
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() >= self.width || cell.row() >= self.height {
            return None;
        }

        let width = usize::try_from(self.width).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    fn reset(&mut self) {
        for node in &mut self.nodes {
            node.reset();
        }
        self.came_from.fill(None);
        self.open.clear();
        self.queue.clear();
        self.expanded = 0;
    }

    fn expand<P>(&mut self, start: usize, goal: usize, mut passable: P) -> bool
    where
        P: FnMut(usize) -> bool,
    {
        let goal_cell = self.nodes[goal].cell;
        let start_estimate = self.heuristic.estimate(self.nodes[start].cell, goal_cell);
        self.nodes[start].score(0, start_estimate);
        self.open.add(start);
        let _ = self.queue.push(&mut self.nodes, start);

        while !self.open.is_empty() {
            let Some(current) = self.queue.pop(&mut self.nodes) else {
                break;
            };

            if current == goal {
                return true;
            }

            self.open.remove(current);
            self.nodes[current].checked = true;
            self.expanded += 1;

            let tentative = self.nodes[current].g.saturating_add(1);
            let neighbors = self.neighbors[current];
            for neighbor in neighbors.into_iter().flatten() {
                if self.nodes[neighbor].checked || !passable(neighbor) {
                    continue;
                }

                let added = if !self.open.contains(neighbor) {
                    self.open.add(neighbor);
                    true
                } else if tentative < self.nodes[neighbor].g {
                    false
                } else {
                    continue;
                };

                self.came_from[neighbor] = Some(current);
                let estimate = self.heuristic.estimate(self.nodes[neighbor].cell, goal_cell);
                self.nodes[neighbor].score(tentative, estimate);

                if added {
                    let _ = self.queue.push(&mut self.nodes, neighbor);
                } else {
                    let _ = self.queue.update(&mut self.nodes, neighbor);
                }
            }
        }

        false
    }

    fn reconstruct(&self, start: usize, goal: usize) -> Vec<CellCoord> {
        let mut path = vec![self.nodes[goal].cell];
        let mut current = goal;

        while current != start {
            let Some(previous) = self.came_from[current] else {
                break;
            };
            path.push(self.nodes[previous].cell);
            current = previous;
        }

        path.reverse();
        path
    }
}

#[derive(Clone, Debug)]
struct PathNode {
    cell: CellCoord,
    g: u32,
    h: u32,
    f: u32,
    checked: bool,
    heap_index: Option<usize>,
}

impl PathNode {
    fn new(cell: CellCoord) -> Self {
        Self {
            cell,
            g: 0,
            h: 0,
            f: 0,
            checked: false,
            heap_index: None,
        }
    }

    fn reset(&mut self) {
        self.g = 0;
        self.h = 0;
        self.f = 0;
        self.checked = false;
        self.heap_index = None;
    }

    fn score(&mut self, g: u32, h: u32) {
        self.g = g;
        self.h = h;
        self.f = self.g.saturating_add(self.h);
    }
}

impl IndexedObject for PathNode {
    fn heap_index(&self) -> Option<usize> {
        self.heap_index
    }

    fn set_heap_index(&mut self, index: Option<usize>) {
        self.heap_index = index;
    }
}

fn compare_scores(first: &PathNode, second: &PathNode) -> Ordering {
    first.f.cmp(&second.f)
}

/// Open-set membership indexed directly by cell.
#[derive(Clone, Debug)]
struct OpenNodes {
    members: Vec<bool>,
    count: usize,
}

impl OpenNodes {
    fn new(cell_count: usize) -> Self {
        Self {
            members: vec![false; cell_count],
            count: 0,
        }
    }

    fn add(&mut self, index: usize) {
        if !self.members[index] {
            self.members[index] = true;
            self.count += 1;
        }
    }

    fn remove(&mut self, index: usize) {
        if self.members[index] {
            self.members[index] = false;
            self.count -= 1;
        }
    }

    fn contains(&self, index: usize) -> bool {
        self.members[index]
    }

    fn is_empty(&self) -> bool {
        self.count == 0
    }

    fn clear(&mut self) {
        self.members.fill(false);
        self.count = 0;
    }
}

// Up, left, right, down. Search results depend on this order.
fn neighbor_indices(cell: CellCoord, width: u32, height: u32) -> [Option<usize>; 4] {
    let width_usize = usize::try_from(width).unwrap_or(0);
    let to_index = |cell: CellCoord| {
        let column = usize::try_from(cell.column()).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        row.checked_mul(width_usize)?.checked_add(column)
    };

    let up = cell
        .row()
        .checked_sub(1)
        .map(|row| CellCoord::new(cell.column(), row));
    let left = cell
        .column()
        .checked_sub(1)
        .map(|column| CellCoord::new(column, cell.row()));
    let right = cell
        .column()
        .checked_add(1)
        .filter(|column| *column < width)
        .map(|column| CellCoord::new(column, cell.row()));
    let down = cell
        .row()
        .checked_add(1)
        .filter(|row| *row < height)
        .map(|row| CellCoord::new(cell.column(), row));

    [up, left, right, down].map(|neighbor| neighbor.and_then(to_index))
}
