//! Navigation facade over the grid and the A* engine.

use lemming_defence_core::{CellCoord, MoverType, TileMap, TileType, UnitId};
use lemming_defence_system_pathfinding::{Heuristic, SpatialAStar, Walkable};
use tracing::debug;

use crate::grid::{Grid, GridPoint};

/// Owns the navigable grid together with the search engine built for it.
///
/// Path requests borrow the engine's scratch space, so they take `&mut self`;
/// lookups and range queries are read-only.
#[derive(Debug)]
pub struct Navigation {
    grid: Grid,
    astar: SpatialAStar<GridPoint, MoverType>,
    tile_length: f32,
    first_tile: Option<CellCoord>,
    last_tile: Option<CellCoord>,
}

impl Navigation {
    /// Creates a grid on which every cell is walkable for every moving unit.
    #[must_use]
    pub fn new(width: u32, height: u32, tile_length: f32) -> Self {
        let points = cells(width, height)
            .map(|cell| GridPoint::new(cell, TileType::EmptySpace, tile_length))
            .collect();
        Self::from_parts(Grid::from_points(width, height, points), tile_length, None, None)
    }

    /// Creates a grid whose blockers follow the tile classification.
    ///
    /// Walkers may only use path tiles. Flyers may additionally cross empty
    /// ground but not towers or decorations.
    #[must_use]
    pub fn from_tile_map(tiles: &TileMap, tile_length: f32) -> Self {
        let points = tiles
            .cells()
            .map(|(cell, tile)| GridPoint::from_tile(cell, tile, tile_length))
            .collect();
        Self::from_parts(
            Grid::from_points(tiles.width(), tiles.height(), points),
            tile_length,
            tiles.start(),
            tiles.end(),
        )
    }

    fn from_parts(
        grid: Grid,
        tile_length: f32,
        first_tile: Option<CellCoord>,
        last_tile: Option<CellCoord>,
    ) -> Self {
        let astar = SpatialAStar::new(grid.width(), grid.height());
        Self {
            grid,
            astar,
            tile_length,
            first_tile,
            last_tile,
        }
    }

    /// Switches the estimate used by later path requests.
    #[must_use]
    pub fn with_heuristic(mut self, heuristic: Heuristic) -> Self {
        self.astar = SpatialAStar::new(self.grid.width(), self.grid.height()).with_heuristic(heuristic);
        self
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.grid.width()
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.grid.height()
    }

    /// Length of each square tile in world units.
    #[must_use]
    pub const fn tile_length(&self) -> f32 {
        self.tile_length
    }

    /// Underlying grid of cells.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Start tile of the map the grid was built from.
    #[must_use]
    pub const fn first_tile(&self) -> Option<CellCoord> {
        self.first_tile
    }

    /// End tile of the map the grid was built from.
    #[must_use]
    pub const fn last_tile(&self) -> Option<CellCoord> {
        self.last_tile
    }

    /// Bounds-checked lookup by signed coordinates.
    #[must_use]
    pub fn grid_point(&self, x: i32, y: i32) -> Option<&GridPoint> {
        self.grid.point_at(x, y)
    }

    /// Bounds-checked lookup by cell.
    #[must_use]
    pub fn point(&self, cell: CellCoord) -> Option<&GridPoint> {
        self.grid.point(cell)
    }

    /// Reports whether the mover may currently enter the cell.
    #[must_use]
    pub fn is_walkable(&self, cell: CellCoord, mover: MoverType) -> bool {
        self.point(cell)
            .map_or(false, |point| point.is_walkable(&mover))
    }

    /// Blocker count of the cell for the mover type.
    #[must_use]
    pub fn blockers(&self, cell: CellCoord, mover: MoverType) -> Option<u32> {
        self.point(cell).map(|point| point.blockers(mover))
    }

    /// Units standing on the cell. Empty for cells outside the grid.
    #[must_use]
    pub fn occupants(&self, cell: CellCoord) -> &[UnitId] {
        self.point(cell)
            .map(GridPoint::occupants)
            .unwrap_or_default()
    }

    /// Finds a route from `start` to `goal`, both included.
    ///
    /// The goal is forced walkable for the duration of the search, so a route
    /// onto a blocked destination is still returned. Its blockers are restored
    /// before this returns.
    pub fn find_path(
        &mut self,
        start: CellCoord,
        goal: CellCoord,
        mover: MoverType,
    ) -> Option<Vec<CellCoord>> {
        let _ = self.grid.index(start)?;
        let destination = self.grid.point_mut(goal)?;
        let saved = destination.force_walkable();

        let path = self.astar.search(self.grid.points(), start, goal, &mover);

        if let Some(destination) = self.grid.point_mut(goal) {
            destination.restore_blockers(saved);
        }
        path
    }

    /// Finds a route a unit can actually follow toward `goal`.
    ///
    /// Behaves like [`Navigation::find_path`], but drops the final cell when
    /// the destination is not genuinely walkable for the mover, so units stop
    /// next to a blocked destination instead of entering it.
    pub fn path_to(
        &mut self,
        start: CellCoord,
        goal: CellCoord,
        mover: MoverType,
    ) -> Option<Vec<CellCoord>> {
        let reachable = self.is_walkable(goal, mover);
        let mut path = self.find_path(start, goal, mover)?;
        if !reachable && path.len() > 1 {
            let _ = path.pop();
            debug!(?goal, ?mover, "stopping short of a blocked destination");
        }
        Some(path)
    }

    /// First cell blocking the mover on the unobstructed shortest route.
    pub fn find_first_blocker(
        &mut self,
        start: CellCoord,
        goal: CellCoord,
        mover: MoverType,
    ) -> Option<CellCoord> {
        self.astar
            .find_first_blocker(self.grid.points(), start, goal, &mover)
    }

    /// Cells within Chebyshev distance `range` of `source`, in row-major order.
    ///
    /// Each cell appears exactly once. Cells outside the grid are skipped; an
    /// out-of-bounds source yields nothing.
    #[must_use]
    pub fn points_in_range(&self, source: CellCoord, range: u32) -> Vec<&GridPoint> {
        if self.point(source).is_none() {
            return Vec::new();
        }

        let first_row = source.row().saturating_sub(range);
        let last_row = source
            .row()
            .saturating_add(range)
            .min(self.height().saturating_sub(1));
        let first_column = source.column().saturating_sub(range);
        let last_column = source
            .column()
            .saturating_add(range)
            .min(self.width().saturating_sub(1));

        (first_row..=last_row)
            .flat_map(|row| (first_column..=last_column).map(move |column| CellCoord::new(column, row)))
            .filter_map(|cell| self.point(cell))
            .collect()
    }

    /// Adds a blocker to the cell, returning the new count.
    pub fn add_blocker(&mut self, cell: CellCoord, mover: MoverType) -> Option<u32> {
        self.grid.point_mut(cell)?.add_blocker(mover)
    }

    /// Removes a blocker from the cell, reporting whether one was removed.
    pub fn remove_blocker(&mut self, cell: CellCoord, mover: MoverType) -> bool {
        self.grid
            .point_mut(cell)
            .map_or(false, |point| point.remove_blocker(mover))
    }

    /// Records that the unit stands on the cell.
    pub fn occupy(&mut self, cell: CellCoord, unit: UnitId) -> bool {
        let Some(point) = self.grid.point_mut(cell) else {
            return false;
        };
        point.add_occupant(unit);
        true
    }

    /// Records that the unit left the cell.
    pub fn vacate(&mut self, cell: CellCoord, unit: UnitId) -> bool {
        self.grid
            .point_mut(cell)
            .map_or(false, |point| point.remove_occupant(unit))
    }
}

fn cells(width: u32, height: u32) -> impl Iterator<Item = CellCoord> {
    (0..height).flat_map(move |row| (0..width).map(move |column| CellCoord::new(column, row)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor() -> TileMap {
        let mut tiles = TileMap::new(5, 3);
        let _ = tiles.set(CellCoord::new(0, 1), TileType::StartPoint);
        for column in 1..4 {
            let _ = tiles.set(CellCoord::new(column, 1), TileType::HorizontalPath);
        }
        let _ = tiles.set(CellCoord::new(4, 1), TileType::EndPoint);
        let _ = tiles.set(CellCoord::new(2, 0), TileType::Tower);
        tiles
    }

    #[test]
    fn tile_map_sets_endpoints_and_blockers() {
        let navigation = Navigation::from_tile_map(&corridor(), 1.0);

        assert_eq!(navigation.first_tile(), Some(CellCoord::new(0, 1)));
        assert_eq!(navigation.last_tile(), Some(CellCoord::new(4, 1)));
        assert!(navigation.is_walkable(CellCoord::new(2, 1), MoverType::Walker));
        assert!(!navigation.is_walkable(CellCoord::new(1, 0), MoverType::Walker));
        assert!(navigation.is_walkable(CellCoord::new(1, 0), MoverType::Flyer));
        assert!(!navigation.is_walkable(CellCoord::new(2, 0), MoverType::Flyer));
    }

    #[test]
    fn walkers_follow_the_corridor() {
        let mut navigation = Navigation::from_tile_map(&corridor(), 1.0);

        let path = navigation
            .find_path(CellCoord::new(0, 1), CellCoord::new(4, 1), MoverType::Walker)
            .expect("corridor is connected");

        assert_eq!(path.len(), 5);
        assert!(path.iter().all(|cell| cell.row() == 1));
    }

    #[test]
    fn path_to_stops_before_blocked_destination() {
        let mut navigation = Navigation::from_tile_map(&corridor(), 1.0);
        let tower = CellCoord::new(2, 0);

        let full = navigation
            .find_path(CellCoord::new(0, 1), tower, MoverType::Walker)
            .expect("forced destination is reachable");
        assert_eq!(full.last(), Some(&tower));

        let short = navigation
            .path_to(CellCoord::new(0, 1), tower, MoverType::Walker)
            .expect("forced destination is reachable");
        assert_eq!(short.last(), Some(&CellCoord::new(2, 1)));
        assert_eq!(short.len() + 1, full.len());
        assert_eq!(navigation.blockers(tower, MoverType::Walker), Some(1));
    }

    #[test]
    fn out_of_bounds_requests_yield_nothing() {
        let mut navigation = Navigation::new(4, 4, 1.0);

        assert!(navigation.grid_point(4, 0).is_none());
        assert!(navigation.grid_point(0, -1).is_none());
        assert!(navigation
            .find_path(CellCoord::new(0, 0), CellCoord::new(9, 9), MoverType::Walker)
            .is_none());
        assert!(navigation
            .find_path(CellCoord::new(9, 9), CellCoord::new(0, 0), MoverType::Walker)
            .is_none());
        assert!(navigation.points_in_range(CellCoord::new(4, 4), 1).is_empty());
        assert!(navigation.occupants(CellCoord::new(4, 4)).is_empty());
    }

    #[test]
    fn range_is_clipped_at_the_border() {
        let navigation = Navigation::new(6, 6, 1.0);

        let corner: Vec<CellCoord> = navigation
            .points_in_range(CellCoord::new(0, 0), 1)
            .into_iter()
            .map(GridPoint::cell)
            .collect();

        assert_eq!(
            corner,
            vec![
                CellCoord::new(0, 0),
                CellCoord::new(1, 0),
                CellCoord::new(0, 1),
                CellCoord::new(1, 1),
            ]
        );
        assert_eq!(navigation.points_in_range(CellCoord::new(3, 3), 2).len(), 25);
    }

    #[test]
    fn stationary_movers_only_reach_their_own_cell() {
        let mut navigation = Navigation::new(4, 4, 1.0);
        let cell = CellCoord::new(1, 1);

        assert_eq!(
            navigation.find_path(cell, cell, MoverType::Stationary),
            Some(vec![cell])
        );
        assert!(navigation
            .find_path(cell, CellCoord::new(2, 2), MoverType::Stationary)
            .is_none());
    }

    #[test]
    fn manhattan_navigation_matches_default_length() {
        let mut octile = Navigation::new(10, 10, 1.0);
        let mut manhattan = Navigation::new(10, 10, 1.0).with_heuristic(Heuristic::Manhattan);
        let start = CellCoord::new(0, 9);
        let goal = CellCoord::new(9, 0);

        let first = octile.find_path(start, goal, MoverType::Flyer).map(|path| path.len());
        let second = manhattan.find_path(start, goal, MoverType::Flyer).map(|path| path.len());

        assert_eq!(first, Some(19));
        assert_eq!(first, second);
    }
}
