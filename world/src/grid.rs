//! Navigable grid cells and the dense grid that owns them.

use glam::Vec2;
use lemming_defence_core::{CellCoord, MoverType, TileType, UnitId};
use lemming_defence_system_pathfinding::Walkable;

/// Blocker counts captured by [`GridPoint::force_walkable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use = "forced cells stay walkable until the saved blockers are restored"]
pub struct SavedBlockers {
    walker: u32,
    flyer: u32,
}

/// One navigable cell of the grid.
///
/// Walkability is tracked per mover type as a count of blockers, so
/// overlapping obstacles compose. A cell is walkable for a mover type when
/// that count is zero; stationary movers can never enter any cell.
#[derive(Clone, Debug, PartialEq)]
pub struct GridPoint {
    cell: CellCoord,
    world_position: Vec2,
    tile: TileType,
    walker_blockers: u32,
    flyer_blockers: u32,
    occupants: Vec<UnitId>,
}

impl GridPoint {
    pub(crate) fn new(cell: CellCoord, tile: TileType, tile_length: f32) -> Self {
        let center = Vec2::new(cell.column() as f32 + 0.5, cell.row() as f32 + 0.5);
        Self {
            cell,
            world_position: center * tile_length,
            tile,
            walker_blockers: 0,
            flyer_blockers: 0,
            occupants: Vec::new(),
        }
    }

    /// Builds a cell whose blockers follow from its tile classification.
    pub(crate) fn from_tile(cell: CellCoord, tile: TileType, tile_length: f32) -> Self {
        let mut point = Self::new(cell, tile, tile_length);
        if blocks_walkers(tile) {
            point.walker_blockers = 1;
        }
        if blocks_flyers(tile) {
            point.flyer_blockers = 1;
        }
        point
    }

    /// Coordinates of the cell.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Centre of the cell in world units.
    #[must_use]
    pub const fn world_position(&self) -> Vec2 {
        self.world_position
    }

    /// Tile classification the cell was built from.
    #[must_use]
    pub const fn tile_type(&self) -> TileType {
        self.tile
    }

    /// Units currently standing on the cell.
    #[must_use]
    pub fn occupants(&self) -> &[UnitId] {
        &self.occupants
    }

    /// Blockers currently registered for the mover type.
    #[must_use]
    pub const fn blockers(&self, mover: MoverType) -> u32 {
        match mover {
            MoverType::Walker => self.walker_blockers,
            MoverType::Flyer => self.flyer_blockers,
            MoverType::Stationary => 0,
        }
    }

    /// Adds a blocker for the mover type, returning the new count.
    ///
    /// Stationary movers have no counter and yield `None`.
    pub fn add_blocker(&mut self, mover: MoverType) -> Option<u32> {
        let counter = self.counter_mut(mover)?;
        *counter = counter.saturating_add(1);
        Some(*counter)
    }

    /// Removes a blocker for the mover type.
    ///
    /// Returns `false`, leaving the count untouched, when there was nothing
    /// to remove.
    pub fn remove_blocker(&mut self, mover: MoverType) -> bool {
        match self.counter_mut(mover) {
            Some(counter) if *counter > 0 => {
                *counter -= 1;
                true
            }
            _ => false,
        }
    }

    /// Clears every blocker so searches may end on this cell.
    ///
    /// The returned value must be handed back to
    /// [`GridPoint::restore_blockers`] once the search completes.
    pub fn force_walkable(&mut self) -> SavedBlockers {
        let saved = SavedBlockers {
            walker: self.walker_blockers,
            flyer: self.flyer_blockers,
        };
        self.walker_blockers = 0;
        self.flyer_blockers = 0;
        saved
    }

    /// Reinstates blocker counts captured by [`GridPoint::force_walkable`].
    pub fn restore_blockers(&mut self, saved: SavedBlockers) {
        self.walker_blockers = saved.walker;
        self.flyer_blockers = saved.flyer;
    }

    /// Reports whether the Euclidean distance between two cells is at most `range` cells.
    #[must_use]
    pub fn in_range(&self, other: &GridPoint, range: f32) -> bool {
        let from = Vec2::new(self.cell.column() as f32, self.cell.row() as f32);
        let to = Vec2::new(other.cell.column() as f32, other.cell.row() as f32);
        from.distance(to) <= range
    }

    pub(crate) fn add_occupant(&mut self, unit: UnitId) {
        if !self.occupants.contains(&unit) {
            self.occupants.push(unit);
        }
    }

    pub(crate) fn remove_occupant(&mut self, unit: UnitId) -> bool {
        let Some(position) = self.occupants.iter().position(|occupant| *occupant == unit) else {
            return false;
        };
        let _ = self.occupants.swap_remove(position);
        true
    }

    fn counter_mut(&mut self, mover: MoverType) -> Option<&mut u32> {
        match mover {
            MoverType::Walker => Some(&mut self.walker_blockers),
            MoverType::Flyer => Some(&mut self.flyer_blockers),
            MoverType::Stationary => None,
        }
    }
}

impl Walkable<MoverType> for GridPoint {
    fn is_walkable(&self, mover: &MoverType) -> bool {
        match mover {
            MoverType::Walker => self.walker_blockers == 0,
            MoverType::Flyer => self.flyer_blockers == 0,
            MoverType::Stationary => false,
        }
    }
}

fn blocks_walkers(tile: TileType) -> bool {
    matches!(
        tile,
        TileType::Tower | TileType::EmptySpace | TileType::Decor | TileType::DecorPatch
    )
}

fn blocks_flyers(tile: TileType) -> bool {
    matches!(
        tile,
        TileType::Tower | TileType::Decor | TileType::DecorPatch
    )
}

/// Dense, row-major grid of [`GridPoint`] values.
#[derive(Clone, Debug)]
pub struct Grid {
    width: u32,
    height: u32,
    points: Vec<GridPoint>,
}

impl Grid {
    pub(crate) fn from_points(width: u32, height: u32, points: Vec<GridPoint>) -> Self {
        Self {
            width,
            height,
            points,
        }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Every cell in row-major order.
    #[must_use]
    pub fn points(&self) -> &[GridPoint] {
        &self.points
    }

    /// Looks up a cell by signed coordinates.
    ///
    /// Coordinates outside the grid, negative ones included, yield `None`.
    #[must_use]
    pub fn point_at(&self, x: i32, y: i32) -> Option<&GridPoint> {
        let column = u32::try_from(x).ok()?;
        let row = u32::try_from(y).ok()?;
        self.point(CellCoord::new(column, row))
    }

    /// Looks up a cell by coordinates.
    #[must_use]
    pub fn point(&self, cell: CellCoord) -> Option<&GridPoint> {
        self.index(cell).and_then(|index| self.points.get(index))
    }

    pub(crate) fn point_mut(&mut self, cell: CellCoord) -> Option<&mut GridPoint> {
        let index = self.index(cell)?;
        self.points.get_mut(index)
    }

    pub(crate) fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() >= self.width || cell.row() >= self.height {
            return None;
        }

        let width = usize::try_from(self.width).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(tile: TileType) -> GridPoint {
        GridPoint::from_tile(CellCoord::new(2, 3), tile, 10.0)
    }

    #[test]
    fn tiles_decide_initial_walkability() {
        let path = point(TileType::HorizontalPath);
        assert!(path.is_walkable(&MoverType::Walker));
        assert!(path.is_walkable(&MoverType::Flyer));
        assert!(!path.is_walkable(&MoverType::Stationary));

        let empty = point(TileType::EmptySpace);
        assert!(!empty.is_walkable(&MoverType::Walker));
        assert!(empty.is_walkable(&MoverType::Flyer));

        for tile in [TileType::Tower, TileType::Decor, TileType::DecorPatch] {
            let blocked = point(tile);
            assert!(!blocked.is_walkable(&MoverType::Walker));
            assert!(!blocked.is_walkable(&MoverType::Flyer));
        }
    }

    #[test]
    fn blockers_compose_and_never_go_negative() {
        let mut point = point(TileType::VerticalPath);

        assert_eq!(point.add_blocker(MoverType::Walker), Some(1));
        assert_eq!(point.add_blocker(MoverType::Walker), Some(2));
        assert!(point.remove_blocker(MoverType::Walker));
        assert!(!point.is_walkable(&MoverType::Walker));
        assert!(point.remove_blocker(MoverType::Walker));
        assert!(point.is_walkable(&MoverType::Walker));
        assert!(!point.remove_blocker(MoverType::Walker));
        assert_eq!(point.blockers(MoverType::Walker), 0);

        assert_eq!(point.add_blocker(MoverType::Stationary), None);
        assert!(!point.remove_blocker(MoverType::Stationary));
    }

    #[test]
    fn forcing_walkable_round_trips_counts() {
        let mut point = point(TileType::Tower);
        let _ = point.add_blocker(MoverType::Walker);

        let saved = point.force_walkable();
        assert!(point.is_walkable(&MoverType::Walker));
        assert!(point.is_walkable(&MoverType::Flyer));

        point.restore_blockers(saved);
        assert_eq!(point.blockers(MoverType::Walker), 2);
        assert_eq!(point.blockers(MoverType::Flyer), 1);
    }

    #[test]
    fn world_position_is_cell_centre() {
        let point = point(TileType::EmptySpace);
        assert_eq!(point.world_position(), Vec2::new(25.0, 35.0));
    }

    #[test]
    fn euclidean_range_excludes_far_corners() {
        let origin = GridPoint::new(CellCoord::new(5, 5), TileType::EmptySpace, 1.0);
        let edge = GridPoint::new(CellCoord::new(7, 5), TileType::EmptySpace, 1.0);
        let corner = GridPoint::new(CellCoord::new(7, 7), TileType::EmptySpace, 1.0);

        assert!(origin.in_range(&edge, 2.0));
        assert!(!origin.in_range(&corner, 2.0));
        assert!(GridPoint::in_range(&origin, &corner, 3.0));
    }

    #[test]
    fn occupants_are_a_set() {
        let mut point = point(TileType::HorizontalPath);
        point.add_occupant(UnitId::new(1));
        point.add_occupant(UnitId::new(1));
        point.add_occupant(UnitId::new(2));

        assert_eq!(point.occupants().len(), 2);
        assert!(point.remove_occupant(UnitId::new(1)));
        assert!(!point.remove_occupant(UnitId::new(1)));
        assert_eq!(point.occupants(), &[UnitId::new(2)]);
    }

    #[test]
    fn signed_lookup_rejects_out_of_range() {
        let points = (0..6)
            .map(|index| {
                GridPoint::new(
                    CellCoord::new(index % 3, index / 3),
                    TileType::EmptySpace,
                    1.0,
                )
            })
            .collect();
        let grid = Grid::from_points(3, 2, points);

        assert_eq!(
            grid.point_at(2, 1).map(GridPoint::cell),
            Some(CellCoord::new(2, 1))
        );
        assert!(grid.point_at(-1, 0).is_none());
        assert!(grid.point_at(0, 2).is_none());
        assert!(grid.point_at(3, 0).is_none());
    }
}
